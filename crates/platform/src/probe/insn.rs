//! Trial-execution capability probing (ARM Linux).
//!
//! Old ARM kernels under-report features in `/proc/cpuinfo`, so the
//! decoder confirms implied-but-unreported capabilities by executing one
//! candidate instruction under a SIGILL guard. The trap machinery is
//! confined to this module; everything above sees only
//! `probe(Instruction) -> Result<bool, Error>` and
//! `read_coprocessor(CoprocessorRegister) -> Result<u32, Error>`.
//!
//! Mechanism: a process-wide SIGILL/SIGBUS handler that records the fault
//! and advances the program counter past the 4-byte candidate instruction.
//! Probes are serialized behind a mutex because the handler and fault flag
//! are process-global.

use crate::Error;

/// Candidate instructions the decoder may probe for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Instruction {
  /// SDIV/UDIV in ARM mode.
  Div,
  /// LDREXB (ARMv6K exclusive loads).
  V6K,
  /// PLDW (ARMv7 multiprocessing extension).
  V7Mp,
  /// VFPv3 constant load.
  Vfp3,
  /// VFPv3 half-precision conversion.
  Vfp3Hp,
  /// VFPv4 fused multiply-add.
  Vfp4,
  /// Upper VFP register bank (d16-d31).
  VfpD32,
  /// NEON half-precision conversion.
  NeonHp,
  /// NEONv2 fused multiply-add.
  Neon2,
}

/// Readable coprocessor identification registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CoprocessorRegister {
  /// VFP FPSID.
  Fpsid,
  /// VFP MVFR0.
  Mvfr0,
  /// Wireless MMX WCID.
  Wcid,
}

/// Execute a candidate instruction; `Ok(true)` means it ran without
/// faulting. `Err(UnsupportedSoftware)` on platforms without the trap
/// harness (everything that is not ARM Linux).
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub fn probe(instruction: Instruction) -> Result<bool, Error> {
  arm::guarded(|| arm::execute(instruction))
}

/// Read a coprocessor identification register; `Ok(value)` only when the
/// read instruction executed without faulting.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub fn read_coprocessor(register: CoprocessorRegister) -> Result<u32, Error> {
  match arm::guarded(|| arm::read(register))? {
    Some(value) => Ok(value),
    None => Err(Error::UnsupportedHardware),
  }
}

#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
pub fn probe(_instruction: Instruction) -> Result<bool, Error> {
  Err(Error::UnsupportedSoftware)
}

#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
pub fn read_coprocessor(_register: CoprocessorRegister) -> Result<u32, Error> {
  Err(Error::UnsupportedSoftware)
}

#[cfg(all(target_arch = "arm", target_os = "linux"))]
#[allow(unsafe_code)] // signal handling and raw instruction words
mod arm {
  use core::sync::atomic::{AtomicBool, Ordering};
  use std::sync::Mutex;

  use super::{CoprocessorRegister, Instruction};
  use crate::Error;

  /// Set by the fault handler when the candidate instruction trapped.
  static FAULTED: AtomicBool = AtomicBool::new(false);

  /// Serializes probes: the handler and flag are process-global.
  static PROBE_LOCK: Mutex<()> = Mutex::new(());

  extern "C" fn on_fault(_signal: libc::c_int, _info: *mut libc::siginfo_t, context: *mut libc::c_void) {
    FAULTED.store(true, Ordering::SeqCst);
    // Skip the faulting 4-byte ARM instruction. All probed candidates are
    // fixed-width A32 encodings, never Thumb.
    // SAFETY: the kernel hands a valid ucontext_t to SA_SIGINFO handlers.
    unsafe {
      let ucontext = context.cast::<libc::ucontext_t>();
      (*ucontext).uc_mcontext.arm_pc += 4;
    }
  }

  /// Run `body` with the SIGILL/SIGBUS handler installed, restoring the
  /// previous handlers afterwards.
  pub(super) fn guarded<T>(body: impl FnOnce() -> T) -> Result<T, Error> {
    let _lock = PROBE_LOCK.lock().map_err(|_| Error::InvalidState)?;

    let mut action: libc::sigaction = unsafe { core::mem::zeroed() };
    action.sa_sigaction = on_fault as usize;
    action.sa_flags = libc::SA_SIGINFO;

    let mut old_ill: libc::sigaction = unsafe { core::mem::zeroed() };
    let mut old_bus: libc::sigaction = unsafe { core::mem::zeroed() };

    // SAFETY: the action structs are fully initialized above.
    let rc = unsafe { libc::sigaction(libc::SIGILL, &action, &mut old_ill) };
    if rc != 0 {
      return Err(Error::System(errno()));
    }
    // SAFETY: as above.
    let rc = unsafe { libc::sigaction(libc::SIGBUS, &action, &mut old_bus) };
    if rc != 0 {
      // SAFETY: old_ill holds the previous SIGILL disposition.
      unsafe { libc::sigaction(libc::SIGILL, &old_ill, core::ptr::null_mut()) };
      return Err(Error::System(errno()));
    }

    FAULTED.store(false, Ordering::SeqCst);
    let value = body();

    // SAFETY: restoring the dispositions saved above.
    unsafe {
      libc::sigaction(libc::SIGILL, &old_ill, core::ptr::null_mut());
      libc::sigaction(libc::SIGBUS, &old_bus, core::ptr::null_mut());
    }

    Ok(value)
  }

  fn errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
  }

  /// Execute one candidate instruction; true when it did not fault.
  ///
  /// Candidates are emitted as raw `.inst` words so the assembler accepts
  /// them regardless of the compile-time `-march` baseline. Each word is
  /// the A32 encoding named in the comment.
  pub(super) fn execute(instruction: Instruction) -> bool {
    FAULTED.store(false, Ordering::SeqCst);
    unsafe {
      match instruction {
        Instruction::Div => {
          // udiv r0, r0, r0
          core::arch::asm!(".inst 0xE730F010", out("r0") _, options(nostack, nomem));
        }
        Instruction::V6K => {
          let word: u32 = 0;
          // ldrexb r1, [r0]
          core::arch::asm!(
            ".inst 0xE1D01F9F",
            in("r0") core::ptr::addr_of!(word),
            out("r1") _,
            options(nostack)
          );
        }
        Instruction::V7Mp => {
          let word: u32 = 0;
          // pldw [r0]
          core::arch::asm!(
            ".inst 0xF510F000",
            in("r0") core::ptr::addr_of!(word),
            options(nostack)
          );
        }
        Instruction::Vfp3 => {
          // vmov.f64 d0, #1.0
          core::arch::asm!(".inst 0xEEB70B00", out("d0") _, options(nostack, nomem));
        }
        Instruction::Vfp3Hp => {
          // vcvtb.f32.f16 s0, s0
          core::arch::asm!(".inst 0xEEB20A40", out("d0") _, options(nostack, nomem));
        }
        Instruction::Vfp4 => {
          // vfma.f64 d0, d0, d0
          core::arch::asm!(".inst 0xEEA00B00", out("d0") _, options(nostack, nomem));
        }
        Instruction::VfpD32 => {
          // vmov.f64 d16, d16
          core::arch::asm!(".inst 0xEEF00B60", out("d16") _, options(nostack, nomem));
        }
        Instruction::NeonHp => {
          // vcvt.f32.f16 q0, d0
          core::arch::asm!(".inst 0xF3B60700", out("q0") _, options(nostack, nomem));
        }
        Instruction::Neon2 => {
          // vfma.f32 q0, q0, q0
          core::arch::asm!(".inst 0xF2000C50", out("q0") _, options(nostack, nomem));
        }
      }
    }
    !FAULTED.load(Ordering::SeqCst)
  }

  /// Read one coprocessor register; `None` when the read faulted.
  pub(super) fn read(register: CoprocessorRegister) -> Option<u32> {
    FAULTED.store(false, Ordering::SeqCst);
    let value: u32;
    unsafe {
      match register {
        CoprocessorRegister::Fpsid => {
          // vmrs r0, fpsid
          core::arch::asm!(".inst 0xEEF00A10", out("r0") value, options(nostack, nomem));
        }
        CoprocessorRegister::Mvfr0 => {
          // vmrs r0, mvfr0
          core::arch::asm!(".inst 0xEEF70A10", out("r0") value, options(nostack, nomem));
        }
        CoprocessorRegister::Wcid => {
          // mrc p1, 0, r0, c0, c0, 0  (tmrc wCID)
          core::arch::asm!(".inst 0xEE100110", out("r0") value, options(nostack, nomem));
        }
      }
    }
    if FAULTED.load(Ordering::SeqCst) { None } else { Some(value) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  #[cfg(not(all(target_arch = "arm", target_os = "linux")))]
  fn stub_reports_unsupported() {
    assert_eq!(probe(Instruction::Div), Err(Error::UnsupportedSoftware));
    assert_eq!(
      read_coprocessor(CoprocessorRegister::Fpsid),
      Err(Error::UnsupportedSoftware)
    );
  }

  #[test]
  #[cfg(all(target_arch = "arm", target_os = "linux"))]
  fn probe_does_not_crash() {
    // Whatever the hardware, probing must return rather than kill the process.
    for insn in [Instruction::Div, Instruction::Vfp3, Instruction::Neon2] {
      let _ = probe(insn).unwrap();
    }
  }
}

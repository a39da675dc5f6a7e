//! CPU cycle counting with explicit acquire/release lifecycle.
//!
//! On x86/x86-64 the counter is the TSC, read directly; nothing is
//! acquired from the OS. Everywhere else on Linux a `perf_event_open`
//! hardware-cycles counter is opened per acquisition and the file
//! descriptor is the owned resource.
//!
//! A successful [`CycleCounter::acquire`] must be matched by exactly one
//! [`release`](CycleCounter::release); a second release reports
//! [`Error::InvalidState`]. Dropping an unreleased counter closes the
//! OS handle without reporting a reading.

use platform::Error;

/// An in-progress cycle measurement.
#[derive(Debug)]
pub struct CycleCounter {
  state: Option<State>,
}

#[derive(Debug)]
enum State {
  /// x86 timestamp counter: the start reading is the whole state.
  #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
  Tsc { start: u64 },
  /// Linux perf-events cycle counter fd.
  #[cfg(all(target_os = "linux", not(any(target_arch = "x86", target_arch = "x86_64"))))]
  PerfEvent { fd: i32 },
}

impl CycleCounter {
  /// Start a cycle measurement.
  ///
  /// # Errors
  ///
  /// - `UnsupportedHardware` when the processor reports no usable cycle
  ///   counter.
  /// - `UnsupportedSoftware` when the OS refuses access (e.g.
  ///   `perf_event_paranoid`); expected on locked-down systems.
  /// - `System` for unexpected OS failures.
  pub fn acquire() -> Result<Self, Error> {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
      use platform::features::system;

      if !system::CYCLE_COUNTER.satisfies(platform::get().system_features()) {
        return Err(Error::UnsupportedHardware);
      }
      Ok(Self {
        state: Some(State::Tsc { start: read_tsc() }),
      })
    }

    #[cfg(all(target_os = "linux", not(any(target_arch = "x86", target_arch = "x86_64"))))]
    {
      let fd = perf::open_cycle_counter()?;
      Ok(Self {
        state: Some(State::PerfEvent { fd }),
      })
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_os = "linux")))]
    {
      Err(Error::UnsupportedSoftware)
    }
  }

  /// Finish the measurement: the elapsed cycle count since acquisition,
  /// releasing any OS resources.
  ///
  /// # Errors
  ///
  /// `InvalidState` when this counter was already released.
  pub fn release(&mut self) -> Result<u64, Error> {
    let state = self.state.take().ok_or(Error::InvalidState)?;
    match state {
      #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
      State::Tsc { start } => Ok(read_tsc().wrapping_sub(start)),

      #[cfg(all(target_os = "linux", not(any(target_arch = "x86", target_arch = "x86_64"))))]
      State::PerfEvent { fd } => perf::read_and_close(fd),
    }
  }

  /// Whether this counter is still acquired.
  #[inline]
  #[must_use]
  pub const fn is_acquired(&self) -> bool {
    self.state.is_some()
  }
}

impl Drop for CycleCounter {
  fn drop(&mut self) {
    #[cfg(all(target_os = "linux", not(any(target_arch = "x86", target_arch = "x86_64"))))]
    if let Some(State::PerfEvent { fd }) = self.state.take() {
      perf::close(fd);
    }
    // TSC state owns nothing.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
      self.state = None;
    }
  }
}

/// Serializing TSC read: CPUID fences earlier instructions, then RDTSC.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[allow(unsafe_code)]
fn read_tsc() -> u64 {
  #[cfg(target_arch = "x86")]
  use core::arch::x86::{__cpuid, _rdtsc};
  #[cfg(target_arch = "x86_64")]
  use core::arch::x86_64::{__cpuid, _rdtsc};

  // SAFETY: RDTSC/CPUID are available on every supported x86 target; the
  // CYCLE_COUNTER capability was checked at acquisition.
  unsafe {
    let _ = __cpuid(0);
    _rdtsc()
  }
}

#[cfg(all(target_os = "linux", not(any(target_arch = "x86", target_arch = "x86_64"))))]
#[allow(unsafe_code)]
mod perf {
  use platform::Error;

  /// Open a process-wide hardware cycle counter.
  pub(super) fn open_cycle_counter() -> Result<i32, Error> {
    let mut attr: libc::perf_event_attr = unsafe { core::mem::zeroed() };
    attr.type_ = libc::PERF_TYPE_HARDWARE as u32;
    attr.size = core::mem::size_of::<libc::perf_event_attr>() as u32;
    attr.config = libc::PERF_COUNT_HW_CPU_CYCLES as u64;
    attr.set_exclude_kernel(1);
    attr.set_exclude_hv(1);

    // SAFETY: attr is fully initialized; the remaining arguments select
    // "this process, any CPU, no group".
    let fd = unsafe {
      libc::syscall(
        libc::SYS_perf_event_open,
        core::ptr::addr_of!(attr),
        0 as libc::pid_t,
        -1 as libc::c_int,
        -1 as libc::c_int,
        0 as libc::c_ulong,
      )
    };
    if fd < 0 {
      let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
      return Err(match errno {
        // Locked down by perf_event_paranoid or seccomp.
        libc::EACCES | libc::EPERM => Error::UnsupportedSoftware,
        // No hardware PMU (common in VMs).
        libc::ENOENT | libc::ENODEV | libc::EOPNOTSUPP => Error::UnsupportedHardware,
        other => Error::System(other),
      });
    }
    Ok(fd as i32)
  }

  /// Read the accumulated count and close the descriptor.
  pub(super) fn read_and_close(fd: i32) -> Result<u64, Error> {
    let mut value: u64 = 0;
    // SAFETY: reading 8 bytes into a valid u64 from an owned fd.
    let read = unsafe {
      libc::read(
        fd,
        core::ptr::addr_of_mut!(value).cast(),
        core::mem::size_of::<u64>(),
      )
    };
    let read_errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    close(fd);
    if read == core::mem::size_of::<u64>() as isize {
      Ok(value)
    } else {
      Err(Error::System(read_errno))
    }
  }

  pub(super) fn close(fd: i32) {
    // SAFETY: fd is owned by the counter and closed exactly once.
    unsafe {
      libc::close(fd);
    }
  }
}

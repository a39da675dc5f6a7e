//! ARM decoding: `/proc/cpuinfo` and kernel-log probe output to vendor,
//! microarchitecture, feature masks, cache topology, and display names.
//!
//! ARM kernels under-report in two ways this decoder has to compensate
//! for: feature flags missing from old kernels (confirmed by trial
//! execution via [`probe::insn`]), and cache geometry that user mode
//! simply cannot read on v7+ cores (filled with per-microarchitecture
//! estimates).

use crate::cache::{CacheHierarchyInfo, CacheLevelInfo};
use crate::features::{isa, simd, system, IsaFeatures, SimdFeatures, SystemFeatures};
use crate::ident::{CpuMicroarchitecture, CpuVendor};
use crate::probe::insn::{self, CoprocessorRegister, Instruction};
use crate::probe::klog::KernelLogInfo;
use crate::probe::procfs::ProcCpuInfo;
use crate::strings;

/// Decoded identity and capabilities of an ARM processor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct DecodedArm {
  pub vendor: CpuVendor,
  pub microarchitecture: CpuMicroarchitecture,
  pub isa: IsaFeatures,
  pub simd: SimdFeatures,
  pub system: SystemFeatures,
  pub cache: CacheHierarchyInfo,
  pub full_name: String,
  pub brief_name: String,
}

/// Decode the parsed `/proc/cpuinfo` plus kernel-log hints.
///
/// `cores` is the logical core count (used for core-count-dependent L2
/// estimates and board-model recovery).
#[must_use]
pub fn decode(info: &ProcCpuInfo, klog: &KernelLogInfo, cores: u32) -> DecodedArm {
  let (vendor, microarchitecture) = decode_microarchitecture(info);

  let mut decoded = DecodedArm {
    vendor,
    microarchitecture,
    ..DecodedArm::default()
  };
  decode_features(info, &mut decoded);
  decoded.cache = decode_cache(info, microarchitecture, cores);

  let (full, brief) = display_names(klog, vendor, microarchitecture, cores, decoded.isa);
  decoded.full_name = full;
  decoded.brief_name = brief;

  decoded
}

// ─────────────────────────────────────────────────────────────────────────────
// Microarchitecture
// ─────────────────────────────────────────────────────────────────────────────

/// MIDR implementer codes are ASCII vendor initials; parts are 12-bit
/// codes whose interpretation is implementer-specific.
fn decode_microarchitecture(info: &ProcCpuInfo) -> (CpuVendor, CpuMicroarchitecture) {
  use CpuMicroarchitecture as M;

  match info.implementer {
    0x41 => {
      // 'A': ARM Ltd.
      let march = match info.part {
        // ARM1156, ARM11 MPCore, ARM1136, ARM1176
        0xB56 | 0xB02 | 0xB36 | 0xB76 => M::Arm11,
        0xC05 => M::CortexA5,
        0xC07 => M::CortexA7,
        0xC08 => M::CortexA8,
        0xC09 => M::CortexA9,
        0xC0F => M::CortexA15,
        part if part & 0xF00 == 0x700 => M::Arm7,
        part if part & 0xF00 == 0x900 => M::Arm9,
        _ => M::Unknown,
      };
      (CpuVendor::Arm, march)
    }
    // 'D': DEC StrongARM designs.
    0x44 => (CpuVendor::Dec, M::StrongArm),
    // 'M': Motorola/Freescale; no part table survives.
    0x4D => (CpuVendor::Motorola, M::Unknown),
    0x54 => {
      // 'T': TI, which also shipped licensed ARM9 cores under its code.
      if info.part == 0x925 {
        (CpuVendor::Arm, M::Arm9)
      } else {
        (CpuVendor::Ti, M::Unknown)
      }
    }
    0x51 => {
      // 'Q': Qualcomm.
      let march = match info.part {
        // Part 0x00F is mostly Scorpion, but some Cortex-A5 report it
        // too; unlike Scorpion, the A5 comes with VFPv4.
        0x00F => {
          if info.features.vfpv4 {
            return (CpuVendor::Arm, M::CortexA5);
          }
          M::Scorpion
        }
        // Dual-core Scorpion
        0x02D => M::Scorpion,
        // Dual- and quad-core Krait
        0x04D | 0x06F => M::Krait,
        _ => M::Unknown,
      };
      (CpuVendor::Qualcomm, march)
    }
    0x56 => {
      // 'V': Marvell. Only verified parts are listed.
      let march = match info.part {
        // PXA 935 and the Feroceon 88FRxxx line
        0x693 | 0x131 | 0x301 | 0x331 | 0x531 | 0x571 => M::Pj1,
        // Armada 510
        0x581 => M::Pj4,
        _ => M::Unknown,
      };
      (CpuVendor::Marvell, march)
    }
    0x69 => {
      // 'i': Intel.
      let march = match info.part {
        0xB11 => M::StrongArm,
        // PXA 210/25x/26x, PXA 27x, PXA 3xx generations
        part if matches!(part & 0xF00, 0x200 | 0x400 | 0x600) => M::XScale,
        _ => M::Unknown,
      };
      (CpuVendor::Intel, march)
    }
    _ => (CpuVendor::Unknown, M::Unknown),
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Features
// ─────────────────────────────────────────────────────────────────────────────

/// Trial-execute a candidate; an unavailable probe harness counts as "no".
fn probe_ok(instruction: Instruction) -> bool {
  insn::probe(instruction).unwrap_or(false)
}

#[allow(clippy::too_many_lines)]
fn decode_features(info: &ProcCpuInfo, decoded: &mut DecodedArm) {
  let mut isa_mask = IsaFeatures::NONE;
  let mut simd_mask = SimdFeatures::NONE;
  let mut system_mask = SystemFeatures::NONE;

  let arch = &info.architecture;
  if arch.thumb {
    isa_mask |= isa::arm::THUMB;
  }
  if arch.jazelle {
    isa_mask |= isa::arm::JAZELLE;
  }
  if arch.version >= 4 {
    isa_mask |= isa::arm::V4;
  }
  if arch.version >= 5 {
    isa_mask |= isa::arm::V5;
    if arch.dsp {
      isa_mask |= isa::arm::V5E;
    }
  }
  if arch.version >= 6 {
    isa_mask |= isa::arm::V6;
    if arch.version == 6 && probe_ok(Instruction::V6K) {
      isa_mask |= isa::arm::V6K;
    }
  }
  if arch.version >= 7 {
    // Raspberry Pi kernels report "CPU architecture: 7" for their ARM11;
    // trust the decoded part over the version line there.
    if decoded.microarchitecture != CpuMicroarchitecture::Arm11 {
      isa_mask |= isa::arm::V5E | isa::arm::V6K | isa::arm::V7 | isa::arm::THUMB | isa::arm::THUMB2;
      if probe_ok(Instruction::V7Mp) {
        isa_mask |= isa::arm::V7MP;
      }
    }
  }

  let flags = &info.features;
  if flags.thumb {
    isa_mask |= isa::arm::THUMB;
  }
  if flags.fpa {
    isa_mask |= isa::arm::FPA;
    system_mask |= system::arm::FPA_STATE;
  }
  if flags.vfp {
    isa_mask |= isa::arm::VFP;
    system_mask |= system::arm::S32_REGISTERS;
  }
  if flags.edsp {
    isa_mask |= isa::arm::V5E;
  }
  if flags.java {
    isa_mask |= isa::arm::JAZELLE;
  }
  if flags.iwmmxt {
    system_mask |= system::arm::WMMX_STATE;
    // The WCID coprocessor type distinguishes WMMX from WMMX2.
    if let Ok(wcid) = insn::read_coprocessor(CoprocessorRegister::Wcid) {
      let coprocessor_type = (wcid >> 8) & 0xFF;
      if coprocessor_type >= 0x10 {
        simd_mask |= simd::arm::WMMX;
      }
      if coprocessor_type >= 0x20 {
        simd_mask |= simd::arm::WMMX2;
      }
    }
  }
  if flags.thumbee {
    isa_mask |= isa::arm::THUMBEE;
  }
  if flags.neon {
    simd_mask |= simd::arm::NEON;
    // NEON mandates VFPv3-D32 and 32 D registers.
    isa_mask |= isa::arm::VFP | isa::arm::VFP2 | isa::arm::VFP3 | isa::arm::VFP_D32;
    system_mask |= system::arm::S32_REGISTERS | system::arm::D32_REGISTERS;
  }
  if flags.vfpv3 {
    system_mask |= system::arm::S32_REGISTERS;
    isa_mask |= isa::arm::VFP | isa::arm::VFP2 | isa::arm::VFP3;
    // The bare "vfpv3" flag covers both D16 and D32 parts.
    if !flags.neon && probe_ok(Instruction::VfpD32) {
      isa_mask |= isa::arm::VFP_D32;
    }
  }
  if flags.vfpv3d16 {
    system_mask |= system::arm::S32_REGISTERS;
    system_mask = system_mask.difference(system::arm::D32_REGISTERS);
    isa_mask |= isa::arm::VFP | isa::arm::VFP2 | isa::arm::VFP3;
    isa_mask = isa_mask.difference(isa::arm::VFP_D32);
  }
  if flags.vfpv4 {
    system_mask |= system::arm::S32_REGISTERS;
    isa_mask |= isa::arm::VFP | isa::arm::VFP2 | isa::arm::VFP3 | isa::arm::VFP3HP | isa::arm::VFP4;
    if !flags.neon && probe_ok(Instruction::VfpD32) {
      isa_mask |= isa::arm::VFP_D32;
    }
  }
  if flags.idiva {
    isa_mask |= isa::arm::DIV;
  }

  // Old kernels do not report DIV; probe to know for sure.
  if !isa_mask.contains(isa::arm::DIV) && probe_ok(Instruction::Div) {
    isa_mask |= isa::arm::DIV;
  }
  // VFP without VFPv3 is usually a kernel reporting gap, not hardware.
  if isa_mask.contains(isa::arm::VFP) && !isa_mask.contains(isa::arm::VFP3) && probe_ok(Instruction::Vfp3) {
    isa_mask |= isa::arm::VFP2 | isa::arm::VFP3;
    if probe_ok(Instruction::VfpD32) {
      isa_mask |= isa::arm::VFP_D32;
    }
  }
  if isa_mask.contains(isa::arm::VFP3) && !isa_mask.contains(isa::arm::VFP3HP) && probe_ok(Instruction::Vfp3Hp) {
    isa_mask |= isa::arm::VFP3HP;
  }
  if isa_mask.contains(isa::arm::VFP3HP) && !isa_mask.contains(isa::arm::VFP4) && probe_ok(Instruction::Vfp4) {
    isa_mask |= isa::arm::VFP4;
  }
  if simd_mask.contains(simd::arm::NEON) {
    if probe_ok(Instruction::NeonHp) {
      simd_mask |= simd::arm::NEON_HP;
    }
    if isa_mask.contains(isa::arm::VFP4) && probe_ok(Instruction::Neon2) {
      simd_mask |= simd::arm::NEON2;
    }
  }
  if decoded.microarchitecture == CpuMicroarchitecture::XScale {
    simd_mask |= simd::arm::XSCALE;
  }

  if isa_mask.contains(isa::arm::V6) {
    system_mask |= system::MISALIGNED_ACCESS;
  }

  // Pre-v7 only: FPSID identifies VFPv2 hardware the kernel has no flag
  // for, and MVFR0 reports the deprecated short-vector mode.
  if !isa_mask.contains(isa::arm::V7) {
    if !isa_mask.contains(isa::arm::VFP2) {
      if let Ok(fpsid) = insn::read_coprocessor(CoprocessorRegister::Fpsid) {
        let subarchitecture = (fpsid >> 16) & 0x7F;
        if subarchitecture >= 0x01 {
          isa_mask |= isa::arm::VFP2;
        }
      }
    }
    if let Ok(mvfr0) = insn::read_coprocessor(CoprocessorRegister::Mvfr0) {
      if (mvfr0 >> 24) & 0xF == 0x1 {
        system_mask |= system::arm::VFP_VECTOR_MODE;
      }
    }
  }

  decoded.isa = isa_mask;
  decoded.simd = simd_mask;
  decoded.system = system_mask;
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

const fn level(size: u32, line_size: u16, associativity: u16, unified: bool) -> CacheLevelInfo {
  CacheLevelInfo {
    size,
    line_size,
    associativity,
    unified,
  }
}

/// Old kernels export cache geometry in `/proc/cpuinfo`; use it when
/// present. Otherwise fall back to per-microarchitecture estimates: L1 is
/// fixed per design, L2 is configurable and guessed from the core count.
fn decode_cache(info: &ProcCpuInfo, march: CpuMicroarchitecture, cores: u32) -> CacheHierarchyInfo {
  use CpuMicroarchitecture as M;

  let mut cache = CacheHierarchyInfo::default();

  if info.cache.valid {
    let legacy = &info.cache;
    cache.l1i = level(legacy.i_size, legacy.i_line_length as u16, legacy.i_assoc as u16, false);
    cache.l1d = level(legacy.d_size, legacy.d_line_length as u16, legacy.d_assoc as u16, false);
    return cache;
  }

  match march {
    M::CortexA5 => {
      cache.l1i = level(32 * 1024, 32, 0, false);
      cache.l1d = level(32 * 1024, 32, 0, false);
      cache.l2 = level(256 * 1024, 32, 0, true);
    }
    M::CortexA7 => {
      cache.l1i = level(32 * 1024, 64, 0, false);
      cache.l1d = level(32 * 1024, 64, 0, false);
      cache.l2 = level(512 * 1024, 64, 0, true);
    }
    M::CortexA8 => {
      cache.l1i = level(32 * 1024, 64, 0, false);
      cache.l1d = level(32 * 1024, 64, 0, false);
      cache.l2 = level(256 * 1024, 64, 0, true);
    }
    M::CortexA9 => {
      cache.l1i = level(32 * 1024, 32, 0, false);
      cache.l1d = level(32 * 1024, 32, 0, false);
      cache.l2 = if cores >= 2 {
        level(1024 * 1024, 32, 16, true)
      } else {
        level(512 * 1024, 32, 8, true)
      };
    }
    M::CortexA15 => {
      cache.l1i = level(64 * 1024, 64, 0, false);
      cache.l1d = level(64 * 1024, 64, 0, false);
      cache.l2 = level(1024 * 1024, 64, 0, true);
    }
    M::Arm11 => {
      cache.l1i = level(16 * 1024, 32, 0, false);
      cache.l1d = level(16 * 1024, 32, 0, false);
      cache.l2 = level(128 * 1024, 32, 0, true);
    }
    M::Arm9 => {
      cache.l1i = level(16 * 1024, 32, 0, false);
      cache.l1d = level(16 * 1024, 32, 0, false);
    }
    M::Scorpion => {
      cache.l1i = level(32 * 1024, 32, 0, false);
      cache.l1d = level(32 * 1024, 32, 0, false);
      let l2_size = if cores >= 2 { 512 * 1024 } else { 256 * 1024 };
      cache.l2 = level(l2_size, 32, 0, true);
    }
    M::Krait => {
      // Krait fronts its L1 with tiny direct-mapped L0 caches.
      cache.l0i = level(4 * 1024, 0, 1, false);
      cache.l0d = level(4 * 1024, 0, 1, false);
      cache.l1i = level(16 * 1024, 0, 4, false);
      cache.l1d = level(16 * 1024, 0, 4, false);
      cache.l2 = if cores >= 4 {
        level(2 * 1024 * 1024, 0, 16, true)
      } else {
        level(1024 * 1024, 0, 8, true)
      };
    }
    M::Pj1 => {
      // Marvell Kirkwood 88F6281 geometry.
      cache.l1i = level(16 * 1024, 0, 0, false);
      cache.l1d = level(16 * 1024, 0, 0, false);
      cache.l2 = level(256 * 1024, 0, 0, true);
    }
    M::Pj4 => {
      // Marvell Armada 510 geometry.
      cache.l1i = level(32 * 1024, 0, 0, false);
      cache.l1d = level(32 * 1024, 0, 0, false);
      cache.l2 = level(512 * 1024, 0, 0, true);
    }
    M::XScale => {
      let l1_size = if info.part & 0xF00 == 0x200 { 16 * 1024 } else { 32 * 1024 };
      cache.l1i = level(l1_size, 0, 0, false);
      cache.l1d = level(l1_size, 0, 0, false);
      if info.part & 0xF00 == 0x600 {
        // Only third-generation XScale has an L2.
        cache.l2 = level(256 * 1024, 0, 0, true);
      }
    }
    _ => {}
  }

  cache
}

// ─────────────────────────────────────────────────────────────────────────────
// Display names
// ─────────────────────────────────────────────────────────────────────────────

/// Synthesize display names, best source first:
///
/// 1. SoC vendor + model from the kernel log ("TI OMAP 4460")
/// 2. SoC vendor + model recovered from the board name ("Rockchip RK3066")
/// 3. vendor + microarchitecture ("Samsung Cortex-A15 based")
/// 4. ISA-derived ("ARMv7-A compatible")
fn display_names(
  klog: &KernelLogInfo,
  vendor: CpuVendor,
  march: CpuMicroarchitecture,
  cores: u32,
  isa_mask: IsaFeatures,
) -> (String, String) {
  let soc_vendor = klog.vendor.name();
  if !soc_vendor.is_empty() {
    let model = klog
      .model
      .clone()
      .or_else(|| klog.board_model(march, cores).map(str::to_owned));
    if let Some(model) = model {
      return (format!("{soc_vendor} {model}"), model);
    }
  }

  // No SoC identity; fall back to the design vendor.
  let vendor_name = if vendor == CpuVendor::Unknown {
    ""
  } else {
    strings::vendor_description(vendor)
  };

  if march != CpuMicroarchitecture::Unknown {
    let march_name = strings::microarchitecture_description(march);
    let brief = format!("{march_name} based");
    let full = if vendor_name.is_empty() {
      brief.clone()
    } else {
      format!("{vendor_name} {brief}")
    };
    return (full, brief);
  }

  let isa_name = name_from_isa(isa_mask);
  // "ARM ARMv7-A compatible" would be silly; elide the vendor there.
  let full = if vendor_name.is_empty() || vendor == CpuVendor::Arm {
    isa_name.to_owned()
  } else {
    format!("{vendor_name} {isa_name}")
  };
  (full, isa_name.to_owned())
}

/// The most specific architecture name the ISA mask supports.
fn name_from_isa(isa_mask: IsaFeatures) -> &'static str {
  if isa_mask.contains(isa::arm::V7) {
    "ARMv7-A compatible"
  } else if isa_mask.contains(isa::arm::V6K) {
    "ARMv6K compatible"
  } else if isa_mask.contains(isa::arm::V6) {
    "ARMv6 compatible"
  } else if isa_mask.contains(isa::arm::V5) {
    if isa_mask.contains(isa::arm::THUMB) {
      if isa_mask.contains(isa::arm::V5E) {
        if isa_mask.contains(isa::arm::JAZELLE) {
          "ARMv5TEJ compatible"
        } else {
          "ARMv5TE compatible"
        }
      } else {
        "ARMv5T compatible"
      }
    } else {
      "ARMv5 compatible"
    }
  } else if isa_mask.contains(isa::arm::THUMB) {
    "ARMv4T compatible"
  } else {
    "ARMv4 compatible"
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::probe::procfs;

  fn pandaboard_info() -> ProcCpuInfo {
    procfs::parse(
      "\
processor       : 0
processor       : 1
Features        : swp half thumb fastmult vfp edsp thumbee neon vfpv3
CPU implementer : 0x41
CPU architecture: 7
CPU variant     : 0x2
CPU part        : 0xc09
CPU revision    : 10
",
    )
  }

  #[test]
  fn cortex_a9_identity() {
    let (vendor, march) = decode_microarchitecture(&pandaboard_info());
    assert_eq!(vendor, CpuVendor::Arm);
    assert_eq!(march, CpuMicroarchitecture::CortexA9);
  }

  #[test]
  fn cortex_a9_features() {
    let decoded = decode(&pandaboard_info(), &KernelLogInfo::default(), 2);
    assert!(decoded.isa.contains(isa::arm::V7));
    assert!(decoded.isa.contains(isa::arm::THUMB2));
    assert!(decoded.isa.contains(isa::arm::VFP3));
    assert!(decoded.isa.contains(isa::arm::VFP_D32));
    assert!(decoded.simd.contains(simd::arm::NEON));
    assert!(decoded.system.contains(system::arm::D32_REGISTERS));
    assert!(decoded.system.contains(system::MISALIGNED_ACCESS));
  }

  #[test]
  fn qualcomm_scorpion_vs_cortex_a5() {
    // Part 0x00F without VFPv4 is Scorpion.
    let mut info = ProcCpuInfo {
      implementer: 0x51,
      part: 0x00F,
      ..ProcCpuInfo::default()
    };
    assert_eq!(
      decode_microarchitecture(&info),
      (CpuVendor::Qualcomm, CpuMicroarchitecture::Scorpion)
    );

    // The same part with VFPv4 is a Cortex-A5 in disguise.
    info.features.vfpv4 = true;
    assert_eq!(
      decode_microarchitecture(&info),
      (CpuVendor::Arm, CpuMicroarchitecture::CortexA5)
    );
  }

  #[test]
  fn krait_parts() {
    for part in [0x04D, 0x06F] {
      let info = ProcCpuInfo {
        implementer: 0x51,
        part,
        ..ProcCpuInfo::default()
      };
      assert_eq!(
        decode_microarchitecture(&info),
        (CpuVendor::Qualcomm, CpuMicroarchitecture::Krait)
      );
    }
  }

  #[test]
  fn xscale_generations() {
    for part in [0x210, 0x412, 0x688] {
      let info = ProcCpuInfo {
        implementer: 0x69,
        part,
        ..ProcCpuInfo::default()
      };
      assert_eq!(
        decode_microarchitecture(&info),
        (CpuVendor::Intel, CpuMicroarchitecture::XScale)
      );
    }
    let strongarm = ProcCpuInfo {
      implementer: 0x69,
      part: 0xB11,
      ..ProcCpuInfo::default()
    };
    assert_eq!(decode_microarchitecture(&strongarm).1, CpuMicroarchitecture::StrongArm);
  }

  #[test]
  fn arm_part_ranges() {
    let arm7 = ProcCpuInfo {
      implementer: 0x41,
      part: 0x710,
      ..ProcCpuInfo::default()
    };
    assert_eq!(decode_microarchitecture(&arm7).1, CpuMicroarchitecture::Arm7);

    let arm9 = ProcCpuInfo {
      implementer: 0x41,
      part: 0x926,
      ..ProcCpuInfo::default()
    };
    assert_eq!(decode_microarchitecture(&arm9).1, CpuMicroarchitecture::Arm9);
  }

  #[test]
  fn raspberry_pi_arch7_workaround() {
    // ARM1176 with the bogus "CPU architecture: 7" line: must not gain v7.
    let info = procfs::parse(
      "\
Features        : swp half thumb fastmult vfp edsp java tls
CPU implementer : 0x41
CPU architecture: 7
CPU part        : 0xb76
",
    );
    let decoded = decode(&info, &KernelLogInfo::default(), 1);
    assert_eq!(decoded.microarchitecture, CpuMicroarchitecture::Arm11);
    assert!(!decoded.isa.contains(isa::arm::V7));
    assert!(!decoded.isa.contains(isa::arm::THUMB2));
    // The version line still grants v6 (7 >= 6).
    assert!(decoded.isa.contains(isa::arm::V6));
  }

  #[test]
  fn vfpv3d16_clears_d32() {
    let info = procfs::parse(
      "\
Features        : swp half thumb vfp edsp neon vfpv3d16
CPU implementer : 0x41
CPU architecture: 7
CPU part        : 0xc09
",
    );
    let decoded = decode(&info, &KernelLogInfo::default(), 1);
    // The explicit d16 flag wins over the NEON-implied d32.
    assert!(!decoded.isa.contains(isa::arm::VFP_D32));
    assert!(!decoded.system.contains(system::arm::D32_REGISTERS));
    assert!(decoded.isa.contains(isa::arm::VFP3));
  }

  #[test]
  fn legacy_cache_info_wins_over_estimates() {
    let info = procfs::parse(
      "\
CPU implementer : 0x41
CPU architecture: 5TEJ
CPU part        : 0x926
I size          : 16384
I assoc         : 4
I line length   : 32
I sets          : 128
D size          : 8192
D assoc         : 4
D line length   : 32
D sets          : 64
",
    );
    let decoded = decode(&info, &KernelLogInfo::default(), 1);
    assert_eq!(decoded.cache.l1i.size, 16384);
    assert_eq!(decoded.cache.l1d.size, 8192);
    assert_eq!(decoded.cache.l2.size, 0);
  }

  #[test]
  fn cortex_a9_l2_scales_with_cores() {
    let info = pandaboard_info();
    let single = decode_cache(&info, CpuMicroarchitecture::CortexA9, 1);
    let dual = decode_cache(&info, CpuMicroarchitecture::CortexA9, 2);
    assert_eq!(single.l2.size, 512 * 1024);
    assert_eq!(dual.l2.size, 1024 * 1024);
  }

  #[test]
  fn krait_has_l0() {
    let cache = decode_cache(&ProcCpuInfo::default(), CpuMicroarchitecture::Krait, 4);
    assert_eq!(cache.l0i.size, 4 * 1024);
    assert_eq!(cache.l0d.associativity, 1);
    assert_eq!(cache.l2.size, 2 * 1024 * 1024);
  }

  #[test]
  fn name_prefers_kernel_log_model() {
    let klog = KernelLogInfo {
      vendor: crate::probe::klog::SocVendor::TexasInstruments,
      model: Some("OMAP 4460".to_owned()),
      ..KernelLogInfo::default()
    };
    let (full, brief) = display_names(
      &klog,
      CpuVendor::Arm,
      CpuMicroarchitecture::CortexA9,
      2,
      IsaFeatures::NONE,
    );
    assert_eq!(full, "TI OMAP 4460");
    assert_eq!(brief, "OMAP 4460");
  }

  #[test]
  fn name_falls_back_to_microarchitecture() {
    let (full, brief) = display_names(
      &KernelLogInfo::default(),
      CpuVendor::Qualcomm,
      CpuMicroarchitecture::Krait,
      4,
      IsaFeatures::NONE,
    );
    assert_eq!(full, "Qualcomm Krait based");
    assert_eq!(brief, "Krait based");
  }

  #[test]
  fn name_falls_back_to_isa() {
    let isa_mask = isa::arm::V5 | isa::arm::V5E | isa::arm::THUMB | isa::arm::JAZELLE;
    let (full, brief) = display_names(
      &KernelLogInfo::default(),
      CpuVendor::Arm,
      CpuMicroarchitecture::Unknown,
      1,
      isa_mask,
    );
    // The redundant "ARM" vendor prefix is elided.
    assert_eq!(full, "ARMv5TEJ compatible");
    assert_eq!(brief, "ARMv5TEJ compatible");
  }
}

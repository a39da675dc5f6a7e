//! x86/x86-64 decoding: CPUID snapshot to vendor, microarchitecture,
//! feature masks, cache topology, and display names.
//!
//! Everything here is a pure function of a [`CpuidSnapshot`], so the
//! decode tables are exercised with synthetic register values in tests.
//!
//! Register/bit assignments follow the Intel SDM and AMD APM; bits that
//! only one vendor defines are commented with the defining vendor. Leaf-2
//! cache descriptors come from Intel AN-485 plus the Cyrix detection
//! guide.

use crate::cache::{CacheHierarchyInfo, CacheLevelInfo};
use crate::features::{isa, simd, system, IsaFeatures, SimdFeatures, SystemFeatures};
use crate::ident::{CpuMicroarchitecture, CpuVendor};
use crate::probe::cpuid::CpuidSnapshot;

/// Decoded identity and capabilities of an x86 processor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct DecodedX86 {
  pub vendor: CpuVendor,
  pub microarchitecture: CpuMicroarchitecture,
  pub isa: IsaFeatures,
  pub simd: SimdFeatures,
  pub system: SystemFeatures,
  pub cache: CacheHierarchyInfo,
  /// Normalized marketing name, e.g. "Intel Core i7-3770".
  pub full_name: String,
  /// Shortened form without decorations and frequency suffix.
  pub brief_name: String,
}

/// Decode a full CPUID snapshot.
#[must_use]
pub fn decode(snapshot: &CpuidSnapshot) -> DecodedX86 {
  let vendor = decode_vendor(snapshot.vendor_regs);
  let model = ModelInfo::from_leaf1_eax(snapshot.leaf1.eax);
  let microarchitecture = decode_microarchitecture(vendor, &model);

  let mut decoded = DecodedX86 {
    vendor,
    microarchitecture,
    ..DecodedX86::default()
  };
  decode_features(snapshot, &mut decoded);
  decoded.cache = decode_cache(snapshot, vendor, &model);

  let (full, brief) = decode_brand(&snapshot.brand);
  decoded.full_name = full;
  decoded.brief_name = brief;

  decoded
}

// ─────────────────────────────────────────────────────────────────────────────
// Vendor
// ─────────────────────────────────────────────────────────────────────────────

/// Known 12-byte vendor strings as the (EBX, EDX, ECX) words of leaf 0.
/// Several vendors shipped more than one string over the years.
const VENDOR_PATTERNS: &[([u32; 3], CpuVendor)] = &[
  // "GenuineIntel"
  ([0x756E_6547, 0x4965_6E69, 0x6C65_746E], CpuVendor::Intel),
  // "AuthenticAMD"
  ([0x6874_7541, 0x6974_6E65, 0x444D_4163], CpuVendor::Amd),
  // "AMDisbetter!" (early engineering samples)
  ([0x6944_4D41, 0x7465_6273, 0x2172_6574], CpuVendor::Amd),
  // "AMD ISBETTER"
  ([0x2044_4D41, 0x4542_5349, 0x5245_5454], CpuVendor::Amd),
  // "CentaurHauls"
  ([0x746E_6543, 0x4872_7561, 0x736C_7561], CpuVendor::Via),
  // "VIA VIA VIA "
  ([0x2041_4956, 0x2041_4956, 0x2041_4956], CpuVendor::Via),
  // "GenuineTMx86"
  ([0x756E_6547, 0x5465_6E69, 0x3638_784D], CpuVendor::Transmeta),
  // "TransmetaCPU"
  ([0x6E61_7254, 0x7465_6D73, 0x5550_4361], CpuVendor::Transmeta),
  // "CyrixInstead"
  ([0x6972_7943, 0x736E_4978, 0x6461_6574], CpuVendor::Cyrix),
  // "RiseRiseRise"
  ([0x6573_6952, 0x6573_6952, 0x6573_6952], CpuVendor::Rise),
  // "Geode by NSC"
  ([0x646F_6547, 0x7962_2065, 0x4353_4E20], CpuVendor::Nsc),
  // "SiS SiS SiS "
  ([0x2053_6953, 0x2053_6953, 0x2053_6953], CpuVendor::Sis),
  // "NexGenDriven"
  ([0x4778_654E, 0x7244_6E65, 0x6E65_7669], CpuVendor::NexGen),
  // "UMC UMC UMC "
  ([0x2043_4D55, 0x2043_4D55, 0x2043_4D55], CpuVendor::Umc),
  // "Genuine  RDC"
  ([0x756E_6547, 0x2065_6E69, 0x4344_5220], CpuVendor::Rdc),
  // "Vortex86 SoC"
  ([0x7472_6F56, 0x3638_7865, 0x436F_5320], CpuVendor::Dmp),
];

fn decode_vendor(regs: [u32; 3]) -> CpuVendor {
  VENDOR_PATTERNS
    .iter()
    .find(|(pattern, _)| *pattern == regs)
    .map_or(CpuVendor::Unknown, |&(_, vendor)| vendor)
}

// ─────────────────────────────────────────────────────────────────────────────
// Family / model
// ─────────────────────────────────────────────────────────────────────────────

/// Sub-fields of CPUID leaf 1 EAX plus the combined family/model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModelInfo {
  pub stepping: u32,
  pub base_model: u32,
  pub base_family: u32,
  pub processor_type: u32,
  pub ext_model: u32,
  pub ext_family: u32,
  /// `base_family + ext_family`.
  pub family: u32,
  /// `base_model + ext_model * 16`.
  pub model: u32,
}

impl ModelInfo {
  /// Split leaf 1 EAX and apply the family/model extension rule.
  #[must_use]
  pub const fn from_leaf1_eax(eax: u32) -> Self {
    let stepping = eax & 0xF;
    let base_model = (eax >> 4) & 0xF;
    let base_family = (eax >> 8) & 0xF;
    let processor_type = (eax >> 12) & 0x3;
    let ext_model = (eax >> 16) & 0xF;
    let ext_family = (eax >> 20) & 0xFF;

    Self {
      stepping,
      base_model,
      base_family,
      processor_type,
      ext_model,
      ext_family,
      family: base_family + ext_family,
      model: base_model + ext_model * 16,
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Microarchitecture
// ─────────────────────────────────────────────────────────────────────────────

fn decode_microarchitecture(vendor: CpuVendor, model: &ModelInfo) -> CpuMicroarchitecture {
  match vendor {
    CpuVendor::Intel => decode_intel(model),
    CpuVendor::Amd => decode_amd(model),
    _ => CpuMicroarchitecture::Unknown,
  }
}

fn decode_intel(model: &ModelInfo) -> CpuMicroarchitecture {
  use CpuMicroarchitecture as M;

  match model.family {
    0x05 => M::P5,
    0x06 => match model.model {
      // Pentium Pro through Pentium III (Katmai/Coppermine/Tualatin)
      0x01 | 0x03 | 0x05 | 0x06 | 0x07 | 0x08 | 0x0A | 0x0B => M::P6,
      // Pentium M (Banias/Dothan), Intel 80579
      0x09 | 0x0D | 0x15 => M::Dothan,
      // Core Solo/Duo (Yonah), Dual-Core Xeon (Sossaman)
      0x0E => M::Yonah,
      // Core 2 (Conroe/Merom), Xeon (Woodcrest/Clovertown)
      0x0F | 0x16 => M::Conroe,
      // Core 2 (Penryn/Yorkfield), Xeon (Harpertown/Dunnington)
      0x17 | 0x1D => M::Penryn,
      // Atom (Diamondville/Silverthorne/Pineview), Tunnel Creek
      0x1C | 0x26 => M::Bonnell,
      // Atom (Medfield/Cloverview/Cedarview)
      0x27 | 0x35 | 0x36 => M::Saltwell,
      // Atom (Bay Trail/Merrifield/Avoton)
      0x37 | 0x4A | 0x4D => M::Silvermont,
      // Core iX (Bloomfield/Lynnfield/Clarkdale/Gulftown), Xeon (Beckton)
      0x1A | 0x1E | 0x1F | 0x25 | 0x2C | 0x2E | 0x2F => M::Nehalem,
      0x2A | 0x2D => M::SandyBridge,
      0x3A | 0x3E => M::IvyBridge,
      // Haswell, Haswell-E, Haswell ULT, Haswell with eDRAM
      0x3C | 0x3F | 0x45 | 0x46 => M::Haswell,
      _ => M::Unknown,
    },
    0x0B => match model.model {
      0x00 => M::KnightsFerry,
      0x01 => M::KnightsCorner,
      _ => M::Unknown,
    },
    0x0F => match model.model {
      // Willamette/Northwood, incl. Foster/Gallatin Xeons
      0x00 | 0x01 | 0x02 => M::Willamette,
      // Prescott/Cedar Mill, incl. Nocona/Dempsey Xeons
      0x03 | 0x04 | 0x06 => M::Prescott,
      _ => M::Unknown,
    },
    _ => M::Unknown,
  }
}

fn decode_amd(model: &ModelInfo) -> CpuMicroarchitecture {
  use CpuMicroarchitecture as M;

  match model.family {
    0x05 => match model.model {
      0x00..=0x02 => M::K5,
      0x06 | 0x07 | 0x08 | 0x0D => M::K6,
      0x0A => M::Geode,
      _ => M::Unknown,
    },
    0x06 => M::K7,
    // Opteron, Athlon 64, Sempron; family 0x11 is Turion
    0x0F | 0x11 => M::K8,
    // Opteron/Phenom; family 0x12 is the Llano APU
    0x10 | 0x12 => M::K10,
    0x14 => M::Bobcat,
    0x15 => match model.model {
      // Engineering samples and Zambezi/Interlagos
      0x00 | 0x01 => M::Bulldozer,
      // Vishera, Trinity, Richland
      0x02 | 0x10 | 0x13 => M::Piledriver,
      _ => match model.ext_model {
        0x0 => M::Bulldozer,
        0x1 | 0x2 => M::Piledriver,
        0x3 | 0x4 => M::Steamroller,
        _ => M::Unknown,
      },
    },
    0x16 => M::Jaguar,
    _ => M::Unknown,
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Features
// ─────────────────────────────────────────────────────────────────────────────

// Single-register feature rules: `(bit, feature)` per source register.
// Bits that need vendor gating or cross-register combination are handled
// in code below the tables.

/// Rules for leaf 1 ECX ISA bits.
const LEAF1_ECX_ISA_RULES: &[(u32, IsaFeatures)] = &[
  (1, isa::x86::PCLMULQDQ),
  (3, isa::x86::MONITOR),
  (13, isa::x86::CMPXCHG16B),
  (22, isa::x86::MOVBE),
  (23, isa::x86::POPCNT),
  (25, isa::x86::AES),
  (26, isa::x86::XSAVE),
  (30, isa::x86::RDRAND),
];

/// Rules for leaf 1 ECX SIMD bits.
const LEAF1_ECX_SIMD_RULES: &[(u32, SimdFeatures)] = &[
  (0, simd::x86::SSE3),
  (9, simd::x86::SSSE3),
  (12, simd::x86::FMA3),
  (19, simd::x86::SSE4_1),
  (20, simd::x86::SSE4_2),
  (28, simd::x86::AVX),
  (29, simd::x86::F16C),
];

/// Rules for leaf 7 EBX ISA bits.
const LEAF7_EBX_ISA_RULES: &[(u32, IsaFeatures)] = &[
  (0, isa::x86::FSGSBASE),
  (3, isa::x86::BMI),
  (4, isa::x86::HLE),
  (8, isa::x86::BMI2),
  (11, isa::x86::RTM),
  (14, isa::x86::MPX),
  (18, isa::x86::RDSEED),
  (19, isa::x86::ADX),
  (29, isa::x86::SHA),
];

/// Rules for leaf 7 EBX SIMD bits.
const LEAF7_EBX_SIMD_RULES: &[(u32, SimdFeatures)] = &[
  (5, simd::x86::AVX2),
  (16, simd::x86::AVX512F),
  (26, simd::x86::AVX512PF),
  (27, simd::x86::AVX512ER),
  (28, simd::x86::AVX512CD),
];

/// Rules for extended-leaf ECX ISA bits (AMD-defined unless noted).
const EXT1_ECX_ISA_RULES: &[(u32, IsaFeatures)] = &[
  (0, isa::x86::LAHF_SAHF_64), // Intel and AMD
  (5, isa::x86::LZCNT),        // Intel and AMD
  (15, isa::x86::LWP),
  (21, isa::x86::TBM),
];

/// Rules for extended-leaf ECX SIMD bits (AMD-defined).
const EXT1_ECX_SIMD_RULES: &[(u32, SimdFeatures)] = &[
  (6, simd::x86::SSE4A),
  (11, simd::x86::XOP),
  (16, simd::x86::FMA4),
];

fn apply_isa_rules(register: u32, rules: &[(u32, IsaFeatures)], mask: &mut IsaFeatures) {
  for &(bit, feature) in rules {
    if register & (1 << bit) != 0 {
      *mask |= feature;
    }
  }
}

fn apply_simd_rules(register: u32, rules: &[(u32, SimdFeatures)], mask: &mut SimdFeatures) {
  for &(bit, feature) in rules {
    if register & (1 << bit) != 0 {
      *mask |= feature;
    }
  }
}

#[allow(clippy::too_many_lines)]
fn decode_features(snapshot: &CpuidSnapshot, decoded: &mut DecodedX86) {
  let basic = snapshot.leaf1;
  let structured = snapshot.leaf7;
  let extended = snapshot.extended1;

  let mut isa_mask = IsaFeatures::NONE;
  let mut simd_mask = SimdFeatures::NONE;
  let mut system_mask = SystemFeatures::NONE;

  // Processors without CPUID are not a supported target.
  isa_mask |= isa::x86::CPUID;
  // Misaligned access is architectural on x86.
  system_mask |= system::MISALIGNED_ACCESS;
  #[cfg(target_arch = "x86_64")]
  {
    system_mask |= system::ADDRESS_SPACE_64BIT | system::GP_REGISTERS_64BIT;
  }

  apply_isa_rules(basic.ecx, LEAF1_ECX_ISA_RULES, &mut isa_mask);
  apply_simd_rules(basic.ecx, LEAF1_ECX_SIMD_RULES, &mut simd_mask);
  apply_isa_rules(structured.ebx, LEAF7_EBX_ISA_RULES, &mut isa_mask);
  apply_simd_rules(structured.ebx, LEAF7_EBX_SIMD_RULES, &mut simd_mask);
  apply_isa_rules(extended.ecx, EXT1_ECX_ISA_RULES, &mut isa_mask);
  apply_simd_rules(extended.ecx, EXT1_ECX_SIMD_RULES, &mut simd_mask);

  // XTEST is usable when either TSX half is present.
  if isa_mask.contains(isa::x86::HLE) || isa_mask.contains(isa::x86::RTM) {
    isa_mask |= isa::x86::XTEST;
  }

  // Bits AMD mirrors in the extended leaf (reserved there on Intel), so
  // the basic and extended registers are OR-combined.
  let edx_both = basic.edx | extended.edx;
  if edx_both & (1 << 0) != 0 {
    isa_mask |= isa::x86::FPU;
  }
  if edx_both & (1 << 4) != 0 {
    isa_mask |= isa::x86::RDTSC;
    system_mask |= system::CYCLE_COUNTER | system::CYCLE_COUNTER_64BIT;
  }
  if edx_both & (1 << 5) != 0 {
    isa_mask |= isa::x86::MSR;
  }
  if edx_both & (1 << 8) != 0 {
    isa_mask |= isa::x86::CMPXCHG8B;
  }
  if edx_both & (1 << 15) != 0 {
    isa_mask |= isa::x86::CMOV;
  }
  if edx_both & (1 << 23) != 0 {
    simd_mask |= simd::x86::MMX;
  }

  if basic.edx & (1 << 11) != 0 {
    isa_mask |= isa::x86::SYSENTER;
  }
  if extended.edx & (1 << 11) != 0 {
    isa_mask |= isa::x86::SYSCALL;
  }
  if basic.edx & (1 << 19) != 0 {
    isa_mask |= isa::x86::CLFLUSH;
  }
  // FXSAVE: basic bit 24; on the extended leaf the same position is the
  // Cyrix EMMX flag, everyone else mirrors FXSAVE there.
  if basic.edx & (1 << 24) != 0 {
    isa_mask |= isa::x86::FXSAVE;
  }
  if extended.edx & (1 << 24) != 0 {
    if decoded.vendor == CpuVendor::Cyrix {
      simd_mask |= simd::x86::EMMX;
    } else {
      isa_mask |= isa::x86::FXSAVE;
    }
  }

  // SSE/SSE2 from the basic leaf; MMX+ is implied by SSE, and pre-SSE AMD
  // parts report it at extended bit 22.
  if basic.edx & (1 << 25) != 0 {
    simd_mask |= simd::x86::SSE | simd::x86::MMX_PLUS;
  }
  if basic.edx & (1 << 26) != 0 {
    simd_mask |= simd::x86::SSE2;
  }
  if extended.edx & (1 << 22) != 0 {
    simd_mask |= simd::x86::MMX_PLUS;
  }

  // 3dnow! family (AMD).
  if extended.edx & (1 << 31) != 0 {
    simd_mask |= simd::x86::THREE_D_NOW;
  }
  if extended.edx & (1 << 30) != 0 {
    simd_mask |= simd::x86::THREE_D_NOW_PLUS;
    if decoded.microarchitecture == CpuMicroarchitecture::Geode {
      simd_mask |= simd::x86::THREE_D_NOW_GEODE;
    }
  }
  // PREFETCH/PREFETCHW: its own flag, or implied by any 3dnow!.
  if extended.ecx & (1 << 8) != 0 || extended.edx & 0xC000_0000 != 0 {
    simd_mask |= simd::x86::THREE_D_NOW_PREFETCH;
  }

  // Long mode.
  if extended.edx & (1 << 29) != 0 {
    isa_mask |= isa::x86::X64;
  }
  #[cfg(target_arch = "x86_64")]
  {
    // The code is executing in long mode regardless of what a hypervisor
    // chose to report.
    isa_mask |= isa::x86::X64;
    simd_mask |= simd::x86::SSE | simd::x86::SSE2;
  }

  if extended.edx & (1 << 27) != 0 {
    isa_mask |= isa::x86::RDTSCP;
  }
  // AMD MisAlignSse.
  if extended.ecx & (1 << 7) != 0 {
    system_mask |= system::x86::MISALIGNED_SSE;
  }

  decode_os_state(snapshot, isa_mask, simd_mask, &mut system_mask);
  decode_padlock(snapshot, &mut isa_mask, &mut system_mask);

  decoded.isa = isa_mask;
  decoded.simd = simd_mask;
  decoded.system = system_mask;
}

/// OS-preserved register state via XCR0: a SIMD extension is only usable
/// when the OS saves its registers across context switches.
fn decode_os_state(
  snapshot: &CpuidSnapshot,
  isa_mask: IsaFeatures,
  simd_mask: SimdFeatures,
  system_mask: &mut SystemFeatures,
) {
  let basic = snapshot.leaf1;
  // XSAVE (26) and OSXSAVE (27) must both be set for XGETBV to be usable.
  if basic.ecx & 0x0C00_0000 == 0x0C00_0000 {
    let valid = snapshot.xcr0_valid;
    let enabled = snapshot.xfeature_enabled;

    if isa_mask.contains(isa::x86::FPU) {
      // XCR0 bit 0 (x87) is hardwired to 1, but tolerate zero `valid`
      // masks from hypervisors by falling back to "supported".
      if valid & 0x1 == 0 || enabled & 0x1 != 0 {
        *system_mask |= system::x86::FPU_STATE;
      }
    }
    if simd_mask.contains(simd::x86::SSE) {
      if valid & 0x2 == 0 || enabled & 0x2 != 0 {
        *system_mask |= system::x86::XMM_STATE;
      }
    }
    if simd_mask.contains(simd::x86::AVX) && valid & enabled & 0x6 == 0x6 {
      *system_mask |= system::x86::YMM_STATE;
    }
    // Opmask (5), upper-ZMM (6), hi16-ZMM (7) plus the YMM/XMM chain.
    if simd_mask.contains(simd::x86::AVX512F) && valid & enabled & 0xE6 == 0xE6 {
      *system_mask |= system::x86::ZMM_STATE;
    }
    // BNDREGS (3) and BNDCSR (4).
    if isa_mask.contains(isa::x86::MPX) && valid & enabled & 0x18 == 0x18 {
      *system_mask |= system::x86::BND_STATE;
    }
  } else {
    // No OSXSAVE: speculate that the OS supports x87 and SSE if the CPU
    // does; every OS this library runs on has since long before AVX.
    if isa_mask.contains(isa::x86::FPU) {
      *system_mask |= system::x86::FPU_STATE;
    }
    if simd_mask.contains(simd::x86::SSE) {
      *system_mask |= system::x86::XMM_STATE;
    }
  }
}

/// VIA PadLock: paired exists/enabled bits in leaf 0xC000_0001 EDX.
fn decode_padlock(snapshot: &CpuidSnapshot, isa_mask: &mut IsaFeatures, system_mask: &mut SystemFeatures) {
  const PAIRS: &[(u32, IsaFeatures, SystemFeatures)] = &[
    (2, isa::x86::RNG, system::x86::RNG_ENABLED),
    (6, isa::x86::ACE, system::x86::ACE_ENABLED),
    (8, isa::x86::ACE2, system::x86::ACE2_ENABLED),
    (10, isa::x86::PHE, system::x86::PHE_ENABLED),
    (12, isa::x86::PMM, system::x86::PMM_ENABLED),
  ];

  let edx = snapshot.padlock.edx;
  for &(exists_bit, feature, enabled) in PAIRS {
    if edx & (1 << exists_bit) != 0 {
      *isa_mask |= feature;
      if edx & (1 << (exists_bit + 1)) != 0 {
        *system_mask |= enabled;
      }
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cache
// ─────────────────────────────────────────────────────────────────────────────

/// Which level a leaf-2 descriptor populates.
#[derive(Clone, Copy)]
enum Slot {
  L1I,
  L1D,
  L2,
  L3,
  Trace,
  Prefetch,
}

/// Leaf-2 one-byte cache descriptors: `(code, slot, size, line, assoc)`.
/// Trace entries carry micro-ops in `size`; prefetch entries carry the
/// line size in `size`. Codes 0x49 and 0x80 need context and are handled
/// in code.
const CACHE_DESCRIPTORS: &[(u8, Slot, u32, u16, u16)] = &[
  (0x06, Slot::L1I, 8 * 1024, 32, 4),
  (0x08, Slot::L1I, 16 * 1024, 32, 4),
  (0x09, Slot::L1I, 32 * 1024, 64, 4),
  (0x0A, Slot::L1D, 8 * 1024, 32, 2),
  (0x0C, Slot::L1D, 16 * 1024, 32, 4),
  (0x0D, Slot::L1D, 16 * 1024, 64, 4),
  (0x0E, Slot::L1D, 24 * 1024, 64, 6),
  (0x21, Slot::L2, 256 * 1024, 64, 8),
  (0x22, Slot::L3, 512 * 1024, 64, 4),
  (0x23, Slot::L3, 1024 * 1024, 64, 8),
  (0x25, Slot::L3, 2 * 1024 * 1024, 64, 8),
  (0x29, Slot::L3, 4 * 1024 * 1024, 64, 8),
  (0x2C, Slot::L1D, 32 * 1024, 64, 8),
  (0x30, Slot::L1I, 32 * 1024, 64, 8),
  (0x39, Slot::L2, 128 * 1024, 64, 4),
  (0x3A, Slot::L2, 192 * 1024, 64, 6),
  (0x3B, Slot::L2, 128 * 1024, 64, 2),
  (0x3C, Slot::L2, 256 * 1024, 64, 4),
  (0x3D, Slot::L2, 384 * 1024, 64, 6),
  (0x3E, Slot::L2, 512 * 1024, 64, 4),
  (0x41, Slot::L2, 128 * 1024, 32, 4),
  (0x42, Slot::L2, 256 * 1024, 32, 4),
  (0x43, Slot::L2, 512 * 1024, 32, 4),
  (0x44, Slot::L2, 1024 * 1024, 32, 4),
  (0x45, Slot::L2, 2 * 1024 * 1024, 32, 4),
  (0x46, Slot::L3, 4 * 1024 * 1024, 64, 4),
  (0x47, Slot::L3, 8 * 1024 * 1024, 64, 8),
  (0x48, Slot::L2, 3 * 1024 * 1024, 64, 12),
  (0x4A, Slot::L3, 6 * 1024 * 1024, 64, 12),
  (0x4B, Slot::L3, 8 * 1024 * 1024, 64, 16),
  (0x4C, Slot::L3, 12 * 1024 * 1024, 64, 12),
  (0x4D, Slot::L3, 16 * 1024 * 1024, 64, 16),
  (0x4E, Slot::L2, 6 * 1024 * 1024, 64, 24),
  (0x60, Slot::L1D, 16 * 1024, 64, 8),
  (0x66, Slot::L1D, 8 * 1024, 64, 4),
  (0x67, Slot::L1D, 16 * 1024, 64, 4),
  (0x68, Slot::L1D, 32 * 1024, 64, 4),
  (0x70, Slot::Trace, 12 * 1024, 0, 8),
  (0x71, Slot::Trace, 16 * 1024, 0, 8),
  (0x72, Slot::Trace, 32 * 1024, 0, 8),
  (0x73, Slot::Trace, 64 * 1024, 0, 8),
  (0x78, Slot::L2, 1024 * 1024, 64, 4),
  (0x79, Slot::L2, 128 * 1024, 64, 8),
  (0x7A, Slot::L2, 256 * 1024, 64, 8),
  (0x7B, Slot::L2, 512 * 1024, 64, 8),
  (0x7C, Slot::L2, 1024 * 1024, 64, 8),
  (0x7D, Slot::L2, 2 * 1024 * 1024, 64, 8),
  (0x7F, Slot::L2, 512 * 1024, 64, 2),
  (0x82, Slot::L2, 256 * 1024, 32, 8),
  (0x83, Slot::L2, 512 * 1024, 32, 8),
  (0x84, Slot::L2, 1024 * 1024, 32, 8),
  (0x85, Slot::L2, 2 * 1024 * 1024, 32, 8),
  (0x86, Slot::L2, 512 * 1024, 64, 4),
  (0x87, Slot::L2, 1024 * 1024, 64, 8),
  (0xD0, Slot::L3, 512 * 1024, 64, 4),
  (0xD1, Slot::L3, 1024 * 1024, 64, 4),
  (0xD2, Slot::L3, 2 * 1024 * 1024, 64, 4),
  (0xD6, Slot::L3, 1024 * 1024, 64, 8),
  (0xD7, Slot::L3, 2 * 1024 * 1024, 64, 8),
  (0xD8, Slot::L3, 4 * 1024 * 1024, 64, 8),
  (0xDC, Slot::L3, 3 * 512 * 1024, 64, 12),
  (0xDD, Slot::L3, 3 * 1024 * 1024, 64, 12),
  (0xDE, Slot::L3, 6 * 1024 * 1024, 64, 12),
  (0xE2, Slot::L3, 2 * 1024 * 1024, 64, 16),
  (0xE3, Slot::L3, 4 * 1024 * 1024, 64, 16),
  (0xE4, Slot::L3, 8 * 1024 * 1024, 64, 16),
  (0xEA, Slot::L3, 12 * 1024 * 1024, 64, 24),
  (0xEB, Slot::L3, 18 * 1024 * 1024, 64, 24),
  (0xEC, Slot::L3, 24 * 1024 * 1024, 64, 24),
  (0xF0, Slot::Prefetch, 64, 0, 0),
  (0xF1, Slot::Prefetch, 128, 0, 0),
];

/// L2/L3 associativity encoding of leaf 0x8000_0006.
const AMD_ASSOCIATIVITY: [u16; 16] = [0, 1, 2, 0, 4, 0, 8, 0, 16, 0, 32, 48, 64, 96, 128, u16::MAX];

fn decode_cache(snapshot: &CpuidSnapshot, vendor: CpuVendor, model: &ModelInfo) -> CacheHierarchyInfo {
  let mut cache = CacheHierarchyInfo::default();

  if snapshot.max_base >= 1 {
    // EBX bits 8-15: CLFLUSH line size in quadwords.
    cache.clflush_line_size = (((snapshot.leaf1.ebx >> 8) & 0xFF) * 8) as u16;
  }

  if snapshot.max_base >= 2 {
    decode_cache_descriptors(snapshot, vendor, model, &mut cache);
  }
  if snapshot.max_base >= 4 {
    decode_deterministic_cache(&snapshot.deterministic_cache, &mut cache);
  }

  if snapshot.max_extended >= 0x8000_0005 && vendor == CpuVendor::Amd {
    let regs = snapshot.amd_l1;
    cache.l1d = CacheLevelInfo {
      size: (regs.ecx >> 24) * 1024,
      line_size: (regs.ecx & 0xFF) as u16,
      associativity: amd_l1_associativity(regs.ecx >> 16),
      unified: false,
    };
    cache.l1i = CacheLevelInfo {
      size: (regs.edx >> 24) * 1024,
      line_size: (regs.edx & 0xFF) as u16,
      associativity: amd_l1_associativity(regs.edx >> 16),
      unified: false,
    };
  }

  if snapshot.max_extended >= 0x8000_0006 {
    let regs = snapshot.amd_l2l3;
    // Knights Corner bug: this leaf reports 256K while leaf 4 reports the
    // correct 512K, so a leaf-4 value wins on Intel.
    if vendor != CpuVendor::Intel || cache.l2.size == 0 {
      let size = ((regs.ecx >> 16) & 0xFFFF) * 1024;
      if size != 0 {
        cache.l2 = CacheLevelInfo {
          size,
          line_size: (regs.ecx & 0xFF) as u16,
          associativity: AMD_ASSOCIATIVITY[((regs.ecx >> 12) & 0xF) as usize],
          unified: true,
        };
      }
    }
    if vendor == CpuVendor::Amd {
      let size = (regs.edx >> 18) * 512 * 1024;
      if size != 0 {
        cache.l3 = CacheLevelInfo {
          size,
          line_size: (regs.edx & 0xFF) as u16,
          associativity: AMD_ASSOCIATIVITY[((regs.edx >> 12) & 0xF) as usize],
          unified: true,
        };
      }
    }
  }

  if snapshot.has_topology_ext && vendor == CpuVendor::Amd {
    decode_deterministic_cache(&snapshot.topology_cache, &mut cache);
  }

  cache
}

/// Leaf 0x8000_0005 associativity byte: 0xFF means fully associative.
fn amd_l1_associativity(raw: u32) -> u16 {
  match raw & 0xFF {
    0xFF => u16::MAX,
    ways => ways as u16,
  }
}

fn decode_cache_descriptors(
  snapshot: &CpuidSnapshot,
  vendor: CpuVendor,
  model: &ModelInfo,
  cache: &mut CacheHierarchyInfo,
) {
  let regs = snapshot.cache_descriptors;
  for (index, register) in [regs.eax, regs.ebx, regs.ecx, regs.edx].into_iter().enumerate() {
    // Bit 31 set means the register carries no descriptors.
    if register & 0x8000_0000 != 0 {
      continue;
    }
    for byte_index in 0..4 {
      // The low byte of EAX is the iteration count, not a descriptor.
      if index == 0 && byte_index == 0 {
        continue;
      }
      let descriptor = (register >> (byte_index * 8)) as u8;
      decode_one_descriptor(descriptor, vendor, model, cache);
    }
  }
}

fn decode_one_descriptor(descriptor: u8, vendor: CpuVendor, model: &ModelInfo, cache: &mut CacheHierarchyInfo) {
  match descriptor {
    0x00 => {}
    // Xeon MP (family 0xF model 6) uses 0x49 for L3; everything else L2.
    0x49 => {
      let level = CacheLevelInfo {
        size: 4 * 1024 * 1024,
        line_size: 64,
        associativity: 16,
        unified: true,
      };
      if vendor == CpuVendor::Intel && model.family == 0x0F && model.model == 0x06 {
        cache.l3 = level;
      } else {
        cache.l2 = level;
      }
    }
    // Cyrix reads 0x80 as a unified 16K L1; everyone else as a 512K L2.
    0x80 => {
      if vendor == CpuVendor::Cyrix {
        let level = CacheLevelInfo {
          size: 16 * 1024,
          line_size: 16,
          associativity: 4,
          unified: true,
        };
        cache.l1i = level;
        cache.l1d = level;
      } else {
        cache.l2 = CacheLevelInfo {
          size: 512 * 1024,
          line_size: 64,
          associativity: 8,
          unified: true,
        };
      }
    }
    code => {
      let Some(&(_, slot, size, line_size, associativity)) =
        CACHE_DESCRIPTORS.iter().find(|entry| entry.0 == code)
      else {
        return;
      };
      match slot {
        Slot::L1I => {
          cache.l1i = CacheLevelInfo { size, line_size, associativity, unified: false };
        }
        Slot::L1D => {
          cache.l1d = CacheLevelInfo { size, line_size, associativity, unified: false };
        }
        Slot::L2 => {
          cache.l2 = CacheLevelInfo { size, line_size, associativity, unified: true };
        }
        Slot::L3 => {
          cache.l3 = CacheLevelInfo { size, line_size, associativity, unified: true };
        }
        Slot::Trace => {
          cache.trace.microops = size;
          cache.trace.associativity = associativity;
        }
        Slot::Prefetch => {
          cache.prefetch_line_size = size as u16;
        }
      }
    }
  }
}

/// Leaf 4 / leaf 0x8000_001D deterministic cache parameters.
fn decode_deterministic_cache(subleaves: &[crate::probe::cpuid::CpuidRegs], cache: &mut CacheHierarchyInfo) {
  for regs in subleaves {
    let cache_type = regs.eax & 0x1F;
    if cache_type == 0 {
      break;
    }
    let level = (regs.eax >> 5) & 0x7;
    let fully_associative = regs.eax & 0x200 != 0;
    let sets = regs.ecx + 1;
    let ways = (regs.ebx >> 22) + 1;
    let partitions = ((regs.ebx >> 12) & 0x3FF) + 1;
    let line_size = (regs.ebx & 0xFFF) + 1;
    let size = ways * partitions * line_size * sets;

    let info = CacheLevelInfo {
      size,
      line_size: line_size as u16,
      associativity: if fully_associative { u16::MAX } else { ways as u16 },
      unified: cache_type == 3,
    };

    match (level, cache_type) {
      (1, 1) => cache.l1d = info,
      (1, 2) => cache.l1i = info,
      (1, 3) => {
        cache.l1d = info;
        cache.l1i = info;
      }
      (2, 3) => cache.l2 = info,
      (3, 3) => cache.l3 = info,
      // Knights Corner bug: its unified L2 is reported as an L2 data cache.
      (2, 1) => cache.l2 = CacheLevelInfo { unified: true, ..info },
      _ => {}
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Brand string
// ─────────────────────────────────────────────────────────────────────────────

/// Normalize the 48-byte brand string into full and brief display names.
///
/// The raw string is space-padded and stuffed with marketing decorations;
/// the brief form drops "(R)"/"(TM)"/"CPU" tokens and the trailing
/// "@ N.NNGHz" frequency.
fn decode_brand(brand: &[u8; 48]) -> (String, String) {
  let end = brand.iter().position(|&b| b == 0).unwrap_or(brand.len());
  let raw = String::from_utf8_lossy(&brand[..end]);

  let mut full = String::with_capacity(raw.len());
  for word in raw.split_ascii_whitespace() {
    if !full.is_empty() {
      full.push(' ');
    }
    full.push_str(word);
  }

  let mut brief = String::with_capacity(full.len());
  for word in full.split(' ') {
    if word == "@" || word.ends_with("Hz") && word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
      // "@ 3.40GHz" and similar frequency suffixes end the brief name.
      break;
    }
    let cleaned = word.replace("(R)", "").replace("(TM)", "").replace("(tm)", "");
    if cleaned.is_empty() || cleaned == "CPU" || cleaned == "Processor" {
      continue;
    }
    if !brief.is_empty() {
      brief.push(' ');
    }
    brief.push_str(&cleaned);
  }

  (full, brief)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  /// Leaf-1 EAX encoder for synthetic tests.
  const fn leaf1_eax(ext_family: u32, ext_model: u32, base_family: u32, base_model: u32, stepping: u32) -> u32 {
    (ext_family << 20) | (ext_model << 16) | (base_family << 8) | (base_model << 4) | stepping
  }

  const GENUINE_INTEL: [u32; 3] = [0x756E_6547, 0x4965_6E69, 0x6C65_746E];
  const AUTHENTIC_AMD: [u32; 3] = [0x6874_7541, 0x6974_6E65, 0x444D_4163];

  #[test]
  fn vendor_strings() {
    assert_eq!(decode_vendor(GENUINE_INTEL), CpuVendor::Intel);
    assert_eq!(decode_vendor(AUTHENTIC_AMD), CpuVendor::Amd);
    // "CentaurHauls"
    assert_eq!(
      decode_vendor([0x746E_6543, 0x4872_7561, 0x736C_7561]),
      CpuVendor::Via
    );
    assert_eq!(decode_vendor([0, 0, 0]), CpuVendor::Unknown);
  }

  #[test]
  fn family_model_extension_rule() {
    // Haswell: family 6, ext family 0, model 0xC, ext model 3.
    let model = ModelInfo::from_leaf1_eax(leaf1_eax(0, 3, 6, 0xC, 1));
    assert_eq!(model.family, 6);
    assert_eq!(model.model, 0x3C);
    assert_eq!(model.stepping, 1);

    // Bulldozer: base family 0xF + ext family 6 = 0x15.
    let model = ModelInfo::from_leaf1_eax(leaf1_eax(6, 0, 0xF, 1, 0));
    assert_eq!(model.family, 0x15);
    assert_eq!(model.model, 1);
  }

  #[test]
  fn intel_microarchitectures() {
    use CpuMicroarchitecture as M;

    let cases = [
      (0x3C, M::Haswell),
      (0x3A, M::IvyBridge),
      (0x2A, M::SandyBridge),
      (0x1A, M::Nehalem),
      (0x17, M::Penryn),
      (0x0F, M::Conroe),
      (0x0E, M::Yonah),
      (0x1C, M::Bonnell),
      (0x37, M::Silvermont),
      (0x99, M::Unknown),
    ];
    for (model_number, expected) in cases {
      let model = ModelInfo {
        family: 6,
        model: model_number,
        ..ModelInfo::default()
      };
      assert_eq!(decode_intel(&model), expected, "model {model_number:#x}");
    }

    let prescott = ModelInfo { family: 0xF, model: 3, ..ModelInfo::default() };
    assert_eq!(decode_intel(&prescott), M::Prescott);
    let knc = ModelInfo { family: 0xB, model: 1, ..ModelInfo::default() };
    assert_eq!(decode_intel(&knc), M::KnightsCorner);
  }

  #[test]
  fn amd_microarchitectures() {
    use CpuMicroarchitecture as M;

    let bulldozer = ModelInfo { family: 0x15, model: 1, ..ModelInfo::default() };
    assert_eq!(decode_amd(&bulldozer), M::Bulldozer);

    let piledriver = ModelInfo { family: 0x15, model: 2, ..ModelInfo::default() };
    assert_eq!(decode_amd(&piledriver), M::Piledriver);

    let steamroller = ModelInfo {
      family: 0x15,
      model: 0x30,
      ext_model: 3,
      ..ModelInfo::default()
    };
    assert_eq!(decode_amd(&steamroller), M::Steamroller);

    let jaguar = ModelInfo { family: 0x16, model: 0, ..ModelInfo::default() };
    assert_eq!(decode_amd(&jaguar), M::Jaguar);

    let k8 = ModelInfo { family: 0xF, model: 0x2F, ..ModelInfo::default() };
    assert_eq!(decode_amd(&k8), M::K8);
  }

  /// "GenuineIntel" with family 6, model 0x3A must decode to
  /// (Intel, IvyBridge).
  #[test]
  fn end_to_end_ivy_bridge() {
    let snapshot = CpuidSnapshot {
      max_base: 7,
      vendor_regs: GENUINE_INTEL,
      leaf1: crate::probe::cpuid::CpuidRegs {
        eax: leaf1_eax(0, 3, 6, 0xA, 9),
        ebx: 0,
        // SSE3 | SSSE3 | SSE4.1 | SSE4.2 | AVX | XSAVE | OSXSAVE | POPCNT
        ecx: (1 << 0) | (1 << 9) | (1 << 19) | (1 << 20) | (1 << 28) | (1 << 26) | (1 << 27) | (1 << 23),
        // FPU | TSC | CMOV | MMX | FXSR | SSE | SSE2
        edx: (1 << 0) | (1 << 4) | (1 << 15) | (1 << 23) | (1 << 24) | (1 << 25) | (1 << 26),
      },
      xcr0_valid: 0x7,
      xfeature_enabled: 0x7,
      ..CpuidSnapshot::default()
    };

    let decoded = decode(&snapshot);
    assert_eq!(decoded.vendor, CpuVendor::Intel);
    assert_eq!(decoded.microarchitecture, CpuMicroarchitecture::IvyBridge);
    assert!(decoded.simd.contains(simd::x86::AVX));
    assert!(decoded.system.contains(system::x86::YMM_STATE));
    assert!(decoded.system.contains(system::CYCLE_COUNTER));
    assert!(decoded.isa.contains(isa::x86::POPCNT));
  }

  #[test]
  fn haswell_decodes_from_leaf1() {
    let snapshot = CpuidSnapshot {
      max_base: 7,
      vendor_regs: GENUINE_INTEL,
      leaf1: crate::probe::cpuid::CpuidRegs {
        eax: leaf1_eax(0, 3, 6, 0xC, 3),
        ..crate::probe::cpuid::CpuidRegs::default()
      },
      ..CpuidSnapshot::default()
    };
    assert_eq!(decode(&snapshot).microarchitecture, CpuMicroarchitecture::Haswell);
  }

  #[test]
  fn amd_bulldozer_family_decodes() {
    let snapshot = CpuidSnapshot {
      max_base: 1,
      vendor_regs: AUTHENTIC_AMD,
      leaf1: crate::probe::cpuid::CpuidRegs {
        eax: leaf1_eax(6, 0, 0xF, 0, 0),
        ..crate::probe::cpuid::CpuidRegs::default()
      },
      ..CpuidSnapshot::default()
    };
    let decoded = decode(&snapshot);
    assert_eq!(decoded.vendor, CpuVendor::Amd);
    assert_eq!(decoded.microarchitecture, CpuMicroarchitecture::Bulldozer);
  }

  #[test]
  fn avx_without_os_support_is_not_usable() {
    // AVX reported, OSXSAVE present, but XCR0 lacks the YMM bit.
    let snapshot = CpuidSnapshot {
      max_base: 1,
      vendor_regs: GENUINE_INTEL,
      leaf1: crate::probe::cpuid::CpuidRegs {
        eax: leaf1_eax(0, 2, 6, 0xA, 0),
        ecx: (1 << 28) | (1 << 26) | (1 << 27),
        edx: (1 << 0) | (1 << 25) | (1 << 26),
        ..crate::probe::cpuid::CpuidRegs::default()
      },
      xcr0_valid: 0x7,
      xfeature_enabled: 0x3, // x87 + SSE only
      ..CpuidSnapshot::default()
    };
    let decoded = decode(&snapshot);
    assert!(decoded.simd.contains(simd::x86::AVX));
    assert!(decoded.system.contains(system::x86::XMM_STATE));
    assert!(!decoded.system.contains(system::x86::YMM_STATE));
  }

  #[test]
  fn padlock_pairs() {
    let snapshot = CpuidSnapshot {
      // RNG exists+enabled, ACE exists only.
      padlock: crate::probe::cpuid::CpuidRegs {
        edx: (1 << 2) | (1 << 3) | (1 << 6),
        ..crate::probe::cpuid::CpuidRegs::default()
      },
      ..CpuidSnapshot::default()
    };
    let decoded = decode(&snapshot);
    assert!(decoded.isa.contains(isa::x86::RNG));
    assert!(decoded.system.contains(system::x86::RNG_ENABLED));
    assert!(decoded.isa.contains(isa::x86::ACE));
    assert!(!decoded.system.contains(system::x86::ACE_ENABLED));
  }

  #[test]
  fn leaf2_descriptor_decoding() {
    // 0x2C = 32K L1D, 0x30 = 32K L1I, 0x7A = 256K L2, low byte of EAX is
    // the iteration count and must be skipped.
    let snapshot = CpuidSnapshot {
      max_base: 2,
      vendor_regs: GENUINE_INTEL,
      cache_descriptors: crate::probe::cpuid::CpuidRegs {
        eax: 0x2C30_7A01,
        ebx: 0,
        ecx: 0,
        edx: 0x8000_0000, // no descriptors in EDX
      },
      ..CpuidSnapshot::default()
    };
    let cache = decode(&snapshot).cache;
    assert_eq!(cache.l1d.size, 32 * 1024);
    assert_eq!(cache.l1i.size, 32 * 1024);
    assert_eq!(cache.l2.size, 256 * 1024);
    assert!(cache.l2.unified);
  }

  #[test]
  fn deterministic_cache_parameters() {
    // 32K 8-way L1D with 64-byte lines: 64 sets, ways-1=7, line-1=63.
    let mut snapshot = CpuidSnapshot {
      max_base: 4,
      vendor_regs: GENUINE_INTEL,
      ..CpuidSnapshot::default()
    };
    snapshot.deterministic_cache[0] = crate::probe::cpuid::CpuidRegs {
      eax: (1 << 5) | 1, // level 1, data
      ebx: (7 << 22) | 63,
      ecx: 63,
      edx: 0,
    };
    let cache = decode(&snapshot).cache;
    assert_eq!(cache.l1d.size, 32 * 1024);
    assert_eq!(cache.l1d.line_size, 64);
    assert_eq!(cache.l1d.associativity, 8);
    assert!(!cache.l1d.unified);
  }

  #[test]
  fn amd_legacy_cache_leaves() {
    let snapshot = CpuidSnapshot {
      max_base: 1,
      max_extended: 0x8000_0006,
      vendor_regs: AUTHENTIC_AMD,
      amd_l1: crate::probe::cpuid::CpuidRegs {
        // 64K 2-way L1D, 64-byte lines; same for L1I.
        ecx: (64 << 24) | (2 << 16) | 64,
        edx: (64 << 24) | (2 << 16) | 64,
        ..crate::probe::cpuid::CpuidRegs::default()
      },
      amd_l2l3: crate::probe::cpuid::CpuidRegs {
        // 512K 16-way L2 (encoding 8), 64-byte lines.
        ecx: (512 << 16) | (8 << 12) | 64,
        // 2M L3 (4 * 512K), 16-way (encoding 8), 64-byte lines.
        edx: (4 << 18) | (8 << 12) | 64,
        ..crate::probe::cpuid::CpuidRegs::default()
      },
      ..CpuidSnapshot::default()
    };
    let cache = decode(&snapshot).cache;
    assert_eq!(cache.l1d.size, 64 * 1024);
    assert_eq!(cache.l1d.associativity, 2);
    assert_eq!(cache.l2.size, 512 * 1024);
    assert_eq!(cache.l2.associativity, 16);
    assert_eq!(cache.l3.size, 2 * 1024 * 1024);
  }

  #[test]
  fn brand_normalization() {
    let mut brand = [0u8; 48];
    let text = b"       Intel(R) Core(TM) i7-3770 CPU @ 3.40GHz";
    brand[..text.len()].copy_from_slice(text);
    let (full, brief) = decode_brand(&brand);
    assert_eq!(full, "Intel(R) Core(TM) i7-3770 CPU @ 3.40GHz");
    assert_eq!(brief, "Intel Core i7-3770");
  }

  #[test]
  fn empty_brand_is_empty() {
    let (full, brief) = decode_brand(&[0u8; 48]);
    assert!(full.is_empty());
    assert!(brief.is_empty());
  }

  #[test]
  fn zeroed_snapshot_decodes_to_unknown() {
    let decoded = decode(&CpuidSnapshot::default());
    assert_eq!(decoded.vendor, CpuVendor::Unknown);
    assert_eq!(decoded.microarchitecture, CpuMicroarchitecture::Unknown);
    assert!(decoded.cache.l1d.is_empty());
  }
}

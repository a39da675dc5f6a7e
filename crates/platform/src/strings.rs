//! String rendering for every public enumeration and feature bit.
//!
//! Each value renders in two styles: a human-readable description
//! ("Ivy Bridge", "Streaming SIMD Extensions 3") and a machine-safe
//! identifier ("IvyBridge", "SSE3"). [`write_string`] copies the rendered
//! text into a caller buffer with explicit too-small reporting, for FFI
//! and no-alloc callers; Rust callers can use the `&'static str` lookups
//! directly.

use crate::error::Error;
use crate::ident::{CpuArchitecture, CpuMicroarchitecture, CpuVendor};

/// Which rendering of a value to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringKind {
  /// Human-readable, e.g. "Ivy Bridge".
  Description,
  /// Machine-safe identifier, e.g. "IvyBridge".
  Ident,
}

/// A renderable value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StringQuery {
  Architecture(CpuArchitecture),
  Vendor(CpuVendor),
  Microarchitecture(CpuMicroarchitecture),
  /// ISA feature bit position within the given architecture's namespace.
  IsaFeature(CpuArchitecture, u8),
  /// SIMD feature bit position.
  SimdFeature(CpuArchitecture, u8),
  /// System feature bit position (generic bits resolve for any architecture).
  SystemFeature(CpuArchitecture, u8),
  Status(Error),
}

/// Resolve a query to its static string.
///
/// # Errors
///
/// `InvalidArgument` when the value has no string in the requested style
/// (e.g. an unassigned feature bit).
pub fn lookup(query: StringQuery, kind: StringKind) -> Result<&'static str, Error> {
  let result = match query {
    StringQuery::Architecture(arch) => Some(architecture_name(arch, kind)),
    StringQuery::Vendor(vendor) => Some(match kind {
      StringKind::Description => vendor_description(vendor),
      StringKind::Ident => vendor_ident(vendor),
    }),
    StringQuery::Microarchitecture(march) => Some(match kind {
      StringKind::Description => microarchitecture_description(march),
      StringKind::Ident => microarchitecture_ident(march),
    }),
    StringQuery::IsaFeature(arch, bit) => feature_name(isa_feature_table(arch), bit, kind),
    StringQuery::SimdFeature(arch, bit) => feature_name(simd_feature_table(arch), bit, kind),
    StringQuery::SystemFeature(arch, bit) => {
      feature_name(GENERIC_SYSTEM_FEATURES, bit, kind).or_else(|| feature_name(system_feature_table(arch), bit, kind))
    }
    StringQuery::Status(status) => Some(match kind {
      StringKind::Description => status.description(),
      StringKind::Ident => status.ident(),
    }),
  };
  result.ok_or(Error::InvalidArgument)
}

/// Render a query into a caller buffer.
///
/// On success the rendered bytes are written (no terminator) and their
/// count returned. A too-small buffer is left untouched and reported as
/// `InsufficientBuffer { required }`.
pub fn write_string(query: StringQuery, kind: StringKind, buffer: &mut [u8]) -> Result<usize, Error> {
  fill(lookup(query, kind)?, buffer)
}

/// The buffer-filling half of [`write_string`], shared with the name
/// accessors on `CpuInfo`.
pub(crate) fn fill(text: &str, buffer: &mut [u8]) -> Result<usize, Error> {
  let bytes = text.as_bytes();
  if bytes.len() > buffer.len() {
    return Err(Error::InsufficientBuffer { required: bytes.len() });
  }
  buffer[..bytes.len()].copy_from_slice(bytes);
  Ok(bytes.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Architecture / vendor / microarchitecture names
// ─────────────────────────────────────────────────────────────────────────────

fn architecture_name(arch: CpuArchitecture, _kind: StringKind) -> &'static str {
  // Description and identifier coincide for architectures.
  match arch {
    CpuArchitecture::Unknown => "Unknown",
    CpuArchitecture::X86 => "x86",
    CpuArchitecture::Arm => "ARM",
    CpuArchitecture::Mips => "MIPS",
    CpuArchitecture::PowerPc => "PowerPC",
    CpuArchitecture::Ia64 => "IA64",
    CpuArchitecture::Sparc => "SPARC",
  }
}

/// Human-readable vendor name.
#[must_use]
pub fn vendor_description(vendor: CpuVendor) -> &'static str {
  match vendor {
    CpuVendor::Unknown => "Unknown",
    CpuVendor::Intel => "Intel",
    CpuVendor::Amd => "AMD",
    CpuVendor::Via => "VIA",
    CpuVendor::Transmeta => "Transmeta",
    CpuVendor::Cyrix => "Cyrix",
    CpuVendor::Rise => "Rise",
    CpuVendor::Nsc => "NSC",
    CpuVendor::Sis => "SiS",
    CpuVendor::NexGen => "NexGen",
    CpuVendor::Umc => "UMC",
    CpuVendor::Rdc => "RDC",
    CpuVendor::Dmp => "DM&P",
    CpuVendor::Arm => "ARM",
    CpuVendor::Marvell => "Marvell",
    CpuVendor::Qualcomm => "Qualcomm",
    CpuVendor::Dec => "DEC",
    CpuVendor::Motorola => "Motorola",
    CpuVendor::Ti => "TI",
    CpuVendor::Apple => "Apple",
    CpuVendor::Broadcom => "Broadcom",
    CpuVendor::Ingenic => "Ingenic",
    CpuVendor::MipsTech => "MIPS",
    CpuVendor::Ibm => "IBM",
    CpuVendor::PaSemi => "P.A. Semi",
    CpuVendor::Sun => "Sun",
    CpuVendor::Fujitsu => "Fujitsu",
  }
}

/// Machine-safe vendor identifier.
#[must_use]
pub fn vendor_ident(vendor: CpuVendor) -> &'static str {
  match vendor {
    CpuVendor::Dmp => "DMP",
    CpuVendor::MipsTech => "MIPSTech",
    CpuVendor::PaSemi => "PASemi",
    other => vendor_description(other),
  }
}

/// Human-readable microarchitecture name.
#[must_use]
pub fn microarchitecture_description(march: CpuMicroarchitecture) -> &'static str {
  use CpuMicroarchitecture as M;

  match march {
    M::Unknown => "Unknown",
    M::P5 => "P5",
    M::P6 => "P6",
    M::Willamette => "Willamette",
    M::Prescott => "Prescott",
    M::Dothan => "Dothan",
    M::Yonah => "Yonah",
    M::Conroe => "Conroe",
    M::Penryn => "Penryn",
    M::Bonnell => "Bonnell",
    M::Nehalem => "Nehalem",
    M::SandyBridge => "Sandy Bridge",
    M::Saltwell => "Saltwell",
    M::IvyBridge => "Ivy Bridge",
    M::Haswell => "Haswell",
    M::Silvermont => "Silvermont",
    M::KnightsFerry => "Knights Ferry",
    M::KnightsCorner => "Knights Corner",
    M::K5 => "K5",
    M::K6 => "K6",
    M::Geode => "Geode",
    M::K7 => "K7",
    M::K8 => "K8",
    M::K10 => "K10",
    M::Bobcat => "Bobcat",
    M::Bulldozer => "Bulldozer",
    M::Piledriver => "Piledriver",
    M::Jaguar => "Jaguar",
    M::Steamroller => "Steamroller",
    M::Arm7 => "ARM7",
    M::Arm9 => "ARM9",
    M::Arm11 => "ARM11",
    M::CortexA5 => "Cortex-A5",
    M::CortexA7 => "Cortex-A7",
    M::CortexA8 => "Cortex-A8",
    M::CortexA9 => "Cortex-A9",
    M::CortexA15 => "Cortex-A15",
    M::StrongArm => "StrongARM",
    M::XScale => "XScale",
    M::Scorpion => "Scorpion",
    M::Krait => "Krait",
    M::Pj1 => "PJ1",
    M::Pj4 => "PJ4",
    M::Swift => "Swift",
    M::Mips24K => "MIPS 24K",
    M::Mips34K => "MIPS 34K",
    M::Mips74K => "MIPS 74K",
    M::XBurst => "XBurst",
    M::XBurst2 => "XBurst 2",
  }
}

/// Machine-safe microarchitecture identifier.
#[must_use]
pub fn microarchitecture_ident(march: CpuMicroarchitecture) -> &'static str {
  use CpuMicroarchitecture as M;

  match march {
    M::SandyBridge => "SandyBridge",
    M::IvyBridge => "IvyBridge",
    M::KnightsFerry => "KnightsFerry",
    M::KnightsCorner => "KnightsCorner",
    M::CortexA5 => "CortexA5",
    M::CortexA7 => "CortexA7",
    M::CortexA8 => "CortexA8",
    M::CortexA9 => "CortexA9",
    M::CortexA15 => "CortexA15",
    M::Mips24K => "MIPS24K",
    M::Mips34K => "MIPS34K",
    M::Mips74K => "MIPS74K",
    M::XBurst2 => "XBurst2",
    other => microarchitecture_description(other),
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feature bit names
// ─────────────────────────────────────────────────────────────────────────────

/// `(bit, ident, description)`.
type FeatureEntry = (u8, &'static str, &'static str);

fn feature_name(table: &'static [FeatureEntry], bit: u8, kind: StringKind) -> Option<&'static str> {
  table.iter().find(|entry| entry.0 == bit).map(|&(_, ident, description)| match kind {
    StringKind::Description => description,
    StringKind::Ident => ident,
  })
}

fn isa_feature_table(arch: CpuArchitecture) -> &'static [FeatureEntry] {
  match arch {
    CpuArchitecture::X86 => X86_ISA_FEATURES,
    CpuArchitecture::Arm => ARM_ISA_FEATURES,
    CpuArchitecture::Mips => MIPS_ISA_FEATURES,
    _ => &[],
  }
}

fn simd_feature_table(arch: CpuArchitecture) -> &'static [FeatureEntry] {
  match arch {
    CpuArchitecture::X86 => X86_SIMD_FEATURES,
    CpuArchitecture::Arm => ARM_SIMD_FEATURES,
    CpuArchitecture::Mips => MIPS_SIMD_FEATURES,
    _ => &[],
  }
}

fn system_feature_table(arch: CpuArchitecture) -> &'static [FeatureEntry] {
  match arch {
    CpuArchitecture::X86 => X86_SYSTEM_FEATURES,
    CpuArchitecture::Arm => ARM_SYSTEM_FEATURES,
    _ => &[],
  }
}

const GENERIC_SYSTEM_FEATURES: &[FeatureEntry] = &[
  (0, "CycleCounter", "Hardware cycle counter"),
  (1, "CycleCounter64Bit", "64-bit cycle counter"),
  (2, "AddressSpace64Bit", "64-bit address space"),
  (3, "GPRegisters64Bit", "64-bit general-purpose registers"),
  (4, "MisalignedAccess", "Misaligned memory access"),
  (5, "SingleThreaded", "Single logical core"),
];

const X86_ISA_FEATURES: &[FeatureEntry] = &[
  (0, "CPUID", "CPUID instruction"),
  (1, "RDTSC", "RDTSC instruction"),
  (2, "RDTSCP", "RDTSCP instruction"),
  (3, "CMOV", "Conditional move instructions"),
  (4, "SYSENTER", "SYSENTER/SYSEXIT instructions"),
  (5, "SYSCALL", "SYSCALL/SYSRET instructions"),
  (6, "MSR", "Model-specific registers"),
  (7, "CLFLUSH", "CLFLUSH instruction"),
  (8, "MONITOR", "MONITOR/MWAIT instructions"),
  (9, "FXSAVE", "FXSAVE/FXRSTOR instructions"),
  (10, "XSAVE", "XSAVE/XRSTOR instructions"),
  (11, "CMPXCHG8B", "CMPXCHG8B instruction"),
  (12, "CMPXCHG16B", "CMPXCHG16B instruction"),
  (13, "MOVBE", "MOVBE instruction"),
  (14, "POPCNT", "POPCNT instruction"),
  (15, "LZCNT", "LZCNT instruction"),
  (16, "TBM", "Trailing bit manipulation instructions"),
  (17, "BMI", "Bit manipulation instructions"),
  (18, "BMI2", "Bit manipulation instructions 2"),
  (19, "ADX", "Multi-precision add-carry instructions"),
  (20, "AES", "AES instruction set"),
  (21, "PCLMULQDQ", "Carry-less multiplication instruction"),
  (22, "RDRAND", "RDRAND instruction"),
  (23, "RDSEED", "RDSEED instruction"),
  (24, "SHA", "SHA instruction set"),
  (25, "MPX", "Memory protection extensions"),
  (26, "HLE", "Hardware lock elision"),
  (27, "RTM", "Restricted transactional memory"),
  (28, "XTEST", "XTEST instruction"),
  (29, "LahfSahf64", "LAHF/SAHF in 64-bit mode"),
  (30, "FSGSBASE", "FS/GS base access instructions"),
  (31, "X64", "64-bit long mode"),
  (32, "FPU", "x87 floating-point unit"),
  (33, "RNG", "PadLock random number generator"),
  (34, "ACE", "PadLock advanced cryptography engine"),
  (35, "ACE2", "PadLock advanced cryptography engine 2"),
  (36, "PHE", "PadLock hash engine"),
  (37, "PMM", "PadLock montgomery multiplier"),
  (38, "LWP", "Lightweight profiling"),
];

const X86_SIMD_FEATURES: &[FeatureEntry] = &[
  (0, "MMX", "MMX instruction set"),
  (1, "MMXPlus", "MMX+ instruction set"),
  (2, "EMMX", "Extended MMX instruction set"),
  (3, "3dnow", "3dnow! instruction set"),
  (4, "3dnowPlus", "3dnow!+ instruction set"),
  (5, "3dnowGeode", "Geode 3dnow! extensions"),
  (6, "3dnowPrefetch", "PREFETCH/PREFETCHW instructions"),
  (7, "SSE", "Streaming SIMD Extensions"),
  (8, "SSE2", "Streaming SIMD Extensions 2"),
  (9, "SSE3", "Streaming SIMD Extensions 3"),
  (10, "SSSE3", "Supplemental Streaming SIMD Extensions 3"),
  (11, "SSE4_1", "Streaming SIMD Extensions 4.1"),
  (12, "SSE4_2", "Streaming SIMD Extensions 4.2"),
  (13, "SSE4A", "Streaming SIMD Extensions 4a"),
  (14, "AVX", "Advanced Vector Extensions"),
  (15, "AVX2", "Advanced Vector Extensions 2"),
  (16, "FMA3", "Three-operand fused multiply-add"),
  (17, "FMA4", "Four-operand fused multiply-add"),
  (18, "XOP", "Extended operations"),
  (19, "F16C", "Half-precision conversion instructions"),
  (20, "AVX512F", "AVX-512 foundation"),
  (21, "AVX512PF", "AVX-512 prefetch instructions"),
  (22, "AVX512ER", "AVX-512 exponential and reciprocal instructions"),
  (23, "AVX512CD", "AVX-512 conflict detection instructions"),
  (24, "KNC", "Knights Corner vector extension"),
];

const X86_SYSTEM_FEATURES: &[FeatureEntry] = &[
  (32, "FPU", "x87 state preserved by the OS"),
  (33, "XMM", "XMM state preserved by the OS"),
  (34, "YMM", "YMM state preserved by the OS"),
  (35, "ZMM", "ZMM state preserved by the OS"),
  (36, "BND", "MPX bound registers preserved by the OS"),
  (37, "MisalignedSSE", "Misaligned SSE operands"),
  (38, "RNG", "PadLock RNG enabled by the OS"),
  (39, "ACE", "PadLock ACE enabled by the OS"),
  (40, "ACE2", "PadLock ACE 2 enabled by the OS"),
  (41, "PHE", "PadLock PHE enabled by the OS"),
  (42, "PMM", "PadLock PMM enabled by the OS"),
];

const ARM_ISA_FEATURES: &[FeatureEntry] = &[
  (0, "V4", "ARMv4 instruction set"),
  (1, "V5", "ARMv5 instruction set"),
  (2, "V5E", "ARMv5 DSP instructions"),
  (3, "V6", "ARMv6 instruction set"),
  (4, "V6K", "ARMv6K instruction set"),
  (5, "V7", "ARMv7 instruction set"),
  (6, "V7MP", "ARMv7 multiprocessing extension"),
  (7, "Thumb", "Thumb instruction set"),
  (8, "Thumb2", "Thumb-2 instruction set"),
  (9, "ThumbEE", "ThumbEE instruction set"),
  (10, "Jazelle", "Jazelle extension"),
  (11, "FPA", "Floating point accelerator"),
  (12, "VFP", "VFP instruction set"),
  (13, "VFP2", "VFPv2 instruction set"),
  (14, "VFP3", "VFPv3 instruction set"),
  (15, "VFP3HP", "VFPv3 half-precision extension"),
  (16, "VFP4", "VFPv4 instruction set"),
  (17, "VFPd32", "32 double-precision VFP registers"),
  (18, "Div", "Hardware integer division"),
  (19, "Armada", "Marvell Armada extensions"),
];

const ARM_SIMD_FEATURES: &[FeatureEntry] = &[
  (0, "XScale", "XScale multiply-accumulate instructions"),
  (1, "WMMX", "Wireless MMX instruction set"),
  (2, "WMMX2", "Wireless MMX 2 instruction set"),
  (3, "NEON", "NEON (Advanced SIMD) instructions"),
  (4, "NEONHP", "NEON half-precision extension"),
  (5, "NEON2", "NEONv2 (fused multiply-add) instructions"),
];

const ARM_SYSTEM_FEATURES: &[FeatureEntry] = &[
  (32, "FPA", "FPA state preserved by the OS"),
  (33, "WMMX", "WMMX state preserved by the OS"),
  (34, "S32", "32 single-precision registers preserved"),
  (35, "D32", "32 double-precision registers preserved"),
  (36, "VFPVectorMode", "VFP short-vector mode"),
];

const MIPS_ISA_FEATURES: &[FeatureEntry] = &[
  (0, "R2", "MIPS32/MIPS64 release 2"),
  (1, "MicroMIPS", "microMIPS instruction set"),
  (2, "FPU", "Hardware floating point"),
];

const MIPS_SIMD_FEATURES: &[FeatureEntry] = &[
  (0, "DSP", "MIPS DSP extension"),
  (1, "DSP2", "MIPS DSP release 2"),
  (2, "PairedSingle", "Paired-single floating point"),
  (3, "MSA", "MIPS SIMD architecture"),
];

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! CPU identity: architecture, vendor, and microarchitecture enumerations.
//!
//! Microarchitecture values carry their identity in the discriminant:
//! `(architecture << 24) | (vendor << 16) | sequence`. The accessors
//! [`CpuMicroarchitecture::architecture`] and [`CpuMicroarchitecture::vendor`]
//! decode the embedded fields, so the vendor/architecture of a detected part
//! never needs a second lookup table.

// ─────────────────────────────────────────────────────────────────────────────
// Architecture
// ─────────────────────────────────────────────────────────────────────────────

/// Instruction-set family. Exactly one value is active per process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum CpuArchitecture {
  #[default]
  Unknown = 0,
  X86 = 1,
  Arm = 2,
  Mips = 3,
  PowerPc = 4,
  Ia64 = 5,
  Sparc = 6,
}

impl CpuArchitecture {
  /// The architecture of the current compilation target.
  #[inline]
  #[must_use]
  pub const fn current() -> Self {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
      Self::X86
    }
    #[cfg(target_arch = "arm")]
    {
      Self::Arm
    }
    #[cfg(any(target_arch = "mips", target_arch = "mips64"))]
    {
      Self::Mips
    }
    #[cfg(any(target_arch = "powerpc", target_arch = "powerpc64"))]
    {
      Self::PowerPc
    }
    #[cfg(target_arch = "sparc64")]
    {
      Self::Sparc
    }
    #[cfg(not(any(
      target_arch = "x86",
      target_arch = "x86_64",
      target_arch = "arm",
      target_arch = "mips",
      target_arch = "mips64",
      target_arch = "powerpc",
      target_arch = "powerpc64",
      target_arch = "sparc64"
    )))]
    {
      Self::Unknown
    }
  }

  pub(crate) const fn from_raw(raw: u8) -> Self {
    match raw {
      1 => Self::X86,
      2 => Self::Arm,
      3 => Self::Mips,
      4 => Self::PowerPc,
      5 => Self::Ia64,
      6 => Self::Sparc,
      _ => Self::Unknown,
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vendor
// ─────────────────────────────────────────────────────────────────────────────

/// Silicon vendor. Values are partitioned by architecture family:
/// x86 vendors occupy 1-12, ARM vendors 20-27, MIPS vendors 40-41,
/// PowerPC 50-51, SPARC 70-71.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum CpuVendor {
  #[default]
  Unknown = 0,

  // x86
  Intel = 1,
  Amd = 2,
  Via = 3,
  Transmeta = 4,
  Cyrix = 5,
  Rise = 6,
  Nsc = 7,
  Sis = 8,
  NexGen = 9,
  Umc = 10,
  Rdc = 11,
  Dmp = 12,

  // ARM
  Arm = 20,
  Marvell = 21,
  Qualcomm = 22,
  Dec = 23,
  Motorola = 24,
  Ti = 25,
  Apple = 26,
  Broadcom = 27,

  // MIPS
  Ingenic = 40,
  MipsTech = 41,

  // PowerPC
  Ibm = 50,
  PaSemi = 51,

  // SPARC
  Sun = 70,
  Fujitsu = 71,
}

impl CpuVendor {
  pub(crate) const fn from_raw(raw: u8) -> Self {
    match raw {
      1 => Self::Intel,
      2 => Self::Amd,
      3 => Self::Via,
      4 => Self::Transmeta,
      5 => Self::Cyrix,
      6 => Self::Rise,
      7 => Self::Nsc,
      8 => Self::Sis,
      9 => Self::NexGen,
      10 => Self::Umc,
      11 => Self::Rdc,
      12 => Self::Dmp,
      20 => Self::Arm,
      21 => Self::Marvell,
      22 => Self::Qualcomm,
      23 => Self::Dec,
      24 => Self::Motorola,
      25 => Self::Ti,
      26 => Self::Apple,
      27 => Self::Broadcom,
      40 => Self::Ingenic,
      41 => Self::MipsTech,
      50 => Self::Ibm,
      51 => Self::PaSemi,
      70 => Self::Sun,
      71 => Self::Fujitsu,
      _ => Self::Unknown,
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Microarchitecture
// ─────────────────────────────────────────────────────────────────────────────

/// A specific processor design generation.
///
/// Discriminant layout: `(architecture << 24) | (vendor << 16) | sequence`.
/// `Unknown` is zero and doubles as the unconditional fallback target in
/// every dispatch list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum CpuMicroarchitecture {
  #[default]
  Unknown = 0,

  // ─── x86: Intel (0x01_01_xxxx) ───
  P5 = 0x0101_0001,
  P6 = 0x0101_0002,
  Willamette = 0x0101_0003,
  Prescott = 0x0101_0004,
  Dothan = 0x0101_0005,
  Yonah = 0x0101_0006,
  Conroe = 0x0101_0007,
  Penryn = 0x0101_0008,
  Bonnell = 0x0101_0009,
  Nehalem = 0x0101_000A,
  SandyBridge = 0x0101_000B,
  Saltwell = 0x0101_000C,
  IvyBridge = 0x0101_000D,
  Haswell = 0x0101_000E,
  Silvermont = 0x0101_000F,
  KnightsFerry = 0x0101_0010,
  KnightsCorner = 0x0101_0011,

  // ─── x86: AMD (0x01_02_xxxx) ───
  K5 = 0x0102_0001,
  K6 = 0x0102_0002,
  Geode = 0x0102_0003,
  K7 = 0x0102_0004,
  K8 = 0x0102_0005,
  K10 = 0x0102_0006,
  Bobcat = 0x0102_0007,
  Bulldozer = 0x0102_0008,
  Piledriver = 0x0102_0009,
  Jaguar = 0x0102_000A,
  Steamroller = 0x0102_000B,

  // ─── ARM: ARM Ltd designs (0x02_14_xxxx) ───
  Arm7 = 0x0214_0001,
  Arm9 = 0x0214_0002,
  Arm11 = 0x0214_0003,
  CortexA5 = 0x0214_0004,
  CortexA7 = 0x0214_0005,
  CortexA8 = 0x0214_0006,
  CortexA9 = 0x0214_0007,
  CortexA15 = 0x0214_0008,

  // ─── ARM: other vendors ───
  /// DEC/Intel StrongARM (vendor DEC, 0x17).
  StrongArm = 0x0217_0001,
  /// Intel XScale (vendor Intel, 0x01).
  XScale = 0x0201_0001,
  /// Qualcomm Scorpion (vendor Qualcomm, 0x16).
  Scorpion = 0x0216_0001,
  Krait = 0x0216_0002,
  /// Marvell Sheeva PJ1 (vendor Marvell, 0x15).
  Pj1 = 0x0215_0001,
  Pj4 = 0x0215_0002,
  /// Apple Swift (vendor Apple, 0x1A).
  Swift = 0x021A_0001,

  // ─── MIPS (arch 0x03) ───
  /// MIPS Technologies 24K (vendor 0x29).
  Mips24K = 0x0329_0001,
  Mips34K = 0x0329_0002,
  Mips74K = 0x0329_0003,
  /// Ingenic XBurst (vendor 0x28).
  XBurst = 0x0328_0001,
  XBurst2 = 0x0328_0002,
}

impl CpuMicroarchitecture {
  /// The encoded numeric identity: `(arch << 24) | (vendor << 16) | sequence`.
  #[inline]
  #[must_use]
  pub const fn id(self) -> u32 {
    self as u32
  }

  /// The architecture family embedded in the identity.
  #[inline]
  #[must_use]
  pub const fn architecture(self) -> CpuArchitecture {
    CpuArchitecture::from_raw((self.id() >> 24) as u8)
  }

  /// The design vendor embedded in the identity.
  #[inline]
  #[must_use]
  pub const fn vendor(self) -> CpuVendor {
    CpuVendor::from_raw((self.id() >> 16) as u8)
  }

  /// All known microarchitecture values, `Unknown` first.
  ///
  /// Used by exhaustive dispatch-list and string-table tests.
  #[must_use]
  pub const fn all() -> &'static [Self] {
    &[
      Self::Unknown,
      Self::P5,
      Self::P6,
      Self::Willamette,
      Self::Prescott,
      Self::Dothan,
      Self::Yonah,
      Self::Conroe,
      Self::Penryn,
      Self::Bonnell,
      Self::Nehalem,
      Self::SandyBridge,
      Self::Saltwell,
      Self::IvyBridge,
      Self::Haswell,
      Self::Silvermont,
      Self::KnightsFerry,
      Self::KnightsCorner,
      Self::K5,
      Self::K6,
      Self::Geode,
      Self::K7,
      Self::K8,
      Self::K10,
      Self::Bobcat,
      Self::Bulldozer,
      Self::Piledriver,
      Self::Jaguar,
      Self::Steamroller,
      Self::Arm7,
      Self::Arm9,
      Self::Arm11,
      Self::CortexA5,
      Self::CortexA7,
      Self::CortexA8,
      Self::CortexA9,
      Self::CortexA15,
      Self::StrongArm,
      Self::XScale,
      Self::Scorpion,
      Self::Krait,
      Self::Pj1,
      Self::Pj4,
      Self::Swift,
      Self::Mips24K,
      Self::Mips34K,
      Self::Mips74K,
      Self::XBurst,
      Self::XBurst2,
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn microarch_identity_encoding() {
    assert_eq!(CpuMicroarchitecture::Haswell.architecture(), CpuArchitecture::X86);
    assert_eq!(CpuMicroarchitecture::Haswell.vendor(), CpuVendor::Intel);
    assert_eq!(CpuMicroarchitecture::Bulldozer.vendor(), CpuVendor::Amd);
    assert_eq!(CpuMicroarchitecture::CortexA9.architecture(), CpuArchitecture::Arm);
    assert_eq!(CpuMicroarchitecture::CortexA9.vendor(), CpuVendor::Arm);
    assert_eq!(CpuMicroarchitecture::Krait.vendor(), CpuVendor::Qualcomm);
    assert_eq!(CpuMicroarchitecture::XScale.vendor(), CpuVendor::Intel);
    assert_eq!(CpuMicroarchitecture::XScale.architecture(), CpuArchitecture::Arm);
    assert_eq!(CpuMicroarchitecture::XBurst.architecture(), CpuArchitecture::Mips);
  }

  #[test]
  fn unknown_is_zero() {
    assert_eq!(CpuMicroarchitecture::Unknown.id(), 0);
    assert_eq!(CpuMicroarchitecture::Unknown.vendor(), CpuVendor::Unknown);
    assert_eq!(CpuMicroarchitecture::Unknown.architecture(), CpuArchitecture::Unknown);
  }

  #[test]
  fn all_ids_unique() {
    let all = CpuMicroarchitecture::all();
    for (i, a) in all.iter().enumerate() {
      for b in &all[i + 1..] {
        assert_ne!(a.id(), b.id(), "{a:?} and {b:?} share an id");
      }
    }
  }

  #[test]
  fn vendor_roundtrip_through_id() {
    for &march in CpuMicroarchitecture::all() {
      let vendor = march.vendor();
      assert_eq!(CpuVendor::from_raw(vendor as u8), vendor);
    }
  }
}

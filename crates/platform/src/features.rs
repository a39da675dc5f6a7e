//! CPU capability bitmasks.
//!
//! Detected capabilities are split into three independent 64-bit sets,
//! matching how numerical kernels state their requirements:
//!
//! - [`IsaFeatures`]: scalar instruction-set extensions (e.g. POPCNT, DIV)
//! - [`SimdFeatures`]: vector extensions (e.g. AVX, NEON)
//! - [`SystemFeatures`]: OS/processor cooperation (e.g. whether the OS
//!   preserves YMM state across context switches)
//!
//! # Bit Layout
//!
//! System features reserve bits 0-31 for generic, architecture-independent
//! flags; architecture-specific system bits start at bit 32. ISA and SIMD
//! bits are architecture-scoped from bit 0: a process only ever observes
//! the namespace of the architecture it runs on.
//!
//! # Usage
//!
//! ```ignore
//! use platform::features::{simd, SimdFeatures};
//!
//! let detected = platform::get().simd_features();
//! if simd::x86::AVX2.satisfies(detected) {
//!     // AVX2 kernel is legal here
//! }
//! ```

macro_rules! feature_mask {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct $name(pub u64);

    impl $name {
      /// Empty set (the always-satisfied "default" requirement).
      pub const NONE: Self = Self(0);

      /// Set with a single bit raised.
      #[inline]
      #[must_use]
      pub const fn bit(bit: u8) -> Self {
        Self(1u64 << (bit & 63))
      }

      /// Requirement test: every bit of `self` is present in `detected`.
      ///
      /// This is the core dispatch check: `required & !detected == 0`.
      #[inline(always)]
      #[must_use]
      pub const fn satisfies(self, detected: Self) -> bool {
        self.0 & !detected.0 == 0
      }

      /// Whether every bit of `other` is present in `self`.
      #[inline]
      #[must_use]
      pub const fn contains(self, other: Self) -> bool {
        other.0 & !self.0 == 0
      }

      /// Union of two sets.
      #[inline]
      #[must_use]
      pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
      }

      /// Intersection of two sets.
      #[inline]
      #[must_use]
      pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
      }

      /// Set difference (`self` without the bits of `other`).
      #[inline]
      #[must_use]
      pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
      }

      /// True when no bit is set.
      #[inline]
      #[must_use]
      pub const fn is_empty(self) -> bool {
        self.0 == 0
      }

      /// Number of set bits.
      #[inline]
      #[must_use]
      pub const fn count(self) -> u32 {
        self.0.count_ones()
      }

      /// Whether a specific bit position is set.
      #[inline]
      #[must_use]
      pub const fn has_bit(self, bit: u8) -> bool {
        self.0 & (1u64 << (bit & 63)) != 0
      }
    }

    impl core::ops::BitOr for $name {
      type Output = Self;

      #[inline]
      fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
      }
    }

    impl core::ops::BitAnd for $name {
      type Output = Self;

      #[inline]
      fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
      }
    }

    impl core::ops::BitOrAssign for $name {
      #[inline]
      fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
      }
    }

    impl core::fmt::Debug for $name {
      fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, concat!(stringify!($name), "({:#018x})"), self.0)
      }
    }
  };
}

feature_mask! {
  /// Scalar instruction-set capability bits.
  IsaFeatures
}

feature_mask! {
  /// Vector/SIMD instruction-set capability bits.
  SimdFeatures
}

feature_mask! {
  /// OS/processor cooperation bits (state preservation, counters, topology).
  SystemFeatures
}

// ─────────────────────────────────────────────────────────────────────────────
// ISA features
// ─────────────────────────────────────────────────────────────────────────────

/// Scalar ISA capability constants, scoped per architecture.
pub mod isa {
  /// x86/x86-64 scalar ISA extensions.
  pub mod x86 {
    use super::super::IsaFeatures;

    /// CPUID instruction. Always set: CPUs without it are not a supported target.
    pub const CPUID: IsaFeatures = IsaFeatures::bit(0);
    pub const RDTSC: IsaFeatures = IsaFeatures::bit(1);
    pub const RDTSCP: IsaFeatures = IsaFeatures::bit(2);
    pub const CMOV: IsaFeatures = IsaFeatures::bit(3);
    pub const SYSENTER: IsaFeatures = IsaFeatures::bit(4);
    pub const SYSCALL: IsaFeatures = IsaFeatures::bit(5);
    pub const MSR: IsaFeatures = IsaFeatures::bit(6);
    pub const CLFLUSH: IsaFeatures = IsaFeatures::bit(7);
    pub const MONITOR: IsaFeatures = IsaFeatures::bit(8);
    pub const FXSAVE: IsaFeatures = IsaFeatures::bit(9);
    pub const XSAVE: IsaFeatures = IsaFeatures::bit(10);
    pub const CMPXCHG8B: IsaFeatures = IsaFeatures::bit(11);
    pub const CMPXCHG16B: IsaFeatures = IsaFeatures::bit(12);
    pub const MOVBE: IsaFeatures = IsaFeatures::bit(13);
    pub const POPCNT: IsaFeatures = IsaFeatures::bit(14);
    pub const LZCNT: IsaFeatures = IsaFeatures::bit(15);
    pub const TBM: IsaFeatures = IsaFeatures::bit(16);
    pub const BMI: IsaFeatures = IsaFeatures::bit(17);
    pub const BMI2: IsaFeatures = IsaFeatures::bit(18);
    pub const ADX: IsaFeatures = IsaFeatures::bit(19);
    pub const AES: IsaFeatures = IsaFeatures::bit(20);
    pub const PCLMULQDQ: IsaFeatures = IsaFeatures::bit(21);
    pub const RDRAND: IsaFeatures = IsaFeatures::bit(22);
    pub const RDSEED: IsaFeatures = IsaFeatures::bit(23);
    pub const SHA: IsaFeatures = IsaFeatures::bit(24);
    pub const MPX: IsaFeatures = IsaFeatures::bit(25);
    /// Hardware lock elision (TSX).
    pub const HLE: IsaFeatures = IsaFeatures::bit(26);
    /// Restricted transactional memory (TSX).
    pub const RTM: IsaFeatures = IsaFeatures::bit(27);
    /// XTEST: set when either HLE or RTM is available.
    pub const XTEST: IsaFeatures = IsaFeatures::bit(28);
    /// LAHF/SAHF legal in 64-bit mode (absent on early x86-64 parts).
    pub const LAHF_SAHF_64: IsaFeatures = IsaFeatures::bit(29);
    pub const FSGSBASE: IsaFeatures = IsaFeatures::bit(30);
    /// Long mode (x86-64).
    pub const X64: IsaFeatures = IsaFeatures::bit(31);
    pub const FPU: IsaFeatures = IsaFeatures::bit(32);
    /// VIA PadLock random number generator.
    pub const RNG: IsaFeatures = IsaFeatures::bit(33);
    /// VIA PadLock advanced cryptography engine.
    pub const ACE: IsaFeatures = IsaFeatures::bit(34);
    pub const ACE2: IsaFeatures = IsaFeatures::bit(35);
    /// VIA PadLock hash engine.
    pub const PHE: IsaFeatures = IsaFeatures::bit(36);
    /// VIA PadLock montgomery multiplier.
    pub const PMM: IsaFeatures = IsaFeatures::bit(37);
    /// AMD lightweight profiling.
    pub const LWP: IsaFeatures = IsaFeatures::bit(38);
  }

  /// ARM scalar ISA extensions.
  pub mod arm {
    use super::super::IsaFeatures;

    pub const V4: IsaFeatures = IsaFeatures::bit(0);
    pub const V5: IsaFeatures = IsaFeatures::bit(1);
    /// ARMv5 DSP extension (saturating arithmetic, 16x16 multiplies).
    pub const V5E: IsaFeatures = IsaFeatures::bit(2);
    pub const V6: IsaFeatures = IsaFeatures::bit(3);
    pub const V6K: IsaFeatures = IsaFeatures::bit(4);
    pub const V7: IsaFeatures = IsaFeatures::bit(5);
    /// ARMv7 multiprocessing extension (PLDW).
    pub const V7MP: IsaFeatures = IsaFeatures::bit(6);
    pub const THUMB: IsaFeatures = IsaFeatures::bit(7);
    pub const THUMB2: IsaFeatures = IsaFeatures::bit(8);
    pub const THUMBEE: IsaFeatures = IsaFeatures::bit(9);
    pub const JAZELLE: IsaFeatures = IsaFeatures::bit(10);
    /// Legacy floating point accelerator.
    pub const FPA: IsaFeatures = IsaFeatures::bit(11);
    pub const VFP: IsaFeatures = IsaFeatures::bit(12);
    pub const VFP2: IsaFeatures = IsaFeatures::bit(13);
    pub const VFP3: IsaFeatures = IsaFeatures::bit(14);
    /// VFPv3 half-precision extension.
    pub const VFP3HP: IsaFeatures = IsaFeatures::bit(15);
    pub const VFP4: IsaFeatures = IsaFeatures::bit(16);
    /// 32 double-precision VFP registers (d0-d31).
    pub const VFP_D32: IsaFeatures = IsaFeatures::bit(17);
    /// Hardware integer division (SDIV/UDIV).
    pub const DIV: IsaFeatures = IsaFeatures::bit(18);
    /// Marvell Armada extensions.
    pub const ARMADA: IsaFeatures = IsaFeatures::bit(19);
  }

  /// MIPS scalar ISA extensions.
  pub mod mips {
    use super::super::IsaFeatures;

    pub const R2: IsaFeatures = IsaFeatures::bit(0);
    pub const MICROMIPS: IsaFeatures = IsaFeatures::bit(1);
    pub const FPU: IsaFeatures = IsaFeatures::bit(2);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// SIMD features
// ─────────────────────────────────────────────────────────────────────────────

/// Vector/SIMD capability constants, scoped per architecture.
pub mod simd {
  /// x86/x86-64 vector extensions.
  pub mod x86 {
    use super::super::SimdFeatures;

    pub const MMX: SimdFeatures = SimdFeatures::bit(0);
    /// MMX extensions introduced with SSE (and on pre-SSE AMD parts).
    pub const MMX_PLUS: SimdFeatures = SimdFeatures::bit(1);
    /// Cyrix extended MMX.
    pub const EMMX: SimdFeatures = SimdFeatures::bit(2);
    pub const THREE_D_NOW: SimdFeatures = SimdFeatures::bit(3);
    pub const THREE_D_NOW_PLUS: SimdFeatures = SimdFeatures::bit(4);
    /// Geode-only 3dnow! additions.
    pub const THREE_D_NOW_GEODE: SimdFeatures = SimdFeatures::bit(5);
    /// PREFETCH/PREFETCHW.
    pub const THREE_D_NOW_PREFETCH: SimdFeatures = SimdFeatures::bit(6);
    pub const SSE: SimdFeatures = SimdFeatures::bit(7);
    pub const SSE2: SimdFeatures = SimdFeatures::bit(8);
    pub const SSE3: SimdFeatures = SimdFeatures::bit(9);
    pub const SSSE3: SimdFeatures = SimdFeatures::bit(10);
    pub const SSE4_1: SimdFeatures = SimdFeatures::bit(11);
    pub const SSE4_2: SimdFeatures = SimdFeatures::bit(12);
    pub const SSE4A: SimdFeatures = SimdFeatures::bit(13);
    pub const AVX: SimdFeatures = SimdFeatures::bit(14);
    pub const AVX2: SimdFeatures = SimdFeatures::bit(15);
    pub const FMA3: SimdFeatures = SimdFeatures::bit(16);
    pub const FMA4: SimdFeatures = SimdFeatures::bit(17);
    pub const XOP: SimdFeatures = SimdFeatures::bit(18);
    pub const F16C: SimdFeatures = SimdFeatures::bit(19);
    pub const AVX512F: SimdFeatures = SimdFeatures::bit(20);
    pub const AVX512PF: SimdFeatures = SimdFeatures::bit(21);
    pub const AVX512ER: SimdFeatures = SimdFeatures::bit(22);
    pub const AVX512CD: SimdFeatures = SimdFeatures::bit(23);
    /// Knights Corner vector extension.
    pub const KNC: SimdFeatures = SimdFeatures::bit(24);
  }

  /// ARM vector extensions.
  pub mod arm {
    use super::super::SimdFeatures;

    /// XScale DSP-style multiply-accumulate.
    pub const XSCALE: SimdFeatures = SimdFeatures::bit(0);
    /// Intel/Marvell Wireless MMX.
    pub const WMMX: SimdFeatures = SimdFeatures::bit(1);
    pub const WMMX2: SimdFeatures = SimdFeatures::bit(2);
    pub const NEON: SimdFeatures = SimdFeatures::bit(3);
    /// NEON half-precision conversions.
    pub const NEON_HP: SimdFeatures = SimdFeatures::bit(4);
    /// NEONv2 (fused multiply-add).
    pub const NEON2: SimdFeatures = SimdFeatures::bit(5);
  }

  /// MIPS vector extensions.
  pub mod mips {
    use super::super::SimdFeatures;

    pub const DSP: SimdFeatures = SimdFeatures::bit(0);
    pub const DSP2: SimdFeatures = SimdFeatures::bit(1);
    pub const PAIRED_SINGLE: SimdFeatures = SimdFeatures::bit(2);
    pub const MSA: SimdFeatures = SimdFeatures::bit(3);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// System features
// ─────────────────────────────────────────────────────────────────────────────

/// System capability constants. Generic bits live at the module root
/// (bits 0-31); architecture-specific bits start at bit 32.
pub mod system {
  use super::SystemFeatures;

  /// The processor has a hardware cycle counter readable from user mode.
  pub const CYCLE_COUNTER: SystemFeatures = SystemFeatures::bit(0);
  /// The cycle counter is 64 bits wide (no short-interval wraparound).
  pub const CYCLE_COUNTER_64BIT: SystemFeatures = SystemFeatures::bit(1);
  pub const ADDRESS_SPACE_64BIT: SystemFeatures = SystemFeatures::bit(2);
  pub const GP_REGISTERS_64BIT: SystemFeatures = SystemFeatures::bit(3);
  /// Misaligned loads/stores are legal (if possibly slow).
  pub const MISALIGNED_ACCESS: SystemFeatures = SystemFeatures::bit(4);
  /// Exactly one logical core: set only when known for sure.
  pub const SINGLE_THREADED: SystemFeatures = SystemFeatures::bit(5);

  /// x86 system bits: OS-preserved register state and PadLock enablement.
  pub mod x86 {
    use super::super::SystemFeatures;

    /// The OS preserves x87 state across context switches.
    pub const FPU_STATE: SystemFeatures = SystemFeatures::bit(32);
    /// The OS preserves XMM state.
    pub const XMM_STATE: SystemFeatures = SystemFeatures::bit(33);
    /// The OS preserves YMM state (AVX usable).
    pub const YMM_STATE: SystemFeatures = SystemFeatures::bit(34);
    /// The OS preserves ZMM/opmask state (AVX-512 usable).
    pub const ZMM_STATE: SystemFeatures = SystemFeatures::bit(35);
    /// The OS preserves MPX bound registers.
    pub const BND_STATE: SystemFeatures = SystemFeatures::bit(36);
    /// Misaligned SSE operands permitted (AMD MisAlignSse).
    pub const MISALIGNED_SSE: SystemFeatures = SystemFeatures::bit(37);
    pub const RNG_ENABLED: SystemFeatures = SystemFeatures::bit(38);
    pub const ACE_ENABLED: SystemFeatures = SystemFeatures::bit(39);
    pub const ACE2_ENABLED: SystemFeatures = SystemFeatures::bit(40);
    pub const PHE_ENABLED: SystemFeatures = SystemFeatures::bit(41);
    pub const PMM_ENABLED: SystemFeatures = SystemFeatures::bit(42);
  }

  /// ARM system bits.
  pub mod arm {
    use super::super::SystemFeatures;

    /// The OS preserves FPA state.
    pub const FPA_STATE: SystemFeatures = SystemFeatures::bit(32);
    /// The OS preserves WMMX state.
    pub const WMMX_STATE: SystemFeatures = SystemFeatures::bit(33);
    /// 32 single-precision VFP registers preserved.
    pub const S32_REGISTERS: SystemFeatures = SystemFeatures::bit(34);
    /// 32 double-precision VFP registers preserved.
    pub const D32_REGISTERS: SystemFeatures = SystemFeatures::bit(35);
    /// Deprecated VFP short-vector mode supported.
    pub const VFP_VECTOR_MODE: SystemFeatures = SystemFeatures::bit(36);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn satisfies_is_subset_test() {
    let detected = simd::x86::SSE2 | simd::x86::SSSE3 | simd::x86::AVX;

    assert!(SimdFeatures::NONE.satisfies(detected));
    assert!(simd::x86::SSE2.satisfies(detected));
    assert!((simd::x86::SSE2 | simd::x86::AVX).satisfies(detected));
    assert!(!simd::x86::AVX2.satisfies(detected));
    assert!(!(simd::x86::SSE2 | simd::x86::AVX2).satisfies(detected));
  }

  #[test]
  fn none_satisfies_anything() {
    assert!(IsaFeatures::NONE.satisfies(IsaFeatures::NONE));
    assert!(SystemFeatures::NONE.satisfies(system::CYCLE_COUNTER));
  }

  #[test]
  fn set_algebra() {
    let a = isa::x86::POPCNT;
    let b = isa::x86::LZCNT;
    let ab = a | b;

    assert_eq!(ab.count(), 2);
    assert!(ab.contains(a));
    assert!(ab.contains(b));
    assert!(!a.contains(ab));
    assert_eq!(ab.intersection(a), a);
    assert_eq!(ab.difference(a), b);
    assert!((a & b).is_empty());
  }

  #[test]
  fn generic_and_arch_system_bits_disjoint() {
    let generic = system::CYCLE_COUNTER
      | system::CYCLE_COUNTER_64BIT
      | system::ADDRESS_SPACE_64BIT
      | system::GP_REGISTERS_64BIT
      | system::MISALIGNED_ACCESS
      | system::SINGLE_THREADED;
    let x86 = system::x86::FPU_STATE
      | system::x86::XMM_STATE
      | system::x86::YMM_STATE
      | system::x86::ZMM_STATE
      | system::x86::BND_STATE
      | system::x86::MISALIGNED_SSE;

    assert!(generic.intersection(x86).is_empty());
    assert!(generic.0 < 1u64 << 32);
    assert_eq!(x86.0 & ((1u64 << 32) - 1), 0);
  }

  #[test]
  fn bitor_assign() {
    let mut mask = SimdFeatures::NONE;
    mask |= simd::arm::NEON;
    mask |= simd::arm::NEON2;
    assert_eq!(mask, simd::arm::NEON | simd::arm::NEON2);
  }
}

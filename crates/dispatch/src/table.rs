//! Function-variant tables and the selection search.
//!
//! A kernel with multiple compiled variants registers them as a
//! [`DispatchTable`]: an ordered slice of [`FunctionDescriptor`]s, each
//! annotated with the microarchitecture it was tuned for and the feature
//! masks it requires, plus an explicit, unconditionally-available
//! fallback. Construction-time checking of the fallback replaces the
//! historical "sentinel entry with empty requirements" convention, so a
//! table without a valid default cannot exist.
//!
//! Selection walks the process dispatch list in priority order and
//! returns the first descriptor whose microarchitecture matches and
//! whose requirements are a subset of the detected capabilities; the
//! fallback is returned when nothing more specific fits. Termination and
//! non-failure are structural: the fallback needs nothing and is always
//! there.

use platform::{CpuInfo, CpuMicroarchitecture, IsaFeatures, SimdFeatures, SystemFeatures};

use crate::lists;

/// One compiled variant of a function.
#[derive(Clone, Copy, Debug)]
pub struct FunctionDescriptor<F> {
  /// Diagnostic name, e.g. `"x86/avx"`.
  pub name: &'static str,
  /// The design this variant is tuned for; `Unknown` marks a variant
  /// gated on features alone (considered in the final dispatch slot).
  pub microarchitecture: CpuMicroarchitecture,
  /// Required scalar ISA features.
  pub isa: IsaFeatures,
  /// Required SIMD features.
  pub simd: SimdFeatures,
  /// Required system features.
  pub system: SystemFeatures,
  /// The variant itself.
  pub func: F,
}

impl<F> FunctionDescriptor<F> {
  /// Describe a variant.
  #[must_use]
  pub const fn new(
    name: &'static str,
    microarchitecture: CpuMicroarchitecture,
    isa: IsaFeatures,
    simd: SimdFeatures,
    system: SystemFeatures,
    func: F,
  ) -> Self {
    Self {
      name,
      microarchitecture,
      isa,
      simd,
      system,
      func,
    }
  }

  /// Whether this variant's requirements are met by the detected masks.
  #[inline]
  #[must_use]
  pub const fn is_satisfied_by(&self, isa: IsaFeatures, simd: SimdFeatures, system: SystemFeatures) -> bool {
    self.isa.satisfies(isa) && self.simd.satisfies(simd) && self.system.satisfies(system)
  }
}

/// The outcome of a selection: the chosen variant and its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selected<F> {
  /// Diagnostic name of the chosen variant.
  pub name: &'static str,
  /// The chosen function.
  pub func: F,
}

/// Detected state a selection runs against.
///
/// Usually built from the process-wide [`CpuInfo`]; tests synthesize it
/// directly to pin down selection behavior.
#[derive(Clone, Copy, Debug)]
pub struct Selection {
  /// Priority-ordered fallback microarchitectures, Unknown-terminated.
  pub dispatch_list: &'static [CpuMicroarchitecture],
  /// Detected scalar ISA features.
  pub isa: IsaFeatures,
  /// Detected SIMD features.
  pub simd: SimdFeatures,
  /// Detected system features.
  pub system: SystemFeatures,
}

impl Selection {
  /// Selection state for a detected processor.
  #[must_use]
  pub fn for_cpu(info: &CpuInfo) -> Self {
    Self {
      dispatch_list: lists::dispatch_list(info.microarchitecture()),
      isa: info.isa_features(),
      simd: info.simd_features(),
      system: info.system_features(),
    }
  }

  /// Selection state for the executing processor (process-wide detection,
  /// degraded to fallback-only when detection failed).
  #[must_use]
  pub fn current() -> Self {
    Self::for_cpu(platform::get())
  }
}

/// An ordered variant table with a mandatory fallback.
#[derive(Clone, Copy, Debug)]
pub struct DispatchTable<F: Copy + 'static> {
  entries: &'static [FunctionDescriptor<F>],
  fallback_name: &'static str,
  fallback: F,
}

impl<F: Copy + 'static> DispatchTable<F> {
  /// Build a table from specialized entries plus the unconditional
  /// fallback. The fallback carries no requirements by construction.
  #[must_use]
  pub const fn new(entries: &'static [FunctionDescriptor<F>], fallback_name: &'static str, fallback: F) -> Self {
    Self {
      entries,
      fallback_name,
      fallback,
    }
  }

  /// The first variant, in dispatch-list priority order, whose
  /// requirements the detected capabilities satisfy. Never fails: the
  /// fallback satisfies trivially.
  #[must_use]
  pub fn select(&self, selection: &Selection) -> Selected<F> {
    for &target in selection.dispatch_list {
      for entry in self.entries {
        if entry.microarchitecture == target
          && entry.is_satisfied_by(selection.isa, selection.simd, selection.system)
        {
          return Selected {
            name: entry.name,
            func: entry.func,
          };
        }
      }
    }
    Selected {
      name: self.fallback_name,
      func: self.fallback,
    }
  }

  /// The specialized entries (diagnostics and tests).
  #[must_use]
  pub const fn entries(&self) -> &'static [FunctionDescriptor<F>] {
    self.entries
  }
}

#[cfg(test)]
mod tests {
  use platform::features::{isa, simd};

  use super::*;

  type KernelFn = fn(u32) -> u32;

  fn fallback_kernel(x: u32) -> u32 {
    x
  }

  fn haswell_kernel(x: u32) -> u32 {
    x + 1
  }

  fn avx_kernel(x: u32) -> u32 {
    x + 2
  }

  const ENTRIES: &[FunctionDescriptor<KernelFn>] = &[
    FunctionDescriptor::new(
      "x86/haswell-fma",
      CpuMicroarchitecture::Haswell,
      IsaFeatures::NONE,
      simd::x86::FMA3,
      SystemFeatures::NONE,
      haswell_kernel,
    ),
    FunctionDescriptor::new(
      "x86/avx",
      CpuMicroarchitecture::Unknown,
      IsaFeatures::NONE,
      simd::x86::AVX,
      SystemFeatures::NONE,
      avx_kernel,
    ),
  ];

  const TABLE: DispatchTable<KernelFn> = DispatchTable::new(ENTRIES, "generic", fallback_kernel);

  use platform::CpuMicroarchitecture;

  fn selection_for(march: CpuMicroarchitecture, simd_mask: SimdFeatures) -> Selection {
    Selection {
      dispatch_list: crate::lists::dispatch_list(march),
      isa: IsaFeatures::NONE,
      simd: simd_mask,
      system: SystemFeatures::NONE,
    }
  }

  #[test]
  fn picks_the_tuned_variant_when_features_allow() {
    let selected = TABLE.select(&selection_for(CpuMicroarchitecture::Haswell, simd::x86::FMA3 | simd::x86::AVX));
    assert_eq!(selected.name, "x86/haswell-fma");
    assert_eq!((selected.func)(1), 2);
  }

  #[test]
  fn missing_features_skip_the_tuned_variant() {
    // Haswell without FMA3 (hypervisor masking): the feature-gated AVX
    // variant is found in the Unknown slot.
    let selected = TABLE.select(&selection_for(CpuMicroarchitecture::Haswell, simd::x86::AVX));
    assert_eq!(selected.name, "x86/avx");
  }

  #[test]
  fn bare_cpu_degrades_to_fallback() {
    let selected = TABLE.select(&selection_for(CpuMicroarchitecture::Haswell, SimdFeatures::NONE));
    assert_eq!(selected.name, "generic");
    assert_eq!((selected.func)(1), 1);
  }

  #[test]
  fn unknown_microarchitecture_still_selects() {
    let selected = TABLE.select(&selection_for(CpuMicroarchitecture::Unknown, simd::x86::AVX));
    assert_eq!(selected.name, "x86/avx");

    let bare = TABLE.select(&selection_for(CpuMicroarchitecture::Unknown, SimdFeatures::NONE));
    assert_eq!(bare.name, "generic");
  }

  #[test]
  fn foreign_architecture_degrades_to_fallback() {
    let selected = TABLE.select(&selection_for(CpuMicroarchitecture::CortexA9, simd::arm::NEON));
    assert_eq!(selected.name, "generic");
  }

  /// Selection never fails for any (microarchitecture, masks) pair.
  #[test]
  fn always_terminates_with_a_function() {
    for &march in CpuMicroarchitecture::all() {
      for mask in [SimdFeatures::NONE, simd::x86::AVX, simd::arm::NEON] {
        let selected = TABLE.select(&selection_for(march, mask));
        assert!(!selected.name.is_empty());
      }
    }
  }

  #[test]
  fn isa_and_system_masks_participate() {
    const POPCNT_TABLE: DispatchTable<KernelFn> = DispatchTable::new(
      &[FunctionDescriptor::new(
        "x86/popcnt",
        CpuMicroarchitecture::Unknown,
        isa::x86::POPCNT,
        SimdFeatures::NONE,
        SystemFeatures::NONE,
        haswell_kernel,
      )],
      "generic",
      fallback_kernel,
    );

    let without = POPCNT_TABLE.select(&Selection {
      dispatch_list: crate::lists::dispatch_list(CpuMicroarchitecture::Nehalem),
      isa: IsaFeatures::NONE,
      simd: SimdFeatures::NONE,
      system: SystemFeatures::NONE,
    });
    assert_eq!(without.name, "generic");

    let with = POPCNT_TABLE.select(&Selection {
      dispatch_list: crate::lists::dispatch_list(CpuMicroarchitecture::Nehalem),
      isa: isa::x86::POPCNT,
      simd: SimdFeatures::NONE,
      system: SystemFeatures::NONE,
    });
    assert_eq!(with.name, "x86/popcnt");
  }
}

#[cfg(all(test, not(miri)))]
mod proptests {
  use proptest::prelude::*;

  use super::*;

  type KernelFn = fn(u32) -> u32;

  fn fallback_kernel(x: u32) -> u32 {
    x
  }

  fn fancy_kernel(x: u32) -> u32 {
    !x
  }

  fn arb_march() -> impl Strategy<Value = CpuMicroarchitecture> {
    prop::sample::select(CpuMicroarchitecture::all())
  }

  use platform::CpuMicroarchitecture;

  proptest! {
    /// The selector returns a function for every reachable input state.
    #[test]
    fn selection_total(march in arb_march(), isa_bits in any::<u64>(), simd_bits in any::<u64>(), system_bits in any::<u64>()) {
      static ENTRIES: &[FunctionDescriptor<KernelFn>] = &[FunctionDescriptor::new(
        "fancy",
        CpuMicroarchitecture::Haswell,
        IsaFeatures(1),
        SimdFeatures(2),
        SystemFeatures(4),
        fancy_kernel,
      )];
      const TABLE: DispatchTable<KernelFn> = DispatchTable::new(ENTRIES, "fallback", fallback_kernel);

      let selection = Selection {
        dispatch_list: crate::lists::dispatch_list(march),
        isa: IsaFeatures(isa_bits),
        simd: SimdFeatures(simd_bits),
        system: SystemFeatures(system_bits),
      };
      let selected = TABLE.select(&selection);

      // The specialized entry is chosen exactly when Haswell is reachable
      // and every requirement bit is detected.
      let haswell_reachable = selection.dispatch_list.contains(&CpuMicroarchitecture::Haswell);
      let satisfied = isa_bits & 1 == 1 && simd_bits & 2 == 2 && system_bits & 4 == 4;
      if haswell_reachable && satisfied {
        prop_assert_eq!(selected.name, "fancy");
      } else {
        prop_assert_eq!(selected.name, "fallback");
      }
    }
  }
}

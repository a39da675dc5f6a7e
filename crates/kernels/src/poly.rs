//! Polynomial evaluation with runtime-selected variants.
//!
//! Horner's scheme over coefficients in ascending power order. The FMA
//! variant contracts each step into one fused operation; it is gated on
//! the FMA3 capability bit, not on a microarchitecture, so it also runs
//! on designs the dispatch lists have never heard of.

use dispatch::{DispatchTable, Dispatcher, FunctionDescriptor, Selection};
#[cfg(target_arch = "x86_64")]
use platform::features::simd;
#[cfg(target_arch = "x86_64")]
use platform::{CpuMicroarchitecture, IsaFeatures, SystemFeatures};

type PolyFn = fn(&[f64], f64) -> f64;

/// Evaluate `coefficients[0] + coefficients[1]*x + ...` at `x`.
///
/// An empty coefficient slice evaluates to zero.
#[must_use]
pub fn evaluate(coefficients: &[f64], x: f64) -> f64 {
  (SELECTED.get().func)(coefficients, x)
}

/// Diagnostic name of the variant in use on this machine.
#[must_use]
pub fn selected_implementation() -> &'static str {
  SELECTED.selected_name()
}

static TABLE: DispatchTable<PolyFn> = DispatchTable::new(
  &[
    #[cfg(target_arch = "x86_64")]
    FunctionDescriptor::new(
      "x86_64/fma",
      CpuMicroarchitecture::Unknown,
      IsaFeatures::NONE,
      simd::x86::FMA3,
      SystemFeatures::NONE,
      evaluate_fma,
    ),
  ],
  "generic",
  evaluate_generic,
);

static SELECTED: Dispatcher<PolyFn> = Dispatcher::new(|| TABLE.select(&Selection::current()));

fn evaluate_generic(coefficients: &[f64], x: f64) -> f64 {
  let mut acc = 0.0f64;
  for &coefficient in coefficients.iter().rev() {
    acc = acc * x + coefficient;
  }
  acc
}

#[cfg(target_arch = "x86_64")]
fn evaluate_fma(coefficients: &[f64], x: f64) -> f64 {
  // SAFETY: this variant is only selected when the FMA3 capability bit
  // was detected.
  #[allow(unsafe_code)]
  unsafe {
    evaluate_fma_impl(coefficients, x)
  }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "fma")]
#[allow(unsafe_code)]
unsafe fn evaluate_fma_impl(coefficients: &[f64], x: f64) -> f64 {
  let mut acc = 0.0f64;
  for &coefficient in coefficients.iter().rev() {
    // With the fma target feature enabled this contracts to vfmadd.
    acc = acc.mul_add(x, coefficient);
  }
  acc
}


#[cfg(all(test, not(miri)))]
mod proptests {
  use proptest::prelude::*;

  use super::*;

  proptest! {
    /// The dispatched variant agrees with the reference within a relative
    /// tolerance on well-conditioned inputs.
    #[test]
    fn agrees_with_reference(
      coefficients in prop::collection::vec(-100.0f64..100.0, 0..12),
      x in -4.0f64..4.0,
    ) {
      let dispatched = evaluate(&coefficients, x);
      let reference = evaluate_generic(&coefficients, x);
      let tolerance = reference.abs().max(1.0) * 1e-12;
      prop_assert!((dispatched - reference).abs() <= tolerance);
    }
  }
}

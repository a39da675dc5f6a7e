//! Dot product with runtime-selected variants.

use dispatch::{DispatchTable, Dispatcher, FunctionDescriptor, Selection};
#[cfg(target_arch = "x86_64")]
use platform::features::{simd, system};
#[cfg(target_arch = "x86_64")]
use platform::{CpuMicroarchitecture, IsaFeatures};

type DotFn = fn(&[f64], &[f64]) -> f64;

/// The dot product of `x` and `y`.
///
/// # Panics
///
/// Panics when the slices differ in length.
#[must_use]
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
  assert_eq!(x.len(), y.len(), "dot product operands must have equal length");
  (SELECTED.get().func)(x, y)
}

/// Diagnostic name of the variant in use on this machine.
#[must_use]
pub fn selected_implementation() -> &'static str {
  SELECTED.selected_name()
}

static TABLE: DispatchTable<DotFn> = DispatchTable::new(
  &[
    #[cfg(target_arch = "x86_64")]
    FunctionDescriptor::new(
      "x86_64/avx-fma",
      CpuMicroarchitecture::Unknown,
      IsaFeatures::NONE,
      simd::x86::AVX.union(simd::x86::FMA3),
      system::x86::YMM_STATE,
      dot_avx_fma,
    ),
  ],
  "generic",
  dot_generic,
);

static SELECTED: Dispatcher<DotFn> = Dispatcher::new(|| TABLE.select(&Selection::current()));

fn dot_generic(x: &[f64], y: &[f64]) -> f64 {
  let mut acc = 0.0f64;
  for (a, b) in x.iter().zip(y) {
    acc += a * b;
  }
  acc
}

#[cfg(target_arch = "x86_64")]
fn dot_avx_fma(x: &[f64], y: &[f64]) -> f64 {
  // SAFETY: selected only when AVX+FMA3 are detected and the OS preserves
  // YMM state.
  #[allow(unsafe_code)]
  unsafe {
    dot_avx_fma_impl(x, y)
  }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx,fma")]
#[allow(unsafe_code)]
unsafe fn dot_avx_fma_impl(x: &[f64], y: &[f64]) -> f64 {
  use core::arch::x86_64::{
    _mm256_add_pd, _mm256_castpd256_pd128, _mm256_extractf128_pd, _mm256_fmadd_pd, _mm256_loadu_pd,
    _mm256_setzero_pd, _mm_add_pd, _mm_add_sd, _mm_cvtsd_f64, _mm_unpackhi_pd,
  };

  let lanes = x.len() / 4;
  let mut acc = _mm256_setzero_pd();
  for lane in 0..lanes {
    let a = _mm256_loadu_pd(x.as_ptr().add(lane * 4));
    let b = _mm256_loadu_pd(y.as_ptr().add(lane * 4));
    acc = _mm256_fmadd_pd(a, b, acc);
  }

  // Horizontal reduction of the 4-wide accumulator.
  let high = _mm256_extractf128_pd(acc, 1);
  let low = _mm256_castpd256_pd128(acc);
  let pair = _mm_add_pd(low, high);
  let mut total = _mm_cvtsd_f64(_mm_add_sd(pair, _mm_unpackhi_pd(pair, pair)));

  for index in lanes * 4..x.len() {
    total = x[index].mul_add(y[index], total);
  }
  total
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_values() {
    assert_eq!(dot(&[], &[]), 0.0);
    assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
  }

  #[test]
  #[should_panic(expected = "equal length")]
  fn mismatched_lengths_panic() {
    let _ = dot(&[1.0], &[1.0, 2.0]);
  }

  #[test]
  fn matches_generic_across_lane_boundaries() {
    // Cover remainders 0-3 around the 4-wide vector width.
    for len in 0..=19 {
      let x: Vec<f64> = (0..len).map(|i| (i as f64).sin()).collect();
      let y: Vec<f64> = (0..len).map(|i| (i as f64 * 0.7).cos()).collect();
      let dispatched = dot(&x, &y);
      let reference = dot_generic(&x, &y);
      assert!(
        (dispatched - reference).abs() <= reference.abs() * 1e-12 + 1e-12,
        "len={len}: {dispatched} vs {reference}"
      );
    }
  }
}

#[cfg(all(test, not(miri)))]
mod proptests {
  use proptest::prelude::*;

  use super::*;

  proptest! {
    #[test]
    fn agrees_with_reference(values in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 0..64)) {
      let x: Vec<f64> = values.iter().map(|&(a, _)| a).collect();
      let y: Vec<f64> = values.iter().map(|&(_, b)| b).collect();
      let dispatched = dot(&x, &y);
      let reference = dot_generic(&x, &y);
      let tolerance = reference.abs().max(1.0) * 1e-10;
      prop_assert!((dispatched - reference).abs() <= tolerance);
    }
  }
}

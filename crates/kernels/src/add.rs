//! Elementwise addition with runtime-selected variants.

use dispatch::{DispatchTable, Dispatcher, FunctionDescriptor, Selection};
#[cfg(target_arch = "x86_64")]
use platform::features::{simd, system};
#[cfg(target_arch = "x86_64")]
use platform::{CpuMicroarchitecture, IsaFeatures};

type AddFn = fn(&[f32], &[f32], &mut [f32]);

/// `out[i] = x[i] + y[i]` for every element.
///
/// # Panics
///
/// Panics when the three slices differ in length.
pub fn add(x: &[f32], y: &[f32], out: &mut [f32]) {
  assert_eq!(x.len(), y.len(), "add operands must have equal length");
  assert_eq!(x.len(), out.len(), "add output must match operand length");
  (SELECTED.get().func)(x, y, out);
}

/// Diagnostic name of the variant in use on this machine.
#[must_use]
pub fn selected_implementation() -> &'static str {
  SELECTED.selected_name()
}

static TABLE: DispatchTable<AddFn> = DispatchTable::new(
  &[
    #[cfg(target_arch = "x86_64")]
    FunctionDescriptor::new(
      "x86_64/avx",
      CpuMicroarchitecture::Unknown,
      IsaFeatures::NONE,
      simd::x86::AVX,
      system::x86::YMM_STATE,
      add_avx,
    ),
  ],
  "generic",
  add_generic,
);

static SELECTED: Dispatcher<AddFn> = Dispatcher::new(|| TABLE.select(&Selection::current()));

fn add_generic(x: &[f32], y: &[f32], out: &mut [f32]) {
  for ((a, b), o) in x.iter().zip(y).zip(out) {
    *o = a + b;
  }
}

#[cfg(target_arch = "x86_64")]
fn add_avx(x: &[f32], y: &[f32], out: &mut [f32]) {
  // SAFETY: selected only when AVX is detected and the OS preserves YMM
  // state.
  #[allow(unsafe_code)]
  unsafe {
    add_avx_impl(x, y, out);
  }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx")]
#[allow(unsafe_code)]
unsafe fn add_avx_impl(x: &[f32], y: &[f32], out: &mut [f32]) {
  use core::arch::x86_64::{_mm256_add_ps, _mm256_loadu_ps, _mm256_storeu_ps};

  let lanes = x.len() / 8;
  for lane in 0..lanes {
    let offset = lane * 8;
    let a = _mm256_loadu_ps(x.as_ptr().add(offset));
    let b = _mm256_loadu_ps(y.as_ptr().add(offset));
    _mm256_storeu_ps(out.as_mut_ptr().add(offset), _mm256_add_ps(a, b));
  }
  for index in lanes * 8..x.len() {
    out[index] = x[index] + y[index];
  }
}

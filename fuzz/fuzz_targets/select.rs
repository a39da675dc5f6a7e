//! Fuzz variant selection: for every microarchitecture and mask triple
//! the selector terminates with a function.

#![no_main]

use arbitrary::Arbitrary;
use dispatch::{dispatch_list, DispatchTable, FunctionDescriptor, Selection};
use libfuzzer_sys::fuzz_target;
use platform::{CpuMicroarchitecture, IsaFeatures, SimdFeatures, SystemFeatures};

#[derive(Arbitrary, Debug)]
struct Input {
  march_index: usize,
  isa: u64,
  simd: u64,
  system: u64,
}

type KernelFn = fn(u32) -> u32;

fn fallback(x: u32) -> u32 {
  x
}

fn tuned(x: u32) -> u32 {
  x.wrapping_add(1)
}

static TABLE: DispatchTable<KernelFn> = DispatchTable::new(
  &[
    FunctionDescriptor::new(
      "haswell",
      CpuMicroarchitecture::Haswell,
      IsaFeatures(1 << 3),
      SimdFeatures(1 << 15),
      SystemFeatures(0),
      tuned,
    ),
    FunctionDescriptor::new(
      "feature-only",
      CpuMicroarchitecture::Unknown,
      IsaFeatures(0),
      SimdFeatures(1 << 14),
      SystemFeatures(1 << 34),
      tuned,
    ),
  ],
  "fallback",
  fallback,
);

fuzz_target!(|input: Input| {
  let all = CpuMicroarchitecture::all();
  let march = all[input.march_index % all.len()];
  let list = dispatch_list(march);
  assert_eq!(*list.last().unwrap(), CpuMicroarchitecture::Unknown);

  let selection = Selection {
    dispatch_list: list,
    isa: IsaFeatures(input.isa),
    simd: SimdFeatures(input.simd),
    system: SystemFeatures(input.system),
  };
  let selected = TABLE.select(&selection);
  assert!(!selected.name.is_empty());
  let _ = (selected.func)(7);
});

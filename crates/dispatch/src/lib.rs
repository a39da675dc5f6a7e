//! Microarchitecture-aware function dispatch for rsprims.
//!
//! Three pieces cooperate to pick the fastest compiled variant of a
//! function for the executing processor:
//!
//! - [`dispatch_list`]: a static, priority-ordered fallback sequence of
//!   microarchitectures for each detected design, ending in `Unknown`
//! - [`DispatchTable`]: a kernel's variants, each annotated with the
//!   microarchitecture and feature masks it requires, plus a mandatory
//!   unconditional fallback
//! - [`Dispatcher`]: a `OnceLock`-backed cache resolving the selection
//!   once per logical function
//!
//! # Usage
//!
//! ```ignore
//! use dispatch::{DispatchTable, Dispatcher, FunctionDescriptor, Selection};
//! use platform::features::simd;
//! use platform::{CpuMicroarchitecture, IsaFeatures, SystemFeatures};
//!
//! type SumFn = fn(&[f32]) -> f32;
//!
//! static TABLE: DispatchTable<SumFn> = DispatchTable::new(
//!   &[FunctionDescriptor::new(
//!     "x86/avx",
//!     CpuMicroarchitecture::Unknown,
//!     IsaFeatures::NONE,
//!     simd::x86::AVX,
//!     platform::features::system::x86::YMM_STATE,
//!     sum_avx,
//!   )],
//!   "generic",
//!   sum_generic,
//! );
//!
//! static SELECTED: Dispatcher<SumFn> = Dispatcher::new(|| TABLE.select(&Selection::current()));
//!
//! pub fn sum(values: &[f32]) -> f32 {
//!   (SELECTED.get().func)(values)
//! }
//! ```

mod cached;
mod lists;
mod table;

pub use cached::Dispatcher;
pub use lists::dispatch_list;
pub use table::{DispatchTable, FunctionDescriptor, Selected, Selection};

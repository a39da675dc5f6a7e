//! CPU detection and introspection for rsprims.
//!
//! This crate is the single source of truth for what the executing
//! processor is (vendor, microarchitecture) and what it can do (ISA,
//! SIMD, and system capability masks, cache topology). The `dispatch`
//! crate builds on it to select the fastest compiled variant of each
//! numerical kernel.
//!
//! # Core Types
//!
//! - [`CpuInfo`]: everything detected about the processor, frozen at
//!   first use
//! - [`IsaFeatures`] / [`SimdFeatures`] / [`SystemFeatures`]: 64-bit
//!   capability masks
//! - [`CpuVendor`] / [`CpuArchitecture`] / [`CpuMicroarchitecture`]:
//!   identity enumerations
//!
//! # Main Entry Point
//!
//! ```ignore
//! let info = platform::get();
//!
//! if platform::features::simd::x86::AVX.satisfies(info.simd_features()) {
//!     // AVX kernel is legal here
//! }
//! ```
//!
//! # Design
//!
//! 1. **Probe, then decode**: raw gathering (`probe`) is separated from
//!    interpretation (`decode`), so every decode table is testable with
//!    synthetic input on any host.
//! 2. **Initialize then freeze**: detection runs once per process behind
//!    a `OnceLock`; the result is read-only and shared by all threads.
//! 3. **Unknown is not an error**: an undecodable part dispatches to the
//!    unconditional fallback of every dispatch table.

pub mod cache;
pub mod decode;
mod error;
pub mod features;
mod ident;
mod info;
pub mod probe;
pub mod strings;

pub use cache::{CacheHierarchyInfo, CacheLevelInfo, TraceCacheInfo};
pub use error::Error;
pub use features::{IsaFeatures, SimdFeatures, SystemFeatures};
pub use ident::{CpuArchitecture, CpuMicroarchitecture, CpuVendor};
pub use info::{get, init_with_info, try_get, CpuInfo};
pub use strings::{write_string, StringKind, StringQuery};

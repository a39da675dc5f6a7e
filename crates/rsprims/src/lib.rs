//! CPU introspection and runtime-dispatched numerical kernels.
//!
//! `rsprims` detects the executing processor once (vendor,
//! microarchitecture, instruction-set and SIMD capabilities, cache
//! topology) and uses the result to select the fastest compiled variant
//! of each numerical kernel at first use.
//!
//! # Quick Start
//!
//! ```ignore
//! let cpu = rsprims::init()?;
//! println!("running on {} ({:?})", cpu.brief_name(), cpu.microarchitecture());
//!
//! let result = rsprims::kernels::dot::dot(&x, &y);
//! ```
//!
//! Detection is idempotent and thread-safe: the first `init()` (or the
//! first kernel call) probes the hardware, every later call observes the
//! frozen result. Kernels never fail on detection problems; they
//! degrade to their portable fallback variants.
//!
//! # Crates
//!
//! | Crate | Concern |
//! |------------|---------------------------------------------------|
//! | `platform` | detection: CPUID, `/proc/cpuinfo`, kernel log |
//! | `dispatch` | microarchitecture dispatch lists, variant tables |
//! | `counters` | cycle/energy counters, timer queries |
//! | `kernels` | dispatched numerical kernels |

pub use counters::{timer_accuracy, timer_frequency, timer_ticks, CycleCounter, EnergyCounter};
pub use dispatch::{dispatch_list, DispatchTable, Dispatcher, FunctionDescriptor, Selected, Selection};
pub use kernels;
pub use platform::{
  features, strings, CacheHierarchyInfo, CpuArchitecture, CpuInfo, CpuMicroarchitecture, CpuVendor, Error,
  IsaFeatures, SimdFeatures, StringKind, StringQuery, SystemFeatures, write_string,
};

/// Library version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LibraryVersion {
  pub major: u32,
  pub minor: u32,
  pub patch: u32,
  /// Release display name.
  pub name: &'static str,
}

const VERSION: LibraryVersion = LibraryVersion {
  major: 0,
  minor: 1,
  patch: 0,
  name: "0.1.0",
};

/// Initialize the library: run CPU detection and freeze the result.
///
/// Idempotent; every call after the first returns the cached outcome.
/// Until `init` has returned `Ok`, no detection-dependent query should
/// be relied upon (kernels still work, via their portable fallbacks).
///
/// # Errors
///
/// `System` when a mandatory probe source could not be read.
pub fn init() -> Result<&'static CpuInfo, Error> {
  platform::try_get()
}

/// Release library-held OS resources.
///
/// Detection state is static and owns nothing, and counters release
/// their handles through `release()`/`Drop`, so this is a no-op kept for
/// embedders that pair every `init` with a shutdown call.
///
/// # Errors
///
/// None currently; the `Result` is part of the lifecycle contract.
pub fn release() -> Result<(), Error> {
  Ok(())
}

/// The library version.
#[must_use]
pub const fn version() -> LibraryVersion {
  VERSION
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn init_is_idempotent() {
    let first = init();
    let second = init();
    assert_eq!(first.is_ok(), second.is_ok());
    if let (Ok(a), Ok(b)) = (first, second) {
      assert!(core::ptr::eq(a, b));
    }
  }

  #[test]
  fn version_matches_package() {
    let v = version();
    assert_eq!(
      format!("{}.{}.{}", v.major, v.minor, v.patch),
      env!("CARGO_PKG_VERSION")
    );
    assert_eq!(v.name, env!("CARGO_PKG_VERSION"));
  }

  #[test]
  fn kernels_work_after_init() {
    let _ = init();
    assert_eq!(kernels::dot::dot(&[2.0, 3.0], &[4.0, 5.0]), 23.0);
  }
}

//! Process-wide detected CPU state.
//!
//! [`CpuInfo`] is populated exactly once per process (initialize-then-
//! freeze): the first call to [`try_get`] runs the platform probes and
//! decoders and caches the outcome, value or error, for the process
//! lifetime. All later calls, from any thread, observe the same result.
//!
//! Detection owns no OS resources, so there is no teardown.

use std::sync::OnceLock;

use crate::cache::CacheHierarchyInfo;
use crate::error::Error;
use crate::features::{system, IsaFeatures, SimdFeatures, SystemFeatures};
use crate::ident::{CpuArchitecture, CpuMicroarchitecture, CpuVendor};
use crate::probe::topology;
use crate::strings;

/// Everything detected about the executing processor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuInfo {
  architecture: CpuArchitecture,
  vendor: CpuVendor,
  microarchitecture: CpuMicroarchitecture,
  isa: IsaFeatures,
  simd: SimdFeatures,
  system: SystemFeatures,
  cache: CacheHierarchyInfo,
  logical_cores: u32,
  full_name: String,
  brief_name: String,
}

/// Degraded state used when detection fails: unknown identity, no
/// features. Every dispatch table degrades to its fallback against it.
const UNKNOWN: CpuInfo = CpuInfo {
  architecture: CpuArchitecture::current(),
  vendor: CpuVendor::Unknown,
  microarchitecture: CpuMicroarchitecture::Unknown,
  isa: IsaFeatures::NONE,
  simd: SimdFeatures::NONE,
  system: SystemFeatures::NONE,
  cache: CacheHierarchyInfo {
    l0i: crate::cache::CacheLevelInfo {
      size: 0,
      line_size: 0,
      associativity: 0,
      unified: false,
    },
    l0d: crate::cache::CacheLevelInfo {
      size: 0,
      line_size: 0,
      associativity: 0,
      unified: false,
    },
    l1i: crate::cache::CacheLevelInfo {
      size: 0,
      line_size: 0,
      associativity: 0,
      unified: false,
    },
    l1d: crate::cache::CacheLevelInfo {
      size: 0,
      line_size: 0,
      associativity: 0,
      unified: false,
    },
    l2: crate::cache::CacheLevelInfo {
      size: 0,
      line_size: 0,
      associativity: 0,
      unified: false,
    },
    l3: crate::cache::CacheLevelInfo {
      size: 0,
      line_size: 0,
      associativity: 0,
      unified: false,
    },
    trace: crate::cache::TraceCacheInfo {
      microops: 0,
      associativity: 0,
    },
    prefetch_line_size: 0,
    clflush_line_size: 0,
  },
  logical_cores: 1,
  full_name: String::new(),
  brief_name: String::new(),
};

static DETECTED: OnceLock<Result<CpuInfo, Error>> = OnceLock::new();

/// Detect or return the cached process-wide CPU state.
///
/// Idempotent: detection runs on the first call; every later call
/// returns the same cached value or error.
///
/// # Errors
///
/// `System` when a mandatory OS source (e.g. `/proc/cpuinfo` on ARM
/// Linux) cannot be read at all. Partial or missing optional sources are
/// not errors; they decode to `Unknown`/zero.
pub fn try_get() -> Result<&'static CpuInfo, Error> {
  match DETECTED.get_or_init(CpuInfo::detect) {
    Ok(info) => Ok(info),
    Err(err) => Err(*err),
  }
}

/// The process-wide CPU state, degraded to an all-`Unknown` value when
/// detection failed. Dispatch against the degraded state always selects
/// unconditional fallback implementations, which is safe everywhere.
#[must_use]
pub fn get() -> &'static CpuInfo {
  static FALLBACK: CpuInfo = UNKNOWN;
  try_get().unwrap_or(&FALLBACK)
}

/// Install caller-supplied CPU state instead of detecting.
///
/// For tests and deployments where the processor is known ahead of time.
/// Must be called before the first [`try_get`]/[`get`].
///
/// # Errors
///
/// `InvalidState` when detection has already run (or an earlier override
/// was installed).
pub fn init_with_info(info: CpuInfo) -> Result<(), Error> {
  DETECTED.set(Ok(info)).map_err(|_| Error::InvalidState)
}

impl CpuInfo {
  /// Run the platform probes and decoders once.
  ///
  /// # Errors
  ///
  /// `System` when a mandatory probe source cannot be read.
  pub fn detect() -> Result<Self, Error> {
    let mut cores = topology::count_logical_cores();
    let mut system_mask = SystemFeatures::NONE;
    if cores == 1 {
      system_mask |= system::SINGLE_THREADED;
    }
    if cores == 0 {
      cores = 1;
    }

    let mut info = Self::detect_identity()?;
    info.logical_cores = cores;
    info.system |= system_mask;
    Ok(info)
  }

  #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
  fn detect_identity() -> Result<Self, Error> {
    use crate::decode::x86;
    use crate::probe::cpuid::CpuidSnapshot;

    let snapshot = CpuidSnapshot::capture();
    let decoded = x86::decode(&snapshot);
    Ok(Self {
      architecture: CpuArchitecture::X86,
      vendor: decoded.vendor,
      microarchitecture: decoded.microarchitecture,
      isa: decoded.isa,
      simd: decoded.simd,
      system: decoded.system,
      cache: decoded.cache,
      logical_cores: 1,
      full_name: decoded.full_name,
      brief_name: decoded.brief_name,
    })
  }

  #[cfg(all(target_arch = "arm", target_os = "linux"))]
  fn detect_identity() -> Result<Self, Error> {
    use crate::decode::arm;
    use crate::probe::{klog, procfs};

    let proc_info = procfs::read()?;
    // The kernel log is a best-effort name source; absence is normal.
    let log_info = klog::read().map(|text| klog::parse(&text)).unwrap_or_default();
    let cores = topology::count_logical_cores().max(1);

    let decoded = arm::decode(&proc_info, &log_info, cores);
    Ok(Self {
      architecture: CpuArchitecture::Arm,
      vendor: decoded.vendor,
      microarchitecture: decoded.microarchitecture,
      isa: decoded.isa,
      simd: decoded.simd,
      system: decoded.system,
      cache: decoded.cache,
      logical_cores: cores,
      full_name: decoded.full_name,
      brief_name: decoded.brief_name,
    })
  }

  #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", all(target_arch = "arm", target_os = "linux"))))]
  fn detect_identity() -> Result<Self, Error> {
    // No probe for this target; everything stays Unknown and dispatch
    // degrades to fallback implementations.
    Ok(UNKNOWN.clone())
  }

  /// Instruction-set family of the executing processor.
  #[inline]
  #[must_use]
  pub const fn architecture(&self) -> CpuArchitecture {
    self.architecture
  }

  /// Design vendor, `Unknown` when undecodable.
  #[inline]
  #[must_use]
  pub const fn vendor(&self) -> CpuVendor {
    self.vendor
  }

  /// Detected microarchitecture, `Unknown` when undecodable.
  #[inline]
  #[must_use]
  pub const fn microarchitecture(&self) -> CpuMicroarchitecture {
    self.microarchitecture
  }

  /// Scalar ISA capability mask.
  #[inline]
  #[must_use]
  pub const fn isa_features(&self) -> IsaFeatures {
    self.isa
  }

  /// SIMD capability mask.
  #[inline]
  #[must_use]
  pub const fn simd_features(&self) -> SimdFeatures {
    self.simd
  }

  /// System capability mask.
  #[inline]
  #[must_use]
  pub const fn system_features(&self) -> SystemFeatures {
    self.system
  }

  /// Detected cache hierarchy (fields zero where unknown).
  #[inline]
  #[must_use]
  pub const fn cache(&self) -> &CacheHierarchyInfo {
    &self.cache
  }

  /// Data cache size in bytes at `level` 0-3; 0 when unknown.
  #[inline]
  #[must_use]
  pub const fn data_cache_size(&self, level: u32) -> u32 {
    self.cache.data_cache_size(level)
  }

  /// Instruction cache size in bytes at `level` 0-3; 0 when unknown.
  #[inline]
  #[must_use]
  pub const fn instruction_cache_size(&self, level: u32) -> u32 {
    self.cache.instruction_cache_size(level)
  }

  /// Logical core count, at least 1.
  #[inline]
  #[must_use]
  pub const fn logical_cores(&self) -> u32 {
    self.logical_cores
  }

  /// Full display name, e.g. "Intel(R) Core(TM) i7-3770 CPU @ 3.40GHz".
  /// Empty when no name source was available.
  #[inline]
  #[must_use]
  pub fn full_name(&self) -> &str {
    &self.full_name
  }

  /// Shortened display name, e.g. "Intel Core i7-3770".
  #[inline]
  #[must_use]
  pub fn brief_name(&self) -> &str {
    &self.brief_name
  }

  /// Copy the full display name into a caller buffer.
  ///
  /// # Errors
  ///
  /// `InsufficientBuffer { required }` when `buffer` is too small; the
  /// buffer is left untouched.
  pub fn write_full_name(&self, buffer: &mut [u8]) -> Result<usize, Error> {
    strings::fill(&self.full_name, buffer)
  }

  /// Copy the brief display name into a caller buffer; semantics as
  /// [`write_full_name`](Self::write_full_name).
  pub fn write_brief_name(&self, buffer: &mut [u8]) -> Result<usize, Error> {
    strings::fill(&self.brief_name, buffer)
  }

  /// Synthetic state for tests and dispatch exercises.
  #[cfg(any(test, feature = "testing"))]
  #[must_use]
  pub fn synthetic(
    microarchitecture: CpuMicroarchitecture,
    isa: IsaFeatures,
    simd: SimdFeatures,
    system_features: SystemFeatures,
  ) -> Self {
    Self {
      architecture: microarchitecture.architecture(),
      vendor: microarchitecture.vendor(),
      microarchitecture,
      isa,
      simd,
      system: system_features,
      ..UNKNOWN.clone()
    }
  }
}

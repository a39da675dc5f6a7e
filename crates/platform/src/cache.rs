//! Cache topology, populated best-effort at detection time.
//!
//! Every field defaults to zero when the hardware or OS does not report it.
//! Sources, in increasing specificity: `/proc/cpuinfo` legacy keys (old ARM
//! kernels), per-microarchitecture guesses, CPUID leaf 2 descriptors, AMD
//! legacy leaves, CPUID leaf 4 / 0x8000_001D deterministic parameters.

/// Geometry of a single cache level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLevelInfo {
  /// Total size in bytes; 0 when unknown or absent.
  pub size: u32,
  /// Line size in bytes; 0 when unknown.
  pub line_size: u16,
  /// Ways of associativity; `u16::MAX` means fully associative, 0 unknown.
  pub associativity: u16,
  /// Whether the level holds both instructions and data.
  pub unified: bool,
}

impl CacheLevelInfo {
  /// True when nothing is known about this level.
  #[inline]
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.size == 0 && self.line_size == 0 && self.associativity == 0
  }
}

/// NetBurst trace cache geometry (micro-ops, not bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraceCacheInfo {
  /// Capacity in micro-ops.
  pub microops: u32,
  /// Ways of associativity.
  pub associativity: u16,
}

/// Full cache hierarchy as far as it could be detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheHierarchyInfo {
  /// Level-0 instruction cache (Qualcomm Krait only).
  pub l0i: CacheLevelInfo,
  /// Level-0 data cache (Qualcomm Krait only).
  pub l0d: CacheLevelInfo,
  pub l1i: CacheLevelInfo,
  pub l1d: CacheLevelInfo,
  pub l2: CacheLevelInfo,
  pub l3: CacheLevelInfo,
  /// Pentium 4 trace cache.
  pub trace: TraceCacheInfo,
  /// Hardware prefetch granularity in bytes (CPUID leaf 2 descriptors
  /// 0xF0/0xF1); 0 when unreported.
  pub prefetch_line_size: u16,
  /// CLFLUSH granularity in bytes from CPUID leaf 1; 0 when unreported.
  pub clflush_line_size: u16,
}

impl CacheHierarchyInfo {
  /// Data cache size at `level` (0-3); unified levels count for both.
  /// Unknown levels report 0.
  #[inline]
  #[must_use]
  pub const fn data_cache_size(&self, level: u32) -> u32 {
    match level {
      0 => self.l0d.size,
      1 => self.l1d.size,
      2 => self.l2.size,
      3 => self.l3.size,
      _ => 0,
    }
  }

  /// Instruction cache size at `level` (0-3); unified levels count for
  /// both. Unknown levels report 0.
  #[inline]
  #[must_use]
  pub const fn instruction_cache_size(&self, level: u32) -> u32 {
    match level {
      0 => self.l0i.size,
      1 => self.l1i.size,
      2 => self.l2.size,
      3 => self.l3.size,
      _ => 0,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_is_all_unknown() {
    let cache = CacheHierarchyInfo::default();
    for level in 0..=4 {
      assert_eq!(cache.data_cache_size(level), 0);
      assert_eq!(cache.instruction_cache_size(level), 0);
    }
    assert!(cache.l1d.is_empty());
  }

  #[test]
  fn unified_levels_visible_from_both_sides() {
    let cache = CacheHierarchyInfo {
      l2: CacheLevelInfo {
        size: 256 * 1024,
        line_size: 64,
        associativity: 8,
        unified: true,
      },
      ..CacheHierarchyInfo::default()
    };
    assert_eq!(cache.data_cache_size(2), 256 * 1024);
    assert_eq!(cache.instruction_cache_size(2), 256 * 1024);
  }
}

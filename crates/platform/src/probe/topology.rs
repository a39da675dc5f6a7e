//! Logical core count.
//!
//! Counts `cpu[0-9]+` entries under `/sys/devices/system/cpu`, which
//! enumerates possible CPUs regardless of the calling thread's affinity
//! mask. A count of zero (unreadable sysfs) is reported as 1 by the
//! caller, and `SINGLE_THREADED` is only asserted when the count is
//! exactly 1, i.e. only when known for sure.

/// Count logical cores via sysfs. Returns 0 when the directory cannot be
/// enumerated; the caller decides the fallback.
#[cfg(target_os = "linux")]
#[must_use]
pub fn count_logical_cores() -> u32 {
  let Ok(entries) = std::fs::read_dir("/sys/devices/system/cpu") else {
    return 0;
  };

  let mut count = 0u32;
  for entry in entries.flatten() {
    if is_cpu_entry(&entry.file_name().to_string_lossy()) {
      count += 1;
    }
  }
  count
}

/// Portable fallback when sysfs is unavailable.
#[cfg(not(target_os = "linux"))]
#[must_use]
pub fn count_logical_cores() -> u32 {
  std::thread::available_parallelism().map_or(0, |n| n.get() as u32)
}

/// `cpu` followed by one or more decimal digits and nothing else.
fn is_cpu_entry(name: &str) -> bool {
  name.strip_prefix("cpu")
    .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cpu_entry_pattern() {
    assert!(is_cpu_entry("cpu0"));
    assert!(is_cpu_entry("cpu15"));
    assert!(!is_cpu_entry("cpu"));
    assert!(!is_cpu_entry("cpufreq"));
    assert!(!is_cpu_entry("cpuidle"));
    assert!(!is_cpu_entry("cpu0a"));
    assert!(!is_cpu_entry("kernel_max"));
  }

  #[test]
  #[cfg(target_os = "linux")]
  fn live_count_is_plausible() {
    let count = count_logical_cores();
    // The test itself is running on at least one core.
    assert!(count >= 1);
  }
}

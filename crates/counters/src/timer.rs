//! High-resolution monotonic timer queries.
//!
//! The timer is `CLOCK_MONOTONIC`, reported as nanosecond ticks: tick
//! values from [`timer_ticks`], the tick rate from [`timer_frequency`],
//! and the kernel-reported resolution from [`timer_accuracy`].

use platform::Error;

/// Current monotonic timer reading, in ticks.
///
/// # Errors
///
/// `System` when the clock cannot be read (not expected on any supported
/// kernel).
pub fn timer_ticks() -> Result<u64, Error> {
  #[cfg(target_os = "linux")]
  {
    let ts = clock_query(Query::Time)?;
    Ok(timespec_to_nanos(&ts))
  }

  #[cfg(not(target_os = "linux"))]
  {
    // Instant has no tick accessor; fall back to a process-relative
    // monotonic reading.
    use std::time::Instant;
    static BASE: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    let base = *BASE.get_or_init(Instant::now);
    Ok(base.elapsed().as_nanos() as u64)
  }
}

/// Timer ticks per second. The monotonic clock reports nanoseconds, so
/// the frequency is fixed.
#[must_use]
pub const fn timer_frequency() -> u64 {
  1_000_000_000
}

/// Timer resolution in ticks, as reported by the kernel.
///
/// # Errors
///
/// `System` when the resolution query fails.
pub fn timer_accuracy() -> Result<u64, Error> {
  #[cfg(target_os = "linux")]
  {
    let ts = clock_query(Query::Resolution)?;
    // A reported resolution of zero still means "at least one tick".
    Ok(timespec_to_nanos(&ts).max(1))
  }

  #[cfg(not(target_os = "linux"))]
  {
    Ok(1)
  }
}

#[cfg(target_os = "linux")]
#[derive(Clone, Copy)]
enum Query {
  Time,
  Resolution,
}

#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
fn clock_query(query: Query) -> Result<libc::timespec, Error> {
  let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
  // SAFETY: ts is a valid out-pointer; CLOCK_MONOTONIC always exists.
  let rc = unsafe {
    match query {
      Query::Time => libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts),
      Query::Resolution => libc::clock_getres(libc::CLOCK_MONOTONIC, &mut ts),
    }
  };
  if rc != 0 {
    let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    return Err(Error::System(errno));
  }
  Ok(ts)
}

#[cfg(target_os = "linux")]
fn timespec_to_nanos(ts: &libc::timespec) -> u64 {
  (ts.tv_sec as u64).saturating_mul(1_000_000_000).saturating_add(ts.tv_nsec as u64)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ticks_are_monotonic() {
    let first = timer_ticks().unwrap();
    let mut acc = 0u64;
    for i in 0..10_000u64 {
      acc = acc.wrapping_add(i);
    }
    core::hint::black_box(acc);
    let second = timer_ticks().unwrap();
    assert!(second >= first);
  }

  #[test]
  fn frequency_is_nanoseconds() {
    assert_eq!(timer_frequency(), 1_000_000_000);
  }

  #[test]
  fn accuracy_is_positive_and_sane() {
    let accuracy = timer_accuracy().unwrap();
    assert!(accuracy >= 1);
    // Any kernel worth running on resolves better than a millisecond.
    assert!(accuracy <= 1_000_000);
  }
}

//! Package energy measurement via Intel RAPL.
//!
//! The kernel exposes the RAPL package-domain energy counter through the
//! powercap sysfs as a monotonically increasing microjoule count with a
//! published wraparound range. A measurement brackets the counter with
//! two reads; wraparound between them is corrected using
//! `max_energy_range_uj`.
//!
//! Same lifecycle contract as the cycle counter: one release per
//! acquire, a second release is `InvalidState`.

use platform::Error;

#[cfg(target_os = "linux")]
const PACKAGE_DOMAIN: &str = "/sys/class/powercap/intel-rapl:0";

/// An in-progress energy measurement of the first RAPL package domain.
#[derive(Debug)]
pub struct EnergyCounter {
  state: Option<State>,
}

#[derive(Debug)]
struct State {
  start_microjoules: u64,
  max_range_microjoules: u64,
}

impl EnergyCounter {
  /// Start an energy measurement.
  ///
  /// # Errors
  ///
  /// - `UnsupportedHardware` when the platform has no RAPL domain.
  /// - `UnsupportedSoftware` when the kernel hides it or denies access
  ///   (powercap requires root on most distributions since the
  ///   PLATYPUS mitigations).
  /// - `System` for other read failures.
  pub fn acquire() -> Result<Self, Error> {
    #[cfg(target_os = "linux")]
    {
      let max_range_microjoules = read_counter_file(&format!("{PACKAGE_DOMAIN}/max_energy_range_uj"))?;
      let start_microjoules = read_counter_file(&format!("{PACKAGE_DOMAIN}/energy_uj"))?;
      Ok(Self {
        state: Some(State {
          start_microjoules,
          max_range_microjoules,
        }),
      })
    }

    #[cfg(not(target_os = "linux"))]
    {
      Err(Error::UnsupportedSoftware)
    }
  }

  /// Finish the measurement: energy consumed since acquisition, in
  /// joules.
  ///
  /// # Errors
  ///
  /// `InvalidState` when already released; `System` when the second
  /// counter read fails.
  pub fn release(&mut self) -> Result<f64, Error> {
    let state = self.state.take().ok_or(Error::InvalidState)?;

    #[cfg(target_os = "linux")]
    {
      let end = read_counter_file(&format!("{PACKAGE_DOMAIN}/energy_uj"))?;
      let microjoules = if end >= state.start_microjoules {
        end - state.start_microjoules
      } else {
        // The counter wrapped; max_energy_range_uj is the modulus.
        state.max_range_microjoules - state.start_microjoules + end
      };
      Ok(microjoules as f64 * 1e-6)
    }

    #[cfg(not(target_os = "linux"))]
    {
      let _ = state;
      Err(Error::UnsupportedSoftware)
    }
  }

  /// Whether this counter is still acquired.
  #[inline]
  #[must_use]
  pub const fn is_acquired(&self) -> bool {
    self.state.is_some()
  }
}

/// Read a decimal counter file.
#[cfg(target_os = "linux")]
fn read_counter_file(path: &str) -> Result<u64, Error> {
  let text = std::fs::read_to_string(path).map_err(|err| match err.kind() {
    std::io::ErrorKind::NotFound => Error::UnsupportedHardware,
    std::io::ErrorKind::PermissionDenied => Error::UnsupportedSoftware,
    _ => Error::System(err.raw_os_error().unwrap_or(0)),
  })?;
  text.trim().parse().map_err(|_| Error::InvalidData)
}

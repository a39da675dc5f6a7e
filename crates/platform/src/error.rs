//! Error taxonomy shared by the rsprims workspace.

use core::fmt;

/// Operation status for everything that can fail in this workspace.
///
/// "Feature not present" is never an error: it is a zero bit in the
/// detected masks. Errors are reserved for misuse (`InvalidState`,
/// `InvalidArgument`), malformed external data, and genuine OS failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
  /// An argument is outside its valid domain.
  InvalidArgument,
  /// External input (e.g. a `/proc/cpuinfo` field) is malformed.
  InvalidData,
  /// An operation was applied to a resource in the wrong lifecycle state,
  /// e.g. releasing an already-released counter.
  InvalidState,
  /// The hardware does not provide the requested facility.
  UnsupportedHardware,
  /// The hardware could provide the facility, but the OS does not expose
  /// it (e.g. `perf_event_open` denied by `perf_event_paranoid`).
  UnsupportedSoftware,
  /// The caller-supplied buffer is too small; `required` is the byte count
  /// that would succeed.
  InsufficientBuffer {
    /// Required buffer length in bytes.
    required: usize,
  },
  /// Memory allocation failed inside a probe.
  OutOfMemory,
  /// An OS call failed unexpectedly; carries the raw `errno` when known.
  System(i32),
}

impl Error {
  /// Short machine-safe identifier, stable across releases.
  #[must_use]
  pub const fn ident(self) -> &'static str {
    match self {
      Self::InvalidArgument => "InvalidArgument",
      Self::InvalidData => "InvalidData",
      Self::InvalidState => "InvalidState",
      Self::UnsupportedHardware => "UnsupportedHardware",
      Self::UnsupportedSoftware => "UnsupportedSoftware",
      Self::InsufficientBuffer { .. } => "InsufficientBuffer",
      Self::OutOfMemory => "OutOfMemory",
      Self::System(_) => "SystemError",
    }
  }

  /// Human-readable description.
  #[must_use]
  pub const fn description(self) -> &'static str {
    match self {
      Self::InvalidArgument => "argument is outside its valid domain",
      Self::InvalidData => "malformed external data",
      Self::InvalidState => "operation not valid in the current state",
      Self::UnsupportedHardware => "hardware does not provide this facility",
      Self::UnsupportedSoftware => "operating system does not expose this facility",
      Self::InsufficientBuffer { .. } => "caller buffer is too small",
      Self::OutOfMemory => "memory allocation failed",
      Self::System(_) => "operating system call failed",
    }
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Self::InsufficientBuffer { required } => {
        write!(f, "caller buffer is too small ({required} bytes required)")
      }
      Self::System(errno) => write!(f, "operating system call failed (errno {errno})"),
      other => f.write_str(other.description()),
    }
  }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_carries_detail() {
    let err = Error::InsufficientBuffer { required: 12 };
    assert!(err.to_string().contains("12"));
    assert!(Error::System(13).to_string().contains("13"));
  }

  #[test]
  fn ident_is_stable() {
    assert_eq!(Error::InvalidState.ident(), "InvalidState");
    assert_eq!(Error::InsufficientBuffer { required: 1 }.ident(), "InsufficientBuffer");
    assert_eq!(Error::System(0).ident(), "SystemError");
  }
}

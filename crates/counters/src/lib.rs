//! Hardware cycle counters, energy counters, and timer queries.
//!
//! Counters follow a strict acquire/release discipline: a successful
//! acquire owns an OS resource (where one is needed) until exactly one
//! release, which also produces the measurement. Releasing twice is an
//! [`Error::InvalidState`]; dropping an unreleased counter closes the
//! resource without producing a reading.
//!
//! ```ignore
//! let mut cycles = counters::CycleCounter::acquire()?;
//! workload();
//! let elapsed = cycles.release()?;
//! ```
//!
//! Counter availability is a property of the machine and kernel
//! configuration, not of this library: `UnsupportedHardware` and
//! `UnsupportedSoftware` are ordinary outcomes the caller should expect
//! on locked-down or virtualized systems.

mod cycles;
mod energy;
mod timer;

pub use cycles::CycleCounter;
pub use energy::EnergyCounter;
pub use platform::Error;
pub use timer::{timer_accuracy, timer_frequency, timer_ticks};

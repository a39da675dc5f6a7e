//! Probe-output decoding.
//!
//! Pure functions from raw probe structures to
//! `(vendor, microarchitecture, feature masks, cache, names)`.
//! Undecodable identity is `Unknown`, never an error: dispatch degrades
//! to the `Unknown` entry of every dispatch list.

pub mod arm;
pub mod x86;

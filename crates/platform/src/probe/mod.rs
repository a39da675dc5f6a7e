//! Raw, architecture-specific information gathering.
//!
//! Probes collect facts with no interpretation: CPUID register dumps,
//! parsed-but-undecoded `/proc/cpuinfo` fields, kernel-log SoC banners,
//! and trial-execution results. The `decode` layer turns probe output
//! into vendor/microarchitecture/feature decisions.
//!
//! Probes never panic and never treat "information unavailable" as an
//! error; missing sources yield zeroed structures with validity flags.

pub mod cpuid;
pub mod insn;
pub mod klog;
pub mod procfs;
pub mod topology;

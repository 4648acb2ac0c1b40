#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Implements the [`HealthProbes`] registry.
mod probes;
pub use self::probes::{HealthProbes, ProbeReport};

/// Implements the ready-made checks.
pub mod check;

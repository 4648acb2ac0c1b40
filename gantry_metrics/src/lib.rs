#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Implements the [`MetricsHub`].
mod hub;
pub use self::hub::{MetricsHub, MetricsHubError};

/// Re-exports the public API of the `metrics` facade for convenience.
pub use metrics;

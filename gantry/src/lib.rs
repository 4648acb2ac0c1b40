#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Re-exports the public API of `gantry-core` in the root of this crate for
/// convenience.
pub use gantry_core::*;


/// Re-exports the public API of `tokio` for convenience.
pub use tokio;


/// Partly re-exports the public API of `tracing` for convenience.
pub use tracing;


/// Re-exports the public API of `gantry-config` for convenience.
pub use gantry_config as config;
pub use gantry_config::{Configurator, DotEnv};


/// Re-exports the public API of `gantry-tracing` for convenience.
pub use gantry_tracing as logging;
pub use gantry_tracing::{Logger, Verbosity};


/// Re-exports the public API of `gantry-metrics` for convenience.
#[cfg(feature = "metrics")]
pub use gantry_metrics as metrics;
#[cfg(feature = "metrics")]
pub use gantry_metrics::MetricsHub;


/// Re-exports the public API of `gantry-probes` for convenience.
#[cfg(feature = "probes")]
pub use gantry_probes as probes;
#[cfg(feature = "probes")]
pub use gantry_probes::HealthProbes;


/// Re-exports the public API of `axum` for serving the admin routers.
#[cfg(any(feature = "metrics", feature = "probes"))]
pub use axum;

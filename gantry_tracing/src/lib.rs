#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Implements the [`Verbosity`] level abstraction.
mod verbosity;
pub use self::verbosity::Verbosity;

/// Implements the [`Logger`] adapter.
mod logger;
pub use self::logger::{Logger, LoggerError};

/// Partly re-exports the public API of `tracing_*` for convenience.
pub use tracing_core::Subscriber;
pub use tracing_subscriber::Registry;
pub use tracing_subscriber::layer::SubscriberExt;
pub use tracing_subscriber::util::SubscriberInitExt;

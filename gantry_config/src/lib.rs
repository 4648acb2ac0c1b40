#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Implements the [`Configurator`] adapter.
mod configurator;
pub use self::configurator::{Configurator, ConfiguratorError};

/// Implements the [`DotEnv`] facade.
mod dotenv;
pub use self::dotenv::DotEnv;

/// Re-exports the public API of the wrapped `config` crate for convenience.
pub use config;

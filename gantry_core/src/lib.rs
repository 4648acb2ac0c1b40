#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Narrow subsystem contracts.
mod subsystem;
pub use self::subsystem::{BoxError, Configuration, Logging};

/// Lifecycle container.
mod container;
pub use self::container::{Container, LifecycleError, SubsystemState};

/// Signal dispatcher.
mod signaler;
pub use self::signaler::release::Release;
pub use self::signaler::{SignalClass, SignalHandler, Signaler, SignalerError};

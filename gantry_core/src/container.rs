use crate::signaler::{Signaler, SignalerError};
use crate::subsystem::{BoxError, Configuration, Logging};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// State of a lifecycle-managed subsystem, as tracked by the [`Container`].
///
/// Transitions are driven exclusively by the container: a subsystem's open
/// hook runs at most once while transitioning `Closed` → `Open`, and its
/// close hook runs at most once while transitioning `Open` → `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemState {
    /// The subsystem's open hook has not run, or its close hook already has.
    Closed,

    /// The subsystem's open hook has run.
    Open,
}

/// Fatal lifecycle failure surfaced by [`Container::open`] or
/// [`Container::close`].
///
/// A lifecycle failure is terminal for the operation that produced it: the
/// container never continues past a failed hook, and never marks a subsystem
/// `Open` after a failed open.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The configuration subsystem failed to resolve its sources.
    #[error("configuration subsystem failed to read")]
    ConfigurationRead(#[source] BoxError),

    /// The logging subsystem failed to open.
    #[error("logging subsystem failed to open")]
    LoggingOpen(#[source] BoxError),

    /// The logging subsystem failed to close.
    #[error("logging subsystem failed to close")]
    LoggingClose(#[source] BoxError),
}

/// Sequences the lifecycle of a service process's subsystems.
///
/// The container owns the *decision* of when the subsystem hooks run, not the
/// subsystems' resources. Startup order is fixed: configuration is read
/// before logging opens, because the logging setup may want resolved
/// configuration. Shutdown runs in reverse; configuration has no close step.
///
/// Both [`open`](Container::open) and [`close`](Container::close) are
/// idempotent: repeating either call after it has succeeded produces no
/// additional effect, so they are safe to call defensively.
///
/// ## Example
///
/// ```
/// use gantry_core::{Configuration, Container};
///
/// struct StaticConfiguration;
///
/// impl Configuration for StaticConfiguration {
///     fn read(&self) -> Result<(), gantry_core::BoxError> {
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), gantry_core::LifecycleError> {
/// let mut container = Container::new()
///     .with_configuration(std::sync::Arc::new(StaticConfiguration));
///
/// container.open()?;
/// // ... run the service ...
/// container.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct Container {
    configuration: Option<Arc<dyn Configuration>>,
    logging: Option<Arc<dyn Logging>>,
    signaler: Option<Signaler>,

    configuration_state: SubsystemState,
    logging_state: SubsystemState,
}

impl Default for SubsystemState {
    /// Every subsystem starts out `Closed`.
    fn default() -> Self {
        Self::Closed
    }
}

impl Container {
    /// Creates an empty [`Container`]: no subsystems wired, all states
    /// `Closed`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires in the configuration subsystem.
    pub fn with_configuration(self, configuration: Arc<dyn Configuration>) -> Self {
        Self {
            configuration: Some(configuration),
            ..self
        }
    }

    /// Wires in the logging subsystem.
    pub fn with_logging(self, logging: Arc<dyn Logging>) -> Self {
        Self {
            logging: Some(logging),
            ..self
        }
    }

    /// Wires in the [`Signaler`]. The container does not drive the signaler's
    /// lifecycle; it merely hands it over to
    /// [`wait_for_signal`](Container::wait_for_signal).
    pub fn with_signaler(self, signaler: Signaler) -> Self {
        Self {
            signaler: Some(signaler),
            ..self
        }
    }
}

impl Container {
    /// Opens the wired subsystems in the fixed startup order: configuration
    /// first, then logging.
    ///
    /// A subsystem that is absent or already `Open` is skipped. A failed hook
    /// aborts the sequence: the failing subsystem stays `Closed` and no later
    /// subsystem is touched.
    pub fn open(&mut self) -> Result<(), LifecycleError> {
        if self.configuration_state == SubsystemState::Closed {
            if let Some(configuration) = &self.configuration {
                configuration
                    .read()
                    .map_err(LifecycleError::ConfigurationRead)?;

                self.configuration_state = SubsystemState::Open;
            }
        }

        if self.logging_state == SubsystemState::Closed {
            if let Some(logging) = &self.logging {
                logging.open().map_err(LifecycleError::LoggingOpen)?;

                self.logging_state = SubsystemState::Open;

                info!("Subsystems open");
            }
        }

        Ok(())
    }

    /// Closes the wired subsystems in reverse startup order. Only logging has
    /// a close hook; configuration's lifecycle is read-only.
    ///
    /// The close hook is attempted exactly once: logging is marked `Closed`
    /// even when the hook fails, so a repeated `close` call does not retry
    /// it. The failure is still surfaced to the caller.
    pub fn close(&mut self) -> Result<(), LifecycleError> {
        if self.logging_state == SubsystemState::Open {
            if let Some(logging) = &self.logging {
                let outcome = logging.close();

                self.logging_state = SubsystemState::Closed;

                outcome.map_err(LifecycleError::LoggingClose)?;
            }
        }

        Ok(())
    }

    /// Blocks (asynchronously) until a signal handler triggers the shared
    /// release, delegating to the wired [`Signaler`].
    ///
    /// The signaler is consumed by the wait: a second call, or a call on a
    /// container with no signaler wired, returns immediately.
    pub async fn wait_for_signal(&mut self, on_error: impl Fn(SignalerError)) {
        if let Some(signaler) = self.signaler.take() {
            signaler.wait_for_signal(on_error).await;
        }
    }
}

/// Methods for inspecting the tracked subsystem states.
impl Container {
    /// Reports the tracked state of the configuration subsystem.
    pub fn configuration_state(&self) -> SubsystemState {
        self.configuration_state
    }

    /// Reports the tracked state of the logging subsystem.
    pub fn logging_state(&self) -> SubsystemState {
        self.logging_state
    }
}

use crate::Verbosity;
use gantry_core::{BoxError, Logging};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};
use tracing_core::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::layer as make_fmt_layer;
use tracing_subscriber::layer::{Filter, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Failure to open the logging subsystem.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// A global `tracing` subscriber is already installed in this process.
    #[error("failed to install the global tracing subscriber")]
    Install(#[from] TryInitError),
}

/// Logging subsystem backed by the `tracing` ecosystem.
///
/// The logger is set up once, wired into the lifecycle container, and
/// [opened](Logger::open) during container open. Opening installs the global
/// subscriber with a formatted layer; since the global subscriber is
/// process-wide, a logger can be opened at most once per process.
///
/// ## Example
///
/// ```no_run
/// use gantry_tracing::{Logger, Verbosity};
///
/// let logger = Logger::new()
///     .with_name("noop")
///     .with_verbosity(Verbosity::Debug)
///     .with_target("hyper", Verbosity::Warn);
///
/// logger.open().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logger {
    name: String,
    verbosity: Verbosity,
    development: bool,
    color: bool,
    show_target: bool,
    targets: BTreeMap<String, Verbosity>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            name: "gantry".to_string(),
            verbosity: Verbosity::default(),
            development: false,
            color: true,
            show_target: true,
            targets: BTreeMap::new(),
        }
    }
}

impl Logger {
    /// Creates a [`Logger`] with the default (compact, colored,
    /// [`Info`](Verbosity::Info)-level) output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names this logger. The name is reported when the subsystem opens and
    /// closes.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Specifies the root [verbosity level](Verbosity): the filter applied to
    /// every target without an explicit [override](Logger::with_target).
    pub fn with_verbosity(self, verbosity: Verbosity) -> Self {
        Self { verbosity, ..self }
    }

    /// Enables or disables development mode, which switches the output from
    /// the single-line compact format to the multi-line pretty format.
    /// Defaults to `false`.
    pub fn with_development(self, development: bool) -> Self {
        Self {
            development,
            ..self
        }
    }

    /// Enables or disables colored (ANSI) output. Defaults to `true`.
    pub fn with_color(self, color: bool) -> Self {
        Self { color, ..self }
    }

    /// Includes or omits the event target in the output. Defaults to `true`.
    pub fn with_show_target(self, show_target: bool) -> Self {
        Self {
            show_target,
            ..self
        }
    }

    /// Merges an extra per-target [`Verbosity`] level into this logger.
    pub fn with_target(mut self, target: impl Into<String>, verbosity: Verbosity) -> Self {
        self.targets.insert(target.into(), verbosity);

        self
    }

    /// Merges extra per-target [`Verbosity`] levels into this logger.
    pub fn with_targets<T>(mut self, targets: impl IntoIterator<Item = (T, Verbosity)>) -> Self
    where
        T: Into<String>,
    {
        for (target, verbosity) in targets.into_iter() {
            self.targets.insert(target.into(), verbosity);
        }

        self
    }
}

impl Logger {
    /// Reports the name of this logger.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports the root [verbosity level](Verbosity) of this logger.
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Reports whether this logger is in development mode.
    pub fn development(&self) -> bool {
        self.development
    }

    /// Reports the per-target [`Verbosity`] overrides of this logger.
    pub fn targets(&self) -> &BTreeMap<String, Verbosity> {
        &self.targets
    }
}

impl Logger {
    /// Installs the global `tracing` subscriber according to this logger’s
    /// setup.
    ///
    /// Fails if a global subscriber is already installed, including by a
    /// previous call to this method.
    pub fn open(&self) -> Result<(), LoggerError> {
        tracing_subscriber::registry()
            .with(self.make_layer())
            .try_init()?;

        info!(logger = %self.name, "Logging open");

        Ok(())
    }

    /// Flushes the logging output.
    ///
    /// The formatted layers write to standard output without buffering, so
    /// this is a bookkeeping step that keeps the subsystem contract symmetric.
    pub fn close(&self) {
        debug!(logger = %self.name, "Logging closed");
    }

    /// Creates the formatted [`Layer`] for this logger: pretty in development
    /// mode, compact otherwise.
    fn make_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
        Targets: Filter<S>,
    {
        let targets = Targets::new()
            .with_default(self.verbosity)
            .with_targets(&self.targets);

        if self.development {
            Box::new(
                make_fmt_layer()
                    .pretty()
                    .with_ansi(self.color)
                    .with_target(self.show_target)
                    .with_filter(targets),
            )
        } else {
            Box::new(
                make_fmt_layer()
                    .compact()
                    .with_ansi(self.color)
                    .with_target(self.show_target)
                    .with_filter(targets),
            )
        }
    }
}

impl Logging for Logger {
    fn open(&self) -> Result<(), BoxError> {
        Logger::open(self).map_err(Into::into)
    }

    fn close(&self) -> Result<(), BoxError> {
        Logger::close(self);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_accumulates_setup() {
        // Given
        let logger = Logger::new()
            .with_name("noop")
            .with_verbosity(Verbosity::Debug)
            .with_development(true)
            .with_target("hyper", Verbosity::Warn)
            .with_targets([("tower", Verbosity::Error)]);

        // Then
        assert_eq!(logger.name(), "noop");
        assert_eq!(logger.verbosity(), Verbosity::Debug);
        assert!(logger.development());
        assert_eq!(logger.targets().get("hyper"), Some(&Verbosity::Warn));
        assert_eq!(logger.targets().get("tower"), Some(&Verbosity::Error));
    }

    #[test]
    fn second_open_is_rejected() {
        // Given
        let logger = Logger::new().with_verbosity(Verbosity::Off);

        // When: the first open installs the process-global subscriber
        Logger::open(&logger).unwrap();

        // Then: another install attempt must surface the conflict
        let outcome = Logger::open(&logger);
        assert!(matches!(outcome, Err(LoggerError::Install(_))));

        // Closing remains available regardless
        Logging::close(&logger).unwrap();
    }
}

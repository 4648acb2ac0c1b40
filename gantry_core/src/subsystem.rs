use std::error::Error;

/// Boxed error returned by subsystem hooks and signal handlers.
///
/// The [`Container`](crate::Container) and [`Signaler`](crate::Signaler) treat
/// collaborator failures as opaque: they are propagated or reported, never
/// inspected.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Contract for the configuration subsystem.
///
/// The configuration subsystem has a read-only lifecycle: the
/// [`Container`](crate::Container) invokes [`read`](Configuration::read) at
/// most once while opening, and there is no close step.
pub trait Configuration: Send + Sync {
    /// Resolves the configuration from its sources (files, environment,
    /// baked-in defaults) and caches the result for later access.
    fn read(&self) -> Result<(), BoxError>;
}

/// Contract for the logging subsystem.
///
/// The [`Container`](crate::Container) invokes [`open`](Logging::open) at most
/// once while opening (after configuration has been read, so the logging
/// setup may rely on resolved configuration), and [`close`](Logging::close)
/// at most once while closing.
pub trait Logging: Send + Sync {
    /// Installs the logging pipeline.
    fn open(&self) -> Result<(), BoxError>;

    /// Flushes and tears down the logging pipeline.
    fn close(&self) -> Result<(), BoxError>;
}

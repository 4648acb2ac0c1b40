use crate::DotEnv;
use config::{Config, ConfigError, Environment, File, Value};
use gantry_core::{BoxError, Configuration};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failure to assemble or deserialize the configuration.
#[derive(Debug, Error)]
pub enum ConfiguratorError {
    /// The underlying builder failed to resolve or parse its sources.
    #[error("failed to assemble configuration")]
    Assemble(#[from] ConfigError),
}

/// Configuration subsystem backed by the `config` crate.
///
/// The configurator is set up once, wired into the lifecycle container, and
/// [read](Configurator::read) during container open. Reading assembles the
/// recognized sources in precedence order (later overrides earlier):
///
/// 1. baked-in [defaults](Configurator::with_default),
/// 2. an optional [configuration file](Configurator::with_file), searched for
///    across the [search paths](Configurator::with_search_path),
/// 3. [environment variables](Configurator::with_env_prefix), optionally
///    after tapping `.env` files.
///
/// The assembled snapshot is then available through
/// [`load`](Configurator::load) and [`section`](Configurator::section).
///
/// ## Example
///
/// ```
/// use gantry_config::Configurator;
/// use gantry_core::Configuration as _;
///
/// let configurator = Configurator::new()
///     .with_optional_file("gantry.toml")
///     .with_env_prefix("GANTRY")
///     .with_default("greeting", "hello");
///
/// configurator.read().unwrap();
///
/// assert_eq!(configurator.load().get_string("greeting").unwrap(), "hello");
/// ```
pub struct Configurator {
    file_name: Option<String>,
    file_required: bool,
    search_paths: Vec<PathBuf>,
    env_enabled: bool,
    env_prefix: Option<String>,
    env_separator: Option<String>,
    defaults: Vec<(String, Value)>,
    tap_dotenv: bool,

    cell: RwLock<Option<Arc<Config>>>,
}

impl Default for Configurator {
    fn default() -> Self {
        Self {
            file_name: None,
            file_required: false,
            search_paths: vec![PathBuf::from(".")],
            env_enabled: true,
            env_prefix: None,
            env_separator: Some("_".to_string()),
            defaults: Vec::new(),
            tap_dotenv: true,
            cell: RwLock::new(None),
        }
    }
}

impl Configurator {
    /// Creates a [`Configurator`] with no file source, environment overrides
    /// enabled without a prefix, and the working directory as the only search
    /// path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the configuration file (extension included, e.g.
    /// `"gantry.toml"`). The file **must** exist in one of the search paths;
    /// [`read`](Configurator::read) fails otherwise.
    pub fn with_file(self, name: impl Into<String>) -> Self {
        Self {
            file_name: Some(name.into()),
            file_required: true,
            ..self
        }
    }

    /// Names the configuration file, tolerating its absence: a file found in
    /// no search path is simply skipped as a source.
    pub fn with_optional_file(self, name: impl Into<String>) -> Self {
        Self {
            file_name: Some(name.into()),
            file_required: false,
            ..self
        }
    }

    /// Appends a directory to search the configuration file in. Paths are
    /// probed in insertion order; the first hit wins.
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());

        self
    }

    /// Enables or disables configuration overrides from environment
    /// variables. Defaults to `true`.
    pub fn with_env(self, enabled: bool) -> Self {
        Self {
            env_enabled: enabled,
            ..self
        }
    }

    /// Specifies the prefix for environment variables used as overrides. With
    /// prefix `"GANTRY"`, the variable `GANTRY_GREETING` overrides the
    /// `greeting` key. The prefix itself is removed from the key.
    pub fn with_env_prefix(self, prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: Some(prefix.into()),
            ..self
        }
    }

    /// Specifies the separator that splits environment variable names into
    /// nested keys. Defaults to `"_"` (a single underscore).
    pub fn with_env_separator(self, separator: impl Into<String>) -> Self {
        Self {
            env_separator: Some(separator.into()),
            ..self
        }
    }

    /// Bakes in a default value for the given key. Defaults have the lowest
    /// precedence of all sources.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.push((key.into(), value.into()));

        self
    }

    /// Enables or disables [tapping](DotEnv::tap) `.env` files before
    /// assembling. Defaults to `true`.
    pub fn with_dotenv(self, enabled: bool) -> Self {
        Self {
            tap_dotenv: enabled,
            ..self
        }
    }
}

impl Configurator {
    /// Assembles the configuration from the recognized sources and caches the
    /// snapshot for [`load`](Configurator::load).
    ///
    /// Safe to call repeatedly: every call re-assembles from scratch and
    /// atomically replaces the cached snapshot.
    pub fn read(&self) -> Result<(), ConfiguratorError> {
        if self.tap_dotenv {
            DotEnv::tap();
        }

        let mut builder = Config::builder();

        for (key, value) in &self.defaults {
            builder = builder.set_default(key, value.clone())?;
        }

        if let Some(file) = self.file_source() {
            builder = builder.add_source(file);
        }

        if self.env_enabled {
            let mut env_source = Environment::default();

            if let Some(prefix) = self.env_prefix.as_deref() {
                env_source = env_source.prefix(prefix);
            }

            if let Some(separator) = self.env_separator.as_deref() {
                env_source = env_source.separator(separator);
            }

            builder = builder.add_source(env_source);
        }

        let resolved = builder.build()?;

        *self.cell.write() = Some(Arc::new(resolved));

        debug!("Configuration assembled");

        Ok(())
    }

    /// Returns the assembled configuration snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the configuration has not been [read](Configurator::read)
    /// yet, which the lifecycle container normally does during open.
    pub fn load(&self) -> Arc<Config> {
        self.try_load()
            .unwrap_or_else(|| panic!("the configuration must be read before it is loaded"))
    }

    /// Returns the assembled configuration snapshot, or `None` if the
    /// configuration has not been [read](Configurator::read) yet.
    pub fn try_load(&self) -> Option<Arc<Config>> {
        self.cell.read().clone()
    }

    /// Deserializes a section of the assembled configuration by its `key`.
    /// A key absent from every source yields `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if the section fails to deserialize, or if the configuration
    /// has not been read yet. For a less panicky alternative, see
    /// [`try_section`](Configurator::try_section).
    pub fn section<T>(&self, key: impl AsRef<str>) -> T
    where
        T: DeserializeOwned + Default,
    {
        let key = key.as_ref();

        self.try_section(key).unwrap_or_else(|error| {
            panic!(
                "failed to load or parse the configuration section '{}': {}",
                key, error,
            );
        })
    }

    /// Attempts to deserialize a section of the assembled configuration.
    ///
    /// # Panics
    ///
    /// Still panics if the configuration has not been read yet. See
    /// [`load`](Configurator::load).
    pub fn try_section<T>(&self, key: impl AsRef<str>) -> Result<T, ConfiguratorError>
    where
        T: DeserializeOwned + Default,
    {
        self.load().get(key.as_ref()).or_else(|error| match error {
            ConfigError::NotFound(_) => Ok(T::default()),
            _ => Err(ConfiguratorError::from(error)),
        })
    }

    /// Resolves the configuration file source, if any: the first search path
    /// containing the named file wins. A required file missing from every
    /// search path is still added, so that assembly reports the failure.
    fn file_source(&self) -> Option<File<config::FileSourceFile, config::FileFormat>> {
        let name = self.file_name.as_deref()?;

        let candidate = self
            .search_paths
            .iter()
            .map(|path| path.join(name))
            .find(|path| path.is_file());

        match candidate {
            Some(path) => Some(File::from(path).required(true)),
            None if self.file_required => {
                let fallback = self
                    .search_paths
                    .first()
                    .map(|path| path.join(name))
                    .unwrap_or_else(|| PathBuf::from(name));

                Some(File::from(fallback).required(true))
            }
            None => None,
        }
    }
}

impl Configuration for Configurator {
    fn read(&self) -> Result<(), BoxError> {
        Configurator::read(self).map_err(Into::into)
    }
}

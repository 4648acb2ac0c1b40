use std::sync::Once;

const FILE_DOT_ENV_LOCAL: &str = ".env.local";
const FILE_DOT_ENV_GLOBAL: &str = ".env";

/// A facade for loading environment variables from `.env` files in the
/// working directory.
///
/// Use [`tap`](DotEnv::tap) for a safe, one-time load, or
/// [`load`](DotEnv::load) to perform the operation directly.
pub struct DotEnv;

impl DotEnv {
    /// Ensures environment variables from dot-env files are loaded.
    ///
    /// The loading operation is performed at most once during the process's
    /// lifetime; subsequent calls have no effect.
    pub fn tap() {
        static INIT: Once = Once::new();

        INIT.call_once(Self::load);
    }

    /// Loads environment variables from dot-env files into the environment.
    ///
    /// Variables already present in the process environment are not
    /// overridden.
    ///
    /// ## Precedence
    ///
    /// Files are loaded in the following order, with variables from earlier
    /// files taking precedence:
    ///
    /// 1. `.env.local`
    /// 2. `.env`
    ///
    /// A file that is not found is silently ignored.
    pub fn load() {
        // Load local file (first priority)
        let _ = dotenvy::from_path(FILE_DOT_ENV_LOCAL);

        // Load global file (second priority)
        let _ = dotenvy::from_path(FILE_DOT_ENV_GLOBAL);
    }
}

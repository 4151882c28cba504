//! Configuration for the worker pool used by [`Parallel`](crate::combinator::Parallel).
//!
//! # Configuration Precedence
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Programmatic**: values set via builder methods (`worker_threads(4)`)
//! 2. **Environment variables**: values from `COSYNC_*` env vars
//! 3. **Config file**: values loaded from TOML (requires `config-file` feature)
//! 4. **Defaults**: host parallelism and the `cosync-worker` name prefix
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `COSYNC_WORKER_THREADS` | `usize` | `worker_threads` |
//! | `COSYNC_THREAD_NAME_PREFIX` | `String` | `thread_name_prefix` |
//!
//! [`Config::default`] never reads the environment. The host-sized entry
//! points ([`Parallel::default`](crate::combinator::Parallel) and the free
//! [`for_all`](crate::combinator::for_all::for_all) functions) start from
//! [`Config::from_env`] and fall back to the defaults, with a warning, when a
//! variable is invalid.

use std::num::NonZeroUsize;

use crate::error::ConfigError;

/// Environment variable name for worker thread count.
pub const ENV_WORKER_THREADS: &str = "COSYNC_WORKER_THREADS";
/// Environment variable name for worker thread name prefix.
pub const ENV_THREAD_NAME_PREFIX: &str = "COSYNC_THREAD_NAME_PREFIX";

/// Default name prefix for spawned worker threads.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "cosync-worker";

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of concurrent workers a parallel loop is split across.
    pub worker_threads: usize,
    /// Name prefix for spawned worker threads; the chunk index is appended.
    pub thread_name_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_threads: host_parallelism(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Returns the defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Parses a TOML document, then applies environment overrides on top.
    ///
    /// ```toml
    /// [parallel]
    /// worker_threads = 4
    /// thread_name_prefix = "myapp-worker"
    /// ```
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig =
            toml::from_str(document).map_err(|e| ConfigError::Toml(e.to_string()))?;
        let mut config = Self::default();
        if let Some(workers) = parsed.parallel.worker_threads {
            config.worker_threads = validate_workers("parallel.worker_threads", workers)?;
        }
        if let Some(prefix) = parsed.parallel.thread_name_prefix {
            config.thread_name_prefix = prefix;
        }
        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Sets the worker count. Zero is clamped to one.
    #[must_use]
    pub fn worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = workers.max(1);
        self
    }

    /// Sets the worker thread name prefix.
    #[must_use]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}

/// Number of execution units on this host, or 1 if it cannot be determined.
#[must_use]
pub fn host_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Apply environment variable overrides to a [`Config`].
///
/// Only variables that are set in the environment are applied.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    if let Some(val) = read_env(ENV_WORKER_THREADS) {
        let workers = parse_usize(ENV_WORKER_THREADS, &val)?;
        config.worker_threads = validate_workers(ENV_WORKER_THREADS, workers)?;
    }
    if let Some(val) = read_env(ENV_THREAD_NAME_PREFIX) {
        config.thread_name_prefix = val;
    }
    Ok(())
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_usize(key: &'static str, val: &str) -> Result<usize, ConfigError> {
    val.trim().parse::<usize>().map_err(|_| ConfigError::Invalid {
        key,
        expected: "unsigned integer",
        value: val.to_string(),
    })
}

fn validate_workers(key: &'static str, workers: usize) -> Result<usize, ConfigError> {
    if workers == 0 {
        return Err(ConfigError::ZeroWorkers { key });
    }
    Ok(workers)
}

#[cfg(feature = "config-file")]
#[derive(serde::Deserialize, Default, Debug)]
struct TomlConfig {
    #[serde(default)]
    parallel: ParallelToml,
}

#[cfg(feature = "config-file")]
#[derive(serde::Deserialize, Default, Debug)]
struct ParallelToml {
    worker_threads: Option<usize>,
    thread_name_prefix: Option<String>,
}

/// Runs `f` with the given variables set (or removed), serialized against
/// every other caller.
#[cfg(test)]
#[allow(unsafe_code)]
pub(crate) fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    for (key, value) in vars {
        // SAFETY: serialized by ENV_LOCK; no other test thread touches these keys.
        unsafe {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
    let out = f();
    for (key, _) in vars {
        // SAFETY: as above.
        unsafe { std::env::remove_var(key) };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_host_parallelism() {
        let config = Config::default();
        assert!(config.worker_threads >= 1);
        assert_eq!(config.worker_threads, host_parallelism());
        assert_eq!(config.thread_name_prefix, DEFAULT_THREAD_NAME_PREFIX);
    }

    #[test]
    fn builder_clamps_zero_workers() {
        assert_eq!(Config::default().worker_threads(0).worker_threads, 1);
        assert_eq!(Config::default().worker_threads(3).worker_threads, 3);
    }

    #[test]
    fn env_overrides_apply() {
        let config = with_env(
            &[
                (ENV_WORKER_THREADS, Some(" 6 ")),
                (ENV_THREAD_NAME_PREFIX, Some("bench")),
            ],
            Config::from_env,
        )
        .expect("valid env");
        assert_eq!(config.worker_threads, 6);
        assert_eq!(config.thread_name_prefix, "bench");
    }

    #[test]
    fn env_rejects_garbage_and_zero() {
        let err = with_env(&[(ENV_WORKER_THREADS, Some("lots"))], Config::from_env)
            .expect_err("garbage must fail");
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = with_env(&[(ENV_WORKER_THREADS, Some("0"))], Config::from_env)
            .expect_err("zero must fail");
        assert_eq!(
            err,
            ConfigError::ZeroWorkers {
                key: ENV_WORKER_THREADS
            }
        );
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn toml_document_parses() {
        let config = with_env(&[(ENV_WORKER_THREADS, None)], || {
            Config::from_toml_str("[parallel]\nworker_threads = 2\nthread_name_prefix = \"io\"\n")
        })
        .expect("valid toml");
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.thread_name_prefix, "io");
    }
}

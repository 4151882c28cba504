//! Error types.
//!
//! Two classes of failure exist in this crate:
//!
//! - [`UsageFault`]: programmer error at a call site. These are never
//!   returned; the primitive logs the fault and halts the calling thread by
//!   panicking with the fault's message.
//! - [`ConfigError`]: an unparseable or out-of-range configuration value,
//!   returned from [`Config`](crate::config::Config) constructors.
//!
//! Errors produced by user tasks travel inside an
//! [`Outcome`](crate::types::Outcome) and are never inspected here.

use thiserror::Error;

use crate::tracing_compat::error;

/// Misuse of a primitive that cannot be rejected by the type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageFault {
    /// A guard handle was passed to an object that did not register it.
    #[error("guard #{index} belongs to guarded object {owner}, not {object}")]
    ForeignGuard {
        /// Object that registered the guard.
        owner: u64,
        /// Object the handle was passed to.
        object: u64,
        /// Position of the guard in its owner.
        index: usize,
    },
    /// The calling thread already holds the exclusive lock of this object.
    #[error("reentrant entry into guarded object {object}")]
    Reentrant {
        /// Object that was re-entered.
        object: u64,
    },
}

impl UsageFault {
    /// Logs the fault and halts the calling thread.
    #[track_caller]
    pub(crate) fn raise(self) -> ! {
        error!(fault = %self, "usage fault");
        panic!("{self}")
    }
}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("invalid value for {key}: expected {expected}, got {value:?}")]
    Invalid {
        /// Environment variable or config key.
        key: &'static str,
        /// Human-readable description of the accepted format.
        expected: &'static str,
        /// The rejected raw value.
        value: String,
    },
    /// The worker count must be at least one.
    #[error("{key} must be at least 1")]
    ZeroWorkers {
        /// Environment variable or config key.
        key: &'static str,
    },
    /// The TOML document could not be parsed.
    #[cfg(feature = "config-file")]
    #[error("config file: {0}")]
    Toml(String),
}

//! Cosync: blocking, thread-based concurrency primitives.
//!
//! # Overview
//!
//! Five independent primitives that callers compose:
//!
//! - **Parallel-for** ([`combinator::for_all`]): apply a function to every
//!   index of a sequence across a fixed number of worker threads
//! - **Process** ([`combinator::process`]): run a task in the background and
//!   receive its [`Outcome`] on a single-slot channel
//! - **Merge** ([`channel::merge`]): fan a dynamically growing set of
//!   channels into one output
//! - **Forward** ([`channel::forward`]): relay one channel into another
//! - **Guarded monitor** ([`sync::GuardedObject`]): state behind a
//!   reader/writer lock whose guard predicates are re-evaluated on every exit
//!
//! Merge and forward stop when a [`DoneSignal`] fires, closing their output.
//!
//! # Module Structure
//!
//! - [`types`]: [`Outcome`] and [`DoneSignal`]
//! - [`combinator`]: parallel-for, process, co-begin
//! - [`channel`]: merge and forward
//! - [`sync`]: guarded monitors
//! - [`config`]: worker pool configuration (env and optional TOML)
//! - [`error`](mod@error): usage faults and configuration errors
//! - [`tracing_compat`]: optional tracing integration (requires `tracing-integration` feature)
//!
//! # Errors
//!
//! Misuse that the type system cannot reject (a guard handle from another
//! object, re-entering a held monitor) panics with a
//! [`UsageFault`](error::UsageFault). Errors produced by tasks travel inside
//! an [`Outcome`] and are never inspected by the toolkit.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod channel;
pub mod combinator;
pub mod config;
pub mod error;
pub mod sync;
pub mod tracing_compat;
pub mod types;

// ── Test-only modules ───────────────────────────────────────────────────
#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

// Re-exports for convenient access to core types
pub use channel::{MergeExit, RelayEnd, forward, merge};
pub use combinator::{Parallel, co_begin, co_begin2, for_all, for_each_mut, process};
pub use config::Config;
pub use error::{ConfigError, UsageFault};
pub use sync::{GuardHandle, GuardedObject};
pub use types::{BoxError, DoneSignal, Outcome};

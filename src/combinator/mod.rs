//! Blocking combinators for running work concurrently.
//!
//! - [`for_all`](mod@for_all): chunked parallel-for over an indexable sequence
//! - [`process`](mod@process): background task delivering an [`Outcome`](crate::types::Outcome)
//! - [`co_begin`](mod@co_begin): run a fixed set of tasks and wait for all

pub mod co_begin;
pub mod for_all;
pub mod process;

pub use co_begin::{co_begin, co_begin2};
pub use for_all::{Indexed, Parallel, for_all, for_each_mut};
pub use process::{Delivery, process};

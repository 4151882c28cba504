//! Core types shared by the primitives.
//!
//! - [`Outcome`]: value-or-error result delivered by tasks
//! - [`DoneSignal`]: one-shot cancellation consumed by channel relays

pub mod done;
pub mod outcome;

pub use done::DoneSignal;
pub use outcome::{BoxError, Outcome};

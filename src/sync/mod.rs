//! Guarded monitors.
//!
//! - [`GuardedObject`]: state behind a reader/writer lock, with guards
//!   re-evaluated on every exit
//! - [`GuardHandle`]: reference to a registered guard predicate

pub mod guard;
pub mod guarded;

pub use guard::GuardHandle;
pub use guarded::{GuardedObject, GuardedRead, GuardedWrite};

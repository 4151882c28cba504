//! Channel plumbing: fan-in of a dynamic set of channels and single-channel relays.
//!
//! Channels are `crossbeam_channel` channels, re-exported here. A channel is
//! closed when its last [`Sender`] is dropped; [`merge`] and [`forward`] take
//! the output sender by value and close it exactly once, on return.
//!
//! Element types are checked by the compiler. A source of channels whose
//! element type differs from the output's is rejected before anything runs:
//!
//! ```compile_fail
//! use cosync::channel::{merge, unbounded, Receiver};
//! use cosync::types::DoneSignal;
//!
//! let (_tx, ins) = unbounded::<Receiver<f32>>();
//! let (out, _rx) = unbounded::<i32>();
//! merge(&DoneSignal::new(), ins, out);
//! ```

pub mod forward;
pub mod merge;

pub use crossbeam_channel::{Receiver, RecvError, SendError, Sender, bounded, unbounded};
pub use forward::{RelayEnd, forward};
pub use merge::{MergeExit, merge};

//! Fan-in of a dynamically growing set of channels.
//!
//! [`merge`] admits input channels as they arrive on a source channel and
//! starts one relay thread per admitted input. All relays write into the same
//! output. Elements from one input keep their order; elements from different
//! inputs interleave arbitrarily.
//!
//! # Termination
//!
//! - `done` fires: admission stops, every relay stops (including one blocked
//!   on a send), and the output closes.
//! - The source closes and every admitted input closes and drains: the
//!   output closes.
//!
//! The output closes once, when the last relay's sender clone and the
//! caller's original sender have all been dropped.
//!
//! Finished relays are joined by the enclosing scope and leave nothing
//! behind, so a long-lived merge fed short-lived channels stays bounded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, select};

use super::forward::{RelayEnd, relay};
use crate::tracing_compat::{debug, trace};
use crate::types::DoneSignal;

/// How a [`merge`] ended, with the number of input channels it admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeExit {
    /// The done signal fired.
    Done {
        /// Input channels admitted before the firing.
        admitted: usize,
    },
    /// The source and every admitted input closed without a firing.
    Drained {
        /// Input channels admitted in total.
        admitted: usize,
    },
}

impl MergeExit {
    /// Number of input channels admitted.
    #[must_use]
    pub const fn admitted(self) -> usize {
        match self {
            Self::Done { admitted } | Self::Drained { admitted } => admitted,
        }
    }

    /// Returns true if the merge was stopped by the done signal.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done { .. })
    }
}

/// Merges every channel arriving on `inputs` into `output` until `done`
/// fires or everything has drained, then closes `output`.
///
/// Blocks the calling thread; run it on its own thread. The caller must not
/// keep another clone of `output` if it relies on the output closing.
///
/// # Example
///
/// ```
/// use cosync::channel::{bounded, merge};
/// use cosync::types::DoneSignal;
/// use std::thread;
///
/// let done = DoneSignal::new();
/// let (ins_tx, ins_rx) = bounded(0);
/// let (out_tx, out_rx) = bounded(0);
///
/// let merger = {
///     let done = done.clone();
///     thread::spawn(move || merge(&done, ins_rx, out_tx))
/// };
/// thread::spawn(move || {
///     for n in 0..3 {
///         let (tx, rx) = bounded(0);
///         ins_tx.send(rx).unwrap();
///         thread::spawn(move || {
///             for i in 0..5 {
///                 tx.send(n * 10 + i).unwrap();
///             }
///         });
///     }
/// });
/// let mut got: Vec<i32> = out_rx.iter().collect();
/// got.sort_unstable();
/// assert_eq!(got.len(), 15);
/// assert_eq!(merger.join().unwrap().admitted(), 3);
/// ```
///
/// A source that does not carry channels does not compile:
///
/// ```compile_fail
/// use cosync::channel::{merge, unbounded};
/// use cosync::types::DoneSignal;
///
/// let (_tx, ins) = unbounded::<i32>();
/// let (out, _rx) = unbounded::<i32>();
/// merge(&DoneSignal::new(), ins, out);
/// ```
pub fn merge<T: Send>(
    done: &DoneSignal,
    inputs: Receiver<Receiver<T>>,
    output: Sender<T>,
) -> MergeExit {
    let stopped_by_relay = AtomicBool::new(false);
    let (admitted, fired) = thread::scope(|scope| {
        let mut admitted = 0_usize;
        let fired = loop {
            if done.is_fired() {
                break true;
            }
            select! {
                recv(done.receiver()) -> _ => break true,
                recv(inputs) -> msg => match msg {
                    Ok(input) => {
                        let output = output.clone();
                        let stopped_by_relay = &stopped_by_relay;
                        trace!(input = admitted, "admitted input channel");
                        scope.spawn(move || {
                            if relay(done, &input, &output) == RelayEnd::Done {
                                stopped_by_relay.store(true, Ordering::Relaxed);
                            }
                        });
                        admitted += 1;
                    }
                    Err(_) => break false,
                },
            }
        };
        debug!(admitted, fired, "admission stopped; waiting for relays");
        (admitted, fired)
    });
    let exit = if fired || stopped_by_relay.into_inner() {
        MergeExit::Done { admitted }
    } else {
        MergeExit::Drained { admitted }
    };
    debug!(?exit, "merge finished; closing output");
    drop(output);
    exit
}

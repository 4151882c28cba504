//! One-shot, idempotent cancellation signal.
//!
//! A [`DoneSignal`] is the only cancellation primitive in the crate. It is
//! consumed by [`merge`](crate::channel::merge) and
//! [`forward`](crate::channel::forward): once fired, every relay stops and
//! every output channel is closed.
//!
//! Firing drops the signal's internal sender, which disconnects every
//! [`receiver`](DoneSignal::receiver). A disconnected receiver is
//! permanently ready inside `crossbeam_channel::select!`, so any number of
//! threads observe the same firing without further coordination.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::Mutex;

use crate::tracing_compat::debug;

/// A cloneable, fire-once cancellation signal.
///
/// # Example
///
/// ```
/// use cosync::types::DoneSignal;
///
/// let done = DoneSignal::new();
/// let observer = done.clone();
/// assert!(!observer.is_fired());
///
/// done.fire();
/// done.fire(); // idempotent
/// assert!(observer.is_fired());
/// ```
#[derive(Debug, Clone)]
pub struct DoneSignal {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    /// `None` once fired.
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

impl DoneSignal {
    /// Creates an unfired signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                sender: Mutex::new(Some(sender)),
                receiver,
            }),
        }
    }

    /// Fires the signal. Subsequent calls have no effect.
    pub fn fire(&self) {
        if self.inner.sender.lock().take().is_some() {
            debug!("done signal fired");
        }
    }

    /// Returns true once [`fire`](Self::fire) has been called on any clone.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        matches!(
            self.inner.receiver.try_recv(),
            Err(TryRecvError::Disconnected)
        )
    }

    /// Returns a receiver that becomes ready (disconnected) when fired.
    ///
    /// Nothing is ever sent on it; use it as a `select!` arm.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<()> {
        &self.inner.receiver
    }
}

impl Default for DoneSignal {
    fn default() -> Self {
        Self::new()
    }
}

//! Background tasks that deliver an [`Outcome`] over a single-slot channel.

use std::io;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use crate::tracing_compat::{trace, warn};
use crate::types::Outcome;

/// Receiving end of a [`process`] task.
///
/// Exactly one [`Outcome`] is written to it. `recv()` blocks until the task
/// finishes; race it against `crossbeam_channel::after` inside `select!` for
/// a timeout. If the task body panics, no Outcome is written and `recv()`
/// reports disconnection.
pub type Delivery<T, E> = Receiver<Outcome<T, E>>;

/// Job handed to a spawner.
type Job = Box<dyn FnOnce() + Send>;

/// Runs `task` on a new thread and returns the channel its Outcome arrives on.
///
/// Returns immediately. The task always runs to completion; there is no
/// cancellation. If no thread can be spawned, the task runs on the calling
/// thread and its Outcome is already waiting when this returns.
///
/// # Example
///
/// ```
/// use cosync::combinator::process;
/// use cosync::types::Outcome;
///
/// let delivery = process(|| Outcome::<_, String>::ok(1 + 2));
/// let outcome = delivery.recv().expect("task completed");
/// assert_eq!(outcome.value(), Some(&3));
/// ```
pub fn process<T, E, F>(task: F) -> Delivery<T, E>
where
    F: FnOnce() -> Outcome<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    process_with(spawn_named, task)
}

fn spawn_named(job: Job) -> io::Result<()> {
    thread::Builder::new()
        .name("cosync-process".into())
        .spawn(job)
        .map(drop)
}

fn process_with<T, E, F>(spawn: fn(Job) -> io::Result<()>, task: F) -> Delivery<T, E>
where
    F: FnOnce() -> Outcome<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let (sender, receiver) = crossbeam_channel::bounded(1);
    let body = move || {
        let outcome = task();
        trace!(ok = outcome.is_ok(), "process task finished");
        // Fails only if the caller dropped the delivery channel.
        let _ = sender.send(outcome);
    };
    // A failed spawn drops its job; the slot keeps the body reachable.
    let slot = Arc::new(Mutex::new(Some(body)));
    let remote = Arc::clone(&slot);
    let spawned = spawn(Box::new(move || {
        if let Some(body) = remote.lock().take() {
            body();
        }
    }));
    if let Err(err) = spawned {
        warn!(error = %err, "failed to spawn process task; running inline");
        if let Some(body) = slot.lock().take() {
            body();
        }
    }
    receiver
}

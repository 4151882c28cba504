//! Run a fixed set of tasks concurrently and wait for all of them.
//!
//! Unlike [`process`](super::process), the caller blocks until every task has
//! finished, and the tasks may borrow from the caller's stack.

use std::thread;

use crate::tracing_compat::debug;
use crate::types::Outcome;

/// Runs each task on its own scoped thread and returns their Outcomes in
/// submission order.
///
/// A panic in any task is propagated to the caller once all tasks have been
/// joined.
///
/// # Example
///
/// ```
/// use cosync::combinator::co_begin;
/// use cosync::types::Outcome;
///
/// let base = 10;
/// let tasks: Vec<Box<dyn FnOnce() -> Outcome<i32, String> + Send + '_>> = vec![
///     Box::new(|| Outcome::ok(base + 1)),
///     Box::new(|| Outcome::err("second failed".to_string())),
/// ];
/// let outcomes = co_begin(tasks);
/// assert_eq!(outcomes[0], Outcome::ok(11));
/// assert!(outcomes[1].is_err());
/// ```
pub fn co_begin<T, E, F, I>(tasks: I) -> Vec<Outcome<T, E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Outcome<T, E> + Send,
    T: Send,
    E: Send,
{
    thread::scope(|scope| {
        let handles: Vec<_> = tasks.into_iter().map(|task| scope.spawn(task)).collect();
        debug!(tasks = handles.len(), "co_begin dispatched");
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect()
    })
}

/// Runs two heterogeneous tasks concurrently and returns both Outcomes.
pub fn co_begin2<A, B, EA, EB, FA, FB>(a: FA, b: FB) -> (Outcome<A, EA>, Outcome<B, EB>)
where
    FA: FnOnce() -> Outcome<A, EA> + Send,
    FB: FnOnce() -> Outcome<B, EB> + Send,
    A: Send,
    B: Send,
    EA: Send,
    EB: Send,
{
    thread::scope(|scope| {
        let left = scope.spawn(a);
        let right = b();
        let left = left
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
        (left, right)
    })
}

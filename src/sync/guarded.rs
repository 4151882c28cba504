//! Monitor combining a reader/writer lock with re-evaluated guards.
//!
//! A [`GuardedObject`] owns some state behind a `parking_lot::RwLock` and a
//! list of guards registered against it. Entry may wait on one guard's token
//! before taking the lock. Every exit, exclusive or shared, re-evaluates every
//! guard while the lock is still held: guards whose predicate holds are
//! opened, the rest are closed. Waiters are therefore woken by state, never by
//! targeted signals, and a change made under the lock is visible to the next
//! entrant that a guard admits.
//!
//! # Entry is two steps
//!
//! [`enter`](GuardedObject::enter) claims the guard's token *before* taking
//! the lock. With more than one waiter on a guard, another entrant can run
//! between the two steps and falsify the predicate. Either keep one logical
//! waiter per guard, re-check the state after entering, or use
//! [`enter_strict`](GuardedObject::enter_strict), which re-validates the
//! predicate under the lock and waits again if it no longer holds.
//!
//! # Usage faults
//!
//! A handle issued by another object, or a thread that already holds the
//! exclusive or a shared lock entering again, halts the caller with a
//! [`UsageFault`](crate::error::UsageFault).

use core::fmt;
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::guard::{Guard, GuardHandle};
use crate::error::UsageFault;
use crate::tracing_compat::trace;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// State protected by a lock and a set of guard predicates.
///
/// # Example
///
/// ```
/// use cosync::sync::GuardedObject;
/// use std::collections::VecDeque;
/// use std::sync::Arc;
/// use std::thread;
///
/// let mut queue = GuardedObject::new(VecDeque::new());
/// let not_empty = queue.guard(|q: &VecDeque<u32>| !q.is_empty());
/// let queue = Arc::new(queue);
///
/// let consumer = {
///     let queue = Arc::clone(&queue);
///     thread::spawn(move || queue.enter(Some(not_empty)).pop_front())
/// };
/// queue.enter(None).push_back(7);
/// assert_eq!(consumer.join().unwrap(), Some(7));
/// ```
pub struct GuardedObject<T> {
    id: u64,
    state: RwLock<T>,
    guards: Vec<Guard<T>>,
    holders: Mutex<Holders>,
}

/// Threads currently inside the object.
#[derive(Debug, Default)]
struct Holders {
    writer: Option<ThreadId>,
    readers: HashSet<ThreadId>,
}

impl Holders {
    fn contains(&self, thread: ThreadId) -> bool {
        self.writer == Some(thread) || self.readers.contains(&thread)
    }
}

impl<T> GuardedObject<T> {
    /// Wraps `state` with no guards registered.
    pub fn new(state: T) -> Self {
        Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            state: RwLock::new(state),
            guards: Vec::new(),
            holders: Mutex::new(Holders::default()),
        }
    }

    /// Process-unique identifier of this object.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Registers a predicate and returns its handle.
    ///
    /// The guard starts open if `predicate` holds for the current state. The
    /// predicate must not mutate anything; it runs on every exit while the
    /// lock is held. Registration needs `&mut self`, so every guard is in
    /// place before the object can be shared.
    pub fn guard<P>(&mut self, predicate: P) -> GuardHandle
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let index = self.guards.len();
        let guard = Guard::new(Box::new(predicate), self.state.get_mut());
        trace!(object = self.id, guard = index, open = guard.is_open(), "guard registered");
        self.guards.push(guard);
        GuardHandle {
            object: self.id,
            index,
        }
    }

    /// Number of registered guards.
    #[must_use]
    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    /// Returns true if the guard currently holds its token.
    ///
    /// This is a snapshot; it may change as soon as it is returned.
    #[must_use]
    pub fn is_open(&self, handle: GuardHandle) -> bool {
        self.lookup(handle).is_open()
    }

    /// Enters with exclusive access.
    ///
    /// With a handle, first blocks until that guard's token is available and
    /// claims it, then takes the lock. The returned value dereferences to the
    /// state; dropping it exits.
    pub fn enter(&self, guard: Option<GuardHandle>) -> GuardedWrite<'_, T> {
        self.check_reentry();
        if let Some(handle) = guard {
            self.lookup(handle).wait();
        }
        let lock = self.state.write();
        self.holders.lock().writer = Some(thread::current().id());
        GuardedWrite { object: self, lock }
    }

    /// Enters with shared access. Guard handling matches [`enter`](Self::enter).
    pub fn enter_read_only(&self, guard: Option<GuardHandle>) -> GuardedRead<'_, T> {
        self.check_reentry();
        if let Some(handle) = guard {
            self.lookup(handle).wait();
        }
        let lock = self.state.read();
        self.holders.lock().readers.insert(thread::current().id());
        GuardedRead { object: self, lock }
    }

    /// Enters with exclusive access once `guard`'s predicate holds under the
    /// lock.
    ///
    /// Like [`enter`](Self::enter), but after taking the lock the predicate is
    /// checked again. If it no longer holds, the entry is abandoned (an
    /// ordinary exit, re-evaluating every guard) and the wait starts over.
    pub fn enter_strict(&self, guard: GuardHandle) -> GuardedWrite<'_, T> {
        let predicate = self.lookup(guard);
        loop {
            let entered = self.enter(Some(guard));
            if predicate.holds(&entered) {
                return entered;
            }
            trace!(
                object = self.id,
                guard = guard.index,
                "admitted on a stale token; waiting again"
            );
            drop(entered);
        }
    }

    /// Consumes the object, returning the protected state.
    pub fn into_inner(self) -> T {
        self.state.into_inner()
    }

    fn lookup(&self, handle: GuardHandle) -> &Guard<T> {
        match self.guards.get(handle.index) {
            Some(guard) if handle.object == self.id => guard,
            _ => UsageFault::ForeignGuard {
                owner: handle.object,
                object: self.id,
                index: handle.index,
            }
            .raise(),
        }
    }

    fn check_reentry(&self) {
        if self.holders.lock().contains(thread::current().id()) {
            UsageFault::Reentrant { object: self.id }.raise();
        }
    }

    /// Re-evaluates every guard against `state`. Callers hold the lock.
    fn resolve_guards(&self, state: &T) {
        for (index, guard) in self.guards.iter().enumerate() {
            if let Some(open) = guard.resolve(state) {
                trace!(object = self.id, guard = index, open, "guard resolved");
            }
        }
    }
}

impl<T: Default> Default for GuardedObject<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for GuardedObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedObject")
            .field("id", &self.id)
            .field("guards", &self.guards)
            .finish_non_exhaustive()
    }
}

/// Exclusive access to a [`GuardedObject`]'s state.
///
/// Dropping it (or calling [`exit`](Self::exit)) re-evaluates every guard and
/// then releases the lock.
#[must_use = "dropping the guard exits the object immediately"]
pub struct GuardedWrite<'a, T> {
    object: &'a GuardedObject<T>,
    lock: RwLockWriteGuard<'a, T>,
}

impl<T> GuardedWrite<'_, T> {
    /// Exits the object.
    pub fn exit(self) {}
}

impl<T> Deref for GuardedWrite<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.lock
    }
}

impl<T> DerefMut for GuardedWrite<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.lock
    }
}

impl<T> Drop for GuardedWrite<'_, T> {
    fn drop(&mut self) {
        self.object.resolve_guards(&self.lock);
        self.object.holders.lock().writer = None;
        // `lock` is released when the fields drop, after this.
    }
}

/// Shared access to a [`GuardedObject`]'s state.
///
/// Dropping it (or calling [`exit`](Self::exit)) re-evaluates every guard
/// under the shared lock and then releases it.
#[must_use = "dropping the guard exits the object immediately"]
pub struct GuardedRead<'a, T> {
    object: &'a GuardedObject<T>,
    lock: RwLockReadGuard<'a, T>,
}

impl<T> GuardedRead<'_, T> {
    /// Exits the object.
    pub fn exit(self) {}
}

impl<T> Deref for GuardedRead<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.lock
    }
}

impl<T> Drop for GuardedRead<'_, T> {
    fn drop(&mut self) {
        self.object.resolve_guards(&self.lock);
        self.object.holders.lock().readers.remove(&thread::current().id());
    }
}

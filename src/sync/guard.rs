//! Guards: predicates with a single-token admission slot.
//!
//! A guard is either *open* (one token available) or *closed* (none). The
//! first waiter to claim the token closes the guard again until the next
//! re-evaluation by its [`GuardedObject`](super::GuardedObject).
//!
//! The open/closed flag and the token are the same `bool`, held under the
//! slot's mutex, so the two can never disagree.

use core::fmt;

use parking_lot::{Condvar, Mutex};

/// Reference to a guard registered on a [`GuardedObject`](super::GuardedObject).
///
/// Handles are only valid on the object that issued them; passing one to
/// another object is a usage fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuardHandle {
    pub(crate) object: u64,
    pub(crate) index: usize,
}

impl GuardHandle {
    /// Position of the guard in registration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

pub(crate) type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A registered predicate and its token slot.
pub(crate) struct Guard<T> {
    condition: Predicate<T>,
    slot: TokenSlot,
}

impl<T> Guard<T> {
    /// Creates a guard whose initial state is `condition(state)`.
    pub(crate) fn new(condition: Predicate<T>, state: &T) -> Self {
        let open = condition(state);
        Self {
            condition,
            slot: TokenSlot::new(open),
        }
    }

    pub(crate) fn holds(&self, state: &T) -> bool {
        (self.condition)(state)
    }

    /// Re-evaluates the predicate and opens or closes the slot to match.
    ///
    /// Returns the new state if it changed.
    pub(crate) fn resolve(&self, state: &T) -> Option<bool> {
        if self.holds(state) {
            self.slot.open().then_some(true)
        } else {
            self.slot.close().then_some(false)
        }
    }

    pub(crate) fn wait(&self) {
        self.slot.wait();
    }

    pub(crate) fn is_open(&self) -> bool {
        self.slot.is_open()
    }
}

impl<T> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("open", &self.slot.is_open())
            .finish_non_exhaustive()
    }
}

/// Capacity-one token slot.
#[derive(Debug)]
struct TokenSlot {
    token: Mutex<bool>,
    available: Condvar,
}

impl TokenSlot {
    fn new(open: bool) -> Self {
        Self {
            token: Mutex::new(open),
            available: Condvar::new(),
        }
    }

    /// Supplies the token if absent. Returns true on transition.
    fn open(&self) -> bool {
        let mut token = self.token.lock();
        if *token {
            return false;
        }
        *token = true;
        self.available.notify_one();
        true
    }

    /// Withdraws the token if present. Returns true on transition.
    fn close(&self) -> bool {
        let mut token = self.token.lock();
        if !*token {
            return false;
        }
        *token = false;
        true
    }

    /// Blocks until the token is available, then consumes it.
    fn wait(&self) {
        let mut token = self.token.lock();
        while !*token {
            self.available.wait(&mut token);
        }
        *token = false;
    }

    fn is_open(&self) -> bool {
        *self.token.lock()
    }
}

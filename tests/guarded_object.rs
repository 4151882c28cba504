//! Producer/consumer scenarios on a guarded monitor.
//!
//! Mirrors a notification queue: `notify` appends under the exclusive lock,
//! `notification` waits for the queue to be non-empty and pops, and
//! `waiting` reads the length under the shared lock.

mod common;

use common::{init_test_logging, wait_until};
use cosync::combinator::{Parallel, co_begin2};
use cosync::sync::{GuardHandle, GuardedObject};
use cosync::types::Outcome;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

struct Notifications {
    object: GuardedObject<VecDeque<usize>>,
    not_empty: GuardHandle,
}

impl Notifications {
    fn new() -> Self {
        let mut object = GuardedObject::new(VecDeque::new());
        let not_empty = object.guard(|queue: &VecDeque<usize>| !queue.is_empty());
        Self { object, not_empty }
    }

    fn notify(&self, notification: usize) {
        self.object.enter(None).push_back(notification);
    }

    /// Several consumers share one guard, so re-validate under the lock.
    fn notification(&self) -> usize {
        let mut queue = self.object.enter_strict(self.not_empty);
        queue
            .pop_front()
            .unwrap_or_else(|| unreachable!("strict entry guarantees a notification"))
    }

    fn waiting(&self) -> usize {
        self.object.enter_read_only(None).len()
    }
}

#[test]
fn concurrent_producers_and_consumers_lose_nothing() {
    init_test_logging();
    let notifications = Notifications::new();
    let parallel = Parallel::new(3);

    for round in 0..50 {
        let received = parking_lot::Mutex::new(Vec::new());
        let (consumed, produced) = co_begin2(
            || {
                parallel.for_all(&[0_u8; 3], |_| {
                    let value = notifications.notification();
                    received.lock().push(value);
                });
                Outcome::<(), ()>::ok(())
            },
            || {
                parallel.for_all(&[0_u8; 3], |i| notifications.notify(round * 3 + i));
                Outcome::<(), ()>::ok(())
            },
        );
        assert!(consumed.is_ok() && produced.is_ok());
        assert_eq!(notifications.waiting(), 0, "round {round}");

        let mut received = received.into_inner();
        received.sort_unstable();
        let expected: Vec<usize> = (round * 3..round * 3 + 3).collect();
        assert_eq!(received, expected, "each notification seen exactly once");
    }
}

#[test]
fn single_consumer_with_plain_enter() {
    init_test_logging();
    let mut object = GuardedObject::new(VecDeque::<u32>::new());
    let not_empty = object.guard(|q: &VecDeque<u32>| !q.is_empty());
    let object = Arc::new(object);

    let consumer = {
        let object = Arc::clone(&object);
        thread::spawn(move || {
            let mut seen = Vec::new();
            for _ in 0..200 {
                let value = object
                    .enter(Some(not_empty))
                    .pop_front()
                    .expect("one waiter per guard is always admitted to a non-empty queue");
                seen.push(value);
            }
            seen
        })
    };
    for i in 0..200 {
        object.enter(None).push_back(i);
    }
    let seen = consumer.join().expect("consumer panicked");
    assert_eq!(seen, (0..200).collect::<Vec<_>>());
}

#[test]
fn bounded_buffer_with_two_guards() {
    const CAPACITY: usize = 2;
    init_test_logging();
    let mut object = GuardedObject::new(VecDeque::<u64>::new());
    let not_full = object.guard(|q: &VecDeque<u64>| q.len() < CAPACITY);
    let not_empty = object.guard(|q: &VecDeque<u64>| !q.is_empty());
    let object = Arc::new(object);

    let producer = {
        let object = Arc::clone(&object);
        thread::spawn(move || {
            for i in 0..100 {
                let mut queue = object.enter(Some(not_full));
                assert!(queue.len() < CAPACITY);
                queue.push_back(i);
            }
        })
    };
    let mut sum = 0;
    for _ in 0..100 {
        sum += object.enter(Some(not_empty)).pop_front().expect("non-empty");
    }
    producer.join().expect("producer panicked");
    assert_eq!(sum, (0..100).sum::<u64>());
}

#[test]
fn reader_with_guard_waits_for_state() {
    init_test_logging();
    let mut object = GuardedObject::new(HashMap::<&'static str, u32>::new());
    let has_answer = object.guard(|m: &HashMap<&'static str, u32>| m.contains_key("answer"));
    let object = Arc::new(object);
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let object = Arc::clone(&object);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let value = object.enter_read_only(Some(has_answer))["answer"];
            done.store(true, Ordering::SeqCst);
            value
        })
    };
    object.enter(None).insert("question", 0);
    assert!(!wait_until(Duration::from_millis(30), || done.load(Ordering::SeqCst)));
    object.enter(None).insert("answer", 42);
    assert_eq!(reader.join().expect("reader panicked"), 42);
}

/// Randomized deposits and fixed withdrawals: the balance never goes negative
/// and every unit deposited is withdrawn exactly once.
#[test]
fn randomized_account_never_overdraws() {
    const WITHDRAWERS: u64 = 3;
    const WITHDRAWALS: u64 = 40;
    const AMOUNT: i64 = 10;
    init_test_logging();

    let mut rng = fastrand::Rng::with_seed(0x00C0_5C1C);
    let mut remaining = i64::try_from(WITHDRAWERS * WITHDRAWALS).expect("small") * AMOUNT;
    let mut deposits = Vec::new();
    while remaining > 0 {
        let amount = rng.i64(1..=25).min(remaining);
        deposits.push((amount, rng.u64(0..200)));
        remaining -= amount;
    }

    let mut account = GuardedObject::new(0_i64);
    let covered = account.guard(|balance: &i64| *balance >= AMOUNT);
    let account = Arc::new(account);

    let withdrawers: Vec<_> = (0..WITHDRAWERS)
        .map(|_| {
            let account = Arc::clone(&account);
            thread::spawn(move || {
                for _ in 0..WITHDRAWALS {
                    let mut balance = account.enter_strict(covered);
                    assert!(*balance >= AMOUNT, "overdraw from {}", *balance);
                    *balance -= AMOUNT;
                }
            })
        })
        .collect();

    for (amount, jitter_us) in deposits {
        *account.enter(None) += amount;
        thread::sleep(Duration::from_micros(jitter_us));
    }
    for withdrawer in withdrawers {
        withdrawer.join().expect("withdrawer panicked");
    }
    let account = Arc::try_unwrap(account).expect("sole owner");
    assert_eq!(account.into_inner(), 0);
}

//! Chunked parallel-for over indexable sequences.
//!
//! The index range `[0, len)` is split into contiguous chunks of
//! `ceil(len / workers)` indices. Each chunk runs on its own scoped thread in
//! ascending index order, and the caller blocks until every chunk is done.
//! The number of threads spawned is derived from the chunks actually
//! produced, and joining is handled by the scope, so an empty input spawns
//! nothing and returns immediately.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::ops::Range;
use std::thread;

use crate::config::{Config, DEFAULT_THREAD_NAME_PREFIX};
use crate::tracing_compat::{debug, warn};

/// A container with a length whose positions can be addressed by index.
///
/// Passing anything else to [`for_all`] is rejected at compile time:
///
/// ```compile_fail
/// cosync::combinator::for_all(&42_u32, |_| {});
/// ```
///
/// Ranges are not containers. `for_all` always visits `0..len`, so a range
/// starting anywhere else would silently get the wrong indices:
///
/// ```compile_fail
/// cosync::combinator::for_all(&(3_usize..6), |_| {});
/// ```
pub trait Indexed {
    /// Number of addressable positions.
    fn len(&self) -> usize;

    /// Returns true if there are no positions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Indexed for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }
}

impl<T, const N: usize> Indexed for [T; N] {
    fn len(&self) -> usize {
        N
    }
}

impl<T> Indexed for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl<T> Indexed for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }
}

impl<K, V, S> Indexed for HashMap<K, V, S> {
    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

impl<K, V> Indexed for BTreeMap<K, V> {
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }
}

impl<T, S> Indexed for HashSet<T, S> {
    fn len(&self) -> usize {
        HashSet::len(self)
    }
}

impl<T> Indexed for BTreeSet<T> {
    fn len(&self) -> usize {
        BTreeSet::len(self)
    }
}

impl Indexed for str {
    fn len(&self) -> usize {
        str::len(self)
    }
}

impl<S: Indexed + ?Sized> Indexed for &S {
    fn len(&self) -> usize {
        (**self).len()
    }
}

/// A parallel-for executor with a fixed worker count.
///
/// # Example
///
/// ```
/// use cosync::combinator::Parallel;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let hits: Vec<AtomicUsize> = (0..100).map(|_| AtomicUsize::new(0)).collect();
/// Parallel::new(4).for_all(&hits, |i| {
///     hits[i].fetch_add(1, Ordering::Relaxed);
/// });
/// assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
/// ```
#[derive(Debug, Clone)]
pub struct Parallel {
    workers: usize,
    thread_name_prefix: String,
}

impl Parallel {
    /// Creates an executor that splits work across `workers` threads.
    ///
    /// Zero is clamped to one.
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }

    /// Creates an executor from an explicit configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.worker_threads.max(1),
            thread_name_prefix: config.thread_name_prefix.clone(),
        }
    }

    /// Returns the configured worker count.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of indices each worker handles for a sequence of `len`.
    #[must_use]
    pub fn chunk_size(&self, len: usize) -> usize {
        len.div_ceil(self.workers)
    }

    /// Applies `f` to every index of `data`, blocking until all calls finish.
    ///
    /// `f` runs concurrently with itself; indices within one chunk are
    /// visited in ascending order, with no ordering across chunks.
    pub fn for_all<S, F>(&self, data: &S, f: F)
    where
        S: Indexed + ?Sized,
        F: Fn(usize) + Sync,
    {
        let len = data.len();
        if len == 0 {
            return;
        }
        let chunk = self.chunk_size(len);
        let f = &f;
        self.run_chunks(len, chunk, |range| range.for_each(f));
    }

    /// Applies `f` to every element of `items` with its index.
    ///
    /// Chunked exactly like [`for_all`](Self::for_all); each worker owns a
    /// disjoint sub-slice, so `f` may mutate its element freely.
    pub fn for_each_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        let len = items.len();
        if len == 0 {
            return;
        }
        let chunk = self.chunk_size(len);
        let f = &f;
        debug!(len, chunk, workers = len.div_ceil(chunk), "dispatching mutable chunks");
        thread::scope(|scope| {
            for (n, part) in items.chunks_mut(chunk).enumerate() {
                let offset = n * chunk;
                let body = move || {
                    for (i, item) in part.iter_mut().enumerate() {
                        f(offset + i, item);
                    }
                };
                self.spawn_or_inline(scope, n, body);
            }
        });
    }

    fn run_chunks<W>(&self, len: usize, chunk: usize, work: W)
    where
        W: Fn(Range<usize>) + Sync,
    {
        let work = &work;
        debug!(len, chunk, workers = len.div_ceil(chunk), "dispatching chunks");
        thread::scope(|scope| {
            for (n, start) in (0..len).step_by(chunk).enumerate() {
                let range = start..(start + chunk).min(len);
                self.spawn_or_inline(scope, n, move || work(range));
            }
        });
    }

    fn spawn_or_inline<'scope, 'env, B>(
        &self,
        scope: &'scope thread::Scope<'scope, 'env>,
        n: usize,
        body: B,
    ) where
        B: FnOnce() + Send + 'scope,
    {
        // A failed spawn drops its closure; the slot keeps the body reachable.
        let slot = std::sync::Arc::new(parking_lot::Mutex::new(Some(body)));
        let remote = std::sync::Arc::clone(&slot);
        let spawned = thread::Builder::new()
            .name(format!("{}-{n}", self.thread_name_prefix))
            .spawn_scoped(scope, move || {
                if let Some(body) = remote.lock().take() {
                    body();
                }
            });
        if let Err(err) = spawned {
            warn!(chunk = n, error = %err, "worker spawn failed; running chunk inline");
            if let Some(body) = slot.lock().take() {
                body();
            }
        }
    }
}

impl Default for Parallel {
    /// Sized from the `COSYNC_*` environment, else the host's parallelism.
    fn default() -> Self {
        let config = Config::from_env().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring invalid environment configuration");
            Config::default()
        });
        Self::from_config(&config)
    }
}

/// Applies `f` to every index of `data` using one worker per execution unit.
///
/// The environment and the host CPU count are consulted here and in
/// [`Parallel::default`] only; use [`Parallel::new`] to inject a worker count.
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let xs: Vec<AtomicUsize> = (0..=10).map(AtomicUsize::new).collect();
/// cosync::combinator::for_all(&xs, |i| {
///     xs[i].fetch_add(i, Ordering::Relaxed);
/// });
/// assert_eq!(xs[10].load(Ordering::Relaxed), 20);
/// ```
pub fn for_all<S, F>(data: &S, f: F)
where
    S: Indexed + ?Sized,
    F: Fn(usize) + Sync,
{
    Parallel::default().for_all(data, f);
}

/// Mutable counterpart of [`for_all`], sized to the host.
pub fn for_each_mut<T, F>(items: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    Parallel::default().for_each_mut(items, f);
}

//! Memoizer Module
//!
//! Orchestrates the cache store and the in-flight registry: derives a key
//! from call arguments, serves fresh hits, coalesces concurrent misses
//! onto one shared computation, and launches detached refreshes for
//! entries whose remaining freshness drops below the prefetch window.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::cache::{MemoStats, TtlStore};
use crate::config::MemoConfig;
use crate::error::{ConfigError, MemoResult};
use crate::flight::{FlightHandle, InFlightRegistry};

type OpFn<A, T, E> = dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync;
type KeyFn<A, K> = dyn Fn(&A) -> K + Send + Sync;

// == Shared State ==
/// Store, registry and coalescing counters behind the memoizer's mutex.
///
/// Every lookup-then-insert sequence on these runs under one lock
/// acquisition and the lock is never held across an await; that is what
/// upholds the single-flight invariant per key.
struct MemoState<K, T, E> {
    store: TtlStore<K, T>,
    flights: InFlightRegistry<K, T, E>,
    coalesced: u64,
    refreshes: u64,
}

// == Flight Guard ==
/// Deregisters a flight when its computation task finishes.
///
/// Lives inside the spawned task so the registry entry is removed on
/// success, failure, and panic alike.
struct FlightGuard<K, T, E>
where
    K: Eq + Hash,
{
    state: Arc<Mutex<MemoState<K, T, E>>>,
    key: K,
}

impl<K, T, E> Drop for FlightGuard<K, T, E>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        self.state.lock().flights.end(&self.key);
    }
}

// == Memoizer ==
/// Memoizes an asynchronous operation behind a bounded TTL + LRU cache.
///
/// Each instance owns its store and registry; independent memoized
/// operations get independent instances. The handle is cheap to clone and
/// every clone shares the same cache.
///
/// The key function is trusted to be pure and deterministic and to
/// produce distinct keys for logically distinct argument sets.
pub struct Memoizer<A, K, T, E> {
    op: Arc<OpFn<A, T, E>>,
    key_fn: Arc<KeyFn<A, K>>,
    config: MemoConfig,
    state: Arc<Mutex<MemoState<K, T, E>>>,
}

impl<A, K, T, E> Clone for Memoizer<A, K, T, E> {
    fn clone(&self) -> Self {
        Self {
            op: Arc::clone(&self.op),
            key_fn: Arc::clone(&self.key_fn),
            config: self.config.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A, K, T, E> Memoizer<A, K, T, E>
where
    A: Send + 'static,
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a memoizer around `op`, using `key_fn` to derive the cache
    /// key from the call arguments.
    ///
    /// # Arguments
    /// * `config` - Freshness window, capacity and prefetch lookahead
    /// * `key_fn` - Pure function mapping call arguments to a cache key
    /// * `op` - The expensive asynchronous operation to memoize
    pub fn new<F, Fut, G>(config: MemoConfig, key_fn: G, op: F) -> Result<Self, ConfigError>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        G: Fn(&A) -> K + Send + Sync + 'static,
    {
        config.validate()?;

        let state = MemoState {
            store: TtlStore::new(config.max_items, config.ttl),
            flights: InFlightRegistry::new(),
            coalesced: 0,
            refreshes: 0,
        };

        Ok(Self {
            op: Arc::new(move |args| op(args).boxed()),
            key_fn: Arc::new(key_fn),
            state: Arc::new(Mutex::new(state)),
            config,
        })
    }

    // == Call ==
    /// Invokes the memoized operation.
    ///
    /// A fresh cached value is returned without suspending. On a miss the
    /// caller either attaches to the computation already in flight for
    /// the key or starts one; either way every caller coalesced onto the
    /// attempt observes the same value or the same shared error.
    ///
    /// When a prefetch window is configured and a hit's remaining
    /// freshness falls below it, a background refresh is started and the
    /// cached value is still returned immediately: staleness is traded
    /// for never paying recomputation latency on a warm key. Failures are
    /// never cached, so the next call for the key recomputes.
    pub async fn call(&self, args: A) -> MemoResult<T, E> {
        let key = (self.key_fn)(&args);

        let flight = {
            let mut state = self.state.lock();

            let hit = state
                .store
                .get(&key)
                .map(|entry| (entry.value.clone(), entry.remaining(self.config.ttl)));

            if let Some((value, remaining)) = hit {
                if let Some(prefetch) = self.config.prefetch {
                    if remaining < prefetch && state.flights.lookup(&key).is_none() {
                        debug!(
                            remaining_ms = remaining.as_millis() as u64,
                            "freshness below prefetch window, refreshing in background"
                        );
                        state.refreshes += 1;
                        self.launch(&mut state, key, args, true);
                    }
                }
                trace!("serving cached value");
                return Ok(value);
            }

            match state.flights.lookup(&key) {
                Some(flight) => {
                    trace!("attaching to in-flight computation");
                    state.coalesced += 1;
                    flight
                }
                None => self.launch(&mut state, key, args, false),
            }
        };

        flight.await
    }

    // == Launch ==
    /// Starts the computation for `key` as a detached task and registers
    /// its shared handle.
    ///
    /// The task runs to completion on its own: a caller dropping its
    /// future never cancels the shared computation, and a prefetch needs
    /// no awaiter at all. On success the store is updated before the
    /// flight is deregistered; on failure the store is left untouched.
    fn launch(
        &self,
        state: &mut MemoState<K, T, E>,
        key: K,
        args: A,
        detached: bool,
    ) -> FlightHandle<T, E> {
        debug!(detached, "launching computation");

        let computation = (self.op)(args);
        let guard = FlightGuard {
            state: Arc::clone(&self.state),
            key: key.clone(),
        };

        let task = tokio::spawn(async move {
            // The guard deregisters the flight even if the computation
            // panics mid-await.
            match computation.await {
                Ok(value) => {
                    guard.state.lock().store.put(guard.key.clone(), value.clone());
                    Ok(value)
                }
                Err(error) => {
                    warn!(detached, "memoized computation failed; result not cached");
                    Err(Arc::new(error))
                }
            }
        });

        let handle: FlightHandle<T, E> = async move {
            match task.await {
                Ok(result) => result,
                Err(join_error) if join_error.is_panic() => {
                    std::panic::resume_unwind(join_error.into_panic())
                }
                Err(_) => panic!("memoized computation task was cancelled"),
            }
        }
        .boxed()
        .shared();

        state.flights.begin(key, handle.clone());
        handle
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.state.lock().store.purge_expired()
    }

    // == Stats ==
    /// Returns a snapshot of cache and coalescing statistics.
    pub fn stats(&self) -> MemoStats {
        let state = self.state.lock();
        MemoStats {
            cache: state.store.stats(),
            coalesced: state.coalesced,
            refreshes: state.refreshes,
            in_flight: state.flights.len(),
        }
    }

    // == Length ==
    /// Returns the number of physically stored entries, expired included.
    pub fn len(&self) -> usize {
        self.state.lock().store.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.state.lock().store.is_empty()
    }

    // == In Flight ==
    /// Returns the number of computations currently running.
    pub fn in_flight(&self) -> usize {
        self.state.lock().flights.len()
    }

    // == Config ==
    /// Returns the configuration this instance was built with.
    pub fn config(&self) -> &MemoConfig {
        &self.config
    }
}

impl<A, T, E> Memoizer<A, (), T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    // == Singleton Constructor ==
    /// Creates a memoizer without key derivation: all calls share one
    /// fixed key, as if the operation took no arguments for caching
    /// purposes.
    pub fn singleton<F, Fut>(config: MemoConfig, op: F) -> Result<Self, ConfigError>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::new(config, |_: &A| (), op)
    }
}

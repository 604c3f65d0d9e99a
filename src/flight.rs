//! In-Flight Registry Module
//!
//! Tracks the single shared computation currently running for each key, so
//! concurrent callers coalesce onto one underlying invocation and the
//! prefetch trigger never duplicates a refresh that is already running.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};

// == Flight Types ==
/// Outcome of a shared computation, cloned to every attached caller.
pub type FlightResult<T, E> = Result<T, Arc<E>>;

/// Cloneable handle to the in-progress computation for a key.
///
/// Any number of callers can await a clone; all of them observe the same
/// value or the same shared error.
pub type FlightHandle<T, E> = Shared<BoxFuture<'static, FlightResult<T, E>>>;

// == In-Flight Registry ==
/// Mapping from key to the handle of its currently running computation.
///
/// At most one live computation per key is tracked at any time. The
/// registry itself does not enforce that: the memoizer only calls `begin`
/// after `lookup` came back empty, inside one critical section.
pub struct InFlightRegistry<K, T, E> {
    flights: HashMap<K, FlightHandle<T, E>>,
}

impl<K, T, E> Default for InFlightRegistry<K, T, E>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T, E> InFlightRegistry<K, T, E>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            flights: HashMap::new(),
        }
    }

    // == Begin ==
    /// Registers a new in-flight computation for `key`.
    ///
    /// The caller must have checked `lookup` first; a key is never
    /// registered twice while a computation is live.
    pub fn begin(&mut self, key: K, handle: FlightHandle<T, E>) {
        let previous = self.flights.insert(key, handle);
        debug_assert!(previous.is_none(), "duplicate in-flight registration");
    }

    // == Lookup ==
    /// Returns a handle to the running computation for `key`, if any.
    pub fn lookup(&self, key: &K) -> Option<FlightHandle<T, E>> {
        self.flights.get(key).cloned()
    }

    // == End ==
    /// Unconditionally removes the registration for `key`.
    ///
    /// Invoked exactly once per `begin`, when the computation finishes,
    /// whether it succeeded or failed.
    pub fn end(&mut self, key: &K) {
        self.flights.remove(key);
    }

    // == Length ==
    /// Returns the number of computations currently in flight.
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}

impl<K, T, E> fmt::Debug for InFlightRegistry<K, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlightRegistry")
            .field("in_flight", &self.flights.len())
            .finish()
    }
}

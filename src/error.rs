//! Error types for the memoization engine
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Config Error Enum ==
/// Rejected configuration values, reported when constructing a
/// [`Memoizer`](crate::memoizer::Memoizer).
///
/// The call path itself never produces engine errors: a failed computation
/// is delivered to callers as the underlying operation's own error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The freshness window must be a positive duration
    #[error("ttl must be greater than zero")]
    ZeroTtl,

    /// The store must hold at least one entry
    #[error("max_items must be at least 1")]
    ZeroCapacity,
}

// == Result Type Alias ==
/// Result of a memoized call.
///
/// The error side shares the underlying operation's failure between all
/// callers coalesced onto the attempt that produced it.
pub type MemoResult<T, E> = Result<T, Arc<E>>;

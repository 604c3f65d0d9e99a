//! Memoflight - async memoization with single-flight coalescing
//!
//! Wraps an expensive asynchronous operation (typically a network call) in
//! a bounded TTL + LRU cache. Repeated calls within the freshness window
//! return the cached value, concurrent callers for the same key share one
//! underlying invocation, and an optional prefetch window refreshes
//! entries in the background just before they expire so warm callers
//! never pay recomputation latency.
//!
//! Failures are propagated to every coalesced caller and never cached.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use memoflight::{MemoConfig, Memoizer};
//!
//! async fn fetch_profile(user: &str) -> Result<String, std::io::Error> {
//!     Ok(format!("profile:{user}"))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = MemoConfig {
//!         ttl: Duration::from_secs(30),
//!         max_items: 500,
//!         prefetch: Some(Duration::from_secs(5)),
//!     };
//!
//!     let lookup = Memoizer::new(
//!         config,
//!         |user: &String| user.clone(),
//!         |user: String| async move { fetch_profile(&user).await },
//!     )
//!     .unwrap();
//!
//!     let profile = lookup.call("alice".to_string()).await;
//!     println!("{profile:?}");
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod flight;
pub mod memoizer;
pub mod tasks;

pub use cache::{CacheStats, MemoStats};
pub use config::MemoConfig;
pub use error::{ConfigError, MemoResult};
pub use memoizer::Memoizer;
pub use tasks::spawn_cleanup_task;

//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! The memoizer removes expired entries lazily when they are read; this
//! sweep additionally frees capacity held by entries that are never
//! touched again.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::memoizer::Memoizer;

/// Spawns a background task that periodically purges expired entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. The memoizer handle is cheap to clone, so callers keep
/// using their own handle while the task holds this one.
///
/// # Arguments
/// * `memo` - Memoizer whose store should be swept
/// * `interval` - Time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task<A, K, T, E>(
    memo: Memoizer<A, K, T, E>,
    interval: Duration,
) -> JoinHandle<()>
where
    A: Send + 'static,
    K: Eq + Hash + Clone + Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    tokio::spawn(async move {
        debug!(interval_secs = interval.as_secs(), "starting ttl cleanup task");

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            let removed = memo.purge_expired();

            if removed > 0 {
                debug!(removed, "ttl cleanup: removed expired entries");
            } else {
                trace!("ttl cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fixed_op(calls: &Arc<AtomicUsize>) -> impl Fn(()) -> futures::future::Ready<Result<u32, std::io::Error>> {
        let calls = Arc::clone(calls);
        move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(7))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_removes_expired_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = MemoConfig {
            ttl: Duration::from_secs(1),
            ..MemoConfig::default()
        };
        let memo = Memoizer::singleton(config, fixed_op(&calls)).unwrap();

        memo.call(()).await.unwrap();
        assert_eq!(memo.len(), 1);

        let handle = spawn_cleanup_task(memo.clone(), Duration::from_secs(1));

        // Wait for the entry to expire and a sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(memo.len(), 0, "Expired entry should have been swept");
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_preserves_valid_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = MemoConfig {
            ttl: Duration::from_secs(3600),
            ..MemoConfig::default()
        };
        let memo = Memoizer::singleton(config, fixed_op(&calls)).unwrap();

        memo.call(()).await.unwrap();

        let handle = spawn_cleanup_task(memo.clone(), Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(memo.len(), 1, "Valid entry should not be removed");
        // The fresh entry is still served without recomputing
        memo.call(()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_task_can_be_aborted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let memo = Memoizer::singleton(MemoConfig::default(), fixed_op(&calls)).unwrap();

        let handle = spawn_cleanup_task(memo, Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}

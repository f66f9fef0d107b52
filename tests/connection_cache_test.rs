// Lifecycle tests for the connection cache: at most one attempt in flight,
// handle reuse, and failure clearing state for the next caller.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use futures::FutureExt;

use blog_api::db::ConnectionCache;

/// Cache whose connector counts its calls and yields `conn` after a short
/// delay, wide enough for concurrent callers to pile up on a cold cache.
fn counting_cache(conn: u32, attempts: Arc<AtomicUsize>) -> ConnectionCache<u32> {
    ConnectionCache::new(move || {
        let attempts = attempts.clone();
        async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(conn)
        }
        .boxed()
    })
}

#[tokio::test]
async fn test_concurrent_acquires_share_one_attempt() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(counting_cache(7, attempts.clone()));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move { cache.acquire().await }));
    }

    for handle in handles {
        let conn = handle.await.unwrap().expect("acquire should succeed");
        assert_eq!(conn, 7);
    }

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_established_connection_is_reused() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let cache = counting_cache(42, attempts.clone());

    assert_eq!(cache.acquire().await.unwrap(), 42);
    assert_eq!(cache.acquire().await.unwrap(), 42);
    assert_eq!(cache.acquire().await.unwrap(), 42);

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_attempt_clears_state_for_retry() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let cache: ConnectionCache<u32> = ConnectionCache::new({
        let attempts = attempts.clone();
        move || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(anyhow::anyhow!("connection refused"))
                } else {
                    Ok(99)
                }
            }
            .boxed()
        }
    });

    let err = cache.acquire().await.expect_err("first attempt must fail");
    assert!(err.to_string().contains("connection refused"));

    // The failure cleared the cached attempt, so this starts a fresh one.
    assert_eq!(cache.acquire().await.unwrap(), 99);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failure_propagates_to_every_waiter() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let cache: ConnectionCache<u32> = ConnectionCache::new({
        let attempts = attempts.clone();
        move || {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Err(anyhow::anyhow!("connection refused"))
            }
            .boxed()
        }
    });
    let cache = Arc::new(cache);

    let mut handles = Vec::new();
    for _ in 0..5 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move { cache.acquire().await }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        let err = result.expect_err("every waiter sees the shared failure");
        assert!(err.to_string().contains("connection refused"));
    }

    // One shared attempt served all five waiters.
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

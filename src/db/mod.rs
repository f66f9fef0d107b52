//! Process-wide connection cache.
//!
//! The service connects to the database lazily, on the first request that
//! needs it, and every request after that reuses the same handle. The cache
//! also memoizes the *in-flight* attempt: a burst of concurrent requests on a
//! cold process results in exactly one connection attempt, with every caller
//! awaiting the same future. A failed attempt is cleared so the next caller
//! retries instead of being handed the stale error forever.
//!
//! There is no timeout or cancellation on the attempt itself; a hung connect
//! blocks every waiter. Retry policy belongs to the caller.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info};

type Connector<T> = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;
type Attempt<T> = Shared<BoxFuture<'static, Result<T, Arc<anyhow::Error>>>>;

enum CacheState<T: Clone> {
    /// No handle, no attempt in flight.
    Empty,
    /// One attempt in flight; every caller awaits this same future.
    Connecting(Attempt<T>),
    /// Established handle, reused for the rest of the process lifetime.
    Connected(T),
}

/// Connection attempt failure, as seen by every caller that awaited it.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct AcquireError(Arc<anyhow::Error>);

/// Memoizes a single connection handle of type `T` for the whole process.
///
/// `T` is whatever the connector produces, typically a cheaply cloneable
/// handle such as a pool or an `Arc`. The connector runs at most once per
/// attempt, never concurrently with itself.
pub struct ConnectionCache<T: Clone> {
    connect: Connector<T>,
    state: Mutex<CacheState<T>>,
}

impl<T: Clone + Send + Sync + 'static> ConnectionCache<T> {
    pub fn new<F>(connect: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync + 'static,
    {
        Self {
            connect: Box::new(connect),
            state: Mutex::new(CacheState::Empty),
        }
    }

    /// Returns the cached handle, joining or starting a connection attempt
    /// as needed.
    pub async fn acquire(&self) -> Result<T, AcquireError> {
        // The lock is synchronous and released before any await, so the
        // Empty -> Connecting transition is visible to concurrent callers
        // before the first suspension point.
        let attempt = {
            let mut state = self.state.lock();
            match &*state {
                CacheState::Connected(conn) => {
                    debug!("Using cached database connection");
                    return Ok(conn.clone());
                }
                CacheState::Connecting(attempt) => attempt.clone(),
                CacheState::Empty => {
                    info!("Connecting to database...");
                    let attempt = (self.connect)()
                        .map(|res| res.map_err(Arc::new))
                        .boxed()
                        .shared();
                    *state = CacheState::Connecting(attempt.clone());
                    attempt
                }
            }
        };

        match attempt.clone().await {
            Ok(conn) => {
                let mut state = self.state.lock();
                if !matches!(&*state, CacheState::Connected(_)) {
                    info!("Database connected successfully");
                    *state = CacheState::Connected(conn.clone());
                }
                Ok(conn)
            }
            Err(err) => {
                error!("Database connection failed: {err}");
                let mut state = self.state.lock();
                // Clear only our own failed attempt; a fresh one may already
                // have been installed by a later caller.
                if let CacheState::Connecting(current) = &*state {
                    if Shared::ptr_eq(current, &attempt) {
                        *state = CacheState::Empty;
                    }
                }
                Err(AcquireError(err))
            }
        }
    }
}

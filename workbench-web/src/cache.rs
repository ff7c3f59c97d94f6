//! Time-to-live cache for dashboard statistics.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Statistics plus whether they came from the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cached<T> {
    #[serde(flatten)]
    pub stats: T,
    pub cached: bool,
}

struct Entry<T> {
    fetched_at: Instant,
    value: T,
}

/// Holds the last successful fetch for `ttl`, measured on tokio's clock.
///
/// The lock is held while fetching; callers arriving meanwhile wait for that
/// fetch. A failed fetch leaves the previous state untouched.
pub struct StatsCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T> std::fmt::Debug for StatsCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsCache").field("ttl", &self.ttl).finish()
    }
}

impl<T: Clone> StatsCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<Cached<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_fetch_at(Instant::now(), fetch).await
    }

    /// Same as [`get_or_fetch`](Self::get_or_fetch) with an explicit clock.
    pub async fn get_or_fetch_at<F, Fut, E>(&self, now: Instant, fetch: F) -> Result<Cached<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(entry) = slot.as_ref() {
            if now.saturating_duration_since(entry.fetched_at) < self.ttl {
                return Ok(Cached {
                    stats: entry.value.clone(),
                    cached: true,
                });
            }
            debug!("stats cache expired");
        }

        let value = fetch().await?;
        *slot = Some(Entry {
            fetched_at: now,
            value: value.clone(),
        });
        Ok(Cached {
            stats: value,
            cached: false,
        })
    }
}

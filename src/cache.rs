//! Time-gated fetch cache
//!
//! [`FetchCache`] owns the device client and the last-known-good
//! [`DeviceSnapshot`]. A refresh happens at most once per minimum interval;
//! a failed refresh keeps the previous snapshot and timestamp so that scrapes
//! keep serving stale (or zero) values instead of failing.
//!
//! The check-and-refresh sequence runs under one lock. A scrape arriving
//! while a refresh is in flight blocks until it completes and then reads the
//! result, so the router never sees two concurrent fetches.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::client::DeviceClient;
use crate::error::DeviceError;
use crate::snapshot::DeviceSnapshot;

/// Default minimum time between two device fetches
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(4);

/// Outcome of a call to [`FetchCache::ensure_fresh`]
#[derive(Debug, Clone, PartialEq)]
pub enum Refresh {
    /// Last fetch is recent enough; nothing was requested
    Cached,
    /// Snapshot replaced by a new fetch
    Refreshed,
    /// Fetch failed; previous snapshot retained
    Failed(DeviceError),
}

impl Refresh {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, Refresh::Refreshed)
    }
}

struct CacheState<C> {
    client: C,
    last_fetch: Option<Instant>,
    snapshot: Arc<DeviceSnapshot>,
    failures: u64,
}

/// Last-known-good device state behind a minimum-interval gate
pub struct FetchCache<C> {
    min_interval: Duration,
    state: Mutex<CacheState<C>>,
}

impl<C: DeviceClient> FetchCache<C> {
    /// Create a cache with the default 4 second interval
    pub fn new(client: C) -> Self {
        Self::with_min_interval(client, DEFAULT_MIN_INTERVAL)
    }

    /// Create a cache with a custom minimum interval
    pub fn with_min_interval(client: C, min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Mutex::new(CacheState {
                client,
                last_fetch: None,
                snapshot: Arc::new(DeviceSnapshot::default()),
                failures: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<C>> {
        // A panicking client leaves the state untouched, so it stays usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refresh the snapshot if the minimum interval has elapsed.
    pub fn ensure_fresh(&self) -> Refresh {
        self.ensure_fresh_at(Instant::now())
    }

    /// [`ensure_fresh`](Self::ensure_fresh) against an explicit clock reading.
    ///
    /// Device errors are logged and returned in [`Refresh::Failed`]; they
    /// never leave the cache half-updated.
    pub fn ensure_fresh_at(&self, now: Instant) -> Refresh {
        let mut state = self.lock();

        if let Some(last) = state.last_fetch {
            let age = now.saturating_duration_since(last);
            if age < self.min_interval {
                debug!(age_ms = age.as_millis() as u64, "Using cached device data");
                return Refresh::Cached;
            }
        }

        match state.client.fetch_snapshot() {
            Ok(snapshot) => {
                state.snapshot = Arc::new(snapshot);
                state.last_fetch = Some(now);
                if state.failures > 0 {
                    info!(
                        failures = state.failures,
                        "Device reachable again, cache refreshed"
                    );
                    state.failures = 0;
                } else {
                    debug!("Cache refreshed");
                }
                Refresh::Refreshed
            }
            Err(e) => {
                state.failures += 1;
                warn!(
                    error = %e,
                    consecutive_failures = state.failures,
                    "Device fetch failed, serving cached data"
                );
                Refresh::Failed(e)
            }
        }
    }

    /// Current snapshot, fresh or stale
    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        Arc::clone(&self.lock().snapshot)
    }

    /// Instant of the last successful fetch
    pub fn last_fetch(&self) -> Option<Instant> {
        self.lock().last_fetch
    }

    /// Failed refreshes since the last success
    pub fn consecutive_failures(&self) -> u64 {
        self.lock().failures
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

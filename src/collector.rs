//! Scrape pipeline
//!
//! [`Collector`] ties the [`FetchCache`] to the assembler: every call to
//! [`Collector::collect`] refreshes the cache if due and assembles the full
//! metric set from whatever snapshot is then current.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::assembler::{assemble, Assembly};
use crate::cache::{FetchCache, Refresh};
use crate::client::DeviceClient;

/// Per-scrape entry point
///
/// Clones share the cache and the scrape counter.
pub struct Collector<C> {
    cache: Arc<FetchCache<C>>,
    scrapes: Arc<AtomicU64>,
}

impl<C> Clone for Collector<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            scrapes: Arc::clone(&self.scrapes),
        }
    }
}

impl<C: DeviceClient> Collector<C> {
    /// Create a collector over a shared cache
    pub fn new(cache: Arc<FetchCache<C>>) -> Self {
        Self {
            cache,
            scrapes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn cache(&self) -> &FetchCache<C> {
        &self.cache
    }

    /// Number of scrapes served so far
    pub fn scrapes(&self) -> u64 {
        self.scrapes.load(Ordering::Relaxed)
    }

    /// Run one scrape. Never fails: device and field errors are logged and
    /// the affected values are served stale or skipped.
    pub fn collect(&self) -> Assembly {
        let scrape = self.scrapes.fetch_add(1, Ordering::Relaxed) + 1;
        info!(scrape, "Metrics scrape");

        if let Refresh::Failed(e) = self.cache.ensure_fresh() {
            debug!(error = %e, "Scrape continues with cached snapshot");
        }

        let snapshot = self.cache.snapshot();
        let assembly = assemble(&snapshot);

        for field in &assembly.errors {
            warn!(
                metric = field.metric,
                key = field.key.as_deref().unwrap_or(""),
                error = %field.error,
                "Skipping field"
            );
        }

        assembly
    }
}

use std::{collections::HashMap, time::Duration};

use tokio::{sync::RwLock, time::Instant};
use tracing::{debug, instrument};

use crate::{
    domain::property::SheetRows,
    ports::property_source::{FetchError, PropertySource, SheetLocation},
};

type CacheKey = (SheetLocation, Option<u32>);

struct CacheEntry {
    rows: SheetRows,
    fetched_at: Instant,
}

/// Remembers successful fetches for `ttl` so that re-filtering the dashboard
/// does not hit the API. Failures are never cached.
pub struct CachingPropertySource<S> {
    inner: S,
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl<S: PropertySource> CachingPropertySource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        CachingPropertySource {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn cached(&self, key: &CacheKey) -> Option<SheetRows> {
        let guard = self.entries.read().await;
        guard
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.rows.clone())
    }
}

#[async_trait::async_trait]
impl<S: PropertySource> PropertySource for CachingPropertySource<S> {
    #[instrument(skip(self))]
    async fn fetch(
        &self,
        location: &SheetLocation,
        row_cap: Option<u32>,
    ) -> error_stack::Result<SheetRows, FetchError> {
        let key = (location.clone(), row_cap);
        if let Some(rows) = self.cached(&key).await {
            debug!("Serving {} from cache", location);
            return Ok(rows);
        }

        let rows = self.inner.fetch(location, row_cap).await?;

        {
            // -- MUTEX WRITE --
            let mut guard = self.entries.write().await;
            guard.insert(
                key,
                CacheEntry {
                    rows: rows.clone(),
                    fetched_at: Instant::now(),
                },
            );
            // -- END MUTEX WRITE --
        }

        Ok(rows)
    }

    async fn invalidate(&self, location: &SheetLocation) {
        self.entries
            .write()
            .await
            .retain(|(cached, _), _| cached != location);
        self.inner.invalidate(location).await;
    }
}

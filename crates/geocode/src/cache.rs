//! Memoizing country position resolver.
//!
//! `GeoCache` answers from its store when it can and asks the geocoder at most
//! once per code otherwise. Every answer, including "no match", is written
//! through to the store before it is returned; service errors are not. A
//! failed write is reported as [`GeocodeError::Store`].

use crate::countries::country_name;
use crate::store::{CacheEntries, CacheEntry, CacheStore};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use trade_map_core::{Coordinates, GeocodeError, Geocoder, PositionResolver, QueryMode, Result};

/// Counters for one cache session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub failures: u64,
}

pub struct GeoCache<G, S> {
    geocoder: G,
    store: S,
    entries: CacheEntries,
    query_mode: QueryMode,
    stats: CacheStats,
}

impl<G, S> std::fmt::Debug for GeoCache<G, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoCache")
            .field("entries", &self.entries.len())
            .field("query_mode", &self.query_mode)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<G, S> GeoCache<G, S>
where
    G: Geocoder,
    S: CacheStore,
{
    /// Opens a cache over `store`, loading its existing entries.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn open(geocoder: G, store: S) -> Result<Self> {
        let entries = store.load()?;
        Ok(Self {
            geocoder,
            store,
            entries,
            query_mode: QueryMode::default(),
            stats: CacheStats::default(),
        })
    }

    #[must_use]
    pub fn with_query_mode(mut self, query_mode: QueryMode) -> Self {
        self.query_mode = query_mode;
        self
    }

    /// Query string sent to the geocoder for `code`.
    #[must_use]
    pub fn query_for(&self, code: &str) -> String {
        match self.query_mode {
            QueryMode::Code => code.to_string(),
            QueryMode::CountryName => country_name(code).unwrap_or(code).to_string(),
        }
    }

    /// Resolves `code`, consulting the geocoder only on a cache miss.
    ///
    /// # Errors
    /// Returns the geocoder's error unchanged, or `GeocodeError::Store` if the
    /// answer could not be persisted. Nothing is cached in either case.
    pub async fn resolve(&mut self, code: &str) -> std::result::Result<Option<Coordinates>, GeocodeError> {
        if let Some(entry) = self.entries.get(code) {
            self.stats.hits += 1;
            debug!(code, position = ?entry.position, "Geocode cache hit");
            return Ok(entry.position);
        }

        self.stats.misses += 1;
        let query = self.query_for(code);
        let position = match self.geocoder.geocode(&query).await {
            Ok(position) => position,
            Err(e) => {
                self.stats.failures += 1;
                warn!(code, query = %query, error = %e, "Geocoding failed, not cached");
                return Err(e);
            }
        };

        if position.is_none() {
            info!(code, query = %query, "No position found, caching negative result");
        }
        self.entries
            .insert(code.to_string(), CacheEntry::new(position));
        if let Err(e) = self.store.save(&self.entries) {
            // Unpersisted answers are not served, so the next lookup retries.
            self.entries.remove(code);
            self.stats.failures += 1;
            warn!(code, error = %e, "Failed to persist geocode cache");
            return Err(GeocodeError::Store(e.to_string()));
        }

        Ok(position)
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&CacheEntry> {
        self.entries.get(code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    #[must_use]
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }
}

#[async_trait]
impl<G, S> PositionResolver for GeoCache<G, S>
where
    G: Geocoder,
    S: CacheStore,
{
    async fn resolve_position(
        &mut self,
        code: &str,
    ) -> std::result::Result<Option<Coordinates>, GeocodeError> {
        self.resolve(code).await
    }
}

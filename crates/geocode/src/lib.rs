//! Country geocoding for trade maps.
//!
//! This crate provides:
//! - [`NominatimClient`], a rate-limited HTTP geocoder
//! - [`GeoCache`], a memoizing [`trade_map_core::PositionResolver`] backed by a [`CacheStore`]
//! - ISO 3166-1 alpha-3 country names for name-based queries

pub mod cache;
pub mod countries;
pub mod nominatim;
pub mod store;

pub use cache::{CacheStats, GeoCache};
pub use countries::country_name;
pub use nominatim::{NominatimClient, NOMINATIM_URL};
pub use store::{CacheEntries, CacheEntry, CacheStore, JsonFileStore, MemoryStore};

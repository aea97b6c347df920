use crate::error::GeocodeError;
use crate::geo::Coordinates;
use async_trait::async_trait;

/// Answers free-text place queries, e.g. a country name or code.
///
/// `Ok(None)` means the service had no match; `Err` means the service could
/// not be asked.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Resolves a country code to a position, typically through a cache.
#[async_trait]
pub trait PositionResolver: Send {
    async fn resolve_position(&mut self, code: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

//! Nominatim (OpenStreetMap) geocoding client.
//!
//! Issues `GET /search?q=<query>&format=json&limit=1` with a bounded timeout
//! and a request-per-minute rate limit.
//!
//! # Example
//!
//! ```ignore
//! use trade_map_geocode::NominatimClient;
//! use trade_map_core::{Geocoder, GeocoderConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = NominatimClient::new(&GeocoderConfig::default())?;
//!     let position = client.geocode("Canada").await?;
//!     println!("{position:?}");
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use trade_map_core::{Coordinates, GeocodeError, Geocoder, GeocoderConfig};

/// Public Nominatim endpoint.
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// One search hit. Nominatim returns coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
struct RawPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl RawPlace {
    fn coordinates(&self) -> Result<Coordinates, GeocodeError> {
        let lat = self
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::Decode(format!("lat {:?}: {e}", self.lat)))?;
        let lon = self
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::Decode(format!("lon {:?}: {e}", self.lon)))?;
        let coordinates = Coordinates::new(lat, lon);
        if !coordinates.is_valid() {
            return Err(GeocodeError::Decode(format!(
                "coordinates out of range: {lat}, {lon}"
            )));
        }
        Ok(coordinates)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GeocodeError {
    if err.is_timeout() {
        GeocodeError::Timeout(err.to_string())
    } else if err.is_connect() {
        GeocodeError::Network(format!("connection failed: {err}"))
    } else if err.is_decode() {
        GeocodeError::Decode(err.to_string())
    } else {
        GeocodeError::Network(err.to_string())
    }
}

/// Rate-limited Nominatim client.
pub struct NominatimClient {
    http: Client,
    base_url: String,
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl std::fmt::Debug for NominatimClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl NominatimClient {
    /// Creates a client from geocoder configuration.
    ///
    /// # Errors
    /// Returns `GeocodeError::Network` if the HTTP client cannot be built.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::Network(format!("failed to build HTTP client: {e}")))?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(nonzero!(60u32));
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/search", self.base_url);
        tracing::debug!(query, url = %url, "Geocoding");

        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GeocodeError::api(status.as_u16(), text));
        }

        let places: Vec<RawPlace> = response.json().await.map_err(map_reqwest_error)?;
        match places.first() {
            Some(place) => {
                let coordinates = place.coordinates()?;
                tracing::debug!(
                    query,
                    lat = coordinates.lat,
                    lon = coordinates.lon,
                    display_name = place.display_name.as_deref().unwrap_or(""),
                    "Geocoded"
                );
                Ok(Some(coordinates))
            }
            None => {
                tracing::debug!(query, "No geocoding match");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> NominatimClient {
        let config = GeocoderConfig {
            timeout_secs: 1,
            requests_per_minute: 600,
            ..GeocoderConfig::default()
        };
        NominatimClient::new(&config)
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_geocode_match() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Canada"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "1"))
            .and(header("user-agent", "mymap"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "61.0666922", "lon": "-107.991707", "display_name": "Canada"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let position = client(&server).geocode("Canada").await.unwrap();
        assert_eq!(position, Some(Coordinates::new(61.0666922, -107.991707)));
    }

    #[tokio::test]
    async fn test_geocode_no_match_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let position = client(&server).geocode("Atlantis").await.unwrap();
        assert_eq!(position, None);
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client(&server).geocode("Canada").await.unwrap_err();
        assert!(matches!(
            err,
            GeocodeError::Api {
                status_code: 503,
                ..
            }
        ));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client(&server).geocode("Canada").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unparseable_coordinates_are_decode_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "north", "lon": "0"}
            ])))
            .mount(&server)
            .await;

        let err = client(&server).geocode("Canada").await.unwrap_err();
        assert!(matches!(err, GeocodeError::Decode(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = NominatimClient::new(&GeocoderConfig::default())
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}

//! Error types for the trade map pipeline.
//!
//! Parameter and data-shape problems abort the operation that hit them.
//! Geocoding failures are isolated per country by the node aggregator and
//! only surface here when a caller resolves a single code directly.

use thiserror::Error;

/// Errors raised while contacting the geocoding service.
///
/// None of these are ever written to the geocode cache; a later run retries.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Connection or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded its time budget.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The service answered with a non-success status.
    #[error("geocoder API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("undecodable geocoder response: {0}")]
    Decode(String),

    /// A resolved position could not be written to the cache store.
    #[error("geocode cache store error: {0}")]
    Store(String),
}

impl GeocodeError {
    /// Creates an API error from status code and message.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Returns true if retrying the same request later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Api { status_code, .. } => *status_code == 429 || *status_code >= 500,
            Self::Decode(_) | Self::Store(_) => false,
        }
    }
}

/// Errors raised by the table transforms, loaders and exporters.
#[derive(Debug, Error)]
pub enum TradeMapError {
    /// Malformed parameters: quantile out of range, unknown column, ragged table.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The same directed pair appears more than once.
    #[error("duplicate trade pair: {reporter} -> {partner}")]
    DuplicateKey {
        /// Reporter code of the repeated pair.
        reporter: String,
        /// Partner code of the repeated pair.
        partner: String,
    },

    /// Geocoding failed for a single lookup.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// IO error reading or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TradeMapError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates an unknown column error.
    pub fn unknown_column(name: &str) -> Self {
        Self::InvalidArgument(format!("unknown column: {name}"))
    }

    /// Creates a duplicate pair error.
    pub fn duplicate_key(reporter: impl Into<String>, partner: impl Into<String>) -> Self {
        Self::DuplicateKey {
            reporter: reporter.into(),
            partner: partner.into(),
        }
    }
}

/// Result type alias for trade map operations.
pub type Result<T> = std::result::Result<T, TradeMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_construction() {
        let err = GeocodeError::api(503, "service unavailable");
        assert!(matches!(
            err,
            GeocodeError::Api {
                status_code: 503,
                ..
            }
        ));
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("service unavailable"));
    }

    #[test]
    fn test_network_and_timeout_are_transient() {
        assert!(GeocodeError::Network("connection refused".to_string()).is_transient());
        assert!(GeocodeError::Timeout("10s elapsed".to_string()).is_transient());
    }

    #[test]
    fn test_server_and_rate_limit_status_are_transient() {
        assert!(GeocodeError::api(500, "boom").is_transient());
        assert!(GeocodeError::api(429, "slow down").is_transient());
    }

    #[test]
    fn test_client_error_and_decode_are_not_transient() {
        assert!(!GeocodeError::Store("read-only file system".to_string()).is_transient());
        assert!(!GeocodeError::api(400, "bad query").is_transient());
        assert!(!GeocodeError::Decode("expected array".to_string()).is_transient());
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = TradeMapError::duplicate_key("USA", "CAN");
        let display = err.to_string();
        assert!(display.contains("USA"));
        assert!(display.contains("CAN"));
    }

    #[test]
    fn test_unknown_column_display() {
        let err = TradeMapError::unknown_column("fobvalue");
        assert!(matches!(err, TradeMapError::InvalidArgument(_)));
        assert!(err.to_string().contains("fobvalue"));
    }

    #[test]
    fn test_geocode_error_is_transparent() {
        let err: TradeMapError = GeocodeError::Timeout("geocode USA".to_string()).into();
        assert_eq!(err.to_string(), "request timeout: geocode USA");
    }
}

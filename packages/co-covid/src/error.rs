//! Error types for the connector.
//!
//! A single `ConnectorError` is surfaced to the host for both steps.
//! Registration never returns validation errors (it re-prompts instead), so
//! most variants originate in the fetch step.

use thiserror::Error;

/// Main error type for the connector library.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// FIPS code without the Colorado state prefix.
    #[error("Invalid FIPS code: '{0}'. All FIPS codes must begin with 08 (prefix for the state of Colorado)")]
    InvalidFips(String),

    /// Configuration carries no FIPS codes to query.
    #[error("No FIPS codes configured; run `co-covid register` first")]
    NoJurisdictions,

    /// Date text that none of the accepted formats could parse.
    #[error("Invalid date: '{0}'")]
    InvalidDate(String),

    /// HTTP request failed (transport error or non-2xx status).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The feature service answered with its JSON error envelope.
    #[error("Feature service error {code}: {message}")]
    Service { code: i64, message: String },

    /// Response body was not the expected JSON shape.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A `Value` attribute that is not a non-negative whole number.
    #[error("Invalid {metric} value for FIPS {fips}: {value}")]
    InvalidValue {
        fips: String,
        metric: String,
        value: String,
    },

    /// A Deaths record with no following record to take cases from.
    #[error("Deaths record at index {index} has no following Cases record")]
    UnpairedRecord { index: usize },

    /// Interactive prompt could not be read.
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid connector settings.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for connector operations.
pub type Result<T> = std::result::Result<T, ConnectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConnectorError::InvalidFips("09003".to_string());
        assert!(err.to_string().contains("09003"));
        assert!(err.to_string().contains("begin with 08"));
    }

    #[test]
    fn test_unpaired_record_display() {
        let err = ConnectorError::UnpairedRecord { index: 4 };
        assert_eq!(
            err.to_string(),
            "Deaths record at index 4 has no following Cases record"
        );
    }

    #[test]
    fn test_service_error_display() {
        let err = ConnectorError::Service {
            code: 400,
            message: "Invalid query parameters".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Feature service error 400: Invalid query parameters"
        );
    }
}

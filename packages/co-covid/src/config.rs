//! Configuration constants, validation functions and runtime settings.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{ConnectorError, Result};
use crate::reshape::PairingStrategy;

/// Query endpoint of the Colorado cumulative county statistics feature layer.
pub const BASE_URL: &str = "https://services3.arcgis.com/66aUo8zsujfVXRIT/arcgis/rest/services/colorado_covid19_county_statistics_cumulative/FeatureServer/0/query";

/// FIPS state prefix for Colorado.
pub const STATE_PREFIX: &str = "08";

/// Attribute fields requested from the feature service.
pub const OUT_FIELDS: &str = "COUNTY,FIPS,Metric,Value,Date";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding [`BASE_URL`].
pub const BASE_URL_ENV: &str = "CO_COVID_BASE_URL";

/// Environment variable overriding [`HTTP_TIMEOUT_SECS`].
pub const TIMEOUT_ENV: &str = "CO_COVID_TIMEOUT_SECS";

/// Date literal format understood by the feature service's `CAST(... AS DATE)`.
pub const QUERY_DATE_FORMAT: &str = "%m/%d/%Y";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%Y%m%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Validate that a FIPS code carries the Colorado state prefix.
///
/// # Examples
/// ```
/// use co_covid::config::validate_fips;
///
/// assert!(validate_fips("08031").is_ok());
/// assert!(validate_fips("09003").is_err());
/// ```
pub fn validate_fips(fips: &str) -> Result<()> {
    if fips.starts_with(STATE_PREFIX) {
        Ok(())
    } else {
        Err(ConnectorError::InvalidFips(fips.to_string()))
    }
}

/// The feature service's county identifier: the FIPS code without the state prefix.
///
/// # Examples
/// ```
/// use co_covid::config::county_id;
///
/// assert_eq!(county_id("08031"), "031");
/// ```
pub fn county_id(fips: &str) -> &str {
    fips.strip_prefix(STATE_PREFIX).unwrap_or(fips)
}

/// Rebuild a full FIPS code from the feature service's county identifier.
pub fn qualified_fips(county_id: &str) -> String {
    format!("{STATE_PREFIX}{county_id}")
}

/// Parse free-form date text into a timestamp.
///
/// Accepts RFC 3339 (keeping the wall-clock time of the given offset), ISO
/// date-times, US style `MM/DD/YYYY` with or without a time of day, and long
/// month names. Date-only input resolves to midnight.
///
/// # Examples
/// ```
/// use co_covid::config::parse_datetime;
///
/// let a = parse_datetime("2021-03-01").unwrap();
/// let b = parse_datetime("03/01/2021").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_datetime("yesterday").is_err());
/// ```
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date.and_time(chrono::NaiveTime::MIN));
        }
    }

    Err(ConnectorError::InvalidDate(text.to_string()))
}

/// Format a timestamp as the date literal used in service filters.
pub fn format_query_date(timestamp: &NaiveDateTime) -> String {
    timestamp.format(QUERY_DATE_FORMAT).to_string()
}

/// Runtime settings for a [`crate::fetch::Connector`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub pairing: PairingStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(BASE_URL)
    }
}

impl Settings {
    /// Read settings from the environment, falling back to the built-in defaults.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| BASE_URL.into());

        let timeout_secs = match std::env::var(TIMEOUT_ENV) {
            Ok(value) => value.parse().map_err(|_| {
                ConnectorError::Config(format!("{TIMEOUT_ENV} must be a whole number, got '{value}'"))
            })?,
            Err(_) => HTTP_TIMEOUT_SECS,
        };

        Ok(Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            pairing: PairingStrategy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pairing(mut self, pairing: PairingStrategy) -> Self {
        self.pairing = pairing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_validate_fips_valid() {
        assert!(validate_fips("08001").is_ok());
        assert!(validate_fips("08").is_ok());
    }

    #[test]
    fn test_validate_fips_invalid() {
        assert!(validate_fips("").is_err());
        assert!(validate_fips("09003").is_err());
        assert!(validate_fips("80001").is_err());
        assert!(validate_fips(" 08001").is_err());
    }

    #[test]
    fn test_county_id_roundtrip() {
        assert_eq!(county_id("08001"), "001");
        assert_eq!(qualified_fips("001"), "08001");
    }

    #[test]
    fn test_parse_datetime_date_only() {
        assert_eq!(parse_datetime("2021-03-01").unwrap(), midnight(2021, 3, 1));
        assert_eq!(parse_datetime("03/01/2021").unwrap(), midnight(2021, 3, 1));
        assert_eq!(parse_datetime("March 1, 2021").unwrap(), midnight(2021, 3, 1));
        assert_eq!(parse_datetime(" 2021/03/01 ").unwrap(), midnight(2021, 3, 1));
    }

    #[test]
    fn test_parse_datetime_with_time() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 1)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2021-03-01T14:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2021-03-01 14:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("03/01/2021 2:30:00 PM").unwrap(), expected);
        assert_eq!(parse_datetime("2021-03-01T14:30:00+02:00").unwrap(), expected);
    }

    #[test]
    fn test_parse_datetime_invalid() {
        assert!(parse_datetime("").is_err());
        assert!(parse_datetime("not a date").is_err());
        assert!(parse_datetime("2021-13-01").is_err());
    }

    #[test]
    fn test_parse_datetime_offset_keeps_local_date() {
        let ts = parse_datetime("2021-03-01T20:00:00-07:00").unwrap();
        assert_eq!(
            ts,
            NaiveDate::from_ymd_opt(2021, 3, 1)
                .unwrap()
                .and_hms_opt(20, 0, 0)
                .unwrap()
        );
        assert_eq!(format_query_date(&ts), "03/01/2021");
    }

    #[test]
    fn test_format_query_date_drops_time() {
        let ts = parse_datetime("2021-03-01T23:59:59").unwrap();
        assert_eq!(format_query_date(&ts), "03/01/2021");
    }

    #[test]
    fn test_settings_builders() {
        let settings = Settings::new("http://localhost:1234/query")
            .with_timeout(Duration::from_secs(5))
            .with_pairing(PairingStrategy::Adjacent);
        assert_eq!(settings.base_url, "http://localhost:1234/query");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.pairing, PairingStrategy::Adjacent);
        assert_eq!(Settings::default().base_url, BASE_URL);
    }
}

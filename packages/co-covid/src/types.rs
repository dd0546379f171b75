//! Core data types for the connector.
//!
//! Covers the pipe configuration produced by registration, the raw feature
//! records returned by the ArcGIS service, and the column-oriented record set
//! handed back to the host.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::parse_datetime;
use crate::error::{ConnectorError, Result};

/// Column-name mapping declared to the host pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Columns {
    /// Temporal column.
    #[serde(alias = "temporal")]
    pub datetime: String,

    /// Identity column.
    #[serde(alias = "identity")]
    pub id: String,

    /// Value column.
    pub value: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            datetime: "date".to_string(),
            id: "fips".to_string(),
            value: "cases".to_string(),
        }
    }
}

/// Connector-specific parameters stored with the pipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceParameters {
    /// Selected FIPS codes, each starting with the state prefix.
    pub fips: Vec<String>,
}

/// Configuration returned by registration and read back by fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeConfig {
    #[serde(default)]
    pub columns: Columns,

    #[serde(alias = "CO-covid")]
    pub source_parameters: SourceParameters,
}

impl PipeConfig {
    /// Build a configuration with the default column mapping.
    #[must_use]
    pub fn new(fips: Vec<String>) -> Self {
        Self {
            columns: Columns::default(),
            source_parameters: SourceParameters { fips },
        }
    }

    /// Configured FIPS codes.
    #[must_use]
    pub fn fips(&self) -> &[String] {
        &self.source_parameters.fips
    }
}

/// Metric label attached to each feature record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Metric {
    Cases,
    Deaths,
    /// Any label other than `Cases` or `Deaths`.
    Other(String),
}

impl From<String> for Metric {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Cases" => Self::Cases,
            "Deaths" => Self::Deaths,
            _ => Self::Other(label),
        }
    }
}

impl Metric {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cases => "Cases",
            Self::Deaths => "Deaths",
            Self::Other(label) => label,
        }
    }
}

/// County identifier as sent by the service, either text (`"001"`) or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CountyIdText {
    Text(String),
    Number(u64),
}

fn deserialize_county_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match CountyIdText::deserialize(deserializer)? {
        CountyIdText::Text(text) => text,
        CountyIdText::Number(n) => format!("{n:03}"),
    })
}

/// Attributes of a single feature: one (county, date, metric, value) tuple.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureAttributes {
    #[serde(rename = "COUNTY")]
    pub county: String,

    /// County identifier without the state prefix.
    #[serde(rename = "FIPS", deserialize_with = "deserialize_county_id")]
    pub county_id: String,

    #[serde(rename = "Metric")]
    pub metric: Metric,

    #[serde(rename = "Value")]
    pub value: serde_json::Value,

    #[serde(rename = "Date")]
    pub date: serde_json::Value,
}

impl FeatureAttributes {
    /// Numeric value as a non-negative count.
    ///
    /// Whole floats (`20.0`) and numeric strings (`"20"`) are accepted.
    pub fn count(&self) -> Result<u64> {
        let parsed = match &self.value {
            serde_json::Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };

        parsed.ok_or_else(|| ConnectorError::InvalidValue {
            fips: self.county_id.clone(),
            metric: self.metric.as_str().to_string(),
            value: self.value.to_string(),
        })
    }

    /// Record date: date text, or ArcGIS epoch milliseconds.
    pub fn timestamp(&self) -> Result<NaiveDateTime> {
        match &self.date {
            serde_json::Value::String(text) => parse_datetime(text),
            serde_json::Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| ConnectorError::InvalidDate(n.to_string())),
            other => Err(ConnectorError::InvalidDate(other.to_string())),
        }
    }
}

/// One entry of the `features` array.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub attributes: FeatureAttributes,
}

/// Body of a feature-query response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureResponse {
    pub features: Vec<Feature>,
}

/// One reshaped output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountyRow {
    pub date: NaiveDateTime,
    pub county: String,
    pub fips: String,
    pub cases: u64,
    pub deaths: u64,
}

/// Semantic type of an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    DateTime,
    Text,
    Count,
}

impl FieldType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateTime => "datetime",
            Self::Text => "text",
            Self::Count => "uint",
        }
    }
}

/// Declared field types, in column order.
pub const DTYPES: [(&str, FieldType); 5] = [
    ("date", FieldType::DateTime),
    ("county", FieldType::Text),
    ("fips", FieldType::Text),
    ("cases", FieldType::Count),
    ("deaths", FieldType::Count),
];

/// Column-oriented batch of rows, index-aligned across fields.
///
/// Fields are private so every mutation goes through [`ColumnRecordSet::push`],
/// which keeps all columns the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRecordSet {
    date: Vec<NaiveDateTime>,
    county: Vec<String>,
    fips: Vec<String>,
    cases: Vec<u64>,
    deaths: Vec<u64>,
}

impl ColumnRecordSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row to every column.
    pub fn push(&mut self, row: CountyRow) {
        self.date.push(row.date);
        self.county.push(row.county);
        self.fips.push(row.fips);
        self.cases.push(row.cases);
        self.deaths.push(row.deaths);
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.date.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
    }

    /// Declared type of each column, in column order.
    #[must_use]
    pub fn dtypes() -> &'static [(&'static str, FieldType)] {
        &DTYPES
    }

    /// Column types as a JSON object, e.g. `{"date": "datetime", ...}`.
    #[must_use]
    pub fn dtypes_json() -> serde_json::Value {
        Self::dtypes()
            .iter()
            .map(|(name, ty)| ((*name).to_string(), serde_json::Value::from(ty.as_str())))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }

    pub fn date(&self) -> &[NaiveDateTime] {
        &self.date
    }

    pub fn county(&self) -> &[String] {
        &self.county
    }

    pub fn fips(&self) -> &[String] {
        &self.fips
    }

    pub fn cases(&self) -> &[u64] {
        &self.cases
    }

    pub fn deaths(&self) -> &[u64] {
        &self.deaths
    }

    /// Rebuild the row at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<CountyRow> {
        Some(CountyRow {
            date: *self.date.get(index)?,
            county: self.county.get(index)?.clone(),
            fips: self.fips.get(index)?.clone(),
            cases: *self.cases.get(index)?,
            deaths: *self.deaths.get(index)?,
        })
    }

    /// Iterate over the rows.
    pub fn rows(&self) -> impl Iterator<Item = CountyRow> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }
}

impl FromIterator<CountyRow> for ColumnRecordSet {
    fn from_iter<I: IntoIterator<Item = CountyRow>>(iter: I) -> Self {
        let mut set = Self::new();
        for row in iter {
            set.push(row);
        }
        set
    }
}

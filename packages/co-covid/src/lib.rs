//! co-covid - Colorado county COVID-19 statistics connector.
//!
//! This crate registers a set of Colorado counties (by FIPS code) and fetches
//! their cumulative case and death counts from the state's ArcGIS feature
//! service, reshaped into index-aligned columns for a time-series pipeline.
//!
//! # Example
//!
//! ```
//! use co_covid::config;
//! use co_covid::query::{FeatureQuery, SyncWindow};
//!
//! assert!(config::validate_fips("08031").is_ok());
//!
//! let window = SyncWindow {
//!     begin: Some(config::parse_datetime("2021-03-01").unwrap()),
//!     end: None,
//! };
//! let query = FeatureQuery::build(&["08031".to_string()], &window).unwrap();
//! assert!(query.where_clause.contains(">= CAST('03/01/2021' AS DATE)"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, FIPS and date handling, runtime settings
//! - [`types`]: Pipe configuration, feature records, column record set
//! - [`error`]: Error types and Result alias
//! - [`context`]: Host capabilities used by fetch
//! - [`query`]: Where-clause builder and query parameters
//! - [`http`]: HTTP client for the feature service
//! - [`reshape`]: Pairing of Cases and Deaths records
//! - [`fetch`]: The fetch step
//! - [`register`]: The registration step
//! - [`prompt`]: Terminal prompter
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod http;
pub mod prompt;
pub mod query;
pub mod register;
pub mod reshape;
pub mod types;

// Re-export the two entry points
pub use fetch::{fetch, Connector};
pub use register::{register, Prompter};

// Re-export commonly used items
pub use config::{parse_datetime, validate_fips, Settings};
pub use context::{FileContext, SyncContext};
pub use error::{ConnectorError, Result};
pub use reshape::PairingStrategy;
pub use types::{ColumnRecordSet, CountyRow, PipeConfig};

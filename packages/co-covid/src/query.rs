//! Filter construction for the feature-query endpoint.
//!
//! The service takes a SQL-like `where` string. Clauses are composed as values
//! and rendered once, so every literal is quoted the same way.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::{county_id, format_query_date, OUT_FIELDS};
use crate::context::SyncContext;
use crate::error::{ConnectorError, Result};

/// Field holding the county identifier.
pub const FIPS_FIELD: &str = "FIPS";

/// Field holding the metric label.
pub const METRIC_FIELD: &str = "Metric";

/// Field holding the record date.
pub const DATE_FIELD: &str = "Date";

/// Metric labels requested from the service.
pub const METRICS: [&str; 2] = ["Cases", "Deaths"];

/// Direction of a date bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    OnOrAfter,
    OnOrBefore,
}

impl Bound {
    fn operator(self) -> &'static str {
        match self {
            Self::OnOrAfter => ">=",
            Self::OnOrBefore => "<=",
        }
    }
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `field IN ('a', 'b')`
    In {
        field: &'static str,
        values: Vec<String>,
    },
    /// `CAST(field AS DATE) >= CAST('MM/DD/YYYY' AS DATE)`, time of day discarded.
    Date {
        field: &'static str,
        bound: Bound,
        at: NaiveDateTime,
    },
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In { field, values } => {
                let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
                write!(f, "{field} IN ({})", quoted.join(", "))
            }
            Self::Date { field, bound, at } => write!(
                f,
                "CAST({field} AS DATE) {} CAST({} AS DATE)",
                bound.operator(),
                quote(&format_query_date(at))
            ),
        }
    }
}

/// Conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    clauses: Vec<Clause>,
}

impl WhereClause {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_in<I, S>(mut self, field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clauses.push(Clause::In {
            field,
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    #[must_use]
    pub fn date_bound(mut self, field: &'static str, bound: Bound, at: NaiveDateTime) -> Self {
        self.clauses.push(Clause::Date { field, bound, at });
        self
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

/// Single-quoted string literal with embedded quotes doubled.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Time bounds of one fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncWindow {
    pub begin: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl SyncWindow {
    /// Resolve the window, defaulting `begin` to the context's last sync time.
    pub fn resolve(
        ctx: &impl SyncContext,
        begin: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            begin: begin.or_else(|| ctx.sync_time()),
            end,
        }
    }
}

/// Query-string parameters sent to the feature service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureQuery {
    #[serde(rename = "where")]
    pub where_clause: String,

    #[serde(rename = "outFields")]
    pub out_fields: String,

    pub f: String,
}

impl FeatureQuery {
    /// Build the query for the given FIPS codes and window.
    pub fn build(fips: &[String], window: &SyncWindow) -> Result<Self> {
        if fips.is_empty() {
            return Err(ConnectorError::NoJurisdictions);
        }

        let mut filter = WhereClause::new()
            .is_in(FIPS_FIELD, fips.iter().map(|f| county_id(f)))
            .is_in(METRIC_FIELD, METRICS);

        if let Some(begin) = window.begin {
            filter = filter.date_bound(DATE_FIELD, Bound::OnOrAfter, begin);
        }
        if let Some(end) = window.end {
            filter = filter.date_bound(DATE_FIELD, Bound::OnOrBefore, end);
        }

        Ok(Self {
            where_clause: filter.to_string(),
            out_fields: OUT_FIELDS.to_string(),
            f: "json".to_string(),
        })
    }
}

//! Reshaping of feature records into output rows.
//!
//! The service returns one record per (county, date, metric). An output row
//! needs both the Cases and the Deaths record of a (county, date) pair.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::config::qualified_fips;
use crate::error::{ConnectorError, Result};
use crate::types::{ColumnRecordSet, CountyRow, Feature, FeatureAttributes, Metric};

/// How Cases and Deaths records are matched up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PairingStrategy {
    /// Join records on (county, date), independent of response order.
    #[default]
    Keyed,

    /// Take cases from the record directly after each Deaths record.
    Adjacent,
}

/// Lower-case a county name and capitalize its first character.
///
/// Only the first word is capitalized: `LA PLATA` becomes `La plata`.
///
/// # Examples
/// ```
/// use co_covid::reshape::capitalize_county;
///
/// assert_eq!(capitalize_county("DENVER"), "Denver");
/// assert_eq!(capitalize_county("LA PLATA"), "La plata");
/// ```
pub fn capitalize_county(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Reshape features into a column record set.
pub fn reshape(features: &[Feature], strategy: PairingStrategy) -> Result<ColumnRecordSet> {
    let rows = match strategy {
        PairingStrategy::Keyed => pair_by_key(features)?,
        PairingStrategy::Adjacent => pair_adjacent(features)?,
    };
    Ok(rows.into_iter().collect())
}

fn build_row(attrs: &FeatureAttributes, cases: u64, deaths: u64) -> Result<CountyRow> {
    Ok(CountyRow {
        date: attrs.timestamp()?,
        county: capitalize_county(&attrs.county),
        fips: qualified_fips(&attrs.county_id),
        cases,
        deaths,
    })
}

#[derive(Debug, Default)]
struct Partial<'a> {
    deaths_record: Option<&'a FeatureAttributes>,
    cases: Option<u64>,
    deaths: Option<u64>,
}

/// Rows are emitted when a key's second metric arrives.
fn pair_by_key(features: &[Feature]) -> Result<Vec<CountyRow>> {
    let mut rows = Vec::new();
    let mut open: HashMap<(String, NaiveDateTime), Partial<'_>> = HashMap::new();

    for feature in features {
        let attrs = &feature.attributes;
        if matches!(attrs.metric, Metric::Other(_)) {
            continue;
        }

        let key = (attrs.county_id.clone(), attrs.timestamp()?);
        let count = attrs.count()?;
        let partial = open.entry(key.clone()).or_default();

        if attrs.metric == Metric::Deaths {
            partial.deaths = Some(count);
            partial.deaths_record = Some(attrs);
        } else {
            partial.cases = Some(count);
        }

        if let (Some(cases), Some(deaths), Some(record)) =
            (partial.cases, partial.deaths, partial.deaths_record)
        {
            rows.push(build_row(record, cases, deaths)?);
            open.remove(&key);
        }
    }

    if !open.is_empty() {
        tracing::warn!(
            unpaired = open.len(),
            "Dropping records without a matching Cases/Deaths partner"
        );
    }

    Ok(rows)
}

/// Legacy pairing: assumes every Deaths record is directly followed by its Cases record.
fn pair_adjacent(features: &[Feature]) -> Result<Vec<CountyRow>> {
    let mut rows = Vec::new();

    for (index, feature) in features.iter().enumerate() {
        let attrs = &feature.attributes;
        if attrs.metric != Metric::Deaths {
            continue;
        }

        let partner = features
            .get(index + 1)
            .ok_or(ConnectorError::UnpairedRecord { index })?;

        rows.push(build_row(attrs, partner.attributes.count()?, attrs.count()?)?);
    }

    Ok(rows)
}

//! The fetch step: query the feature service and reshape the response.

use chrono::NaiveDateTime;
use reqwest::blocking::Client;

use crate::config::Settings;
use crate::context::SyncContext;
use crate::error::Result;
use crate::http::{create_client, get_json};
use crate::query::{FeatureQuery, SyncWindow};
use crate::reshape::reshape;
use crate::types::{ColumnRecordSet, FeatureResponse};

/// Connector bound to one feature-service endpoint.
#[derive(Debug, Clone)]
pub struct Connector {
    client: Client,
    settings: Settings,
}

impl Connector {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = create_client(settings.timeout)?;
        Ok(Self { client, settings })
    }

    /// Fetch rows for the context's configured FIPS codes.
    ///
    /// # Arguments
    /// * `ctx` - Host context supplying the configuration and sync cursor
    /// * `begin` - Lower date bound; defaults to `ctx.sync_time()`
    /// * `end` - Upper date bound; unbounded when `None`
    pub fn fetch(
        &self,
        ctx: &impl SyncContext,
        begin: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<ColumnRecordSet> {
        let window = SyncWindow::resolve(ctx, begin, end);
        let query = FeatureQuery::build(ctx.parameters().fips(), &window)?;

        tracing::debug!(
            url = %self.settings.base_url,
            filter = %query.where_clause,
            "Querying feature service"
        );
        if ctx.debug() {
            ctx.diagnostic("Request parameters", &serde_json::to_value(&query)?);
        }

        let body = get_json(&self.client, &self.settings.base_url, &query)?;
        if ctx.debug() {
            ctx.diagnostic("Response", &body);
        }

        let response: FeatureResponse = serde_json::from_value(body)?;
        let records = reshape(&response.features, self.settings.pairing)?;

        tracing::debug!(
            features = response.features.len(),
            rows = records.len(),
            "Reshaped feature records"
        );
        if ctx.debug() {
            ctx.diagnostic("Records", &serde_json::to_value(&records)?);
            ctx.diagnostic("Column types", &ColumnRecordSet::dtypes_json());
        }

        Ok(records)
    }
}

/// Fetch with settings taken from the environment.
///
/// See [`Settings::from_env`] and [`Connector::fetch`].
pub fn fetch(
    ctx: &impl SyncContext,
    begin: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<ColumnRecordSet> {
    Connector::new(Settings::from_env()?)?.fetch(ctx, begin, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use crate::types::PipeConfig;

    struct EmptyContext(PipeConfig);

    impl SyncContext for EmptyContext {
        fn parameters(&self) -> &PipeConfig {
            &self.0
        }

        fn sync_time(&self) -> Option<NaiveDateTime> {
            None
        }
    }

    #[test]
    fn test_fetch_without_fips_makes_no_request() {
        // Unroutable endpoint: reaching the network would fail with Http instead.
        let connector = Connector::new(Settings::new("http://127.0.0.1:9/query")).unwrap();
        let ctx = EmptyContext(PipeConfig::new(Vec::new()));

        let result = connector.fetch(&ctx, None, None);
        assert!(matches!(result, Err(ConnectorError::NoJurisdictions)));
    }
}

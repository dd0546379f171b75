//! HTTP client wrapper for the ArcGIS feature-query endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::error::{ConnectorError, Result};

/// User agent string identifying this connector.
const USER_AGENT: &str = concat!("co-covid/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
pub fn create_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Issue one GET and decode the body as JSON.
///
/// Transport failures and non-2xx statuses are returned as-is; there is no
/// retry. ArcGIS reports query errors with status 200 and an `error` object,
/// which is mapped to [`ConnectorError::Service`].
pub fn get_json<Q: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    query: &Q,
) -> Result<serde_json::Value> {
    let response = client.get(url).query(query).send()?.error_for_status()?;
    let bytes = response.bytes()?;
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;

    if let Some(error) = body.get("error") {
        return Err(ConnectorError::Service {
            code: error.get("code").and_then(|c| c.as_i64()).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    Ok(body)
}

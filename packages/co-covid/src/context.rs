//! Capabilities the host pipeline exposes to the fetch step.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use console::style;

use crate::error::{ConnectorError, Result};
use crate::types::PipeConfig;

/// Narrow view of the host pipe: stored configuration and sync cursor.
pub trait SyncContext {
    /// Configuration stored at registration.
    fn parameters(&self) -> &PipeConfig;

    /// Timestamp of the newest row already synced, if any.
    fn sync_time(&self) -> Option<NaiveDateTime>;

    /// Whether diagnostic output is requested.
    fn debug(&self) -> bool {
        false
    }

    /// Receive a diagnostic payload. Only called when [`SyncContext::debug`] is true.
    fn diagnostic(&self, _label: &str, _payload: &serde_json::Value) {}
}

/// Context backed by a configuration file and command-line values.
#[derive(Debug, Clone)]
pub struct FileContext {
    config: PipeConfig,
    sync_time: Option<NaiveDateTime>,
    debug: bool,
}

impl FileContext {
    pub fn new(config: PipeConfig) -> Self {
        Self {
            config,
            sync_time: None,
            debug: false,
        }
    }

    /// Load the configuration JSON written by `co-covid register`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            ConnectorError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config: PipeConfig = serde_json::from_str(&text)?;
        Ok(Self::new(config))
    }

    pub fn with_sync_time(mut self, sync_time: Option<NaiveDateTime>) -> Self {
        self.sync_time = sync_time;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl SyncContext for FileContext {
    fn parameters(&self) -> &PipeConfig {
        &self.config
    }

    fn sync_time(&self) -> Option<NaiveDateTime> {
        self.sync_time
    }

    fn debug(&self) -> bool {
        self.debug
    }

    fn diagnostic(&self, label: &str, payload: &serde_json::Value) {
        let rendered =
            serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        eprintln!("{}", style(label).bold().cyan());
        eprintln!("{rendered}");
    }
}

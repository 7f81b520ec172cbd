// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Ingestion settings
//!
//! Everything a session remembers between runs. The embedder loads it,
//! hands it to [`SqlSession::new`](crate::session::SqlSession::new) and gets
//! it back from `into_settings`; this crate never stores it anywhere.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sql_ingest::IngestSettings;
//!
//! let settings: IngestSettings = serde_json::from_str(r#"{
//!     "selectedBackend": "PostgreSQL",
//!     "table": "iris",
//!     "download": true
//! }"#)?;
//! settings.validate()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::source_catalog::CustomQuery;

/// Relations above this many rows prompt before attribute discovery
pub const LARGE_TABLE: u64 = 100_000;
/// Relations above this many rows prompt before download
pub const AUTO_DOWNLOAD_LIMIT: u64 = 10_000;
/// Never download more rows than this
pub const MAX_DOWNLOAD_LIMIT: u64 = 1_000_000;

/// Row thresholds of the ingestion policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeLimits {
    pub large_table: u64,
    pub auto_download: u64,
    pub max_download: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            large_table: LARGE_TABLE,
            auto_download: AUTO_DOWNLOAD_LIMIT,
            max_download: MAX_DOWNLOAD_LIMIT,
        }
    }
}

impl SizeLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_download == 0 {
            return Err(ConfigError::InvalidLimits {
                reason: "maxDownload must be > 0".to_string(),
            });
        }

        if self.auto_download == 0 {
            return Err(ConfigError::InvalidLimits {
                reason: "autoDownload must be > 0".to_string(),
            });
        }

        if self.auto_download > self.max_download {
            return Err(ConfigError::InvalidLimits {
                reason: "autoDownload cannot exceed maxDownload".to_string(),
            });
        }

        Ok(())
    }
}

/// Persisted session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestSettings {
    /// Display name of the backend last used
    pub selected_backend: Option<String>,
    /// Label of the source last opened
    pub table: Option<String>,
    /// Schema to list tables from; the server's search path when unset
    pub schema: Option<String>,
    /// Text of the custom query editor
    pub sql: String,
    /// Inspect values to find categorical columns
    pub guess_values: bool,
    /// Download data to local memory
    pub download: bool,
    /// Resource file to load named queries from
    pub path_to_res_file: String,
    /// Persist the custom query into a table before reading it
    pub materialize: bool,
    pub materialize_table_name: String,
    pub limits: SizeLimits,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            selected_backend: None,
            table: None,
            schema: None,
            sql: String::new(),
            guess_values: true,
            download: false,
            path_to_res_file: String::new(),
            materialize: false,
            materialize_table_name: String::new(),
            limits: SizeLimits::default(),
        }
    }
}

impl IngestSettings {
    /// Validate the settings
    ///
    /// Checks that:
    /// - Size limits are consistent
    /// - A schema, when given, is not blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;

        if let Some(schema) = &self.schema
            && schema.trim().is_empty()
        {
            return Err(ConfigError::InvalidSchema);
        }

        Ok(())
    }

    /// Custom query entry as currently edited
    pub fn custom_query(&self) -> CustomQuery {
        CustomQuery {
            sql: self.sql.clone(),
            materialize: self.materialize,
            materialize_table_name: self.materialize_table_name.clone(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Inconsistent size limits
    #[error("Invalid size limits: {reason}")]
    InvalidLimits { reason: String },

    /// Blank schema name
    #[error("Schema name cannot be blank")]
    InvalidSchema,
}

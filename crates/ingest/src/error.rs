// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for ingestion
//!
//! Every variant renders as one message fit to show a user as-is.
//! Declining a prompt or hitting the download cap is not an error; see
//! [`IngestOutcome`](crate::pipeline::IngestOutcome).

use serde::Serialize;
use thiserror::Error;

use sql_ingest_backend::BackendError;

use crate::settings::ConfigError;

/// Result type alias for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur while discovering or ingesting a source
#[derive(Debug, Error, Clone, Serialize)]
pub enum IngestError {
    /// A resource file could not be read
    #[error("{message}")]
    Io { path: String, message: String },

    /// Required input is missing or malformed
    #[error("{0}")]
    Validation(String),

    /// The backend failed while listing, executing or materializing
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The resolved source could not be opened as a relation
    #[error("Failed to open source: {0}")]
    Connection(String),

    /// No backend implementation is registered
    #[error("No database backends are available.")]
    NoBackends,

    /// A backend name that is not registered
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),
}

impl From<ConfigError> for IngestError {
    fn from(err: ConfigError) -> Self {
        IngestError::Validation(err.to_string())
    }
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for backend operations
//!
//! This module defines the error types used throughout the backend layer.

use serde::Serialize;
use thiserror::Error;

use sql_ingest_ir::TableError;

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur during backend operations
#[derive(Debug, Error, Clone, Serialize)]
pub enum BackendError {
    /// Failed to connect to the database
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Invalid backend configuration
    #[error("Invalid backend configuration: {0}")]
    ConfigurationError(String),

    /// The driver returned something the backend cannot interpret
    #[error("Unexpected query result: {0}")]
    MalformedResult(String),

    /// The specified feature is not supported by this backend
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}

impl From<TableError> for BackendError {
    fn from(err: TableError) -> Self {
        BackendError::MalformedResult(err.to_string())
    }
}

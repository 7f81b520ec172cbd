// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Ingest - Intermediate Representation
//!
//! This crate provides the dialect-agnostic types shared by the backend layer
//! and the ingestion pipeline:
//! - SQL dialects and the features each one supports
//! - Column data types as reported by a database
//! - The domain (schema) model produced by schema inference
//! - Cell values and the columnar in-memory [`DataTable`]

pub mod dialect;
pub mod domain;
pub mod metadata;
pub mod table;
pub mod value;

// Re-export commonly used types
pub use dialect::{Dialect, DialectExtensions};
pub use domain::{ColumnRole, Domain, Variable, VariableKind};
pub use metadata::{ColumnMetadata, DataType};
pub use table::{DataTable, TableError};
pub use value::Value;

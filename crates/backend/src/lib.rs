// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Ingest - Backend Layer
//!
//! This crate provides the database abstraction used by the ingestion engine.
//! It defines the `Backend` trait and the dialect implementations behind it:
//!
//! - **Driver ports**: [`Connection`] and [`Connector`], supplied by the embedder
//! - **Dialect backends**: PostgreSQL and MySQL, generating dialect SQL
//! - **Registry**: enumerating and selecting available backends
//!
//! ## Architecture
//!
//! The backend layer is responsible for:
//! - Listing tables and executing statements
//! - Opening relations over tables and queries
//! - Estimating row counts, sampling and downloading relations
//! - Inferring the domain (schema) of a relation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sql_ingest_backend::{Backend, BackendError, RelationSource};
//!
//! async fn print_tables(backend: &dyn Backend) -> Result<(), BackendError> {
//!     for table in backend.list_tables(None).await? {
//!         let relation = backend.open_relation(RelationSource::Table(table.clone())).await?;
//!         println!("{}: ~{} rows", table, backend.approx_row_count(&relation).await?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod error;
pub mod inference;
pub mod live_mysql;
pub mod live_postgres;
pub mod registry;
pub mod relation;
pub mod r#trait;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use connection::{
    Connection, ConnectionParams, Connector, QueryResult, ResultColumn,
    validate_connection_string,
};
pub use error::{BackendError, BackendResult};
pub use live_mysql::{MySqlBackend, MySqlFactory};
pub use live_postgres::{PostgresBackend, PostgresFactory};
pub use registry::{BackendDescriptor, BackendFactory, BackendRegistry};
pub use relation::{Relation, RelationSource, Sample, strip_terminator};
pub use r#trait::{Backend, BackendCapabilities};

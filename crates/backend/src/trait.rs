// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Backend trait for database capability abstraction
//!
//! This module defines the async `Backend` trait the ingestion engine calls.
//! There is one implementation per SQL dialect; what a backend can do is
//! advertised through [`BackendCapabilities`] rather than discovered by type.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::connection::QueryResult;
use crate::error::BackendResult;
use crate::relation::{Relation, RelationSource, Sample, strip_terminator};
use sql_ingest_ir::{DataTable, Dialect, Domain};

/// Capability flags of an open backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendCapabilities {
    /// Base tables can be sampled by percentage of rows
    pub supports_percentage_sampling: bool,
    /// Base tables can be sampled within a time budget
    pub supports_time_sampling: bool,
    /// Query results can be persisted with CREATE TABLE ... AS
    pub can_materialize: bool,
}

/// Open connection to a database, seen through the operations ingestion needs
///
/// # Examples
///
/// ```rust,ignore
/// use sql_ingest_backend::{Backend, RelationSource};
///
/// async fn peek(backend: &dyn Backend) -> BackendResult<u64> {
///     let relation = backend.open_relation(RelationSource::Table("iris".into())).await?;
///     backend.approx_row_count(&relation).await
/// }
/// ```
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Name shown to users, e.g. "PostgreSQL"
    fn display_name(&self) -> &str;

    /// SQL dialect spoken by this backend
    fn dialect(&self) -> Dialect;

    /// What this backend can do
    fn capabilities(&self) -> BackendCapabilities;

    /// Server extensions the backend would use but could not find
    fn missing_extensions(&self) -> &BTreeSet<String>;

    /// List the tables visible in a schema (or the default search path)
    ///
    /// Names are returned in the order the server reports them.
    async fn list_tables(&self, schema: Option<&str>) -> BackendResult<Vec<String>>;

    /// Execute one SQL statement
    async fn execute_query(&self, sql: &str) -> BackendResult<QueryResult>;

    /// Open a relation over a table or query
    ///
    /// The returned relation carries a domain built from column types only,
    /// without inspecting values.
    ///
    /// # Errors
    ///
    /// Fails when the server rejects the table name or query.
    async fn open_relation(&self, source: RelationSource) -> BackendResult<Relation>;

    /// Estimated number of rows of a relation
    async fn approx_row_count(&self, relation: &Relation) -> BackendResult<u64>;

    /// Infer the domain of a relation
    ///
    /// With `inspect_values`, low-cardinality columns become discrete
    /// variables; this reads distinct values and may be slow on big tables.
    async fn infer_domain(&self, relation: &Relation, inspect_values: bool)
    -> BackendResult<Domain>;

    /// Reduce a relation with a sample
    async fn sample(&self, relation: &Relation, sample: Sample) -> BackendResult<Relation>;

    /// Read at most `max_rows` rows of a relation into memory
    async fn download(&self, relation: &Relation, max_rows: u64) -> BackendResult<DataTable>;

    /// Statements persisting `sql` into `table`: drop, create-as, analyze
    fn materialize_statements(&self, table: &str, sql: &str) -> [String; 3] {
        [
            format!("DROP TABLE IF EXISTS {}", table),
            format!("CREATE TABLE {} AS {}", table, strip_terminator(sql)),
            self.dialect().analyze_statement(table),
        ]
    }
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Source resolver
//!
//! Turns a [`SourceSelection`] into the table or query to open, running the
//! materialization statements for custom queries that ask for them.

use tracing::{info, warn};

use sql_ingest_backend::{Backend, BackendError, RelationSource};

use crate::error::{IngestError, IngestResult};
use crate::resource_file::NamedQueries;
use crate::source_catalog::{CustomQuery, SourceSelection};

pub const MISSING_MATERIALIZE_TABLE_MESSAGE: &str = "Specify a table name to materialize the query";
pub const EMPTY_QUERY_MESSAGE: &str = "Query cannot be empty.";

/// What to open for a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub source: RelationSource,
    /// Table the query was persisted into, if it was materialized
    pub materialized_table: Option<String>,
}

impl Resolved {
    pub fn is_materialized(&self) -> bool {
        self.materialized_table.is_some()
    }
}

pub struct SourceResolver<'a> {
    backend: &'a dyn Backend,
    file_queries: &'a NamedQueries,
}

impl<'a> SourceResolver<'a> {
    pub fn new(backend: &'a dyn Backend, file_queries: &'a NamedQueries) -> Self {
        Self {
            backend,
            file_queries,
        }
    }

    /// Resolve a selection
    ///
    /// Returns `Ok(None)` when nothing is selected.
    ///
    /// # Errors
    ///
    /// Validation errors are raised before the backend is called. A failing
    /// materialization statement stops the sequence; statements that already
    /// ran are not undone.
    pub async fn resolve(&self, selection: &SourceSelection) -> IngestResult<Option<Resolved>> {
        let resolved = match selection {
            SourceSelection::NoneSelected => return Ok(None),
            SourceSelection::LiveTable { table_name } => Resolved {
                source: RelationSource::Table(table_name.clone()),
                materialized_table: None,
            },
            SourceSelection::NamedQuery { name } => {
                let sql = self.file_queries.get(name).ok_or_else(|| {
                    IngestError::Validation(format!("No query named '{}' was loaded", name))
                })?;
                Resolved {
                    source: RelationSource::Query(sql.to_string()),
                    materialized_table: None,
                }
            }
            SourceSelection::CustomQuery(custom) => self.resolve_custom(custom).await?,
        };
        Ok(Some(resolved))
    }

    async fn resolve_custom(&self, custom: &CustomQuery) -> IngestResult<Resolved> {
        if custom.sql.trim().is_empty() {
            return Err(IngestError::Validation(EMPTY_QUERY_MESSAGE.to_string()));
        }

        let materialized_table = if custom.materialize {
            let table = custom.materialize_table_name.trim();
            if table.is_empty() {
                return Err(IngestError::Validation(
                    MISSING_MATERIALIZE_TABLE_MESSAGE.to_string(),
                ));
            }
            if !self.backend.capabilities().can_materialize {
                return Err(BackendError::NotSupported(format!(
                    "{} cannot materialize queries",
                    self.backend.display_name()
                ))
                .into());
            }
            self.materialize(table, &custom.sql).await?;
            Some(table.to_string())
        } else {
            None
        };

        // The original query is read even after materializing it
        Ok(Resolved {
            source: RelationSource::Query(custom.sql.clone()),
            materialized_table,
        })
    }

    async fn materialize(&self, table: &str, sql: &str) -> IngestResult<()> {
        let statements = self.backend.materialize_statements(table, sql);
        for (step, statement) in statements.iter().enumerate() {
            if let Err(e) = self.backend.execute_query(statement).await {
                warn!(
                    table,
                    step,
                    error = %e,
                    "Materialization aborted; earlier statements are not rolled back"
                );
                return Err(e.into());
            }
        }
        info!(table, "Materialized query");
        Ok(())
    }
}

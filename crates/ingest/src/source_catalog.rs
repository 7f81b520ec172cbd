// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Source catalog
//!
//! The ordered list of sources a user can pick from:
//!
//! ```text
//! (none)        <- always first
//! (custom)      <- always second
//! ACTIVE_USERS  <- named queries, file order
//! users         <- live tables, backend order
//! ```
//!
//! Labels are not unique. A named query and a table may share a label, so
//! selection is by position.

use serde::{Deserialize, Serialize};
use tracing::debug;

use sql_ingest_backend::{Backend, BackendResult};

use crate::resource_file::NamedQueries;

/// Label of the "nothing selected" entry
pub const NONE_LABEL: &str = "(none)";
/// Label of the custom query entry
pub const CUSTOM_LABEL: &str = "(custom)";

/// Position of the custom query entry
pub const CUSTOM_INDEX: usize = 1;

/// One selectable source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum CatalogEntry {
    NoneSelected,
    CustomQuery,
    NamedQuery(String),
    LiveTable(String),
}

impl CatalogEntry {
    pub fn label(&self) -> &str {
        match self {
            CatalogEntry::NoneSelected => NONE_LABEL,
            CatalogEntry::CustomQuery => CUSTOM_LABEL,
            CatalogEntry::NamedQuery(name) | CatalogEntry::LiveTable(name) => name,
        }
    }
}

/// User input for the custom query entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomQuery {
    pub sql: String,
    pub materialize: bool,
    pub materialize_table_name: String,
}

impl CustomQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Default::default()
        }
    }

    /// Persist the query result into `table` before reading it
    pub fn materialize_into(mut self, table: impl Into<String>) -> Self {
        self.materialize = true;
        self.materialize_table_name = table.into();
        self
    }
}

/// What a catalog position stands for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SourceSelection {
    #[default]
    NoneSelected,
    CustomQuery(CustomQuery),
    NamedQuery {
        name: String,
    },
    LiveTable {
        table_name: String,
    },
}

/// Ordered, selectable sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Catalog of a session without a backend
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the catalog for a backend
    ///
    /// Without a backend the catalog is empty, not even holding the sentinels.
    ///
    /// # Errors
    ///
    /// Propagates a failed table listing.
    pub async fn rebuild(
        backend: Option<&dyn Backend>,
        file_queries: &NamedQueries,
        schema: Option<&str>,
    ) -> BackendResult<Self> {
        let Some(backend) = backend else {
            return Ok(Self::empty());
        };

        let tables = backend.list_tables(schema).await?;

        let mut entries = Vec::with_capacity(2 + file_queries.len() + tables.len());
        entries.push(CatalogEntry::NoneSelected);
        entries.push(CatalogEntry::CustomQuery);
        entries.extend(
            file_queries
                .names()
                .map(|name| CatalogEntry::NamedQuery(name.to_string())),
        );
        entries.extend(tables.into_iter().map(CatalogEntry::LiveTable));

        debug!(
            backend = backend.display_name(),
            queries = file_queries.len(),
            entries = entries.len(),
            "Rebuilt source catalog"
        );
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(CatalogEntry::label)
    }

    /// Index of the first entry with this label
    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.labels().position(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map a position to a selection
    ///
    /// Position 0 and positions past the end select nothing. Other entries
    /// are told apart by label: a label that names a file query selects
    /// that query, even when the entry came from the table listing.
    pub fn resolve_selection(
        &self,
        index: usize,
        file_queries: &NamedQueries,
        custom: &CustomQuery,
    ) -> SourceSelection {
        match self.entries.get(index) {
            None | Some(CatalogEntry::NoneSelected) => SourceSelection::NoneSelected,
            Some(CatalogEntry::CustomQuery) => SourceSelection::CustomQuery(custom.clone()),
            Some(entry) if file_queries.contains(entry.label()) => SourceSelection::NamedQuery {
                name: entry.label().to_string(),
            },
            Some(entry) => SourceSelection::LiveTable {
                table_name: entry.label().to_string(),
            },
        }
    }

    /// Whether a position shows the query editor instead of loading data
    pub fn is_editor_entry(&self, index: usize, file_queries: &NamedQueries) -> bool {
        match self.entries.get(index) {
            Some(CatalogEntry::CustomQuery) => true,
            Some(entry) => file_queries.contains(entry.label()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_file::parse_resource_content;

    fn catalog(entries: Vec<CatalogEntry>) -> Catalog {
        Catalog { entries }
    }

    #[test]
    fn test_labels() {
        let cat = catalog(vec![
            CatalogEntry::NoneSelected,
            CatalogEntry::CustomQuery,
            CatalogEntry::LiveTable("t1".into()),
        ]);
        assert_eq!(cat.labels().collect::<Vec<_>>(), vec!["(none)", "(custom)", "t1"]);
        assert_eq!(cat.position_of("t1"), Some(2));
        assert_eq!(cat.position_of("nope"), None);
    }

    #[test]
    fn test_resolve_sentinels_and_out_of_range() {
        let cat = catalog(vec![CatalogEntry::NoneSelected, CatalogEntry::CustomQuery]);
        let queries = NamedQueries::new();
        let custom = CustomQuery::new("SELECT 1");

        assert_eq!(
            cat.resolve_selection(0, &queries, &custom),
            SourceSelection::NoneSelected
        );
        assert_eq!(
            cat.resolve_selection(7, &queries, &custom),
            SourceSelection::NoneSelected
        );
        assert_eq!(
            cat.resolve_selection(1, &queries, &custom),
            SourceSelection::CustomQuery(custom)
        );
    }

    #[test]
    fn test_named_query_label_wins_over_table() {
        let queries = parse_resource_content("-- name:sales\nSELECT 1;\n");
        let cat = catalog(vec![
            CatalogEntry::NoneSelected,
            CatalogEntry::CustomQuery,
            CatalogEntry::NamedQuery("SALES".into()),
            CatalogEntry::LiveTable("SALES".into()),
            CatalogEntry::LiveTable("sales".into()),
        ]);
        let custom = CustomQuery::default();

        for index in [2, 3] {
            assert_eq!(
                cat.resolve_selection(index, &queries, &custom),
                SourceSelection::NamedQuery {
                    name: "SALES".into()
                }
            );
        }
        assert_eq!(
            cat.resolve_selection(4, &queries, &custom),
            SourceSelection::LiveTable {
                table_name: "sales".into()
            }
        );
        assert!(cat.is_editor_entry(3, &queries));
        assert!(!cat.is_editor_entry(4, &queries));
    }

    #[tokio::test]
    async fn test_rebuild_without_backend_is_empty() {
        let queries = parse_resource_content("-- name:q\nSELECT 1;\n");
        let cat = Catalog::rebuild(None, &queries, None).await.unwrap();
        assert!(cat.is_empty());
    }
}

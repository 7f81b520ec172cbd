// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Result of ingesting a source

use serde::Serialize;

use sql_ingest_backend::Relation;
use sql_ingest_ir::{DataTable, Domain};

/// An ingested dataset, either still on the server or in memory
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Dataset {
    /// Lazy handle to a relation that was not downloaded
    Remote { relation: Relation, approx_rows: u64 },
    /// Rows downloaded into memory
    Local { table: DataTable },
}

impl Dataset {
    pub fn domain(&self) -> &Domain {
        match self {
            Dataset::Remote { relation, .. } => relation.domain(),
            Dataset::Local { table } => table.domain(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Dataset::Local { .. })
    }

    /// Row count: exact when local, estimated when remote
    pub fn row_count(&self) -> u64 {
        match self {
            Dataset::Remote { approx_rows, .. } => *approx_rows,
            Dataset::Local { table } => table.len() as u64,
        }
    }

    pub fn as_table(&self) -> Option<&DataTable> {
        match self {
            Dataset::Local { table } => Some(table),
            Dataset::Remote { .. } => None,
        }
    }
}

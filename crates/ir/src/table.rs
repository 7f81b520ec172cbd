// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Columnar in-memory table
//!
//! A [`DataTable`] owns its values column by column, in domain order
//! (attributes, class variables, metas). Rows coming from a driver are in
//! result-set order and are mapped onto the domain by column name.

use serde::Serialize;
use thiserror::Error;

use crate::domain::{ColumnRole, Domain, Variable};
use crate::value::Value;

/// Errors raised while assembling a table
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum TableError {
    /// A domain variable has no matching column in the result set
    #[error("Column '{0}' is missing from the result set")]
    MissingColumn(String),

    /// A row has a different width than the result header
    #[error("Row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Fully materialized columnar table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataTable {
    domain: Domain,
    columns: Vec<Vec<Value>>,
    n_rows: usize,
}

impl DataTable {
    /// Assemble a table from driver rows
    ///
    /// `column_names` is the result-set header that `rows` follow.
    pub fn from_rows(
        domain: Domain,
        column_names: &[String],
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, TableError> {
        let positions = domain
            .variables()
            .map(|(_, var)| {
                column_names
                    .iter()
                    .position(|name| *name == var.name)
                    .ok_or_else(|| TableError::MissingColumn(var.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let n_rows = rows.len();
        let mut columns: Vec<Vec<Value>> = positions
            .iter()
            .map(|_| Vec::with_capacity(n_rows))
            .collect();

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != column_names.len() {
                return Err(TableError::RaggedRow {
                    row: row_idx,
                    expected: column_names.len(),
                    found: row.len(),
                });
            }
            for (column, &pos) in columns.iter_mut().zip(&positions) {
                column.push(row[pos].clone());
            }
        }

        Ok(Self {
            domain,
            columns,
            n_rows,
        })
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Values of a column by name
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.domain
            .variables()
            .position(|(_, v)| v.name == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Columns with their variable and role, in domain order
    pub fn columns(&self) -> impl Iterator<Item = (ColumnRole, &Variable, &[Value])> {
        self.domain
            .variables()
            .zip(&self.columns)
            .map(|((role, var), values)| (role, var, values.as_slice()))
    }
}

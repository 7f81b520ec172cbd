// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Support
//!
//! This module defines the SQL dialects a backend can speak and the
//! dialect-specific features the ingestion engine relies on.
//!
//! ## Dialect Extensions
//!
//! - `TableSample`: `TABLESAMPLE system(p)` on base tables (PostgreSQL)
//! - `TimeBoundedSample`: `TABLESAMPLE system_time(ms)`, needs the
//!   `tsm_system_time` extension (PostgreSQL)
//! - `CreateTableAs`: `CREATE TABLE t AS <query>` materialization
//! - `ExplainEstimate`: cheap row estimates from the planner (PostgreSQL)
//! - `AnalyzeTable`: MySQL's `ANALYZE TABLE t` spelling of the statistics refresh

use serde::{Deserialize, Serialize};

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Dialect {
    /// PostgreSQL (12+)
    PostgreSQL,
    /// MySQL (5.7, 8.0)
    MySQL,
}

impl Dialect {
    /// Human readable name, also used as the backend display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "PostgreSQL",
            Dialect::MySQL => "MySQL",
        }
    }

    /// URL schemes accepted in connection strings for this dialect
    pub fn url_schemes(&self) -> &'static [&'static str] {
        match self {
            Dialect::PostgreSQL => &["postgresql", "postgres"],
            Dialect::MySQL => &["mysql"],
        }
    }

    /// Check if this dialect supports a specific extension
    pub fn supports(&self, ext: DialectExtensions) -> bool {
        match self {
            Dialect::PostgreSQL => matches!(
                ext,
                DialectExtensions::TableSample
                    | DialectExtensions::TimeBoundedSample
                    | DialectExtensions::CreateTableAs
                    | DialectExtensions::ExplainEstimate
            ),
            Dialect::MySQL => matches!(
                ext,
                DialectExtensions::CreateTableAs | DialectExtensions::AnalyzeTable
            ),
        }
    }

    /// Quote an identifier (column or table name)
    pub fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Dialect::PostgreSQL => format!("\"{}\"", ident.replace('"', "\"\"")),
            Dialect::MySQL => format!("`{}`", ident.replace('`', "``")),
        }
    }

    /// Quote a string literal
    pub fn quote_literal(&self, value: &str) -> String {
        match self {
            Dialect::PostgreSQL => format!("'{}'", value.replace('\'', "''")),
            Dialect::MySQL => format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''")),
        }
    }

    /// Cast an expression to the dialect's text type
    pub fn cast_to_text(&self, expr: &str) -> String {
        match self {
            Dialect::PostgreSQL => format!("({})::text", expr),
            Dialect::MySQL => format!("CAST({} AS CHAR)", expr),
        }
    }

    /// Statement refreshing planner statistics for a table
    pub fn analyze_statement(&self, table: &str) -> String {
        if self.supports(DialectExtensions::AnalyzeTable) {
            format!("ANALYZE TABLE {}", table)
        } else {
            format!("ANALYZE {}", table)
        }
    }
}

/// Dialect-specific extensions and features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DialectExtensions {
    /// TABLESAMPLE system(percentage)
    TableSample,

    /// TABLESAMPLE system_time(milliseconds)
    TimeBoundedSample,

    /// CREATE TABLE ... AS SELECT ...
    CreateTableAs,

    /// Row estimate from EXPLAIN output
    ExplainEstimate,

    /// ANALYZE TABLE spelling
    AnalyzeTable,
}

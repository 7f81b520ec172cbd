// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Relations
//!
//! A [`Relation`] is a lazy, queryable result set: a table or a query,
//! optionally reduced by a [`Sample`], together with the domain currently
//! attached to it. Nothing is fetched until a backend is asked to.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult};
use sql_ingest_ir::{Dialect, DialectExtensions, Domain};

/// Alias given to wrapped queries
const QUERY_ALIAS: &str = "my_table";

/// What a relation reads from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationSource {
    /// A table identifier, read as `SELECT * FROM name`
    Table(String),
    /// An arbitrary SELECT statement
    Query(String),
}

impl RelationSource {
    /// Text used in a FROM clause
    ///
    /// Queries are wrapped as a derived table; a trailing `;` is dropped.
    pub fn from_clause(&self) -> String {
        match self {
            RelationSource::Table(name) => name.trim().to_string(),
            RelationSource::Query(sql) => {
                format!("({}) AS {}", strip_terminator(sql), QUERY_ALIAS)
            }
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, RelationSource::Query(_))
    }
}

/// Remove surrounding whitespace and trailing statement terminators
pub fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// Reduced subset of a relation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Sample {
    /// Roughly this percentage of the rows (0-100)
    Percentage(f64),
    /// Whatever can be read within this much time
    Time(Duration),
}

impl Sample {
    /// Dialect extension needed to express this sample
    pub fn required_extension(&self) -> DialectExtensions {
        match self {
            Sample::Percentage(_) => DialectExtensions::TableSample,
            Sample::Time(_) => DialectExtensions::TimeBoundedSample,
        }
    }

    /// `TABLESAMPLE` clause for this sample
    pub fn tablesample_clause(&self) -> String {
        match self {
            Sample::Percentage(pct) => format!("TABLESAMPLE system({})", pct.clamp(0.0, 100.0)),
            Sample::Time(duration) => {
                format!("TABLESAMPLE system_time({})", duration.as_millis())
            }
        }
    }
}

/// A queryable result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    source: RelationSource,
    sample: Option<Sample>,
    domain: Domain,
}

impl Relation {
    pub fn new(source: RelationSource, domain: Domain) -> Self {
        Self {
            source,
            sample: None,
            domain,
        }
    }

    pub fn source(&self) -> &RelationSource {
        &self.source
    }

    pub fn sample(&self) -> Option<&Sample> {
        self.sample.as_ref()
    }

    pub fn is_sampled(&self) -> bool {
        self.sample.is_some()
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn set_domain(&mut self, domain: Domain) {
        self.domain = domain;
    }

    /// Same relation reduced by a sample, keeping the current domain
    pub fn with_sample(&self, sample: Sample) -> Self {
        Self {
            source: self.source.clone(),
            sample: Some(sample),
            domain: self.domain.clone(),
        }
    }

    /// `SELECT *` statement reading this relation in the given dialect
    pub fn select_sql(&self, dialect: Dialect) -> BackendResult<String> {
        let from = self.source.from_clause();
        match &self.sample {
            None => Ok(format!("SELECT * FROM {}", from)),
            Some(sample) => {
                if self.source.is_query() {
                    return Err(BackendError::NotSupported(
                        "sampling of complex queries is not supported".to_string(),
                    ));
                }
                if !dialect.supports(sample.required_extension()) {
                    return Err(BackendError::NotSupported(format!(
                        "{} cannot express {:?}",
                        dialect.display_name(),
                        sample
                    )));
                }
                Ok(format!(
                    "SELECT * FROM {} {}",
                    from,
                    sample.tablesample_clause()
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_select() {
        let rel = Relation::new(RelationSource::Table("iris".into()), Domain::default());
        assert_eq!(rel.select_sql(Dialect::MySQL).unwrap(), "SELECT * FROM iris");
    }

    #[test]
    fn test_query_is_wrapped_without_terminator() {
        let rel = Relation::new(
            RelationSource::Query("SELECT a FROM t;  ".into()),
            Domain::default(),
        );
        assert_eq!(
            rel.select_sql(Dialect::PostgreSQL).unwrap(),
            "SELECT * FROM (SELECT a FROM t) AS my_table"
        );
    }

    #[test]
    fn test_time_sample_clause() {
        let rel = Relation::new(RelationSource::Table("big".into()), Domain::default())
            .with_sample(Sample::Time(Duration::from_secs(1)));
        assert_eq!(
            rel.select_sql(Dialect::PostgreSQL).unwrap(),
            "SELECT * FROM big TABLESAMPLE system_time(1000)"
        );
    }

    #[test]
    fn test_percentage_sample_clause() {
        let rel = Relation::new(RelationSource::Table("big".into()), Domain::default())
            .with_sample(Sample::Percentage(12.5));
        assert_eq!(
            rel.select_sql(Dialect::PostgreSQL).unwrap(),
            "SELECT * FROM big TABLESAMPLE system(12.5)"
        );
    }

    #[test]
    fn test_sampling_queries_is_rejected() {
        let rel = Relation::new(RelationSource::Query("SELECT 1".into()), Domain::default())
            .with_sample(Sample::Percentage(10.0));
        assert!(matches!(
            rel.select_sql(Dialect::PostgreSQL),
            Err(BackendError::NotSupported(_))
        ));
    }

    #[test]
    fn test_mysql_cannot_sample() {
        let rel = Relation::new(RelationSource::Table("t".into()), Domain::default())
            .with_sample(Sample::Percentage(10.0));
        assert!(rel.select_sql(Dialect::MySQL).is_err());
    }
}

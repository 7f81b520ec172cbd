// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Domain inference
//!
//! Shared by the dialect backends. Column types come from an empty read of
//! the relation; with value inspection enabled, integer and character
//! columns with few distinct values become discrete variables.

use tracing::debug;

use crate::connection::Connection;
use crate::error::{BackendError, BackendResult};
use crate::relation::Relation;
use sql_ingest_ir::{
    ColumnMetadata, DataTable, DataType, Dialect, Domain, Value, Variable, VariableKind,
};

/// Maximum number of distinct values for a column to become discrete
pub const DISTINCT_VALUES_LIMIT: usize = 20;

/// Maps a driver type name to a unified data type
pub type TypeParser = fn(&str) -> DataType;

/// Column metadata of a relation, without reading rows
pub async fn describe_columns(
    conn: &dyn Connection,
    dialect: Dialect,
    relation: &Relation,
    parse_type: TypeParser,
) -> BackendResult<Vec<ColumnMetadata>> {
    let empty_read = format!("SELECT * FROM ({}) AS t LIMIT 0", relation.select_sql(dialect)?);
    let result = conn.execute(&empty_read).await?;
    Ok(result
        .columns
        .iter()
        .map(|c| ColumnMetadata::new(c.name.clone(), parse_type(&c.type_name)))
        .collect())
}

/// Infer the domain of a relation
pub async fn infer_domain(
    conn: &dyn Connection,
    dialect: Dialect,
    relation: &Relation,
    parse_type: TypeParser,
    inspect_values: bool,
) -> BackendResult<Domain> {
    let columns = describe_columns(conn, dialect, relation, parse_type).await?;
    let mut variables = Vec::with_capacity(columns.len());

    for column in columns {
        let kind = if (column.data_type.is_integer() || column.data_type.is_textual())
            && inspect_values
        {
            match distinct_values(conn, dialect, relation, &column.name).await? {
                Some(values) => VariableKind::Discrete { values },
                None => kind_without_values(&column.data_type),
            }
        } else {
            kind_without_values(&column.data_type)
        };
        variables.push(Variable::new(column.name, kind, column.data_type));
    }

    let domain = Domain::from_variables(variables);
    debug!(
        attributes = domain.attributes.len(),
        metas = domain.metas.len(),
        inspect_values,
        sampled = relation.is_sampled(),
        "Inferred domain"
    );
    Ok(domain)
}

/// Variable kind decided from the column type alone
pub fn kind_without_values(data_type: &DataType) -> VariableKind {
    if data_type.is_integer() || data_type.is_fractional() {
        VariableKind::Continuous
    } else if *data_type == DataType::Boolean {
        VariableKind::Discrete {
            values: vec!["false".to_string(), "true".to_string()],
        }
    } else if data_type.has_date() || data_type.has_time() {
        VariableKind::Time {
            has_date: data_type.has_date(),
            has_time: data_type.has_time(),
        }
    } else {
        VariableKind::String
    }
}

/// Distinct non-null values of a column, or `None` when there are too many
async fn distinct_values(
    conn: &dyn Connection,
    dialect: Dialect,
    relation: &Relation,
    column: &str,
) -> BackendResult<Option<Vec<String>>> {
    let field = dialect.quote_identifier(column);
    let sql = format!(
        "SELECT DISTINCT {} FROM ({}) AS t WHERE {} IS NOT NULL ORDER BY 1 LIMIT {}",
        dialect.cast_to_text(&field),
        relation.select_sql(dialect)?,
        field,
        DISTINCT_VALUES_LIMIT + 1
    );
    let result = conn.execute(&sql).await?;
    if result.rows.len() > DISTINCT_VALUES_LIMIT {
        return Ok(None);
    }
    let values: Vec<String> = result
        .first_column()
        .filter(|v| !v.is_null())
        .map(Value::to_string)
        .collect();
    if values.is_empty() {
        return Ok(None);
    }
    Ok(Some(values))
}

/// Read at most `max_rows` rows of a relation into a table
pub async fn download(
    conn: &dyn Connection,
    dialect: Dialect,
    relation: &Relation,
    max_rows: u64,
) -> BackendResult<DataTable> {
    let sql = format!("{} LIMIT {}", relation.select_sql(dialect)?, max_rows);
    let result = conn.execute(&sql).await?;
    let header = result.column_names();
    let n_rows = result.rows.len();
    let table = DataTable::from_rows(relation.domain().clone(), &header, result.rows)
        .map_err(BackendError::from)?;
    debug!(rows = n_rows, max_rows, "Downloaded relation");
    Ok(table)
}

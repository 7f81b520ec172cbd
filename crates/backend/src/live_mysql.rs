// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Live MySQL backend
//!
//! MySQL has no `TABLESAMPLE`, so this backend never samples and counts
//! rows exactly with `COUNT(*)`. Tables are listed from `information_schema`.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::connection::{
    Connection, ConnectionParams, Connector, QueryResult, validate_connection_string,
};
use crate::error::{BackendError, BackendResult};
use crate::inference;
use crate::r#trait::{Backend, BackendCapabilities};
use crate::registry::{BackendDescriptor, BackendFactory};
use crate::relation::{Relation, RelationSource, Sample};
use sql_ingest_ir::{DataTable, DataType, Dialect, Domain, Value};

/// Live MySQL backend
pub struct MySqlBackend {
    connection_string: String,
    connection: Arc<dyn Connection>,
    /// Always empty; MySQL needs no extensions
    missing_extensions: BTreeSet<String>,
}

impl MySqlBackend {
    /// Connect through a driver
    ///
    /// # Errors
    ///
    /// Returns `BackendError::ConfigurationError` if the connection string is invalid.
    pub async fn connect(
        connector: &dyn Connector,
        connection_string: impl Into<String>,
    ) -> BackendResult<Self> {
        let conn_str = connection_string.into();
        validate_connection_string(Dialect::MySQL, &conn_str)?;

        let connection = connector.connect(&conn_str).await.map_err(|e| match e {
            BackendError::ConnectionFailed(_) => e,
            other => BackendError::ConnectionFailed(other.to_string()),
        })?;
        info!("Connected to MySQL");

        Ok(Self {
            connection_string: conn_str,
            connection,
            missing_extensions: BTreeSet::new(),
        })
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Parse MySQL data type to unified DataType
    ///
    /// Converts MySQL type strings (e.g., "varchar(255)", "int", "text")
    /// to the unified DataType enum.
    pub fn parse_mysql_type(mysql_type: &str) -> DataType {
        let type_lower = mysql_type.to_lowercase();

        // Parse type with parameters (e.g., varchar(255), decimal(10,2))
        let type_name: String = type_lower
            .chars()
            .take_while(|c| c.is_alphabetic())
            .collect();

        match type_name.as_str() {
            // tinyint(1) is how MySQL spells BOOLEAN
            "tinyint" if Self::extract_length(&type_lower) == Some(1) => DataType::Boolean,
            "tinyint" => DataType::TinyInt,
            "smallint" => DataType::SmallInt,
            "mediumint" | "int" | "integer" => DataType::Integer,
            "bigint" => DataType::BigInt,

            "decimal" | "numeric" => DataType::Decimal,
            "float" => DataType::Float,
            "double" | "real" => DataType::Double,

            "varchar" => DataType::Varchar(Self::extract_length(&type_lower)),
            "char" => DataType::Char(Self::extract_length(&type_lower)),
            "text" | "tinytext" | "mediumtext" | "longtext" | "enum" | "set" => DataType::Text,

            "binary" => DataType::Binary,
            "varbinary" => DataType::VarBinary(Self::extract_length(&type_lower)),
            "blob" | "tinyblob" | "mediumblob" | "longblob" => DataType::Blob,

            "date" => DataType::Date,
            "time" => DataType::Time,
            "datetime" => DataType::DateTime,
            "timestamp" => DataType::Timestamp,

            "bool" | "boolean" => DataType::Boolean,

            "json" => DataType::Json,

            _ => DataType::Other(mysql_type.to_string()),
        }
    }

    /// Extract length from type string (e.g., "varchar(255)" -> Some(255))
    fn extract_length(type_str: &str) -> Option<usize> {
        type_str
            .find('(')
            .and_then(|pos| {
                let end = type_str[pos..].find([',', ')'])?;
                type_str[pos + 1..pos + end].trim().parse().ok()
            })
            .and_then(|len: usize| if len == 0 { None } else { Some(len) })
    }

    fn list_tables_sql(schema: Option<&str>) -> String {
        let schema_filter = match schema {
            Some(schema) => Dialect::MySQL.quote_literal(schema),
            None => "DATABASE()".to_string(),
        };
        format!(
            "SELECT TABLE_NAME FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = {} \
             ORDER BY TABLE_NAME",
            schema_filter
        )
    }
}

#[async_trait]
impl Backend for MySqlBackend {
    fn display_name(&self) -> &str {
        Dialect::MySQL.display_name()
    }

    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_percentage_sampling: false,
            supports_time_sampling: false,
            can_materialize: true,
        }
    }

    fn missing_extensions(&self) -> &BTreeSet<String> {
        &self.missing_extensions
    }

    async fn list_tables(&self, schema: Option<&str>) -> BackendResult<Vec<String>> {
        let result = self.execute_query(&Self::list_tables_sql(schema)).await?;
        Ok(result
            .first_column()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    async fn execute_query(&self, sql: &str) -> BackendResult<QueryResult> {
        debug!(sql, "Executing");
        self.connection.execute(sql).await
    }

    async fn open_relation(&self, source: RelationSource) -> BackendResult<Relation> {
        let mut relation = Relation::new(source, Domain::default());
        let domain = self.infer_domain(&relation, false).await?;
        relation.set_domain(domain);
        Ok(relation)
    }

    async fn approx_row_count(&self, relation: &Relation) -> BackendResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM ({}) AS t",
            relation.select_sql(Dialect::MySQL)?
        );
        let result = self.execute_query(&sql).await?;
        match result.scalar() {
            Some(Value::Integer(n)) => Ok((*n).max(0) as u64),
            Some(Value::Text(text)) => text.trim().parse().map_err(|_| {
                BackendError::MalformedResult(format!("row count is not a number: {}", text))
            }),
            other => Err(BackendError::MalformedResult(format!(
                "expected a row count, got {:?}",
                other
            ))),
        }
    }

    async fn infer_domain(
        &self,
        relation: &Relation,
        inspect_values: bool,
    ) -> BackendResult<Domain> {
        inference::infer_domain(
            self.connection.as_ref(),
            Dialect::MySQL,
            relation,
            Self::parse_mysql_type,
            inspect_values,
        )
        .await
    }

    async fn sample(&self, _relation: &Relation, _sample: Sample) -> BackendResult<Relation> {
        Err(BackendError::NotSupported(
            "MySQL does not support table sampling".to_string(),
        ))
    }

    async fn download(&self, relation: &Relation, max_rows: u64) -> BackendResult<DataTable> {
        inference::download(self.connection.as_ref(), Dialect::MySQL, relation, max_rows).await
    }
}

/// Creates [`MySqlBackend`]s through a driver connector
pub struct MySqlFactory {
    connector: Arc<dyn Connector>,
}

impl MySqlFactory {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl BackendFactory for MySqlFactory {
    fn descriptor(&self) -> BackendDescriptor {
        BackendDescriptor::new(Dialect::MySQL)
    }

    async fn connect(&self, params: &ConnectionParams) -> BackendResult<Arc<dyn Backend>> {
        let conn_str = params.connection_string(Dialect::MySQL)?;
        let backend = MySqlBackend::connect(self.connector.as_ref(), conn_str).await?;
        Ok(Arc::new(backend))
    }
}

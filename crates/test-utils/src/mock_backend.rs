// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock backend implementation for testing
//!
//! Provides an in-memory backend with builder pattern for easy test setup.
//! Every call is recorded so tests can assert on order and count.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use sql_ingest_backend::{
    Backend, BackendCapabilities, BackendDescriptor, BackendError, BackendFactory, BackendResult,
    ConnectionParams, QueryResult, Relation, RelationSource, Sample,
};
use sql_ingest_ir::{DataTable, DataType, Dialect, Domain, Value, Variable, VariableKind};

/// A call made on a [`MockBackend`]
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    ListTables(Option<String>),
    Execute(String),
    OpenRelation(RelationSource),
    ApproxRowCount,
    InferDomain { inspect_values: bool, sampled: bool },
    Sample(Sample),
    Download { max_rows: u64, sampled: bool },
}

/// A table served by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockTable {
    pub name: String,
    /// Domain from column types only
    pub domain: Domain,
    /// Domain after value inspection
    pub discovered: Domain,
    /// Result-set header the rows follow
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub approx_rows: u64,
}

impl MockTable {
    /// Table whose domain does not change with inspection
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        let header = domain.variables().map(|(_, v)| v.name.clone()).collect();
        Self {
            name: name.into(),
            discovered: domain.clone(),
            domain,
            header,
            rows: Vec::new(),
            approx_rows: 0,
        }
    }

    pub fn with_discovered(mut self, discovered: Domain) -> Self {
        self.discovered = discovered;
        self
    }

    /// Rows in header order; the estimate follows unless set later
    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.approx_rows = rows.len() as u64;
        self.rows = rows;
        self
    }

    pub fn with_approx_rows(mut self, approx_rows: u64) -> Self {
        self.approx_rows = approx_rows;
        self
    }
}

/// In-memory mock backend for testing
#[derive(Debug, Clone)]
pub struct MockBackend {
    display_name: String,
    dialect: Dialect,
    capabilities: BackendCapabilities,
    missing_extensions: BTreeSet<String>,
    tables: Vec<MockTable>,
    query_result: MockTable,
    failing_statements: Vec<String>,
    fail_open: bool,
    fail_listing: bool,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl MockBackend {
    pub fn builder() -> MockBackendBuilder {
        MockBackendBuilder::new()
    }

    /// Calls recorded so far, shared between clones
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Statements passed to `execute_query`, in order
    pub fn executed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Execute(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    pub fn count_calls(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn table_for(&self, source: &RelationSource) -> BackendResult<&MockTable> {
        match source {
            RelationSource::Table(name) => self
                .tables
                .iter()
                .find(|t| t.name == *name)
                .ok_or_else(|| {
                    BackendError::QueryFailed(format!("relation \"{}\" does not exist", name))
                }),
            RelationSource::Query(_) => Ok(&self.query_result),
        }
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    fn missing_extensions(&self) -> &BTreeSet<String> {
        &self.missing_extensions
    }

    async fn list_tables(&self, schema: Option<&str>) -> BackendResult<Vec<String>> {
        self.record(BackendCall::ListTables(schema.map(str::to_string)));
        if self.fail_listing {
            return Err(BackendError::QueryFailed("permission denied for schema".into()));
        }
        Ok(self.tables.iter().map(|t| t.name.clone()).collect())
    }

    async fn execute_query(&self, sql: &str) -> BackendResult<QueryResult> {
        self.record(BackendCall::Execute(sql.to_string()));
        if self
            .failing_statements
            .iter()
            .any(|prefix| sql.starts_with(prefix.as_str()))
        {
            return Err(BackendError::QueryFailed(format!("mock failure: {}", sql)));
        }
        Ok(QueryResult::empty())
    }

    async fn open_relation(&self, source: RelationSource) -> BackendResult<Relation> {
        self.record(BackendCall::OpenRelation(source.clone()));
        if self.fail_open {
            return Err(BackendError::QueryFailed("syntax error at or near \"FORM\"".into()));
        }
        let domain = self.table_for(&source)?.domain.clone();
        Ok(Relation::new(source, domain))
    }

    async fn approx_row_count(&self, relation: &Relation) -> BackendResult<u64> {
        self.record(BackendCall::ApproxRowCount);
        Ok(self.table_for(relation.source())?.approx_rows)
    }

    async fn infer_domain(&self, relation: &Relation, inspect_values: bool) -> BackendResult<Domain> {
        self.record(BackendCall::InferDomain {
            inspect_values,
            sampled: relation.is_sampled(),
        });
        let table = self.table_for(relation.source())?;
        Ok(if inspect_values {
            table.discovered.clone()
        } else {
            table.domain.clone()
        })
    }

    async fn sample(&self, relation: &Relation, sample: Sample) -> BackendResult<Relation> {
        self.record(BackendCall::Sample(sample));
        let supported = match sample {
            Sample::Percentage(_) => self.capabilities.supports_percentage_sampling,
            Sample::Time(_) => self.capabilities.supports_time_sampling,
        };
        if !supported {
            return Err(BackendError::NotSupported("sampling".into()));
        }
        if relation.source().is_query() {
            return Err(BackendError::NotSupported(
                "sampling of complex queries is not supported".into(),
            ));
        }
        Ok(relation.with_sample(sample))
    }

    async fn download(&self, relation: &Relation, max_rows: u64) -> BackendResult<DataTable> {
        self.record(BackendCall::Download {
            max_rows,
            sampled: relation.is_sampled(),
        });
        let table = self.table_for(relation.source())?;
        let rows = table
            .rows
            .iter()
            .take(max_rows as usize)
            .cloned()
            .collect();
        Ok(DataTable::from_rows(
            relation.domain().clone(),
            &table.header,
            rows,
        )?)
    }
}

/// Builder for creating mock backends with a fluent API
pub struct MockBackendBuilder {
    backend: MockBackend,
}

impl Default for MockBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackendBuilder {
    /// A PostgreSQL-flavoured backend that samples and materializes
    pub fn new() -> Self {
        Self {
            backend: MockBackend {
                display_name: Dialect::PostgreSQL.display_name().to_string(),
                dialect: Dialect::PostgreSQL,
                capabilities: BackendCapabilities {
                    supports_percentage_sampling: true,
                    supports_time_sampling: true,
                    can_materialize: true,
                },
                missing_extensions: BTreeSet::new(),
                tables: Vec::new(),
                query_result: MockTable::new("query", Domain::default()),
                failing_statements: Vec::new(),
                fail_open: false,
                fail_listing: false,
                calls: Arc::new(Mutex::new(Vec::new())),
            },
        }
    }

    /// A MySQL-flavoured backend without sampling
    pub fn mysql() -> Self {
        Self::new()
            .with_display_name(Dialect::MySQL.display_name())
            .with_dialect(Dialect::MySQL)
            .with_sampling(false)
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.backend.display_name = name.into();
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.backend.dialect = dialect;
        self
    }

    /// Turn both kinds of sampling on or off
    pub fn with_sampling(mut self, supported: bool) -> Self {
        self.backend.capabilities.supports_percentage_sampling = supported;
        self.backend.capabilities.supports_time_sampling = supported;
        self
    }

    /// A server lacking the time-bounded sampling extension
    pub fn with_time_sampling(mut self, supported: bool) -> Self {
        self.backend.capabilities.supports_time_sampling = supported;
        self
    }

    pub fn with_materialize(mut self, supported: bool) -> Self {
        self.backend.capabilities.can_materialize = supported;
        self
    }

    pub fn with_missing_extension(mut self, extension: impl Into<String>) -> Self {
        self.backend.missing_extensions.insert(extension.into());
        self
    }

    pub fn with_table(mut self, table: MockTable) -> Self {
        self.backend.tables.push(table);
        self
    }

    /// What every query source opens as
    pub fn with_query_result(mut self, table: MockTable) -> Self {
        self.backend.query_result = table;
        self
    }

    /// Fail statements starting with `prefix`
    pub fn failing_statement(mut self, prefix: impl Into<String>) -> Self {
        self.backend.failing_statements.push(prefix.into());
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.backend.fail_open = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.backend.fail_listing = true;
        self
    }

    /// Add the standard test tables: `iris` (150 rows) and `events` (2M rows)
    pub fn with_standard_schema(self) -> Self {
        self.with_table(iris_table()).with_table(events_table())
    }

    pub fn build(self) -> MockBackend {
        self.backend
    }
}

/// `iris`: its class column turns discrete once values are inspected
pub fn iris_table() -> MockTable {
    let cheap = Domain::from_variables([
        Variable::continuous("sepal_length", DataType::Double),
        Variable::continuous("sepal_width", DataType::Double),
        Variable::string("class", DataType::Varchar(Some(20))),
    ]);
    let discovered = Domain::from_variables([
        Variable::continuous("sepal_length", DataType::Double),
        Variable::continuous("sepal_width", DataType::Double),
        Variable::new(
            "class",
            VariableKind::Discrete {
                values: vec![
                    "setosa".to_string(),
                    "versicolor".to_string(),
                    "virginica".to_string(),
                ],
            },
            DataType::Varchar(Some(20)),
        ),
    ]);
    MockTable::new("iris", cheap)
        .with_discovered(discovered)
        .with_rows(vec![
            vec![Value::Real(5.1), Value::Real(3.5), Value::from("setosa")],
            vec![Value::Real(7.0), Value::Real(3.2), Value::from("versicolor")],
            vec![Value::Real(6.3), Value::Real(3.3), Value::from("virginica")],
        ])
        .with_approx_rows(150)
}

/// `events`: large enough to trigger every prompt
pub fn events_table() -> MockTable {
    let domain = Domain::from_variables([
        Variable::continuous("id", DataType::BigInt),
        Variable::string("payload", DataType::Json),
    ]);
    MockTable::new("events", domain)
        .with_rows(vec![
            vec![Value::Integer(1), Value::from("{}")],
            vec![Value::Integer(2), Value::from("{\"a\": 1}")],
        ])
        .with_approx_rows(2_000_000)
}

/// Factory handing out clones of one [`MockBackend`]
///
/// Clones share the call log, so the test keeps a handle through
/// [`MockBackendFactory::backend`].
pub struct MockBackendFactory {
    backend: MockBackend,
    connect_error: Option<BackendError>,
}

impl MockBackendFactory {
    pub fn new(backend: MockBackend) -> Self {
        Self {
            backend,
            connect_error: None,
        }
    }

    /// Make every connection attempt fail with `error`
    pub fn failing_with(mut self, error: BackendError) -> Self {
        self.connect_error = Some(error);
        self
    }

    pub fn backend(&self) -> &MockBackend {
        &self.backend
    }
}

#[async_trait::async_trait]
impl BackendFactory for MockBackendFactory {
    fn descriptor(&self) -> BackendDescriptor {
        BackendDescriptor::new(self.backend.dialect).with_display_name(&self.backend.display_name)
    }

    async fn connect(&self, params: &ConnectionParams) -> BackendResult<Arc<dyn Backend>> {
        params.connection_string(self.backend.dialect)?;
        match &self.connect_error {
            Some(err) => Err(err.clone()),
            None => Ok(Arc::new(self.backend.clone())),
        }
    }
}

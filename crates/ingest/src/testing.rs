// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! In-crate test doubles

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use sql_ingest_backend::{
    Backend, BackendCapabilities, BackendError, BackendResult, QueryResult, Relation,
    RelationSource, Sample,
};
use sql_ingest_ir::{DataTable, Dialect, Domain};

use crate::decision::{
    DecisionPort, DiscoveryChoice, DiscoveryPrompt, DownloadChoice, DownloadPrompt,
};

/// Backend answering from fixed values and logging every call
pub(crate) struct StubBackend {
    rows: u64,
    sampling: bool,
    time_sampling: bool,
    tables: Vec<String>,
    fail_prefix: Option<String>,
    fail_open: bool,
    missing: BTreeSet<String>,
    executed: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl StubBackend {
    pub(crate) fn new() -> Self {
        Self {
            rows: 10,
            sampling: true,
            time_sampling: true,
            tables: Vec::new(),
            fail_prefix: None,
            fail_open: false,
            missing: BTreeSet::new(),
            executed: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_rows(mut self, rows: u64) -> Self {
        self.rows = rows;
        self
    }

    pub(crate) fn with_sampling(mut self, sampling: bool) -> Self {
        self.sampling = sampling;
        self.time_sampling = sampling;
        self
    }

    pub(crate) fn with_time_sampling(mut self, time_sampling: bool) -> Self {
        self.time_sampling = time_sampling;
        self
    }

    pub(crate) fn with_tables(mut self, tables: &[&str]) -> Self {
        self.tables = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    pub(crate) fn failing_on(mut self, prefix: &str) -> Self {
        self.fail_prefix = Some(prefix.to_string());
        self
    }

    pub(crate) fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Backend for StubBackend {
    fn display_name(&self) -> &str {
        "Stub"
    }

    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_percentage_sampling: self.sampling,
            supports_time_sampling: self.time_sampling,
            can_materialize: true,
        }
    }

    fn missing_extensions(&self) -> &BTreeSet<String> {
        &self.missing
    }

    async fn list_tables(&self, _schema: Option<&str>) -> BackendResult<Vec<String>> {
        self.record("list_tables".to_string());
        Ok(self.tables.clone())
    }

    async fn execute_query(&self, sql: &str) -> BackendResult<QueryResult> {
        self.executed.lock().unwrap().push(sql.to_string());
        match &self.fail_prefix {
            Some(prefix) if sql.starts_with(prefix.as_str()) => {
                Err(BackendError::QueryFailed(format!("cannot run: {}", sql)))
            }
            _ => Ok(QueryResult::empty()),
        }
    }

    async fn open_relation(&self, source: RelationSource) -> BackendResult<Relation> {
        self.record("open_relation".to_string());
        if self.fail_open {
            return Err(BackendError::QueryFailed("relation does not exist".to_string()));
        }
        Ok(Relation::new(source, Domain::default()))
    }

    async fn approx_row_count(&self, _relation: &Relation) -> BackendResult<u64> {
        Ok(self.rows)
    }

    async fn infer_domain(&self, relation: &Relation, inspect_values: bool) -> BackendResult<Domain> {
        self.record(format!("infer_domain(inspect={})", inspect_values));
        Ok(relation.domain().clone())
    }

    async fn sample(&self, relation: &Relation, sample: Sample) -> BackendResult<Relation> {
        self.record(match sample {
            Sample::Percentage(pct) => format!("sample(Percentage({}))", pct),
            Sample::Time(duration) => format!("sample(Time({:?}))", duration),
        });
        Ok(relation.with_sample(sample))
    }

    async fn download(&self, relation: &Relation, max_rows: u64) -> BackendResult<DataTable> {
        self.record(format!("download({})", max_rows));
        Ok(DataTable::from_rows(relation.domain().clone(), &[], Vec::new())?)
    }
}

/// Wraps a port and counts the prompts it is shown
pub(crate) struct RecordingDecisions<P> {
    inner: P,
    discovery: AtomicUsize,
    download: AtomicUsize,
}

impl<P: DecisionPort> RecordingDecisions<P> {
    pub(crate) fn new(inner: P) -> Self {
        Self {
            inner,
            discovery: AtomicUsize::new(0),
            download: AtomicUsize::new(0),
        }
    }

    pub(crate) fn discovery_prompts(&self) -> usize {
        self.discovery.load(Ordering::SeqCst)
    }

    pub(crate) fn download_prompts(&self) -> usize {
        self.download.load(Ordering::SeqCst)
    }
}

impl<P: DecisionPort> DecisionPort for RecordingDecisions<P> {
    fn decide_discovery(&self, prompt: &DiscoveryPrompt) -> DiscoveryChoice {
        self.discovery.fetch_add(1, Ordering::SeqCst);
        self.inner.decide_discovery(prompt)
    }

    fn decide_download(&self, prompt: &DownloadPrompt) -> DownloadChoice {
        self.download.fetch_add(1, Ordering::SeqCst);
        self.inner.decide_download(prompt)
    }
}

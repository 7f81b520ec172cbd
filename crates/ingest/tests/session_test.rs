// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! End-to-end session behaviour over a mock backend factory

use std::sync::Arc;

use sql_ingest::session::{CUSTOM_QUERY_DESCRIPTION, FILE_QUERY_DESCRIPTION, NO_TABLE_DESCRIPTION};
use sql_ingest::source_catalog::{CUSTOM_INDEX, CUSTOM_LABEL};
use sql_ingest::{
    DeclineAll, DiscoveryChoice, DownloadChoice, IngestError, IngestSettings, SqlSession,
};
use sql_ingest_backend::{BackendError, BackendRegistry, ConnectionParams, RelationSource};
use sql_ingest_ir::Dialect;
use sql_ingest_test_utils::{
    BackendCall, DomainAssertions, MockBackend, MockBackendBuilder, MockBackendFactory,
    ResourceFixtures, ScriptedDecisions, iris_table, write_resource_file,
};

fn params() -> ConnectionParams {
    ConnectionParams::new("localhost", "test")
}

fn session_over(backend: &MockBackend, settings: IngestSettings) -> SqlSession {
    let registry =
        BackendRegistry::new().with_factory(Arc::new(MockBackendFactory::new(backend.clone())));
    SqlSession::new(registry, settings).unwrap()
}

fn labels(session: &SqlSession) -> Vec<String> {
    session.catalog().labels().map(str::to_string).collect()
}

#[tokio::test]
async fn test_connect_lists_sentinels_then_tables() {
    let backend = MockBackend::builder().with_standard_schema().build();
    let mut session = session_over(&backend, IngestSettings::default());

    session.connect(&params(), &DeclineAll).await.unwrap();

    assert!(session.is_connected());
    assert_eq!(labels(&session), vec!["(none)", "(custom)", "iris", "events"]);
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.description(), Some(NO_TABLE_DESCRIPTION));
    assert!(session.dataset().is_none());
    assert_eq!(backend.calls(), vec![BackendCall::ListTables(None)]);
}

#[tokio::test]
async fn test_refreshing_catalog_is_idempotent() {
    let backend = MockBackend::builder().with_standard_schema().build();
    let settings = IngestSettings {
        schema: Some("public".into()),
        ..Default::default()
    };
    let mut session = session_over(&backend, settings);

    session.connect(&params(), &DeclineAll).await.unwrap();
    let first = labels(&session);
    session.refresh_catalog().await.unwrap();

    assert_eq!(labels(&session), first);
    assert_eq!(
        backend.count_calls(|c| *c == BackendCall::ListTables(Some("public".into()))),
        2
    );
}

#[tokio::test]
async fn test_connect_restores_last_table() {
    let backend = MockBackend::builder().with_standard_schema().build();
    let settings = IngestSettings {
        table: Some("iris".into()),
        ..Default::default()
    };
    let mut session = session_over(&backend, settings);

    session.connect(&params(), &DeclineAll).await.unwrap();

    assert_eq!(session.current_index(), 2);
    assert_eq!(session.description(), Some("iris"));
    assert!(backend
        .calls()
        .contains(&BackendCall::OpenRelation(RelationSource::Table("iris".into()))));
    let dataset = session.dataset().unwrap();
    assert!(!dataset.is_local());
    DomainAssertions::assert_discrete(
        dataset.domain(),
        "class",
        &["setosa", "versicolor", "virginica"],
    );
}

#[tokio::test]
async fn test_backend_without_sampling_forces_download() {
    let backend = MockBackendBuilder::mysql().with_standard_schema().build();
    let mut session = session_over(&backend, IngestSettings::default());

    session.connect(&params(), &DeclineAll).await.unwrap();
    assert!(session.download_locked());
    assert!(session.settings().download);
    assert!(session.set_download(false));

    session.select(2, &DeclineAll).await.unwrap();
    let dataset = session.dataset().unwrap();
    assert!(dataset.is_local());
    assert_eq!(dataset.row_count(), 3);
}

#[tokio::test]
async fn test_missing_extension_is_reported() {
    let backend = MockBackend::builder()
        .with_missing_extension("quantile")
        .build();
    let mut session = session_over(&backend, IngestSettings::default());

    session.connect(&params(), &DeclineAll).await.unwrap();
    assert!(session.download_locked());
    assert_eq!(
        session.notices().warnings(),
        vec!["Database is missing extensions: quantile"]
    );
}

#[tokio::test]
async fn test_huge_table_on_mysql_is_refused() {
    let backend = MockBackendBuilder::mysql().with_standard_schema().build();
    let mut session = session_over(&backend, IngestSettings::default());
    let decisions = ScriptedDecisions::new().then_discovery(DiscoveryChoice::Skip);

    session.connect(&params(), &decisions).await.unwrap();
    session.select(3, &decisions).await.unwrap();

    assert!(decisions.download_prompts().is_empty());
    assert!(session.dataset().is_none());
    assert!(!session.settings().guess_values);
    assert_eq!(session.settings().table.as_deref(), Some("events"));
    assert_eq!(
        session.notices().warnings(),
        vec!["Data is too big to download.\nTable length: 2,000,000. Limit 1,000,000"]
    );
}

#[tokio::test]
async fn test_sampled_discovery_sets_notice() {
    let backend = MockBackend::builder().with_standard_schema().build();
    let mut session = session_over(&backend, IngestSettings::default());
    let decisions = ScriptedDecisions::new()
        .then_discovery(DiscoveryChoice::Sampled)
        .then_download(DownloadChoice::Decline);

    session.connect(&params(), &decisions).await.unwrap();
    session.select(3, &decisions).await.unwrap();

    assert_eq!(
        session.notices().information(),
        vec!["Data description was generated from a sample."]
    );
    assert!(session.dataset().is_some());
}

#[tokio::test]
async fn test_custom_query_with_materialization() {
    let backend = MockBackend::builder()
        .with_standard_schema()
        .with_query_result(iris_table())
        .build();
    let mut session = session_over(&backend, IngestSettings::default());
    session.connect(&params(), &DeclineAll).await.unwrap();

    session.select(CUSTOM_INDEX, &DeclineAll).await.unwrap();
    assert!(session.editor_visible());
    assert!(session.dataset().is_none());

    let settings = session.settings_mut();
    settings.sql = "SELECT * FROM iris;".into();
    settings.materialize = true;
    settings.materialize_table_name = "iris_copy".into();
    backend.clear_calls();

    session.open_table(&DeclineAll).await.unwrap();

    assert_eq!(
        backend.executed(),
        vec![
            "DROP TABLE IF EXISTS iris_copy",
            "CREATE TABLE iris_copy AS SELECT * FROM iris",
            "ANALYZE iris_copy",
        ]
    );
    assert!(backend.calls().contains(&BackendCall::OpenRelation(
        RelationSource::Query("SELECT * FROM iris;".into())
    )));
    assert_eq!(session.settings().table.as_deref(), Some(CUSTOM_LABEL));
    assert_eq!(session.description(), Some(CUSTOM_QUERY_DESCRIPTION));
    assert!(session.dataset().is_some());
}

#[tokio::test]
async fn test_empty_custom_query_is_rejected() {
    let backend = MockBackend::builder().with_standard_schema().build();
    let settings = IngestSettings {
        table: Some("iris".into()),
        ..Default::default()
    };
    let mut session = session_over(&backend, settings);
    session.connect(&params(), &DeclineAll).await.unwrap();

    session.select(CUSTOM_INDEX, &DeclineAll).await.unwrap();
    let err = session.open_table(&DeclineAll).await.unwrap_err();

    assert_eq!(err.to_string(), "Query cannot be empty.");
    assert_eq!(session.description(), Some(NO_TABLE_DESCRIPTION));
    assert!(session.dataset().is_none());
    assert!(backend.executed().is_empty());
}

#[tokio::test]
async fn test_load_queries_merges_into_catalog() {
    let backend = MockBackend::builder()
        .with_standard_schema()
        .with_query_result(iris_table())
        .build();
    let first = write_resource_file(ResourceFixtures::single_query()).unwrap();
    let second = write_resource_file(ResourceFixtures::one_line_query()).unwrap();
    let mut session = session_over(&backend, IngestSettings::default());
    session.connect(&params(), &DeclineAll).await.unwrap();

    session.settings_mut().path_to_res_file = first.path().display().to_string();
    session.load_queries_from_file().await.unwrap();
    session.settings_mut().path_to_res_file = second.path().display().to_string();
    session.load_queries_from_file().await.unwrap();

    assert_eq!(
        labels(&session),
        vec!["(none)", "(custom)", "TOP_CUSTOMERS", "ALL_IRIS", "iris", "events"]
    );

    session.select(3, &DeclineAll).await.unwrap();
    assert!(session.editor_visible());
    assert_eq!(session.settings().sql, "SELECT * FROM iris;");

    session.open_table(&DeclineAll).await.unwrap();
    assert_eq!(session.description(), Some(FILE_QUERY_DESCRIPTION));
    assert_eq!(session.settings().table.as_deref(), Some("ALL_IRIS"));
}

#[tokio::test]
async fn test_failed_load_leaves_queries_untouched() {
    let backend = MockBackend::builder().with_standard_schema().build();
    let file = write_resource_file(ResourceFixtures::single_query()).unwrap();
    let mut session = session_over(&backend, IngestSettings::default());
    session.connect(&params(), &DeclineAll).await.unwrap();

    session.settings_mut().path_to_res_file = file.path().display().to_string();
    session.load_queries_from_file().await.unwrap();
    let before = labels(&session);

    session.settings_mut().path_to_res_file = "/nonexistent/queries.sql".into();
    let err = session.load_queries_from_file().await.unwrap_err();

    assert!(matches!(err, IngestError::Io { .. }));
    assert_eq!(labels(&session), before);
    assert_eq!(session.file_queries().len(), 1);
}

#[tokio::test]
async fn test_failed_connection_stays_disconnected() {
    let backend = MockBackend::builder().build();
    let factory = MockBackendFactory::new(backend)
        .failing_with(BackendError::ConnectionFailed("timeout expired".into()));
    let registry = BackendRegistry::new().with_factory(Arc::new(factory));
    let mut session = SqlSession::new(registry, IngestSettings::default()).unwrap();

    let err = session.connect(&params(), &DeclineAll).await.unwrap_err();

    assert!(matches!(
        err,
        IngestError::Backend(BackendError::ConnectionFailed(_))
    ));
    assert!(!session.is_connected());
    assert!(session.catalog().is_empty());
}

#[tokio::test]
async fn test_failed_listing_disconnects() {
    let backend = MockBackend::builder().failing_listing().build();
    let mut session = session_over(&backend, IngestSettings::default());

    assert!(session.connect(&params(), &DeclineAll).await.is_err());
    assert!(!session.is_connected());
}

#[tokio::test]
async fn test_remembered_backend_is_selected() {
    let postgres = MockBackend::builder().build();
    let mysql = MockBackendBuilder::mysql().build();
    let registry = BackendRegistry::new()
        .with_factory(Arc::new(MockBackendFactory::new(postgres)))
        .with_factory(Arc::new(MockBackendFactory::new(mysql)));
    let settings = IngestSettings {
        selected_backend: Some("MySQL".into()),
        ..Default::default()
    };
    let session = SqlSession::new(registry, settings).unwrap();

    let selected = session.selected_backend().unwrap();
    assert_eq!(selected.dialect, Dialect::MySQL);
    assert_eq!(session.available_backends().len(), 2);
}

#[test]
fn test_empty_registry_is_rejected() {
    let result = SqlSession::new(BackendRegistry::new(), IngestSettings::default());
    assert!(matches!(result, Err(IngestError::NoBackends)));
}

#[tokio::test]
async fn test_reopening_unchanged_selection_gives_equal_domain() {
    let backend = MockBackend::builder().with_standard_schema().build();
    let settings = IngestSettings {
        table: Some("iris".into()),
        ..Default::default()
    };
    let mut session = session_over(&backend, settings);
    session.connect(&params(), &DeclineAll).await.unwrap();
    let first = session.dataset().unwrap().domain().clone();
    backend.clear_calls();

    session.open_table(&DeclineAll).await.unwrap();

    assert!(backend
        .calls()
        .contains(&BackendCall::OpenRelation(RelationSource::Table("iris".into()))));
    assert_eq!(session.dataset().unwrap().domain(), &first);
    assert_eq!(session.description(), Some("iris"));
    assert_eq!(session.current_index(), 2);
}

// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Session controller
//!
//! [`SqlSession`] ties the pieces together for one user: the selected
//! backend, loaded file queries, the source catalog, the current selection
//! and the last dataset. It owns [`IngestSettings`] for its lifetime and
//! returns them from [`SqlSession::into_settings`].
//!
//! Every state-changing operation takes `&mut self`, so one session never
//! runs two cycles against its backend at once.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut session = SqlSession::new(BackendRegistry::with_connector(connector), settings)?;
//! session.connect(&ConnectionParams::new("localhost", "shop"), &DeclineAll).await?;
//! let index = session.catalog().position_of("orders").unwrap_or(0);
//! session.select(index, &DeclineAll).await?;
//! if let Some(dataset) = session.dataset() {
//!     println!("{} rows", dataset.row_count());
//! }
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use sql_ingest_backend::{Backend, BackendDescriptor, BackendRegistry, ConnectionParams};

use crate::dataset::Dataset;
use crate::decision::DecisionPort;
use crate::error::{IngestError, IngestResult};
use crate::pipeline::{IngestOptions, IngestionPipeline};
use crate::resource_file::{NamedQueries, parse_resource_file};
use crate::resolver::SourceResolver;
use crate::settings::IngestSettings;
use crate::source_catalog::{CUSTOM_LABEL, Catalog, SourceSelection};

/// Description shown when nothing is loaded
pub const NO_TABLE_DESCRIPTION: &str = "(None)";
/// Description of a source loaded from the resource file
pub const FILE_QUERY_DESCRIPTION: &str = "Loaded from File";
/// Description of a custom query source
pub const CUSTOM_QUERY_DESCRIPTION: &str = "Custom SQL";

pub const NOT_CONNECTED_MESSAGE: &str = "Not connected to a database.";

/// Messages for the user about the current state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notices {
    /// Server extensions the backend could not find
    pub missing_extensions: Vec<String>,
    /// The current domain was inferred from a sample
    pub data_sampled: bool,
    /// Why the last download was refused
    pub download_refused: Option<String>,
}

impl Notices {
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.missing_extensions.is_empty() {
            warnings.push(format!(
                "Database is missing extensions: {}",
                self.missing_extensions.join(", ")
            ));
        }
        if let Some(refused) = &self.download_refused {
            warnings.push(refused.clone());
        }
        warnings
    }

    pub fn information(&self) -> Vec<String> {
        if self.data_sampled {
            vec!["Data description was generated from a sample.".to_string()]
        } else {
            Vec::new()
        }
    }
}

/// One user's ingestion session
pub struct SqlSession {
    settings: IngestSettings,
    registry: BackendRegistry,
    backend: Option<Arc<dyn Backend>>,
    file_queries: NamedQueries,
    catalog: Catalog,
    current: usize,
    editor_visible: bool,
    description: Option<String>,
    dataset: Option<Dataset>,
    notices: Notices,
    download_locked: bool,
}

impl SqlSession {
    /// Create a session
    ///
    /// # Errors
    ///
    /// Fails when the registry is empty or the settings are invalid.
    pub fn new(registry: BackendRegistry, settings: IngestSettings) -> IngestResult<Self> {
        if registry.is_empty() {
            return Err(IngestError::NoBackends);
        }
        settings.validate()?;

        Ok(Self {
            settings,
            registry,
            backend: None,
            file_queries: NamedQueries::new(),
            catalog: Catalog::empty(),
            current: 0,
            editor_visible: false,
            description: None,
            dataset: None,
            notices: Notices::default(),
            download_locked: false,
        })
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Mutable settings, e.g. for editing the custom query
    pub fn settings_mut(&mut self) -> &mut IngestSettings {
        &mut self.settings
    }

    pub fn into_settings(self) -> IngestSettings {
        self.settings
    }

    pub fn available_backends(&self) -> Vec<BackendDescriptor> {
        self.registry.list_available()
    }

    /// The remembered backend when it is still available, else the first one
    pub fn selected_backend(&self) -> Option<BackendDescriptor> {
        let available = self.registry.list_available();
        let remembered = self.settings.selected_backend.as_deref().and_then(|name| {
            available
                .iter()
                .find(|d| d.display_name == name)
                .cloned()
        });
        remembered.or_else(|| available.into_iter().next())
    }

    pub fn select_backend(&mut self, name: &str) -> IngestResult<()> {
        if self.registry.select_by_name(name).is_none() {
            return Err(IngestError::UnknownBackend(name.to_string()));
        }
        self.settings.selected_backend = Some(name.to_string());
        Ok(())
    }

    pub fn backend(&self) -> Option<&Arc<dyn Backend>> {
        self.backend.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    /// Connect to the selected backend and restore the last source
    ///
    /// # Errors
    ///
    /// A failed connection or table listing leaves the session disconnected.
    /// An error opening the restored source is returned with the session
    /// still connected.
    pub async fn connect(
        &mut self,
        params: &ConnectionParams,
        decisions: &dyn DecisionPort,
    ) -> IngestResult<()> {
        let descriptor = self.selected_backend().ok_or(IngestError::NoBackends)?;
        let factory = self
            .registry
            .select_by_name(&descriptor.display_name)
            .ok_or_else(|| IngestError::UnknownBackend(descriptor.display_name.clone()))?;

        self.disconnect();
        let backend = factory.connect(params).await.inspect_err(|e| {
            warn!(backend = %descriptor.display_name, error = %e, "Connection failed");
        })?;
        info!(backend = %descriptor.display_name, "Connected");

        self.settings.selected_backend = Some(descriptor.display_name);

        let missing: Vec<String> = backend.missing_extensions().iter().cloned().collect();
        if !missing.is_empty() || !backend.capabilities().supports_percentage_sampling {
            self.settings.download = true;
            self.download_locked = true;
        }
        self.notices.missing_extensions = missing;
        self.backend = Some(backend);

        if let Err(e) = self.refresh_catalog().await {
            self.disconnect();
            return Err(e);
        }
        self.select(self.current, decisions).await
    }

    /// Drop the backend and everything derived from it
    pub fn disconnect(&mut self) {
        if self.backend.take().is_some() {
            debug!("Disconnected");
        }
        self.catalog = Catalog::empty();
        self.current = 0;
        self.editor_visible = false;
        self.description = None;
        self.dataset = None;
        self.notices = Notices::default();
        self.download_locked = false;
    }

    /// Whether download was forced on by the backend's limitations
    pub fn download_locked(&self) -> bool {
        self.download_locked
    }

    /// Turn download on or off; ignored while locked
    pub fn set_download(&mut self, download: bool) -> bool {
        if !self.download_locked {
            self.settings.download = download;
        }
        self.settings.download
    }

    pub fn file_queries(&self) -> &NamedQueries {
        &self.file_queries
    }

    /// Load named queries from the configured resource file
    ///
    /// New queries are merged into those already loaded. Nothing changes
    /// when the file cannot be parsed or the catalog cannot be rebuilt.
    pub async fn load_queries_from_file(&mut self) -> IngestResult<()> {
        let parsed = parse_resource_file(&self.settings.path_to_res_file)?;
        let mut merged = self.file_queries.clone();
        merged.merge(parsed);

        let catalog = Catalog::rebuild(
            self.backend.as_deref(),
            &merged,
            self.settings.schema.as_deref(),
        )
        .await?;
        info!(queries = merged.len(), "Loaded queries from file");
        self.file_queries = merged;
        self.install_catalog(catalog);
        Ok(())
    }

    /// Rebuild the catalog and reselect the last source by label
    pub async fn refresh_catalog(&mut self) -> IngestResult<()> {
        let catalog = Catalog::rebuild(
            self.backend.as_deref(),
            &self.file_queries,
            self.settings.schema.as_deref(),
        )
        .await?;
        self.install_catalog(catalog);
        Ok(())
    }

    fn install_catalog(&mut self, catalog: Catalog) {
        self.current = self
            .settings
            .table
            .as_deref()
            .and_then(|label| catalog.position_of(label))
            .unwrap_or(0);
        self.catalog = catalog;
        if self.catalog.is_empty() {
            self.description = None;
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Whether the query editor is showing
    pub fn editor_visible(&self) -> bool {
        self.editor_visible
    }

    /// Select a catalog entry
    ///
    /// The custom entry and named queries open the editor; a named query's
    /// text is copied into it. Other entries are opened right away.
    pub async fn select(&mut self, index: usize, decisions: &dyn DecisionPort) -> IngestResult<()> {
        self.current = if index < self.catalog.len() { index } else { 0 };

        if self.catalog.is_editor_entry(self.current, &self.file_queries) {
            self.editor_visible = true;
            self.dataset = None;
            self.description = Some(NO_TABLE_DESCRIPTION.to_string());
            self.settings.table = None;
            let label = self.catalog.get(self.current).map(|e| e.label().to_string());
            if let Some(sql) = label.as_deref().and_then(|l| self.file_queries.get(l)) {
                self.settings.sql = sql.to_string();
            }
            return Ok(());
        }

        self.editor_visible = false;
        self.open_table(decisions).await
    }

    /// Resolve and ingest the current selection
    ///
    /// # Errors
    ///
    /// On error the previous dataset, description and settings are kept.
    pub async fn open_table(&mut self, decisions: &dyn DecisionPort) -> IngestResult<()> {
        let backend = self
            .backend
            .clone()
            .ok_or_else(|| IngestError::Validation(NOT_CONNECTED_MESSAGE.to_string()))?;
        let selection = self.catalog.resolve_selection(
            self.current,
            &self.file_queries,
            &self.settings.custom_query(),
        );

        let resolved = SourceResolver::new(backend.as_ref(), &self.file_queries)
            .resolve(&selection)
            .await?;
        let Some(resolved) = resolved else {
            self.description = Some(NO_TABLE_DESCRIPTION.to_string());
            self.dataset = None;
            self.notices.data_sampled = false;
            return Ok(());
        };

        let options = IngestOptions::from(&self.settings);
        let ingestion = IngestionPipeline::new(backend.as_ref(), decisions, options)
            .ingest(&resolved)
            .await?;

        let (table, description) = match &selection {
            SourceSelection::NamedQuery { name } => (name.clone(), FILE_QUERY_DESCRIPTION.to_string()),
            SourceSelection::LiveTable { table_name } => (table_name.clone(), table_name.clone()),
            _ => (CUSTOM_LABEL.to_string(), CUSTOM_QUERY_DESCRIPTION.to_string()),
        };
        self.settings.table = Some(table);
        self.description = Some(description);
        if ingestion.discovery_declined {
            self.settings.guess_values = false;
        }
        self.notices.data_sampled = ingestion.domain_sampled;
        self.notices.download_refused = ingestion.outcome.refusal_message();
        self.dataset = ingestion.outcome.into_dataset();
        Ok(())
    }

    /// Description of the loaded source
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DeclineAll;
    use crate::testing::StubBackend;
    use async_trait::async_trait;
    use sql_ingest_backend::{BackendFactory, BackendResult};
    use sql_ingest_ir::Dialect;

    struct StubFactory {
        tables: &'static [&'static str],
        sampling: bool,
    }

    #[async_trait]
    impl BackendFactory for StubFactory {
        fn descriptor(&self) -> BackendDescriptor {
            BackendDescriptor::new(Dialect::PostgreSQL).with_display_name("Stub")
        }

        async fn connect(&self, _params: &ConnectionParams) -> BackendResult<Arc<dyn Backend>> {
            Ok(Arc::new(
                StubBackend::new()
                    .with_tables(self.tables)
                    .with_sampling(self.sampling),
            ))
        }
    }

    fn session(tables: &'static [&'static str], sampling: bool) -> SqlSession {
        let registry = BackendRegistry::new().with_factory(Arc::new(StubFactory { tables, sampling }));
        SqlSession::new(registry, IngestSettings::default()).unwrap()
    }

    fn params() -> ConnectionParams {
        ConnectionParams::new("localhost", "db")
    }

    #[test]
    fn test_empty_registry() {
        let result = SqlSession::new(BackendRegistry::new(), IngestSettings::default());
        assert!(matches!(result, Err(IngestError::NoBackends)));
    }

    #[test]
    fn test_selected_backend_falls_back_to_first() {
        let mut s = session(&[], true);
        s.settings_mut().selected_backend = Some("Gone".into());
        assert_eq!(s.selected_backend().unwrap().display_name, "Stub");
        assert!(matches!(
            s.select_backend("Gone"),
            Err(IngestError::UnknownBackend(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_builds_catalog() {
        let mut s = session(&["t1", "t2"], true);
        s.connect(&params(), &DeclineAll).await.unwrap();

        assert!(s.is_connected());
        assert_eq!(
            s.catalog().labels().collect::<Vec<_>>(),
            vec!["(none)", "(custom)", "t1", "t2"]
        );
        assert_eq!(s.description(), Some(NO_TABLE_DESCRIPTION));
        assert!(!s.download_locked());
    }

    #[tokio::test]
    async fn test_capability_limited_backend_forces_download() {
        let mut s = session(&["t1"], false);
        s.connect(&params(), &DeclineAll).await.unwrap();

        assert!(s.settings().download);
        assert!(s.download_locked());
        assert!(s.set_download(false));
    }

    #[tokio::test]
    async fn test_open_live_table_updates_state() {
        let mut s = session(&["t1", "t2"], true);
        s.connect(&params(), &DeclineAll).await.unwrap();
        s.select(3, &DeclineAll).await.unwrap();

        assert_eq!(s.settings().table.as_deref(), Some("t2"));
        assert_eq!(s.description(), Some("t2"));
        assert!(s.dataset().is_some());
    }

    #[tokio::test]
    async fn test_reconnect_restores_last_table() {
        let mut s = session(&["t1", "t2"], true);
        s.connect(&params(), &DeclineAll).await.unwrap();
        s.select(3, &DeclineAll).await.unwrap();
        s.disconnect();
        assert!(s.dataset().is_none());

        s.connect(&params(), &DeclineAll).await.unwrap();
        assert_eq!(s.current_index(), 3);
        assert!(s.dataset().is_some());
    }

    #[tokio::test]
    async fn test_custom_entry_shows_editor_without_executing() {
        let mut s = session(&["t1"], true);
        s.connect(&params(), &DeclineAll).await.unwrap();
        s.select(2, &DeclineAll).await.unwrap();
        assert!(s.dataset().is_some());

        s.select(1, &DeclineAll).await.unwrap();
        assert!(s.editor_visible());
        assert!(s.dataset().is_none());
        assert_eq!(s.settings().table, None);
    }

    #[tokio::test]
    async fn test_failed_custom_query_keeps_previous_dataset() {
        let mut s = session(&["t1"], true);
        s.connect(&params(), &DeclineAll).await.unwrap();
        s.select(2, &DeclineAll).await.unwrap();

        s.settings_mut().sql = "SELECT 1".into();
        s.settings_mut().materialize = true;
        s.current = 1;
        let result = s.open_table(&DeclineAll).await;

        assert!(matches!(result, Err(IngestError::Validation(_))));
        assert_eq!(s.description(), Some("t1"));
        assert!(s.dataset().is_some());
    }

    #[tokio::test]
    async fn test_open_table_requires_connection() {
        let mut s = session(&[], true);
        let result = s.open_table(&DeclineAll).await;
        assert!(matches!(result, Err(IngestError::Validation(msg)) if msg == NOT_CONNECTED_MESSAGE));
    }

    #[test]
    fn test_notices_messages() {
        let notices = Notices {
            missing_extensions: vec!["quantile".into(), "tsm_system_time".into()],
            data_sampled: true,
            download_refused: None,
        };
        assert_eq!(
            notices.warnings(),
            vec!["Database is missing extensions: quantile, tsm_system_time"]
        );
        assert_eq!(notices.information().len(), 1);
    }
}

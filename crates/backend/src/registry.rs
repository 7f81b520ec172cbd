// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Backend registry
//!
//! This module enumerates the backend implementations an application has
//! available.
//!
//! The registry is responsible for:
//! - Listing backends in registration order
//! - Selecting a backend factory by its display name
//!
//! It never connects on its own; connecting is a separate step through
//! [`BackendFactory::connect`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::{ConnectionParams, Connector};
use crate::error::BackendResult;
use crate::live_mysql::MySqlFactory;
use crate::live_postgres::PostgresFactory;
use crate::r#trait::Backend;
use sql_ingest_ir::Dialect;

/// Describes an available backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendDescriptor {
    pub display_name: String,
    pub dialect: Dialect,
}

impl BackendDescriptor {
    /// Descriptor named after the dialect
    pub fn new(dialect: Dialect) -> Self {
        Self {
            display_name: dialect.display_name().to_string(),
            dialect,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }
}

/// Opens backends of one kind
#[async_trait]
pub trait BackendFactory: Send + Sync {
    fn descriptor(&self) -> BackendDescriptor;

    /// Open a connection to a database server
    async fn connect(&self, params: &ConnectionParams) -> BackendResult<Arc<dyn Backend>>;
}

/// Backend registry
///
/// Holds factories for the backends an application can connect to.
#[derive(Default)]
pub struct BackendRegistry {
    factories: Vec<Arc<dyn BackendFactory>>,
}

impl BackendRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the PostgreSQL and MySQL backends over one driver connector
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let registry = BackendRegistry::with_connector(Arc::new(SqlxConnector::new()));
    /// let factory = registry.select_by_name("PostgreSQL").unwrap();
    /// let backend = factory.connect(&params).await?;
    /// ```
    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self::new()
            .with_factory(Arc::new(PostgresFactory::new(connector.clone())))
            .with_factory(Arc::new(MySqlFactory::new(connector)))
    }

    /// Add a factory, builder style
    pub fn with_factory(mut self, factory: Arc<dyn BackendFactory>) -> Self {
        self.register(factory);
        self
    }

    /// Add a factory
    ///
    /// A factory with the same display name as an existing one replaces it
    /// in place.
    pub fn register(&mut self, factory: Arc<dyn BackendFactory>) {
        let name = factory.descriptor().display_name;
        match self
            .factories
            .iter()
            .position(|f| f.descriptor().display_name == name)
        {
            Some(pos) => self.factories[pos] = factory,
            None => self.factories.push(factory),
        }
        debug!(backend = %name, "Registered backend");
    }

    /// Available backends, in registration order
    pub fn list_available(&self) -> Vec<BackendDescriptor> {
        self.factories.iter().map(|f| f.descriptor()).collect()
    }

    /// Factory for the backend with this display name
    pub fn select_by_name(&self, name: &str) -> Option<Arc<dyn BackendFactory>> {
        self.factories
            .iter()
            .find(|f| f.descriptor().display_name == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

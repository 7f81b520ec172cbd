// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Scripted driver connection for unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::connection::{Connection, Connector, QueryResult};
use crate::error::{BackendError, BackendResult};

#[derive(Default)]
struct Script {
    responses: Vec<(String, BackendResult<QueryResult>)>,
    executed: Vec<String>,
}

/// Connection answering statements by prefix; unmatched statements get an
/// empty result
#[derive(Clone, Default)]
pub(crate) struct ScriptedConnection {
    script: Arc<Mutex<Script>>,
}

impl ScriptedConnection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, prefix: &str, result: QueryResult) -> Self {
        self.script
            .lock()
            .unwrap()
            .responses
            .push((prefix.to_string(), Ok(result)));
        self
    }

    pub(crate) fn fail(self, prefix: &str, message: &str) -> Self {
        self.script.lock().unwrap().responses.push((
            prefix.to_string(),
            Err(BackendError::QueryFailed(message.to_string())),
        ));
        self
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.script.lock().unwrap().executed.clone()
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn execute(&self, sql: &str) -> BackendResult<QueryResult> {
        let mut script = self.script.lock().unwrap();
        script.executed.push(sql.to_string());
        script
            .responses
            .iter()
            .find(|(prefix, _)| sql.starts_with(prefix.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(|| Ok(QueryResult::empty()))
    }
}

pub(crate) struct ScriptedConnector {
    connection: ScriptedConnection,
}

impl ScriptedConnector {
    pub(crate) fn new(connection: ScriptedConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _connection_string: &str) -> BackendResult<Arc<dyn Connection>> {
        Ok(Arc::new(self.connection.clone()))
    }
}

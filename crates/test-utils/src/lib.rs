// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for sql-ingest
//!
//! This crate provides common testing components including:
//! - Mock backend and factory implementations
//! - Scripted answers to ingestion prompts
//! - Domain assertions
//! - Resource file fixtures

pub mod assertions;
pub mod decisions;
pub mod fixtures;
pub mod mock_backend;

// Re-exports for convenience
pub use assertions::DomainAssertions;
pub use decisions::ScriptedDecisions;
pub use fixtures::{ResourceFixtures, write_resource_file};
pub use mock_backend::{
    BackendCall, MockBackend, MockBackendBuilder, MockBackendFactory, MockTable, events_table,
    iris_table,
};

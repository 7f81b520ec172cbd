// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Ingest
//!
//! Discovers SQL sources and ingests them into typed, columnar datasets.
//!
//! ## Architecture
//!
//! - [`resource_file`]: named queries parsed from a SQL resource file
//! - [`source_catalog`]: the ordered list of selectable sources
//! - [`resolver`]: what to open for a selection, materializing custom queries
//! - [`pipeline`]: opening, discovery and the size-gated download policy
//! - [`decision`]: ports answering the pipeline's prompts
//! - [`session`]: a user session tying the above to one backend
//!
//! Database access goes through `sql_ingest_backend::Backend`; this crate
//! never talks to a driver directly.

pub mod dataset;
pub mod decision;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod resource_file;
pub mod session;
pub mod settings;
pub mod source_catalog;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use dataset::Dataset;
pub use decision::{
    DecisionPort, DeclineAll, DiscoveryChoice, DiscoveryPrompt, DownloadChoice, DownloadPrompt,
    FixedPolicy,
};
pub use error::{IngestError, IngestResult};
pub use pipeline::{IngestOptions, IngestOutcome, Ingestion, IngestionPipeline};
pub use resolver::{Resolved, SourceResolver};
pub use resource_file::{
    NamedQueries, ParseState, ResourceFileParser, parse_resource_content, parse_resource_file,
};
pub use session::{Notices, SqlSession};
pub use settings::{ConfigError, IngestSettings, SizeLimits};
pub use source_catalog::{Catalog, CatalogEntry, CustomQuery, SourceSelection};

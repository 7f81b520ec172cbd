// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Print the named queries of a resource file as JSON

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let path = std::env::args()
        .nth(1)
        .context("usage: sql-ingest-queries <resource-file>")?;

    let queries = sql_ingest::parse_resource_file(&path)
        .with_context(|| format!("Cannot load queries from {}", path))?;
    tracing::info!(count = queries.len(), "Loaded queries");

    println!("{}", serde_json::to_string_pretty(&queries)?);
    Ok(())
}

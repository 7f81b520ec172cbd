// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Ingestion pipeline
//!
//! Opens a resolved source and turns it into a [`Dataset`]:
//!
//! 1. open the relation (type-only domain)
//! 2. on large relations, ask whether to discover attributes
//! 3. discover attributes on the whole relation or a time sample
//! 4. when downloading above the auto-download limit, ask, refuse or sample
//! 5. download, or hand back the lazy relation
//!
//! Every prompt is answered before the backend call it guards.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sql_ingest_backend::{Backend, Relation, Sample};

use crate::dataset::Dataset;
use crate::decision::{
    DecisionPort, DiscoveryChoice, DiscoveryPrompt, DownloadChoice, DownloadPrompt,
    group_thousands,
};
use crate::error::{IngestError, IngestResult};
use crate::resolver::Resolved;
use crate::settings::{IngestSettings, SizeLimits};

/// Duration of the sample used for sampled discovery
pub const DEFAULT_SAMPLE_TIME: Duration = Duration::from_secs(1);

/// Switches and limits of one ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    pub guess_values: bool,
    pub download: bool,
    pub limits: SizeLimits,
    pub sample_time: Duration,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            guess_values: true,
            download: false,
            limits: SizeLimits::default(),
            sample_time: DEFAULT_SAMPLE_TIME,
        }
    }
}

impl From<&IngestSettings> for IngestOptions {
    fn from(settings: &IngestSettings) -> Self {
        Self {
            guess_values: settings.guess_values,
            download: settings.download,
            limits: settings.limits,
            sample_time: DEFAULT_SAMPLE_TIME,
        }
    }
}

/// How an ingestion ended
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Loaded(Dataset),
    /// The download prompt was declined
    Declined,
    /// Too large to download; nobody was asked
    Refused { approx_rows: u64, limit: u64 },
}

impl IngestOutcome {
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            IngestOutcome::Loaded(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn into_dataset(self) -> Option<Dataset> {
        match self {
            IngestOutcome::Loaded(dataset) => Some(dataset),
            _ => None,
        }
    }

    /// Message for a refused download
    pub fn refusal_message(&self) -> Option<String> {
        match self {
            IngestOutcome::Refused { approx_rows, limit } => Some(format!(
                "Data is too big to download.\nTable length: {}. Limit {}",
                group_thousands(*approx_rows),
                group_thousands(*limit)
            )),
            _ => None,
        }
    }
}

/// Result of [`IngestionPipeline::ingest`]
#[derive(Debug, Clone, PartialEq)]
pub struct Ingestion {
    pub outcome: IngestOutcome,
    /// The domain was inferred from a sample
    pub domain_sampled: bool,
    /// Discovery was skipped at the prompt; callers should stop asking
    pub discovery_declined: bool,
}

pub struct IngestionPipeline<'a> {
    backend: &'a dyn Backend,
    decisions: &'a dyn DecisionPort,
    options: IngestOptions,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        decisions: &'a dyn DecisionPort,
        options: IngestOptions,
    ) -> Self {
        Self {
            backend,
            decisions,
            options,
        }
    }

    /// Ingest a resolved source
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Connection` when the source cannot be opened and
    /// `IngestError::Backend` when a later backend call fails.
    pub async fn ingest(&self, resolved: &Resolved) -> IngestResult<Ingestion> {
        let limits = self.options.limits;

        let mut relation = self
            .backend
            .open_relation(resolved.source.clone())
            .await
            .map_err(|e| IngestError::Connection(e.to_string()))?;
        let approx_rows = self.backend.approx_row_count(&relation).await?;
        debug!(approx_rows, source = ?resolved.source, "Opened relation");

        // Only base tables can be sampled
        let samplable = !resolved.source.is_query();
        let capabilities = self.backend.capabilities();

        let mut discovery = self.options.guess_values.then_some(DiscoveryChoice::Full);
        let mut discovery_declined = false;
        if approx_rows > limits.large_table && self.options.guess_values {
            let prompt = DiscoveryPrompt {
                approx_rows,
                large_table_limit: limits.large_table,
                offer_sample: samplable && capabilities.supports_time_sampling,
            };
            let choice = Some(self.decisions.decide_discovery(&prompt))
                .filter(|c| prompt.allows(*c))
                .unwrap_or(DiscoveryChoice::Skip);
            info!(approx_rows, ?choice, "Discovery decision");
            discovery = Some(choice).filter(|c| *c != DiscoveryChoice::Skip);
            discovery_declined = choice == DiscoveryChoice::Skip;
        }

        let mut domain_sampled = false;
        match discovery {
            Some(DiscoveryChoice::Sampled) => {
                let sample = self
                    .backend
                    .sample(&relation, Sample::Time(self.options.sample_time))
                    .await?;
                let domain = self.backend.infer_domain(&sample, true).await?;
                relation.set_domain(domain);
                domain_sampled = true;
            }
            Some(_) => {
                let domain = self.backend.infer_domain(&relation, true).await?;
                relation.set_domain(domain);
            }
            None => {}
        }

        let outcome = if self.options.download {
            let sampling = samplable && capabilities.supports_percentage_sampling;
            self.download(relation, approx_rows, sampling).await?
        } else {
            IngestOutcome::Loaded(Dataset::Remote {
                relation,
                approx_rows,
            })
        };

        Ok(Ingestion {
            outcome,
            domain_sampled,
            discovery_declined,
        })
    }

    async fn download(
        &self,
        relation: Relation,
        approx_rows: u64,
        sampling: bool,
    ) -> IngestResult<IngestOutcome> {
        let limits = self.options.limits;
        let mut relation = relation;

        if approx_rows > limits.auto_download {
            if !sampling && approx_rows > limits.max_download {
                info!(approx_rows, limit = limits.max_download, "Download refused");
                return Ok(IngestOutcome::Refused {
                    approx_rows,
                    limit: limits.max_download,
                });
            }

            let prompt = DownloadPrompt {
                approx_rows,
                max_download_limit: limits.max_download,
                offer_download: approx_rows <= limits.max_download,
                offer_sample: sampling,
            };
            let choice = Some(self.decisions.decide_download(&prompt))
                .filter(|c| prompt.allows(*c))
                .unwrap_or(DownloadChoice::Decline);
            info!(approx_rows, ?choice, "Download decision");

            match choice {
                DownloadChoice::Decline => return Ok(IngestOutcome::Declined),
                DownloadChoice::Sample => {
                    let percentage = limits.auto_download as f64 / approx_rows as f64 * 100.0;
                    relation = self
                        .backend
                        .sample(&relation, Sample::Percentage(percentage))
                        .await?;
                }
                DownloadChoice::Download => {}
            }
        }

        let table = self.backend.download(&relation, limits.max_download).await?;
        info!(rows = table.len(), "Downloaded data");
        Ok(IngestOutcome::Loaded(Dataset::Local { table }))
    }
}

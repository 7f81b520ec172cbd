// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Decision ports
//!
//! Ingesting a large relation pauses twice for a decision: whether to run
//! attribute discovery, and whether to download. The pipeline asks a
//! [`DecisionPort`] and never renders anything itself. Each prompt lists
//! the choices it offers; an answer outside that list counts as declining.

use serde::{Deserialize, Serialize};

/// Answer to the discovery prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscoveryChoice {
    /// Inspect values of the whole relation
    Full,
    /// Keep the type-only domain and stop asking
    Skip,
    /// Inspect values of a time-bounded sample
    Sampled,
}

/// Answer to the download prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadChoice {
    Download,
    Decline,
    /// Download a sample sized to the auto-download limit
    Sample,
}

/// Asked before discovering attributes of a large relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryPrompt {
    pub approx_rows: u64,
    pub large_table_limit: u64,
    /// Whether [`DiscoveryChoice::Sampled`] is offered
    pub offer_sample: bool,
}

impl DiscoveryPrompt {
    pub fn allows(&self, choice: DiscoveryChoice) -> bool {
        match choice {
            DiscoveryChoice::Full | DiscoveryChoice::Skip => true,
            DiscoveryChoice::Sampled => self.offer_sample,
        }
    }

    pub fn choices(&self) -> Vec<DiscoveryChoice> {
        [
            DiscoveryChoice::Full,
            DiscoveryChoice::Skip,
            DiscoveryChoice::Sampled,
        ]
        .into_iter()
        .filter(|c| self.allows(*c))
        .collect()
    }

    pub fn message(&self) -> String {
        "Attribute discovery might take a long time on large tables.\n\
         Do you want to auto discover attributes?"
            .to_string()
    }
}

/// Asked before downloading a relation above the auto-download limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadPrompt {
    pub approx_rows: u64,
    pub max_download_limit: u64,
    /// Whether [`DownloadChoice::Download`] is offered
    pub offer_download: bool,
    /// Whether [`DownloadChoice::Sample`] is offered
    pub offer_sample: bool,
}

impl DownloadPrompt {
    pub fn allows(&self, choice: DownloadChoice) -> bool {
        match choice {
            DownloadChoice::Download => self.offer_download,
            DownloadChoice::Decline => true,
            DownloadChoice::Sample => self.offer_sample,
        }
    }

    pub fn choices(&self) -> Vec<DownloadChoice> {
        [
            DownloadChoice::Download,
            DownloadChoice::Decline,
            DownloadChoice::Sample,
        ]
        .into_iter()
        .filter(|c| self.allows(*c))
        .collect()
    }

    pub fn message(&self) -> String {
        format!(
            "Data appears to be big. Do you really want to download it to local memory?\n\
             Table length: {}. Limit {}",
            group_thousands(self.approx_rows),
            group_thousands(self.max_download_limit)
        )
    }
}

/// Format a count with `,` between groups of three digits
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Answers the prompts raised while ingesting
pub trait DecisionPort: Send + Sync {
    fn decide_discovery(&self, prompt: &DiscoveryPrompt) -> DiscoveryChoice;

    fn decide_download(&self, prompt: &DownloadPrompt) -> DownloadChoice;
}

/// Declines every prompt; the non-interactive default
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclineAll;

impl DecisionPort for DeclineAll {
    fn decide_discovery(&self, _prompt: &DiscoveryPrompt) -> DiscoveryChoice {
        DiscoveryChoice::Skip
    }

    fn decide_download(&self, _prompt: &DownloadPrompt) -> DownloadChoice {
        DownloadChoice::Decline
    }
}

/// Gives the same answers to every prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedPolicy {
    pub discovery: DiscoveryChoice,
    pub download: DownloadChoice,
}

impl FixedPolicy {
    pub fn new(discovery: DiscoveryChoice, download: DownloadChoice) -> Self {
        Self {
            discovery,
            download,
        }
    }
}

impl DecisionPort for FixedPolicy {
    fn decide_discovery(&self, _prompt: &DiscoveryPrompt) -> DiscoveryChoice {
        self.discovery
    }

    fn decide_download(&self, _prompt: &DownloadPrompt) -> DownloadChoice {
        self.download
    }
}

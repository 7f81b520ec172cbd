// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Scripted answers to ingestion prompts

use std::collections::VecDeque;
use std::sync::Mutex;

use sql_ingest::{DecisionPort, DiscoveryChoice, DiscoveryPrompt, DownloadChoice, DownloadPrompt};

/// Answers prompts from queues and records every prompt shown
///
/// An exhausted queue answers like a dismissed dialog: `Skip` or `Decline`.
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    discovery_answers: Mutex<VecDeque<DiscoveryChoice>>,
    download_answers: Mutex<VecDeque<DownloadChoice>>,
    discovery_prompts: Mutex<Vec<DiscoveryPrompt>>,
    download_prompts: Mutex<Vec<DownloadPrompt>>,
}

impl ScriptedDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_discovery(self, choice: DiscoveryChoice) -> Self {
        self.discovery_answers.lock().unwrap().push_back(choice);
        self
    }

    pub fn then_download(self, choice: DownloadChoice) -> Self {
        self.download_answers.lock().unwrap().push_back(choice);
        self
    }

    pub fn discovery_prompts(&self) -> Vec<DiscoveryPrompt> {
        self.discovery_prompts.lock().unwrap().clone()
    }

    pub fn download_prompts(&self) -> Vec<DownloadPrompt> {
        self.download_prompts.lock().unwrap().clone()
    }

    /// No prompt of either kind was shown
    pub fn silent(&self) -> bool {
        self.discovery_prompts.lock().unwrap().is_empty()
            && self.download_prompts.lock().unwrap().is_empty()
    }
}

impl DecisionPort for ScriptedDecisions {
    fn decide_discovery(&self, prompt: &DiscoveryPrompt) -> DiscoveryChoice {
        self.discovery_prompts.lock().unwrap().push(prompt.clone());
        self.discovery_answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DiscoveryChoice::Skip)
    }

    fn decide_download(&self, prompt: &DownloadPrompt) -> DownloadChoice {
        self.download_prompts.lock().unwrap().push(prompt.clone());
        self.download_answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(DownloadChoice::Decline)
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-record outcomes and batch summaries

use crate::document::Document;
use crate::error::LoaderError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Ok(Duration::from_secs_f64(secs))
}

/// Progress of one record through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStage {
    Received,
    SourceResolved,
    Loaded,
    Sampled,
    Accepted,
}

impl RecordStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStage::Received => "received",
            RecordStage::SourceResolved => "source_resolved",
            RecordStage::Loaded => "loaded",
            RecordStage::Sampled => "sampled",
            RecordStage::Accepted => "accepted",
        }
    }
}

impl fmt::Display for RecordStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final state of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Sampled and kept in the output batch
    Accepted,
    /// Nothing to load; dropped without an error
    Skipped { reason: String },
    /// Failed after `stage`; dropped from the output batch
    Rejected {
        stage: RecordStage,
        kind: String,
        reason: String,
    },
}

impl Outcome {
    pub fn rejected(stage: RecordStage, error: &LoaderError) -> Self {
        Outcome::Rejected {
            stage,
            kind: error.kind().to_string(),
            reason: error.to_string(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

/// Outcome of one record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordStatus {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub outcome: Outcome,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
}

impl RecordStatus {
    pub fn new(document: &Document, outcome: Outcome, duration: Duration) -> Self {
        Self {
            id: document.id.clone(),
            uri: document.uri().map(summarize_uri),
            outcome,
            duration,
        }
    }
}

/// Summary of one processed batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub timestamp: String,
    pub as_chunks: bool,
    pub samples: usize,
    pub total: usize,
    pub accepted: usize,
    pub skipped: usize,
    pub rejected: usize,
    #[serde(serialize_with = "serialize_duration", deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    pub records: Vec<RecordStatus>,
}

impl BatchReport {
    pub fn new(samples: usize, as_chunks: bool) -> Self {
        Self {
            timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            as_chunks,
            samples,
            total: 0,
            accepted: 0,
            skipped: 0,
            rejected: 0,
            duration: Duration::ZERO,
            records: Vec::new(),
        }
    }

    pub fn add_record(&mut self, status: RecordStatus) {
        self.total += 1;
        match status.outcome {
            Outcome::Accepted => self.accepted += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Rejected { .. } => self.rejected += 1,
        }
        self.duration += status.duration;
        self.records.push(status);
    }

    /// Fold another batch into this one
    pub fn absorb(&mut self, other: BatchReport) {
        for record in other.records {
            self.add_record(record);
        }
    }

    pub fn acceptance_rate(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.accepted as f32 / self.total as f32) * 100.0
        }
    }

    pub fn has_failures(&self) -> bool {
        self.skipped > 0 || self.rejected > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordStatus> {
        self.records.iter().filter(|r| !r.outcome.is_accepted())
    }
}

/// Data uris are shortened to their header in reports and logs
pub fn summarize_uri(uri: &str) -> String {
    if crate::io::data_uri::is_data_uri(uri) {
        match uri.split_once(',') {
            Some((header, payload)) => format!("{},<{} bytes>", header, payload.len()),
            None => uri.chars().take(32).collect(),
        }
    } else {
        uri.to_string()
    }
}

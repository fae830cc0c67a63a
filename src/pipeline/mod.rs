// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ingestion pipeline: resolve, load, sample, coordinate

mod coordinator;
mod loader;
mod report;
mod source;

pub use coordinator::Coordinator;
pub use loader::{LoadedGeometry, MeshLoader};
pub use report::{summarize_uri, BatchReport, Outcome, RecordStage, RecordStatus};
pub use source::{MeshSource, SourceResolver};

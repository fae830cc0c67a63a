// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch coordination with per-record failure isolation

use super::loader::{LoadedGeometry, MeshLoader};
use super::report::{summarize_uri, BatchReport, Outcome, RecordStage, RecordStatus};
use super::source::{MeshSource, SourceResolver};
use crate::config::{LoaderConfig, Parameters};
use crate::document::{Document, GEOMETRY_TAG};
use crate::error::{LoaderError, LoaderResult};
use crate::geometry::SurfaceSampler;
use crate::io::{Fetcher, HttpFetcher};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs documents through resolve, load and sample.
///
/// The coordinator holds immutable defaults; each call merges its own
/// [`Parameters`] on top of them. Records are processed sequentially and a
/// failing record never aborts the batch.
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: LoaderConfig,
    loader: MeshLoader,
}

impl Coordinator {
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_fetcher(config, Arc::new(HttpFetcher::new()))
    }

    pub fn with_fetcher(config: LoaderConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let loader = MeshLoader::new(fetcher, config.temp_dir.clone());
        Self { config, loader }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Process a batch and return only the records that were sampled.
    ///
    /// Only configuration errors are returned; record failures are logged and
    /// the record is left out of the result.
    pub fn process(&self, documents: Vec<Document>, params: &Parameters) -> LoaderResult<Vec<Document>> {
        self.process_with_report(documents, params)
            .map(|(documents, _)| documents)
    }

    /// Like [`Coordinator::process`], also returning what happened to each record
    pub fn process_with_report(
        &self,
        documents: Vec<Document>,
        params: &Parameters,
    ) -> LoaderResult<(Vec<Document>, BatchReport)> {
        let config = self.config.merge(params)?;
        let mut sampler = SurfaceSampler::new(config.seed);
        let resolver = SourceResolver::new(config.temp_dir.as_deref());
        let mut report = BatchReport::new(config.samples, config.as_chunks);
        let batch_start = Instant::now();

        let mut accepted = Vec::with_capacity(documents.len());
        for mut document in documents {
            let start = Instant::now();
            let outcome = match self.process_record(&mut document, &config, &resolver, &mut sampler) {
                Ok(()) => Outcome::Accepted,
                Err((_, LoaderError::MissingSource { id })) => {
                    error!(id = %id, "no uri or content passed for the document");
                    Outcome::Skipped {
                        reason: "no uri or content".to_string(),
                    }
                }
                Err((_, e)) if !e.is_record_failure() => return Err(e),
                Err((stage, e)) => {
                    warn!(
                        id = %document.id,
                        uri = %document.uri().map(summarize_uri).unwrap_or_default(),
                        stage = %stage,
                        error = %e,
                        "failed to process document"
                    );
                    Outcome::rejected(stage, &e)
                }
            };

            report.add_record(RecordStatus::new(&document, outcome.clone(), start.elapsed()));
            if outcome.is_accepted() && document.has_result(config.as_chunks) {
                accepted.push(document);
            }
        }

        report.duration = batch_start.elapsed();
        info!(
            total = report.total,
            accepted = report.accepted,
            skipped = report.skipped,
            rejected = report.rejected,
            samples = config.samples,
            as_chunks = config.as_chunks,
            "processed batch"
        );
        Ok((accepted, report))
    }

    /// Run one record; on error, report the last stage the record reached
    fn process_record(
        &self,
        document: &mut Document,
        config: &LoaderConfig,
        resolver: &SourceResolver<'_>,
        sampler: &mut SurfaceSampler,
    ) -> Result<(), (RecordStage, LoaderError)> {
        let source = resolver
            .resolve(document)
            .map_err(|e| (RecordStage::Received, e))?;
        debug!(id = %document.id, source = source.kind(), format = %source.format(), "resolved source");

        let result = self.load_and_sample(document, &source, config, sampler);
        let content_field = source.content_field();
        source.release();
        debug!(id = %document.id, "cleanup performed");

        result?;
        if config.drop_content {
            if let Some(field) = content_field {
                document.drop_content(field);
            }
        }
        Ok(())
    }

    fn load_and_sample(
        &self,
        document: &mut Document,
        source: &MeshSource,
        config: &LoaderConfig,
        sampler: &mut SurfaceSampler,
    ) -> Result<(), (RecordStage, LoaderError)> {
        let loaded = self
            .loader
            .load(source, config.as_chunks)
            .map_err(|e| (RecordStage::SourceResolved, e))?;

        let sampled = |e: LoaderError| (RecordStage::Loaded, e);
        match loaded {
            LoadedGeometry::Mesh(mesh) => {
                document.tensor = Some(sampler.sample(&mesh, config.samples).map_err(sampled)?);
            }
            LoadedGeometry::Scene(scene) => {
                let mut chunks = Vec::with_capacity(scene.len());
                for geometry in scene.geometries() {
                    let cloud = sampler.sample(&geometry.mesh, config.samples).map_err(|e| {
                        (
                            RecordStage::Loaded,
                            match e {
                                LoaderError::InvalidGeometry(msg) => LoaderError::InvalidGeometry(
                                    format!("geometry '{}': {}", geometry.name, msg),
                                ),
                                other => other,
                            },
                        )
                    })?;
                    chunks.push(Document::from_tensor(cloud).with_tag(GEOMETRY_TAG, geometry.name.as_str()));
                }
                document.chunks.extend(chunks);
            }
        }
        Ok(())
    }
}

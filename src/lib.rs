// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycloud
//!
//! Mesh ingestion and surface point-cloud sampling. Documents referencing a
//! mesh (local path, http(s) url, base64 `data:` uri or raw bytes) are
//! resolved, loaded and sampled into fixed-size point clouds, one record at a
//! time, with failures isolated to the record that caused them.

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod io;
pub mod pipeline;

pub use config::{LoaderConfig, Parameters};
pub use document::Document;
pub use error::{LoaderError, LoaderResult};
pub use geometry::{Mesh, PointCloud, Scene, SurfaceSampler};
pub use pipeline::{BatchReport, Coordinator, Outcome};

/// Sample `samples` points from the mesh file at `path`, all geometries combined
pub fn sample_file(
    path: impl AsRef<std::path::Path>,
    samples: usize,
    seed: Option<u64>,
) -> LoaderResult<PointCloud> {
    let path = path.as_ref();
    let format = io::FileFormat::from_path(path)
        .ok_or_else(|| LoaderError::UnknownFormat(path.display().to_string()))?;
    let loader = pipeline::MeshLoader::new(std::sync::Arc::new(io::HttpFetcher::new()), None);
    let mesh = loader.load_path(path, format)?.to_mesh();
    SurfaceSampler::new(seed).sample(&mesh, samples)
}

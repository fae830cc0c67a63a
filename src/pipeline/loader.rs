// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh loading from resolved sources

use super::source::MeshSource;
use crate::error::{LoaderError, LoaderResult};
use crate::geometry::{Mesh, Scene};
use crate::io::{self, archive, FileFormat, Fetcher, ResourceBase};
use reqwest::Url;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Loaded content, forced into the shape the active mode needs
#[derive(Debug, Clone)]
pub enum LoadedGeometry {
    /// Combine mode: every geometry coalesced in world space
    Mesh(Mesh),
    /// Chunk mode: one named surface per object
    Scene(Scene),
}

/// Loads [`MeshSource`]s from disk or over the network
#[derive(Clone)]
pub struct MeshLoader {
    fetcher: Arc<dyn Fetcher>,
    temp_dir: Option<PathBuf>,
}

impl MeshLoader {
    pub fn new(fetcher: Arc<dyn Fetcher>, temp_dir: Option<PathBuf>) -> Self {
        Self { fetcher, temp_dir }
    }

    /// Load a source as one mesh (`as_chunks = false`) or as a scene
    pub fn load(&self, source: &MeshSource, as_chunks: bool) -> LoaderResult<LoadedGeometry> {
        let scene = self.load_scene(source)?;
        debug!(
            source = source.kind(),
            geometries = scene.len(),
            as_chunks,
            "loaded mesh source"
        );

        if as_chunks {
            Ok(LoadedGeometry::Scene(scene))
        } else {
            Ok(LoadedGeometry::Mesh(scene.to_mesh()))
        }
    }

    pub fn load_scene(&self, source: &MeshSource) -> LoaderResult<Scene> {
        let scene = match source {
            MeshSource::Remote { url, format } => self.load_remote(url, *format)?,
            MeshSource::Local { path, format } => self.load_path(path, *format)?,
            MeshSource::Inline { file, format } | MeshSource::Binary { file, format } => {
                self.load_path(file.path(), *format)?
            }
            MeshSource::Archive { path } => self.load_path(path, FileFormat::Zip)?,
        };

        if scene.is_empty() {
            return Err(LoaderError::InvalidGeometry(
                "scene contains no geometry".to_string(),
            ));
        }
        Ok(scene)
    }

    /// Load a file on disk; archives are expanded and their first mesh entry loaded
    pub fn load_path(&self, path: &Path, format: FileFormat) -> LoaderResult<Scene> {
        if format.is_archive() {
            return archive::expand(path, self.temp_dir.as_deref(), |entry| {
                let format = FileFormat::from_path(entry).unwrap_or(FileFormat::Glb);
                self.load_path(entry, format)
            });
        }

        let bytes = std::fs::read(path)
            .map_err(|e| LoaderError::load_failure(format.extension(), format!("{}: {}", path.display(), e)))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mesh".to_string());
        let base = path.parent().map_or(ResourceBase::Embedded, ResourceBase::Dir);

        io::load_bytes(&bytes, format, &name, &base)
    }

    /// Fetch and load a remote mesh; relative glTF buffers are fetched alongside it
    pub fn load_remote(&self, url: &Url, format: FileFormat) -> LoaderResult<Scene> {
        let bytes = self.fetcher.fetch(url)?;

        if format.is_archive() {
            let mut builder = tempfile::Builder::new();
            builder.prefix("polycloud-").suffix(".zip");
            let mut file = match self.temp_dir.as_deref() {
                Some(dir) => builder.tempfile_in(dir)?,
                None => builder.tempfile()?,
            };
            file.write_all(&bytes)?;
            file.flush()?;
            return self.load_path(file.path(), format);
        }

        let name = url
            .path_segments()
            .and_then(|segments| segments.last())
            .and_then(|last| Path::new(last).file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "mesh".to_string());
        let base = ResourceBase::Remote {
            url,
            fetcher: self.fetcher.as_ref(),
        };

        io::load_bytes(&bytes, format, &name, &base)
    }
}

impl std::fmt::Debug for MeshLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshLoader")
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}

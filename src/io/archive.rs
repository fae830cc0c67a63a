// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Zip archive expansion
//!
//! An archive is extracted into a scoped temporary directory, the first glTF
//! candidate is handed to the caller, and the directory is removed afterwards
//! whatever the caller returns. Only the first candidate is loaded; the other
//! entries are ignored.

use super::FileFormat;
use crate::error::{LoaderError, LoaderResult};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Extract `archive` and call `load` with the selected mesh entry.
///
/// The extraction directory lives under `temp_root` (or the OS temp dir) and
/// is deleted before this function returns, on success and on error alike.
pub fn expand<T>(
    archive: &Path,
    temp_root: Option<&Path>,
    load: impl FnOnce(&Path) -> LoaderResult<T>,
) -> LoaderResult<T> {
    let file = File::open(archive).map_err(|e| LoaderError::archive(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| LoaderError::archive(archive, e))?;

    let dir = scratch_dir(temp_root).map_err(|e| LoaderError::archive(archive, e))?;
    debug!(archive = %archive.display(), target = %dir.path().display(), "extracting archive");

    let result = zip
        .extract(dir.path())
        .map_err(|e| LoaderError::archive(archive, e))
        .and_then(|_| {
            let candidates = find_candidates(dir.path());
            let selected = candidates.first().ok_or_else(|| {
                LoaderError::archive(archive, "no .gltf or .glb entry found")
            })?;
            if candidates.len() > 1 {
                debug!(
                    selected = %selected.display(),
                    ignored = candidates.len() - 1,
                    "archive holds several meshes, loading the first"
                );
            }
            load(selected)
        });

    let target = dir.path().to_path_buf();
    if let Err(e) = dir.close() {
        warn!(target = %target.display(), error = %e, "failed to remove extracted archive");
    }
    result
}

fn scratch_dir(temp_root: Option<&Path>) -> std::io::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("polycloud-archive-");
    match temp_root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    }
}

/// Mesh entries under `root`: `.gltf` files first, then `.glb`, each sorted by path
pub fn find_candidates(root: &Path) -> Vec<PathBuf> {
    let files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    FileFormat::archive_candidates()
        .iter()
        .flat_map(|format| {
            files
                .iter()
                .filter(move |path| FileFormat::from_path(path) == Some(*format))
                .cloned()
        })
        .collect()
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy for mesh ingestion and sampling

use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors raised while resolving, loading or sampling a mesh.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The document carries neither a uri nor a binary payload.
    #[error("no uri or content passed for the document {id}")]
    MissingSource { id: String },

    /// The geometry parser could not interpret the resolved bytes.
    #[error("failed to load {format} mesh: {message}")]
    LoadFailure { format: String, message: String },

    /// Sampling produced non-finite coordinates or the surface has no area.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Network error while fetching a remote source.
    #[error("failed to fetch {url}: {message}")]
    RemoteFetchFailure { url: String, message: String },

    /// Corrupt archive, extraction I/O error, or no loadable entry.
    #[error("failed to expand archive {path}: {message}")]
    ArchiveExtractionFailure { path: PathBuf, message: String },

    /// Neither the extension nor the declared format is a known mesh format.
    #[error("unknown mesh format: {0}")]
    UnknownFormat(String),

    /// A `data:` uri that is malformed or not base64 encoded.
    #[error("invalid data uri: {0}")]
    InvalidDataUri(String),

    /// Misconfiguration; never contained at record level.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoaderError {
    pub fn load_failure(format: impl Into<String>, message: impl ToString) -> Self {
        Self::LoadFailure {
            format: format.into(),
            message: message.to_string(),
        }
    }

    pub fn archive(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ArchiveExtractionFailure {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn remote(url: impl Into<String>, message: impl ToString) -> Self {
        Self::RemoteFetchFailure {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error belongs to a single record and must not abort the batch.
    pub fn is_record_failure(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingSource { .. } => "missing_source",
            Self::LoadFailure { .. } => "load_failure",
            Self::InvalidGeometry(_) => "invalid_geometry",
            Self::RemoteFetchFailure { .. } => "remote_fetch_failure",
            Self::ArchiveExtractionFailure { .. } => "archive_extraction_failure",
            Self::UnknownFormat(_) => "unknown_format",
            Self::InvalidDataUri(_) => "invalid_data_uri",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Io(_) => "io",
        }
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Source resolution
//!
//! Classifies a document's content once and materializes inline or binary
//! payloads into scoped temporary files.

use crate::document::{ContentField, Document};
use crate::error::{LoaderError, LoaderResult};
use crate::io::{data_uri, FileFormat};
use reqwest::Url;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Resolved content of one document.
///
/// Temporary files are owned by the variant and removed when it is released
/// or dropped.
#[derive(Debug)]
pub enum MeshSource {
    /// Mesh file on local disk, used in place
    Local { path: PathBuf, format: FileFormat },
    /// http(s) url, fetched by the loader
    Remote { url: Url, format: FileFormat },
    /// Decoded `data:` uri written to a temporary file
    Inline {
        file: NamedTempFile,
        format: FileFormat,
    },
    /// Binary payload written to a temporary file
    Binary {
        file: NamedTempFile,
        format: FileFormat,
    },
    /// Zip archive on local disk
    Archive { path: PathBuf },
}

impl MeshSource {
    pub fn format(&self) -> FileFormat {
        match self {
            MeshSource::Local { format, .. }
            | MeshSource::Remote { format, .. }
            | MeshSource::Inline { format, .. }
            | MeshSource::Binary { format, .. } => *format,
            MeshSource::Archive { .. } => FileFormat::Zip,
        }
    }

    /// Local path of the content, if it is file-addressable
    pub fn path(&self) -> Option<&Path> {
        match self {
            MeshSource::Local { path, .. } | MeshSource::Archive { path } => Some(path),
            MeshSource::Inline { file, .. } | MeshSource::Binary { file, .. } => Some(file.path()),
            MeshSource::Remote { .. } => None,
        }
    }

    /// Document field the content came from, when it may be dropped after loading
    pub fn content_field(&self) -> Option<ContentField> {
        match self {
            MeshSource::Inline { .. } => Some(ContentField::Uri),
            MeshSource::Binary { .. } => Some(ContentField::Blob),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MeshSource::Local { .. } => "local",
            MeshSource::Remote { .. } => "remote",
            MeshSource::Inline { .. } => "inline",
            MeshSource::Binary { .. } => "binary",
            MeshSource::Archive { .. } => "archive",
        }
    }

    /// Remove any temporary file held by the source
    pub fn release(self) {
        match self {
            MeshSource::Inline { file, .. } | MeshSource::Binary { file, .. } => {
                let path = file.path().to_path_buf();
                match file.close() {
                    Ok(()) => debug!(path = %path.display(), "removed temporary mesh file"),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to remove temporary mesh file")
                    }
                }
            }
            _ => {}
        }
    }
}

/// Turns documents into [`MeshSource`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceResolver<'a> {
    temp_dir: Option<&'a Path>,
}

impl<'a> SourceResolver<'a> {
    pub fn new(temp_dir: Option<&'a Path>) -> Self {
        Self { temp_dir }
    }

    pub fn resolve(&self, document: &Document) -> LoaderResult<MeshSource> {
        if let Some(uri) = document.uri() {
            return self.resolve_uri(uri, document);
        }

        match &document.blob {
            Some(blob) => {
                let format = declared_format(document)?;
                let file = self.materialize(blob, format)?;
                Ok(MeshSource::Binary { file, format })
            }
            None => Err(LoaderError::MissingSource {
                id: document.id.clone(),
            }),
        }
    }

    fn resolve_uri(&self, uri: &str, document: &Document) -> LoaderResult<MeshSource> {
        if data_uri::is_data_uri(uri) {
            let decoded = data_uri::decode(uri)?;
            let format = declared_format(document)?;
            let file = self.materialize(&decoded.bytes, format)?;
            return Ok(MeshSource::Inline { file, format });
        }

        match scheme(uri) {
            Some(scheme) if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") => {
                let url = Url::parse(uri).map_err(|e| LoaderError::remote(uri, e))?;
                let from_path = url
                    .path_segments()
                    .and_then(|segments| segments.last())
                    .and_then(FileFormat::from_path);
                let format = match from_path {
                    Some(format) => format,
                    None => declared_format(document)?,
                };
                Ok(MeshSource::Remote { url, format })
            }
            Some(scheme) if scheme.eq_ignore_ascii_case("file") => {
                let url = Url::parse(uri).map_err(|e| LoaderError::load_failure("uri", e))?;
                let path = url.to_file_path().map_err(|_| {
                    LoaderError::load_failure("uri", format!("not a local file url: {}", uri))
                })?;
                local(path, document)
            }
            Some(other) => Err(LoaderError::UnknownFormat(format!(
                "unsupported uri scheme '{}'",
                other
            ))),
            None => local(PathBuf::from(uri), document),
        }
    }

    fn materialize(&self, bytes: &[u8], format: FileFormat) -> LoaderResult<NamedTempFile> {
        let suffix = format!(".{}", format.extension());
        let mut builder = tempfile::Builder::new();
        builder.prefix("polycloud-").suffix(&suffix);
        let mut file = match self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;
        debug!(path = %file.path().display(), bytes = bytes.len(), "materialized mesh content");
        Ok(file)
    }
}

fn local(path: PathBuf, document: &Document) -> LoaderResult<MeshSource> {
    let format = match FileFormat::from_path(&path) {
        Some(format) => format,
        None => declared_format(document)?,
    };
    if format.is_archive() {
        Ok(MeshSource::Archive { path })
    } else {
        Ok(MeshSource::Local { path, format })
    }
}

fn declared_format(document: &Document) -> LoaderResult<FileFormat> {
    let tag = document.file_format();
    FileFormat::from_extension(tag).ok_or_else(|| LoaderError::UnknownFormat(tag.to_string()))
}

/// Uri scheme, if the string has one. Single letters are drive prefixes, not schemes.
fn scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = scheme.len() >= 2
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FILE_FORMAT_TAG;

    #[test]
    fn test_missing_source() {
        let doc = Document::new().with_id("empty");
        let err = SourceResolver::default().resolve(&doc).unwrap_err();
        assert!(matches!(err, LoaderError::MissingSource { id } if id == "empty"));

        let doc = Document::from_uri("");
        assert!(matches!(
            SourceResolver::default().resolve(&doc),
            Err(LoaderError::MissingSource { .. })
        ));
    }

    #[test]
    fn test_remote_format_from_url_or_tag() {
        let resolver = SourceResolver::default();

        let doc = Document::from_uri("https://example.com/assets/chair.stl?token=1");
        let source = resolver.resolve(&doc).unwrap();
        assert!(matches!(&source, MeshSource::Remote { format: FileFormat::Stl, .. }));
        assert!(source.path().is_none());

        let doc = Document::from_uri("http://example.com/mesh").with_tag(FILE_FORMAT_TAG, "3mf");
        let source = resolver.resolve(&doc).unwrap();
        assert_eq!(source.format(), FileFormat::ThreeMf);
    }

    #[test]
    fn test_local_paths() {
        let resolver = SourceResolver::default();

        let source = resolver.resolve(&Document::from_uri("meshes/a.GLTF")).unwrap();
        assert!(matches!(source, MeshSource::Local { format: FileFormat::Gltf, .. }));

        let source = resolver.resolve(&Document::from_uri("bundle.zip")).unwrap();
        assert!(matches!(source, MeshSource::Archive { .. }));

        let source = resolver.resolve(&Document::from_uri("file:///tmp/part.stl")).unwrap();
        assert_eq!(source.path(), Some(Path::new("/tmp/part.stl")));

        let source = resolver
            .resolve(&Document::from_uri("C:/models/part.3mf"))
            .unwrap();
        assert_eq!(source.format(), FileFormat::ThreeMf);

        let source = resolver.resolve(&Document::from_uri("no_extension")).unwrap();
        assert_eq!(source.format(), FileFormat::Glb);
    }

    #[test]
    fn test_unknown_scheme_and_format() {
        let resolver = SourceResolver::default();
        assert!(matches!(
            resolver.resolve(&Document::from_uri("s3://bucket/a.glb")),
            Err(LoaderError::UnknownFormat(_))
        ));
        assert!(matches!(
            resolver.resolve(&Document::from_blob(vec![0]).with_tag(FILE_FORMAT_TAG, "obj")),
            Err(LoaderError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_inline_and_binary_materialized_and_released() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = SourceResolver::new(Some(dir.path()));

        let doc = Document::from_uri(data_uri::encode(b"solid", "model/stl"))
            .with_tag(FILE_FORMAT_TAG, "stl");
        let source = resolver.resolve(&doc).unwrap();
        assert_eq!(source.content_field(), Some(ContentField::Uri));
        let path = source.path().unwrap().to_path_buf();
        assert!(path.starts_with(dir.path()));
        assert_eq!(path.extension().unwrap(), "stl");
        assert_eq!(std::fs::read(&path).unwrap(), b"solid");
        source.release();
        assert!(!path.exists());

        let source = resolver.resolve(&Document::from_blob(vec![1, 2, 3])).unwrap();
        assert_eq!(source.content_field(), Some(ContentField::Blob));
        assert_eq!(source.format(), FileFormat::Glb);
        let path = source.path().unwrap().to_path_buf();
        drop(source);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_data_uri() {
        let doc = Document::from_uri("data:model/gltf-binary,plain");
        assert!(matches!(
            SourceResolver::default().resolve(&doc),
            Err(LoaderError::InvalidDataUri(_))
        ));
    }
}

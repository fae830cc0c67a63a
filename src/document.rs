// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Document records consumed and populated by the pipeline

use crate::geometry::PointCloud;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag holding the declared format of inline or binary content
pub const FILE_FORMAT_TAG: &str = "file_format";
/// Format assumed when no `file_format` tag is present
pub const DEFAULT_FILE_FORMAT: &str = "glb";
/// Tag set on chunk documents with the geometry they were sampled from
pub const GEOMETRY_TAG: &str = "geometry";

/// Content field of a document that may be dropped after loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentField {
    Uri,
    Blob,
}

/// A record flowing through the pipeline.
///
/// Input documents carry a `uri` (path, http(s) url or `data:` uri) or a raw
/// `blob`. Processing fills `tensor` (combine mode) or appends `chunks`
/// (chunk mode).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tensor: Option<PointCloud>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<Document>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            ..Self::default()
        }
    }

    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::new()
        }
    }

    pub fn from_blob(blob: Vec<u8>) -> Self {
        Self {
            blob: Some(blob),
            ..Self::new()
        }
    }

    pub fn from_tensor(tensor: PointCloud) -> Self {
        Self {
            tensor: Some(tensor),
            ..Self::new()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Non-empty uri, if any
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref().filter(|uri| !uri.is_empty())
    }

    /// Whether the document has a uri or a binary payload to load
    pub fn has_content(&self) -> bool {
        self.uri().is_some() || self.blob.is_some()
    }

    /// Declared format tag, `glb` by default
    pub fn file_format(&self) -> &str {
        self.tags
            .get(FILE_FORMAT_TAG)
            .map(String::as_str)
            .unwrap_or(DEFAULT_FILE_FORMAT)
    }

    /// Clear a content field
    pub fn drop_content(&mut self, field: ContentField) {
        match field {
            ContentField::Uri => self.uri = None,
            ContentField::Blob => self.blob = None,
        }
    }

    /// Whether the document holds the result expected for the active mode
    pub fn has_result(&self, as_chunks: bool) -> bool {
        if as_chunks {
            !self.chunks.is_empty() && self.chunks.iter().all(|c| c.tensor.is_some())
        } else {
            self.tensor.is_some()
        }
    }
}

fn new_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

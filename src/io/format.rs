// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh container format detection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File formats the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Binary glTF
    Glb,
    /// glTF JSON with external or embedded buffers
    Gltf,
    /// STL, binary or ASCII
    Stl,
    /// 3D Manufacturing Format
    #[serde(rename = "3mf")]
    ThreeMf,
    /// Zip archive holding glTF assets
    Zip,
}

impl FileFormat {
    /// Parse an extension or a `file_format` tag value (case-insensitive, leading dot allowed)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "glb" => Some(Self::Glb),
            "gltf" => Some(Self::Gltf),
            "stl" => Some(Self::Stl),
            "3mf" => Some(Self::ThreeMf),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }

    /// Detect the format from a path's extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        Self::from_extension(ext)
    }

    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Glb => "glb",
            Self::Gltf => "gltf",
            Self::Stl => "stl",
            Self::ThreeMf => "3mf",
            Self::Zip => "zip",
        }
    }

    /// Whether the format is a container to expand rather than a mesh to parse
    pub const fn is_archive(&self) -> bool {
        matches!(self, Self::Zip)
    }

    /// Formats that may be picked from inside an archive, in preference order
    pub const fn archive_candidates() -> [Self; 2] {
        [Self::Gltf, Self::Glb]
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

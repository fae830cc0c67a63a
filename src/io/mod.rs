// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - format detection, fetching, decoding and importing

pub mod archive;
pub mod data_uri;
mod fetch;
mod format;
pub mod gltf;
pub mod stl;
pub mod threemf;

pub use self::gltf::ResourceBase;
pub use fetch::{Fetcher, HttpFetcher};
pub use format::FileFormat;

use crate::error::{LoaderError, LoaderResult};
use crate::geometry::Scene;

/// Parse mesh bytes of a known format into a scene.
///
/// `name` labels single-geometry formats (STL); `base` resolves external
/// glTF buffers.
pub fn load_bytes(
    bytes: &[u8],
    format: FileFormat,
    name: &str,
    base: &ResourceBase<'_>,
) -> LoaderResult<Scene> {
    match format {
        FileFormat::Glb | FileFormat::Gltf => self::gltf::load(bytes, base),
        FileFormat::Stl => stl::load(bytes, name),
        FileFormat::ThreeMf => threemf::load(bytes),
        FileFormat::Zip => Err(LoaderError::UnknownFormat(
            "zip archives must be expanded before loading".to_string(),
        )),
    }
}

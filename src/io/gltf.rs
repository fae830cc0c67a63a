// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! glTF / GLB importer
//!
//! Only geometry is read: every triangle primitive becomes one named geometry
//! and the default scene's node hierarchy becomes instances. Materials,
//! textures and images are never dereferenced, so assets whose materials
//! reference missing or unsupported images still load.

use super::data_uri;
use super::fetch::Fetcher;
use crate::error::{LoaderError, LoaderResult};
use crate::geometry::{Mesh, Scene};
use gltf::buffer::Source;
use gltf::mesh::Mode;
use gltf::Semantic;
use nalgebra::{Matrix4, Point3};
use reqwest::Url;
use std::path::Path;
use tracing::debug;

const FORMAT: &str = "gltf";
const MAX_NODE_DEPTH: usize = 256;

/// Where external buffer uris are resolved from
pub enum ResourceBase<'a> {
    /// Directory holding the asset
    Dir(&'a Path),
    /// Remote asset location
    Remote { url: &'a Url, fetcher: &'a dyn Fetcher },
    /// Only embedded buffers are available
    Embedded,
}

/// Parse glTF JSON or GLB bytes into a scene
pub fn load(bytes: &[u8], base: &ResourceBase<'_>) -> LoaderResult<Scene> {
    let gltf = gltf::Gltf::from_slice_without_validation(bytes)
        .map_err(|e| LoaderError::load_failure(FORMAT, e))?;
    let gltf::Gltf { document, mut blob } = gltf;
    let document = gltf::Document::from_json(strip_materials(document.into_json()))
        .map_err(|e| LoaderError::load_failure(FORMAT, e))?;

    let buffers = document
        .buffers()
        .map(|buffer| {
            let data = match buffer.source() {
                Source::Bin => blob.take().ok_or_else(|| {
                    LoaderError::load_failure(FORMAT, "GLB binary chunk missing")
                })?,
                Source::Uri(uri) => resolve_uri(uri, base)?,
            };
            if data.len() < buffer.length() {
                return Err(LoaderError::load_failure(
                    FORMAT,
                    format!(
                        "buffer {} holds {} bytes, {} declared",
                        buffer.index(),
                        data.len(),
                        buffer.length()
                    ),
                ));
            }
            Ok(data)
        })
        .collect::<LoaderResult<Vec<Vec<u8>>>>()?;

    let mut scene = Scene::new();
    let mut mesh_geometries: Vec<Vec<usize>> = Vec::with_capacity(document.meshes().len());

    for mesh in document.meshes() {
        let name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
        let mut indices = Vec::new();

        for primitive in mesh.primitives() {
            let reader = primitive.reader(|b| buffers.get(b.index()).map(Vec::as_slice));

            let accessor = primitive.get(&Semantic::Positions).ok_or_else(|| {
                LoaderError::load_failure(
                    FORMAT,
                    format!("mesh '{}' has a primitive without POSITION", name),
                )
            })?;
            let positions: Vec<Point3<f64>> = reader
                .read_positions()
                .ok_or_else(|| {
                    LoaderError::load_failure(
                        FORMAT,
                        format!(
                            "mesh '{}': POSITION accessor {} ({} elements) runs past its buffer",
                            name,
                            accessor.index(),
                            accessor.count()
                        ),
                    )
                })?
                .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
                .collect();

            let order: Vec<usize> = match reader.read_indices() {
                Some(read) => read.into_u32().map(|i| i as usize).collect(),
                None => (0..positions.len()).collect(),
            };

            let faces = match triangulate(primitive.mode(), &order) {
                Some(faces) => faces,
                None => {
                    debug!(mesh = %name, mode = ?primitive.mode(), "skipping non-triangle primitive");
                    continue;
                }
            };

            let geometry = Mesh::from_indexed(positions, faces)
                .map_err(|e| LoaderError::load_failure(FORMAT, e))?;
            indices.push(scene.add_geometry(name.clone(), geometry));
        }

        mesh_geometries.push(indices);
    }

    if let Some(root) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in root.nodes() {
            place_node(&mut scene, &node, &Matrix4::identity(), &mesh_geometries, 0)?;
        }
    }

    debug!(
        geometries = scene.len(),
        instances = scene.instances().len(),
        "loaded gltf scene"
    );
    Ok(scene)
}

/// Drop everything material related so only geometry is validated
fn strip_materials(mut root: gltf::json::Root) -> gltf::json::Root {
    root.materials.clear();
    root.textures.clear();
    root.images.clear();
    root.samplers.clear();
    for mesh in &mut root.meshes {
        for primitive in &mut mesh.primitives {
            primitive.material = None;
        }
    }
    root.extensions_required.retain(|ext| !is_material_extension(ext));
    root.extensions_used.retain(|ext| !is_material_extension(ext));
    root
}

fn is_material_extension(name: &str) -> bool {
    const PREFIXES: [&str; 4] = ["KHR_materials_", "KHR_texture_", "EXT_texture_", "MSFT_texture_"];
    PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Index triples for a primitive topology, `None` for points and lines
fn triangulate(mode: Mode, order: &[usize]) -> Option<Vec<[usize; 3]>> {
    let faces = match mode {
        Mode::Triangles => order
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect(),
        Mode::TriangleStrip => order
            .windows(3)
            .enumerate()
            .map(|(i, w)| if i % 2 == 0 { [w[0], w[1], w[2]] } else { [w[1], w[0], w[2]] })
            .collect(),
        Mode::TriangleFan => match order.split_first() {
            Some((&hub, rest)) => rest.windows(2).map(|w| [hub, w[0], w[1]]).collect(),
            None => Vec::new(),
        },
        Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip => return None,
    };
    Some(faces)
}

fn place_node(
    scene: &mut Scene,
    node: &gltf::Node<'_>,
    parent: &Matrix4<f64>,
    mesh_geometries: &[Vec<usize>],
    depth: usize,
) -> LoaderResult<()> {
    if depth > MAX_NODE_DEPTH {
        return Err(LoaderError::load_failure(
            FORMAT,
            "node hierarchy is too deep or cyclic",
        ));
    }

    let local = node.transform().matrix();
    let world = parent * Matrix4::from_fn(|row, col| local[col][row] as f64);

    if let Some(mesh) = node.mesh() {
        if let Some(geometries) = mesh_geometries.get(mesh.index()) {
            for &geometry in geometries {
                scene.add_instance(geometry, world);
            }
        }
    }

    for child in node.children() {
        place_node(scene, &child, &world, mesh_geometries, depth + 1)?;
    }
    Ok(())
}

fn resolve_uri(uri: &str, base: &ResourceBase<'_>) -> LoaderResult<Vec<u8>> {
    if data_uri::is_data_uri(uri) {
        return Ok(data_uri::decode(uri)?.bytes);
    }

    match base {
        ResourceBase::Dir(dir) => {
            let path = dir.join(uri);
            std::fs::read(&path).map_err(|e| {
                LoaderError::load_failure(FORMAT, format!("buffer {}: {}", path.display(), e))
            })
        }
        ResourceBase::Remote { url, fetcher } => {
            let joined = url
                .join(uri)
                .map_err(|e| LoaderError::remote(url.as_str(), e))?;
            fetcher.fetch(&joined)
        }
        ResourceBase::Embedded => Err(LoaderError::load_failure(
            FORMAT,
            format!("external buffer '{}' cannot be resolved", uri),
        )),
    }
}

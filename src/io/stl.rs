// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL importer

use crate::error::{LoaderError, LoaderResult};
use crate::geometry::{Mesh, Scene};
use nalgebra::Point3;
use std::io::Cursor;

/// Load binary or ASCII STL bytes as a single-geometry scene
pub fn load(bytes: &[u8], name: &str) -> LoaderResult<Scene> {
    let stl = stl_io::read_stl(&mut Cursor::new(bytes))
        .map_err(|e| LoaderError::load_failure("stl", e))?;

    let vertices = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let faces = stl.faces.iter().map(|face| face.vertices).collect();

    let mesh = Mesh::from_indexed(vertices, faces).map_err(|e| LoaderError::load_failure("stl", e))?;

    let mut scene = Scene::new();
    scene.add_geometry(name, mesh);
    Ok(scene)
}

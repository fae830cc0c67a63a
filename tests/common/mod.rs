// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Shared fixtures for integration tests

#![allow(dead_code)]

use nalgebra::Point3;
use polycloud::geometry::{Mesh, Triangle};
use polycloud::io::Fetcher;
use polycloud::{LoaderError, LoaderResult};
use reqwest::Url;
use serde_json::json;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Axis-aligned box with 12 triangles
pub fn cube(min: [f64; 3], size: f64) -> Mesh {
    let mut mesh = Mesh::new();
    for i in 0..8 {
        mesh.add_vertex(Point3::new(
            min[0] + if i & 1 != 0 { size } else { 0.0 },
            min[1] + if i & 2 != 0 { size } else { 0.0 },
            min[2] + if i & 4 != 0 { size } else { 0.0 },
        ));
    }
    let faces = [
        [0, 2, 1], [1, 2, 3], // z min
        [4, 5, 6], [5, 7, 6], // z max
        [0, 1, 4], [1, 5, 4], // y min
        [2, 6, 3], [3, 6, 7], // y max
        [0, 4, 2], [2, 4, 6], // x min
        [1, 3, 5], [3, 7, 5], // x max
    ];
    for face in faces {
        mesh.add_triangle(Triangle::new(face));
    }
    mesh
}

/// A mesh placed by one scene node
pub struct Part<'a> {
    pub name: &'a str,
    pub mesh: &'a Mesh,
    pub translation: [f64; 3],
}

impl<'a> Part<'a> {
    pub fn new(name: &'a str, mesh: &'a Mesh) -> Self {
        Self {
            name,
            mesh,
            translation: [0.0; 3],
        }
    }

    pub fn translated(mut self, translation: [f64; 3]) -> Self {
        self.translation = translation;
        self
    }
}

/// glTF JSON plus its binary buffer; one mesh and one node per part
pub fn gltf_document(parts: &[Part<'_>], buffer_uri: Option<&str>) -> (serde_json::Value, Vec<u8>) {
    let mut buffer = Vec::new();
    let mut meshes = Vec::new();
    let mut nodes = Vec::new();
    let mut accessors = Vec::new();
    let mut views = Vec::new();

    for (i, part) in parts.iter().enumerate() {
        let bbox = part.mesh.bounding_box();

        let position_offset = buffer.len();
        for vertex in &part.mesh.vertices {
            buffer.extend_from_slice(&(vertex.x as f32).to_le_bytes());
            buffer.extend_from_slice(&(vertex.y as f32).to_le_bytes());
            buffer.extend_from_slice(&(vertex.z as f32).to_le_bytes());
        }
        let position_length = buffer.len() - position_offset;

        let indices_offset = buffer.len();
        for triangle in &part.mesh.triangles {
            for index in triangle.indices {
                buffer.extend_from_slice(&(index as u32).to_le_bytes());
            }
        }
        let indices_length = buffer.len() - indices_offset;

        views.push(json!({
            "buffer": 0, "byteOffset": position_offset, "byteLength": position_length, "target": 34962
        }));
        views.push(json!({
            "buffer": 0, "byteOffset": indices_offset, "byteLength": indices_length, "target": 34963
        }));
        accessors.push(json!({
            "bufferView": 2 * i,
            "componentType": 5126,
            "count": part.mesh.vertex_count(),
            "type": "VEC3",
            "min": [bbox.min.x, bbox.min.y, bbox.min.z],
            "max": [bbox.max.x, bbox.max.y, bbox.max.z]
        }));
        accessors.push(json!({
            "bufferView": 2 * i + 1,
            "componentType": 5125,
            "count": part.mesh.triangle_count() * 3,
            "type": "SCALAR"
        }));
        meshes.push(json!({
            "name": part.name,
            "primitives": [{
                "attributes": { "POSITION": 2 * i },
                "indices": 2 * i + 1,
                "mode": 4
            }]
        }));
        nodes.push(json!({ "mesh": i, "translation": part.translation }));
    }

    let mut buffer_json = json!({ "byteLength": buffer.len() });
    if let Some(uri) = buffer_uri {
        buffer_json["uri"] = json!(uri);
    }

    let document = json!({
        "asset": { "generator": "polycloud tests", "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": (0..parts.len()).collect::<Vec<_>>() }],
        "nodes": nodes,
        "meshes": meshes,
        "accessors": accessors,
        "bufferViews": views,
        "buffers": [buffer_json]
    });
    (document, buffer)
}

/// Binary glTF container for the parts
pub fn glb(parts: &[Part<'_>]) -> Vec<u8> {
    let (document, mut buffer) = gltf_document(parts, None);

    let mut json = serde_json::to_vec(&document).unwrap();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }

    let total_length = 12 + 8 + json.len() + 8 + buffer.len();
    let mut out = Vec::with_capacity(total_length);
    out.extend_from_slice(&0x46546C67u32.to_le_bytes()); // magic: "glTF"
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total_length as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // type: "JSON"
    out.extend_from_slice(&json);
    out.extend_from_slice(&(buffer.len() as u32).to_le_bytes());
    out.extend_from_slice(&0x004E4942u32.to_le_bytes()); // type: "BIN\0"
    out.extend_from_slice(&buffer);
    out
}

/// Unit cube and a second cube offset along x
pub fn two_cube_glb() -> Vec<u8> {
    let a = cube([0.0; 3], 1.0);
    let b = cube([0.0; 3], 2.0);
    glb(&[
        Part::new("small", &a),
        Part::new("large", &b).translated([5.0, 0.0, 0.0]),
    ])
}

/// Binary STL of the mesh
pub fn stl(mesh: &Mesh) -> Vec<u8> {
    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles
        .iter()
        .map(|triangle| {
            let [a, b, c] = mesh.corners(triangle);
            let n = (b - a).cross(&(c - a)).normalize();
            let v = |p: Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [v(a), v(b), v(c)],
            }
        })
        .collect();

    let mut out = Vec::new();
    stl_io::write_stl(&mut out, triangles.iter()).unwrap();
    out
}

/// Minimal 3MF package with one object per mesh
pub fn threemf(objects: &[(&str, &Mesh)]) -> Vec<u8> {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">
<resources>
"#,
    );
    for (i, (name, mesh)) in objects.iter().enumerate() {
        xml.push_str(&format!(r#"<object id="{}" name="{}" type="model"><mesh><vertices>"#, i + 1, name));
        for v in &mesh.vertices {
            xml.push_str(&format!(r#"<vertex x="{}" y="{}" z="{}"/>"#, v.x, v.y, v.z));
        }
        xml.push_str("</vertices><triangles>");
        for t in &mesh.triangles {
            xml.push_str(&format!(
                r#"<triangle v1="{}" v2="{}" v3="{}"/>"#,
                t.indices[0], t.indices[1], t.indices[2]
            ));
        }
        xml.push_str("</triangles></mesh></object>\n");
    }
    xml.push_str("</resources>\n<build>\n");
    for i in 0..objects.len() {
        xml.push_str(&format!(r#"<item objectid="{}"/>"#, i + 1));
    }
    xml.push_str("\n</build>\n</model>\n");

    zip_bytes(&[("3D/3dmodel.model", xml.as_bytes())])
}

/// Zip archive bytes holding the entries
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> String {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, bytes).unwrap();
    path.to_string_lossy().into_owned()
}

/// Number of entries left in a directory
pub fn entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Serves canned responses keyed by url
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn with(mut self, url: &str, body: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), body);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, url: &Url) -> LoaderResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| LoaderError::remote(url.as_str(), "404 Not Found"))
    }
}

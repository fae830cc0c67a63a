// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 3MF importer
//!
//! Each `<object>` holding a `<mesh>` becomes one geometry. Build items and
//! their transforms are ignored, as are materials and colors.

use crate::error::{LoaderError, LoaderResult};
use crate::geometry::{Mesh, Scene};
use nalgebra::Point3;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

const FORMAT: &str = "3mf";

fn invalid(message: impl ToString) -> LoaderError {
    LoaderError::load_failure(FORMAT, message)
}

/// Load a 3MF package from bytes
pub fn load(bytes: &[u8]) -> LoaderResult<Scene> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| invalid(format!("invalid ZIP archive: {}", e)))?;
    let model = read_model_file(&mut archive)?;
    parse_model(&model)
}

fn read_model_file<R: Read + Seek>(archive: &mut ZipArchive<R>) -> LoaderResult<String> {
    let name = archive
        .file_names()
        .find(|name| {
            std::path::Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("model"))
        })
        .map(str::to_string)
        .ok_or_else(|| invalid("archive does not contain a model file"))?;

    let mut file = archive.by_name(&name).map_err(invalid)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

#[derive(Default)]
struct ObjectState {
    name: Option<String>,
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 3]>,
}

fn parse_model(content: &str) -> LoaderResult<Scene> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut scene = Scene::new();
    let mut object: Option<ObjectState> = None;
    let mut in_vertices = false;
    let mut in_triangles = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"object" => {
                    let id = attribute(e, b"id")?.unwrap_or_default();
                    let name = attribute(e, b"name")?
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| format!("object_{}", id));
                    object = Some(ObjectState {
                        name: Some(name),
                        ..ObjectState::default()
                    });
                }
                b"vertices" => in_vertices = true,
                b"triangles" => in_triangles = true,
                b"vertex" if in_vertices => {
                    if let Some(state) = object.as_mut() {
                        state.vertices.push(Point3::new(
                            coordinate(e, b"x")?,
                            coordinate(e, b"y")?,
                            coordinate(e, b"z")?,
                        ));
                    }
                }
                b"triangle" if in_triangles => {
                    if let Some(state) = object.as_mut() {
                        state
                            .faces
                            .push([index(e, b"v1")?, index(e, b"v2")?, index(e, b"v3")?]);
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"vertices" => in_vertices = false,
                b"triangles" => in_triangles = false,
                b"object" => {
                    if let Some(state) = object.take() {
                        if !state.faces.is_empty() {
                            let name = state.name.unwrap_or_else(|| "object".to_string());
                            let mesh = Mesh::from_indexed(state.vertices, state.faces)
                                .map_err(invalid)?;
                            scene.add_geometry(name, mesh);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(invalid(format!("XML parse error: {}", e))),
            _ => {}
        }
    }

    Ok(scene)
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> LoaderResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(invalid)?;
        if attr.key.local_name().as_ref() == key {
            let value = attr.unescape_value().map_err(invalid)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn coordinate(element: &BytesStart<'_>, key: &[u8]) -> LoaderResult<f64> {
    let value = attribute(element, key)?.unwrap_or_else(|| "0".to_string());
    value
        .trim()
        .parse()
        .map_err(|e| invalid(format!("invalid {} coordinate: {}", String::from_utf8_lossy(key), e)))
}

fn index(element: &BytesStart<'_>, key: &[u8]) -> LoaderResult<usize> {
    let value = attribute(element, key)?
        .ok_or_else(|| invalid(format!("triangle without {}", String::from_utf8_lossy(key))))?;
    value
        .trim()
        .parse()
        .map_err(|e| invalid(format!("invalid {} index: {}", String::from_utf8_lossy(key), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const MODEL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<model unit="millimeter" xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02">
  <resources>
    <object id="1" type="model" name="base">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="0"/>
          <vertex x="4" y="0" z="0"/>
          <vertex x="0" y="4" z="0"/>
        </vertices>
        <triangles>
          <triangle v1="0" v2="1" v3="2"/>
        </triangles>
      </mesh>
    </object>
    <object id="2" type="model">
      <mesh>
        <vertices>
          <vertex x="0" y="0" z="1"/>
          <vertex x="1" y="0" z="1"/>
          <vertex x="0" y="1" z="1"/>
        </vertices>
        <triangles>
          <triangle v1="0" v2="1" v3="2"/>
        </triangles>
      </mesh>
    </object>
  </resources>
  <build><item objectid="1"/><item objectid="2"/></build>
</model>"#;

    fn package(model: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("3D/3dmodel.model", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(model.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_objects_become_geometries() {
        let scene = load(&package(MODEL)).unwrap();
        let names: Vec<_> = scene.geometries().map(|g| g.name.clone()).collect();
        assert_eq!(names, vec!["base", "object_2"]);
        assert!((scene.geometry("base").unwrap().surface_area() - 8.0).abs() < 1e-9);
        assert_eq!(scene.to_mesh().triangle_count(), 2);
    }

    #[test]
    fn test_bad_index_is_a_load_failure() {
        let broken = MODEL.replace(r#"v3="2""#, r#"v3="9""#);
        assert!(matches!(
            load(&package(&broken)),
            Err(LoaderError::LoadFailure { .. })
        ));
        assert!(matches!(load(b"not a zip"), Err(LoaderError::LoadFailure { .. })));
    }
}

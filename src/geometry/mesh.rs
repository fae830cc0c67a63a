// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle mesh surface

use super::BoundingBox;
use crate::error::{LoaderError, LoaderResult};
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Build a mesh from raw positions and index triples, checking every index.
    pub fn from_indexed(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> LoaderResult<Self> {
        let mesh = Self {
            vertices,
            triangles: faces.into_iter().map(Triangle::new).collect(),
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            *vertex = matrix.transform_point(vertex);
        }
    }

    /// Append another mesh, offsetting its triangle indices
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles.push(Triangle::new([
                triangle.indices[0] + offset,
                triangle.indices[1] + offset,
                triangle.indices[2] + offset,
            ]));
        }
    }

    /// Corner positions of a triangle
    pub fn corners(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        [
            self.vertices[triangle.indices[0]],
            self.vertices[triangle.indices[1]],
            self.vertices[triangle.indices[2]],
        ]
    }

    /// Area of every triangle, in triangle order
    pub fn triangle_areas(&self) -> Vec<f64> {
        self.triangles
            .iter()
            .map(|triangle| {
                let [a, b, c] = self.corners(triangle);
                (b - a).cross(&(c - a)).norm() / 2.0
            })
            .collect()
    }

    /// Total surface area
    pub fn surface_area(&self) -> f64 {
        self.triangle_areas().iter().sum()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// Check that every triangle references an existing vertex
    pub fn validate(&self) -> LoaderResult<()> {
        let count = self.vertices.len();
        if let Some(bad) = self
            .triangles
            .iter()
            .find(|t| t.indices.iter().any(|&i| i >= count))
        {
            return Err(LoaderError::InvalidGeometry(format!(
                "triangle {:?} references a vertex outside 0..{}",
                bad.indices, count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn unit_square() -> Mesh {
        Mesh::from_indexed(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_surface_area() {
        let mesh = unit_square();
        assert_relative_eq!(mesh.surface_area(), 1.0);
        assert_eq!(mesh.triangle_areas().len(), 2);
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut mesh = unit_square();
        mesh.merge(&unit_square());
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangles[2].indices, [4, 5, 6]);
        assert_relative_eq!(mesh.surface_area(), 2.0);
    }

    #[test]
    fn test_transform_scales_area() {
        let mut mesh = unit_square();
        mesh.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 3.0, 1.0)));
        assert_relative_eq!(mesh.surface_area(), 6.0);
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let result = Mesh::from_indexed(vec![Point3::origin()], vec![[0, 1, 2]]);
        assert!(matches!(result, Err(LoaderError::InvalidGeometry(_))));
    }
}

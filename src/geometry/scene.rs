// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene: named geometries plus the node instances that place them

use super::Mesh;
use nalgebra::Matrix4;

/// A geometry stored in a scene under a unique name
#[derive(Debug, Clone)]
pub struct NamedGeometry {
    pub name: String,
    pub mesh: Mesh,
}

/// One placement of a geometry in world space
#[derive(Debug, Clone)]
pub struct Instance {
    pub geometry: usize,
    pub transform: Matrix4<f64>,
}

/// Named collection of geometry surfaces loaded from one container.
///
/// Geometries keep the order in which the loader declared them; instances are
/// only consulted when the scene is coalesced into a single mesh.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    geometries: Vec<NamedGeometry>,
    instances: Vec<Instance>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a geometry and return its index. Name clashes get a `_<n>` suffix.
    pub fn add_geometry(&mut self, name: impl Into<String>, mesh: Mesh) -> usize {
        let base = name.into();
        let mut name = base.clone();
        let mut suffix = 1;
        while self.geometries.iter().any(|g| g.name == name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        self.geometries.push(NamedGeometry { name, mesh });
        self.geometries.len() - 1
    }

    /// Place an existing geometry with a world transform
    pub fn add_instance(&mut self, geometry: usize, transform: Matrix4<f64>) {
        if geometry < self.geometries.len() {
            self.instances.push(Instance {
                geometry,
                transform,
            });
        }
    }

    /// Geometries in declaration order
    pub fn geometries(&self) -> impl Iterator<Item = &NamedGeometry> {
        self.geometries.iter()
    }

    pub fn geometry(&self, name: &str) -> Option<&Mesh> {
        self.geometries
            .iter()
            .find(|g| g.name == name)
            .map(|g| &g.mesh)
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Coalesce the scene into one mesh in world space.
    ///
    /// Every instance contributes a transformed copy of its geometry. A scene
    /// without instances (STL, 3MF, glTF without nodes) concatenates its
    /// geometries as stored.
    pub fn to_mesh(&self) -> Mesh {
        let mut combined = Mesh::new();

        if self.instances.is_empty() {
            for geometry in &self.geometries {
                combined.merge(&geometry.mesh);
            }
            return combined;
        }

        for instance in &self.instances {
            let mut placed = self.geometries[instance.geometry].mesh.clone();
            if instance.transform != Matrix4::identity() {
                placed.transform(&instance.transform);
            }
            combined.merge(&placed);
        }
        combined
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - meshes, scenes and surface sampling

mod bbox;
mod mesh;
mod point_cloud;
mod sampling;
mod scene;

pub use bbox::BoundingBox;
pub use mesh::{Mesh, Triangle};
pub use point_cloud::PointCloud;
pub use sampling::SurfaceSampler;
pub use scene::{Instance, NamedGeometry, Scene};

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Fixed-size point cloud sampled from a surface

use super::BoundingBox;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Ordered `(samples, 3)` array of surface points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointCloud {
    points: Vec<Point3<f64>>,
}

impl PointCloud {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Shape as `(rows, columns)`; columns is always 3
    pub fn shape(&self) -> (usize, usize) {
        (self.points.len(), 3)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Whether any coordinate is NaN
    pub fn has_nan(&self) -> bool {
        self.points.iter().any(|p| p.coords.iter().any(|c| c.is_nan()))
    }

    /// Whether every coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.points.iter().all(|p| p.coords.iter().all(|c| c.is_finite()))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Rows as plain arrays
    pub fn to_rows(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| [p.x, p.y, p.z]).collect()
    }
}

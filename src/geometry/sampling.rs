// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Area-weighted random sampling over a triangle surface

use super::{Mesh, PointCloud};
use crate::error::{LoaderError, LoaderResult};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws uniformly distributed points from mesh surfaces.
///
/// Unseeded samplers are stochastic; a fixed seed reproduces the exact same
/// points for the same mesh and count.
pub struct SurfaceSampler {
    rng: StdRng,
}

impl SurfaceSampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Sample `count` points from the surface of `mesh`.
    ///
    /// Triangles are picked with probability proportional to their area, then
    /// a point is drawn uniformly inside the picked triangle.
    pub fn sample(&mut self, mesh: &Mesh, count: usize) -> LoaderResult<PointCloud> {
        if count == 0 {
            return Err(LoaderError::InvalidConfig(
                "sample count must be positive".to_string(),
            ));
        }
        if mesh.is_empty() {
            return Err(LoaderError::InvalidGeometry(
                "mesh has no triangles to sample".to_string(),
            ));
        }

        let cumulative: Vec<f64> = mesh
            .triangle_areas()
            .into_iter()
            .scan(0.0, |total, area| {
                *total += area;
                Some(*total)
            })
            .collect();
        let total = cumulative.last().copied().unwrap_or(0.0);

        if total.is_nan() {
            return Err(LoaderError::InvalidGeometry(
                "NaN values contained in the model".to_string(),
            ));
        }
        if total <= 0.0 {
            return Err(LoaderError::InvalidGeometry(
                "mesh surface has zero area".to_string(),
            ));
        }

        let last = cumulative.len() - 1;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let pick = self.rng.gen::<f64>() * total;
            let face = cumulative.partition_point(|&c| c < pick).min(last);
            let [origin, b, c] = mesh.corners(&mesh.triangles[face]);

            let mut u = self.rng.gen::<f64>();
            let mut v = self.rng.gen::<f64>();
            // Fold the unit square onto the triangle half.
            if u + v > 1.0 {
                u = 1.0 - u;
                v = 1.0 - v;
            }

            points.push(Point3::from(
                origin.coords + (b - origin) * u + (c - origin) * v,
            ));
        }

        validate(PointCloud::new(points))
    }
}

/// Reject clouds holding NaN or infinite coordinates
fn validate(cloud: PointCloud) -> LoaderResult<PointCloud> {
    if cloud.has_nan() {
        return Err(LoaderError::InvalidGeometry(
            "NaN values contained in the model".to_string(),
        ));
    }
    if !cloud.is_finite() {
        return Err(LoaderError::InvalidGeometry(
            "sampled coordinates are not finite".to_string(),
        ));
    }
    Ok(cloud)
}

impl Default for SurfaceSampler {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles(far_scale: f64) -> Mesh {
        // Small triangle near the origin, large one far along +x.
        Mesh::from_indexed(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(100.0, 0.0, 0.0),
                Point3::new(100.0 + far_scale, 0.0, 0.0),
                Point3::new(100.0, far_scale, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 5]],
        )
        .unwrap()
    }

    #[test]
    fn test_sample_shape() {
        let mut sampler = SurfaceSampler::seeded(7);
        let cloud = sampler.sample(&two_triangles(1.0), 1024).unwrap();
        assert_eq!(cloud.shape(), (1024, 3));
        assert!(cloud.is_finite());
    }

    #[test]
    fn test_points_lie_on_surface() {
        let mesh = two_triangles(1.0);
        let cloud = SurfaceSampler::seeded(3).sample(&mesh, 500).unwrap();
        for p in cloud.points() {
            assert_eq!(p.z, 0.0);
            let local_x = if p.x >= 100.0 { p.x - 100.0 } else { p.x };
            assert!(local_x >= 0.0 && p.y >= 0.0 && local_x + p.y <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_sampling_is_area_weighted() {
        // The far triangle has 9x the area of the near one.
        let mesh = two_triangles(3.0);
        let cloud = SurfaceSampler::seeded(11).sample(&mesh, 10_000).unwrap();
        let far = cloud.points().iter().filter(|p| p.x >= 100.0).count();
        let ratio = far as f64 / cloud.len() as f64;
        assert!((ratio - 0.9).abs() < 0.03, "far ratio was {}", ratio);
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let mesh = two_triangles(2.0);
        let a = SurfaceSampler::seeded(42).sample(&mesh, 64).unwrap();
        let b = SurfaceSampler::seeded(42).sample(&mesh, 64).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_nan_vertices_rejected() {
        let mesh = Mesh::from_indexed(
            vec![
                Point3::new(f64::NAN, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let result = SurfaceSampler::seeded(1).sample(&mesh, 16);
        assert!(matches!(result, Err(LoaderError::InvalidGeometry(_))));
    }

    #[test]
    fn test_non_finite_clouds_rejected() {
        let ok = PointCloud::new(vec![Point3::new(1.0, 2.0, 3.0)]);
        assert!(validate(ok).is_ok());

        let nan = PointCloud::new(vec![Point3::new(0.0, f64::NAN, 0.0)]);
        match validate(nan) {
            Err(LoaderError::InvalidGeometry(msg)) => assert!(msg.contains("NaN")),
            other => panic!("expected NaN rejection, got {:?}", other),
        }

        let inf = PointCloud::new(vec![Point3::new(f64::INFINITY, 0.0, 0.0)]);
        match validate(inf) {
            Err(LoaderError::InvalidGeometry(msg)) => assert!(msg.contains("not finite")),
            other => panic!("expected non-finite rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_and_empty_meshes_rejected() {
        let flat = Mesh::from_indexed(
            vec![Point3::origin(), Point3::origin(), Point3::origin()],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let mut sampler = SurfaceSampler::seeded(1);
        assert!(matches!(
            sampler.sample(&flat, 8),
            Err(LoaderError::InvalidGeometry(_))
        ));
        assert!(matches!(
            sampler.sample(&Mesh::new(), 8),
            Err(LoaderError::InvalidGeometry(_))
        ));
        assert!(matches!(
            sampler.sample(&two_triangles(1.0), 0),
            Err(LoaderError::InvalidConfig(_))
        ));
    }
}

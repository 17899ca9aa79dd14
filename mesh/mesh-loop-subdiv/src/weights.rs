//! Loop stencil weights.
//!
//! Every even-vertex and limit-position rule is a weighted average of a
//! vertex and its one-ring; only the weight differs.

#![allow(clippy::cast_precision_loss)]

use std::f64::consts::TAU;

use nalgebra::Point3;

/// Even-vertex weight for a regular interior vertex, `β(6)`.
pub const REGULAR_BETA: f64 = 1.0 / 16.0;

/// Even-vertex weight for boundary vertices.
pub const BOUNDARY_BETA: f64 = 1.0 / 8.0;

/// Limit-position weight for boundary vertices.
pub const BOUNDARY_LIMIT_WEIGHT: f64 = 1.0 / 5.0;

/// Loop's even-vertex weight for an interior vertex of valence `n`.
///
/// `β(n) = (1/n)·(5/8 − (3/8 + 1/4·cos(2π/n))²)`
///
/// # Example
///
/// ```
/// use mesh_loop_subdiv::{beta, REGULAR_BETA};
///
/// assert!((beta(6) - REGULAR_BETA).abs() < 1e-15);
/// assert!((beta(3) - 3.0 / 16.0).abs() < 1e-15);
/// ```
#[must_use]
pub fn beta(valence: usize) -> f64 {
    let n = valence as f64;
    let c = 0.25f64.mul_add((TAU / n).cos(), 3.0 / 8.0);
    c.mul_add(-c, 5.0 / 8.0) / n
}

/// Loop's limit-position weight for an interior vertex of valence `n`.
///
/// `γ(n) = 1 / (n + 3/(8·β(n)))`
#[must_use]
pub fn gamma(valence: usize) -> f64 {
    1.0 / (valence as f64 + 3.0 / (8.0 * beta(valence)))
}

/// `(1 − n·w)·P + w·Σ ring`.
pub(crate) fn weight_one_ring(p: Point3<f64>, ring: &[Point3<f64>], w: f64) -> Point3<f64> {
    let mut sum = p.coords * (ring.len() as f64).mul_add(-w, 1.0);
    for q in ring {
        sum += q.coords * w;
    }
    Point3::from(sum)
}

/// `(1 − 2w)·P + w·(ring[0] + ring[last])`.
///
/// A ring with fewer than two entries leaves `P` unchanged.
pub(crate) fn weight_boundary(p: Point3<f64>, ring: &[Point3<f64>], w: f64) -> Point3<f64> {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() >= 2 => {
            Point3::from(p.coords * 2.0f64.mul_add(-w, 1.0) + (first.coords + last.coords) * w)
        }
        _ => p,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_beta_matches_regular_constant() {
        assert_relative_eq!(beta(6), REGULAR_BETA, epsilon = 1e-15);
    }

    #[test]
    fn test_beta_known_values() {
        assert_relative_eq!(beta(3), 3.0 / 16.0, epsilon = 1e-15);
        // Weights stay positive and shrink with valence.
        for n in 3..=12 {
            assert!(beta(n) > 0.0);
            assert!(beta(n + 1) < beta(n));
        }
    }

    #[test]
    fn test_gamma_regular() {
        // 1 / (6 + 3 / (8/16)) = 1/12
        assert_relative_eq!(gamma(6), 1.0 / 12.0, epsilon = 1e-15);
        for n in 3..=12 {
            let g = gamma(n);
            assert!(g > 0.0 && g * (n as f64) < 1.0);
        }
    }

    #[test]
    fn test_weight_one_ring_is_affine() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let ring = [p; 5];
        let out = weight_one_ring(p, &ring, beta(5));
        assert_relative_eq!(out, p, epsilon = 1e-12);
    }

    #[test]
    fn test_weight_one_ring_regular() {
        let ring: Vec<_> = (0..6)
            .map(|k| {
                let a = TAU * f64::from(k) / 6.0;
                Point3::new(a.cos(), a.sin(), 1.0)
            })
            .collect();
        let out = weight_one_ring(Point3::origin(), &ring, REGULAR_BETA);
        // Ring centroid is (0, 0, 1); six neighbors at 1/16 each.
        assert_relative_eq!(out, Point3::new(0.0, 0.0, 6.0 / 16.0), epsilon = 1e-12);
    }

    #[test]
    fn test_weight_boundary_uses_only_ends() {
        let p = Point3::origin();
        let ring = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(100.0, 100.0, 100.0),
            Point3::new(-1.0, 2.0, 0.0),
        ];
        let out = weight_boundary(p, &ring, BOUNDARY_BETA);
        assert_relative_eq!(out, Point3::new(0.0, 0.25, 0.0), epsilon = 1e-12);

        assert_eq!(weight_boundary(p, &ring[..1], BOUNDARY_BETA), p);
    }
}

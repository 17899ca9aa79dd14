//! Limit-surface projection.
//!
//! Pushes every vertex of the final level onto the Loop limit surface and
//! evaluates the limit normal from two tangent masks over its one-ring.

// Arena ids are u32; valences are small
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use std::f64::consts::{PI, TAU};

use nalgebra::{Point3, Vector3};
use tracing::warn;

use crate::error::RefineWarning;
use crate::topology::Level;
use crate::weights::{BOUNDARY_LIMIT_WEIGHT, gamma, weight_boundary, weight_one_ring};

/// A tangent cross product this small relative to `|S|·|T|` has no direction.
const NORMAL_TOLERANCE: f64 = 1e-12;

/// Limit positions and unit normals for every vertex of `level`.
///
/// All positions are projected before any tangent is evaluated, so normals
/// are taken on the limit surface itself. The level is not modified.
pub(crate) fn project(level: &Level) -> (Vec<Point3<f64>>, Vec<Vector3<f64>>, Vec<RefineWarning>) {
    let positions = limit_positions(level);
    let (normals, warnings) = limit_normals(level, &positions);
    (positions, normals, warnings)
}

/// Loop limit position of every vertex.
///
/// Interior vertices use `γ(valence)`, boundary vertices the boundary stencil
/// with weight 1/5.
pub(crate) fn limit_positions(level: &Level) -> Vec<Point3<f64>> {
    let mut ring_ids = Vec::with_capacity(16);
    let mut ring = Vec::with_capacity(16);

    level
        .vertices
        .iter()
        .enumerate()
        .map(|(i, v)| {
            level.one_ring_into(i as u32, &mut ring_ids);
            ring.clear();
            ring.extend(ring_ids.iter().map(|&r| level.vertices[r as usize].position));

            if ring.is_empty() {
                v.position
            } else if v.boundary {
                weight_boundary(v.position, &ring, BOUNDARY_LIMIT_WEIGHT)
            } else {
                weight_one_ring(v.position, &ring, gamma(ring.len()))
            }
        })
        .collect()
}

/// Unit normal of every vertex, evaluated on `positions`.
///
/// `positions` is indexed by vertex id; it is the limit positions after
/// refinement and the control positions for a pass-through.
pub(crate) fn limit_normals(
    level: &Level,
    positions: &[Point3<f64>],
) -> (Vec<Vector3<f64>>, Vec<RefineWarning>) {
    let mut warnings = Vec::new();
    let mut ring_ids = Vec::with_capacity(16);
    let mut ring = Vec::with_capacity(16);
    let mut normals = Vec::with_capacity(level.vertices.len());

    for (i, v) in level.vertices.iter().enumerate() {
        level.one_ring_into(i as u32, &mut ring_ids);
        ring.clear();
        ring.extend(ring_ids.iter().map(|&r| positions[r as usize]));

        let p = positions[i];
        let (s, t) = if v.boundary {
            boundary_tangents(p, &ring)
        } else {
            interior_tangents(&ring)
        };

        let n = s.cross(&t);
        let normal = if n.norm() > NORMAL_TOLERANCE * s.norm() * t.norm() {
            n.normalize()
        } else {
            warnings.push(RefineWarning::DegenerateNormal { vertex: i });
            fallback_normal(level, i as u32, positions)
        };
        normals.push(normal);
    }

    (normals, warnings)
}

/// `S = Σ cos(2πk/n)·ring[k]`, `T = Σ sin(2πk/n)·ring[k]`.
fn interior_tangents(ring: &[Point3<f64>]) -> (Vector3<f64>, Vector3<f64>) {
    let n = ring.len() as f64;
    let mut s = Vector3::zeros();
    let mut t = Vector3::zeros();
    for (k, q) in ring.iter().enumerate() {
        let angle = TAU * k as f64 / n;
        s += q.coords * angle.cos();
        t += q.coords * angle.sin();
    }
    (s, t)
}

/// Boundary tangent masks: `S` along the boundary, `T` across it.
///
/// The ring runs from one boundary neighbor to the other, so its length is
/// the vertex valence.
fn boundary_tangents(p: Point3<f64>, ring: &[Point3<f64>]) -> (Vector3<f64>, Vector3<f64>) {
    let (Some(first), Some(last)) = (ring.first(), ring.last()) else {
        return (Vector3::zeros(), Vector3::zeros());
    };
    let s = last - first;
    let p = p.coords;

    let t = match ring {
        [r0, r1] => r0.coords + r1.coords - p * 2.0,
        [_, r1, _] => r1.coords - p,
        [r0, r1, r2, r3] => {
            -r0.coords + r1.coords * 2.0 + r2.coords * 2.0 - r3.coords - p * 2.0
        }
        _ if ring.len() > 4 => {
            let theta = PI / (ring.len() - 1) as f64;
            let mut t = (first.coords + last.coords) * theta.sin();
            let w = 2.0f64.mul_add(theta.cos(), -2.0);
            for (k, q) in ring.iter().enumerate().take(ring.len() - 1).skip(1) {
                t += q.coords * (w * (k as f64 * theta).sin());
            }
            -t
        }
        _ => Vector3::zeros(),
    };

    (s, t)
}

/// Normal substituted when the tangents do not span a plane: the first face
/// around the vertex (starting at its start face) with non-zero area, else +Z.
///
/// One-rings run clockwise with respect to the face winding, so `S×T` points
/// against the right-hand-rule face normal. The face normal is flipped to
/// match.
fn fallback_normal(level: &Level, v: u32, positions: &[Point3<f64>]) -> Vector3<f64> {
    let mut fan = Vec::new();
    level.fan_into(v, &mut fan);

    let normal = fan
        .iter()
        .map(|&f| level.face_normal(f, positions))
        .find(|n| n.norm() > 0.0)
        .map_or_else(Vector3::z, |n| -n.normalize());

    warn!(
        "Degenerate limit normal at vertex {}: substituting ({:.3}, {:.3}, {:.3})",
        v, normal.x, normal.y, normal.z
    );
    normal
}

//! Vertex classification: boundary, valence and regularity.
//!
//! Only control vertices and newly inserted odd vertices are classified from
//! scratch. Even children copy their parent's flags: subdivision never
//! changes the valence of an existing vertex.

// Arena ids are u32
#![allow(clippy::cast_possible_truncation)]

use nalgebra::Point3;
use tracing::warn;

use crate::error::RefineWarning;
use crate::topology::{Level, SubdivVertex};

/// Valence of a regular interior vertex.
pub const REGULAR_INTERIOR_VALENCE: usize = 6;

/// Valence of a regular boundary vertex.
pub const REGULAR_BOUNDARY_VALENCE: usize = 4;

/// Whether a vertex with this boundary status and valence is regular.
///
/// # Example
///
/// ```
/// use mesh_loop_subdiv::is_regular;
///
/// assert!(is_regular(false, 6));
/// assert!(is_regular(true, 4));
/// assert!(!is_regular(false, 5));
/// assert!(!is_regular(true, 6));
/// ```
#[must_use]
pub const fn is_regular(boundary: bool, valence: usize) -> bool {
    if boundary {
        valence == REGULAR_BOUNDARY_VALENCE
    } else {
        valence == REGULAR_INTERIOR_VALENCE
    }
}

/// Classify every vertex of a freshly built control level.
///
/// A vertex is on the boundary when the walk around it from its start face
/// ends at a missing neighbor instead of returning to the start. Vertices
/// whose walk misses some of the faces that use them are reported.
pub(crate) fn classify_control_level(level: &mut Level) -> Vec<RefineWarning> {
    let mut referenced = vec![0usize; level.vertices.len()];
    for face in &level.faces {
        for &v in &face.v {
            referenced[v as usize] += 1;
        }
    }

    let mut warnings = Vec::new();
    let mut fan = Vec::new();
    for (vi, &referenced) in referenced.iter().enumerate() {
        let closed = level.fan_into(vi as u32, &mut fan);
        let valence = if closed { fan.len() } else { fan.len() + 1 };

        let vertex = &mut level.vertices[vi];
        vertex.boundary = !closed;
        vertex.regular = is_regular(vertex.boundary, valence);

        if fan.len() < referenced {
            warn!(
                "Non-manifold vertex {}: walked {} of {} incident faces",
                vi,
                fan.len(),
                referenced
            );
            warnings.push(RefineWarning::NonManifoldVertex {
                vertex: vi,
                walked: fan.len(),
                referenced,
            });
        }
    }

    warnings
}

/// Even child of `parent`: same flags, position filled in later.
pub(crate) fn even_child(parent: &SubdivVertex) -> SubdivVertex {
    SubdivVertex {
        position: parent.position,
        start_face: None,
        child: None,
        regular: parent.regular,
        boundary: parent.boundary,
    }
}

/// Odd vertex inserted on an edge.
///
/// Odd vertices are always regular: valence 6 in the interior, 4 on a
/// boundary edge.
pub(crate) fn odd_vertex(
    position: Point3<f64>,
    boundary_edge: bool,
    start_face: u32,
) -> SubdivVertex {
    SubdivVertex {
        position,
        start_face: Some(start_face),
        child: None,
        regular: true,
        boundary: boundary_edge,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mesh::ControlMesh;
    use crate::params::SubdivideParams;
    use std::f64::consts::TAU;

    /// A closed fan of `n` triangles around vertex 0.
    fn fan(n: u32) -> ControlMesh {
        let mut positions = vec![Point3::origin()];
        for i in 0..n {
            let angle = TAU * f64::from(i) / f64::from(n);
            positions.push(Point3::new(angle.cos(), angle.sin(), 0.0));
        }
        let faces = (0..n).map(|i| [0, i + 1, (i + 1) % n + 1]).collect();
        ControlMesh::from_parts(positions, faces)
    }

    #[test]
    fn test_regular_table() {
        for valence in 3..=12 {
            assert_eq!(is_regular(false, valence), valence == 6);
            assert_eq!(is_regular(true, valence), valence == 4);
        }
        assert!(is_regular(true, 4));
        assert!(!is_regular(true, 2));
    }

    #[test]
    fn test_fan_center_is_interior() {
        for n in 3..=12 {
            let (level, warnings) =
                Level::from_control(&fan(n), &SubdivideParams::default()).unwrap();
            assert!(warnings.is_empty());
            assert!(!level.is_boundary(0));
            assert_eq!(level.valence(0), n as usize);
            assert_eq!(level.is_regular(0), n == 6);

            // Rim vertices see two faces: boundary, valence 3.
            for v in 1..=n as usize {
                assert!(level.is_boundary(v));
                assert_eq!(level.valence(v), 3);
                assert!(!level.is_regular(v));
            }
        }
    }

    #[test]
    fn test_even_child_copies_flags() {
        let mut parent = SubdivVertex::new(Point3::new(1.0, 2.0, 3.0));
        parent.boundary = true;
        parent.regular = true;
        parent.start_face = Some(9);
        parent.child = Some(4);

        let child = even_child(&parent);
        assert!(child.boundary);
        assert!(child.regular);
        assert_eq!(child.start_face, None);
        assert_eq!(child.child, None);
    }

    #[test]
    fn test_odd_vertex_is_regular() {
        let interior = odd_vertex(Point3::origin(), false, 3);
        assert!(interior.regular);
        assert!(!interior.boundary);
        assert_eq!(interior.start_face, Some(3));

        let boundary = odd_vertex(Point3::origin(), true, 0);
        assert!(boundary.regular);
        assert!(boundary.boundary);
    }
}

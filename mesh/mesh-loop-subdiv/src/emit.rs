//! Flatten the final level into a [`RefinedMesh`].

use nalgebra::{Point3, Vector3};

use crate::mesh::RefinedMesh;
use crate::topology::Level;

/// Build the output buffers from the final level.
///
/// `positions` and `normals` are indexed by vertex id of `level`. Every
/// vertex of a level lies on at least one face, so a vertex id is its output
/// index.
pub(crate) fn emit(
    level: &Level,
    positions: &[Point3<f64>],
    normals: &[Vector3<f64>],
) -> RefinedMesh {
    debug_assert_eq!(positions.len(), level.vertices.len());
    debug_assert_eq!(normals.len(), level.vertices.len());

    RefinedMesh {
        indices: level.faces.iter().map(|face| face.v).collect(),
        positions: positions.to_vec(),
        normals: normals.to_vec(),
    }
}

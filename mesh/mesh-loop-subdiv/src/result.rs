//! Result types for refinement.

// Face counts don't overflow in practice
#![allow(clippy::cast_precision_loss)]

use crate::error::RefineWarning;
use crate::mesh::RefinedMesh;

/// Result of refining one control mesh.
#[derive(Debug, Clone)]
pub struct RefineResult {
    /// The refined mesh on the limit surface.
    pub mesh: RefinedMesh,

    /// Number of faces in the control mesh.
    pub original_faces: usize,

    /// Number of faces in the refined mesh.
    pub final_faces: usize,

    /// Number of vertices in the control mesh.
    pub original_vertices: usize,

    /// Number of vertices in the refined mesh.
    pub final_vertices: usize,

    /// Number of subdivision levels applied.
    pub levels: u32,

    /// Boundary vertices in the final level.
    pub boundary_vertices: usize,

    /// Irregular (extraordinary) vertices in the final level.
    pub irregular_vertices: usize,

    /// Recoverable problems found along the way.
    pub warnings: Vec<RefineWarning>,
}

impl RefineResult {
    /// Get the face multiplication factor.
    #[must_use]
    pub fn face_ratio(&self) -> f64 {
        if self.original_faces == 0 {
            1.0
        } else {
            self.final_faces as f64 / self.original_faces as f64
        }
    }

    /// Get the vertex multiplication factor.
    #[must_use]
    pub fn vertex_ratio(&self) -> f64 {
        if self.original_vertices == 0 {
            1.0
        } else {
            self.final_vertices as f64 / self.original_vertices as f64
        }
    }

    /// Check if any subdivision occurred.
    #[must_use]
    pub const fn was_subdivided(&self) -> bool {
        self.levels > 0 && self.final_faces > self.original_faces
    }

    /// Check if refinement reported any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl std::fmt::Display for RefineResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loop refinement: {} → {} faces ({:.1}x), {} levels, {} boundary / {} irregular vertices",
            self.original_faces,
            self.final_faces,
            self.face_ratio(),
            self.levels,
            self.boundary_vertices,
            self.irregular_vertices
        )?;
        if self.has_warnings() {
            write!(f, ", {} warnings", self.warnings.len())?;
        }
        Ok(())
    }
}

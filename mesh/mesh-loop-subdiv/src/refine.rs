//! Refinement pipeline: topology, subdivision levels, limit projection, emission.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::emit::emit;
use crate::error::{SubdivideError, SubdivideResult};
use crate::limit;
use crate::mesh::ControlMesh;
use crate::params::SubdivideParams;
use crate::result::RefineResult;
use crate::topology::Level;

/// Refine a control mesh onto its Loop limit surface.
///
/// Builds the control topology, subdivides `params.levels` times, projects
/// the final level onto the limit surface and flattens it. With zero levels
/// the control positions and faces are returned unchanged, with normals
/// evaluated from the control one-rings.
///
/// # Errors
///
/// Returns an error if:
/// - The mesh is empty or malformed (see [`Level::from_control`])
/// - The refined mesh would exceed `params.max_faces`
/// - `params.strict_manifold` is set and the mesh is non-manifold or
///   inconsistently wound
///
/// # Examples
///
/// ```
/// use mesh_loop_subdiv::{refine_mesh, ControlMesh, SubdivideParams};
/// use nalgebra::Point3;
///
/// let mesh = ControlMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(1.0, 1.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [0, 2, 3]],
/// );
///
/// let result = refine_mesh(&mesh, &SubdivideParams::new().with_levels(1))?;
/// assert_eq!(result.final_vertices, 9);
/// assert_eq!(result.final_faces, 8);
/// # Ok::<(), mesh_loop_subdiv::SubdivideError>(())
/// ```
pub fn refine_mesh(mesh: &ControlMesh, params: &SubdivideParams) -> SubdivideResult<RefineResult> {
    let projected = params.expected_faces(mesh.face_count());
    if projected > params.max_faces {
        return Err(SubdivideError::MeshTooLarge {
            current: mesh.face_count(),
            projected,
            max: params.max_faces,
        });
    }

    debug!(
        "Refining control mesh: {} faces, {} vertices, {} levels",
        mesh.face_count(),
        mesh.vertex_count(),
        params.levels
    );

    let (mut level, mut warnings) = Level::from_control(mesh, params)?;

    for i in 0..params.levels {
        level = level.subdivide()?;
        debug!(
            "Level {}: {} faces, {} vertices",
            i + 1,
            level.face_count(),
            level.vertex_count()
        );
    }

    let (positions, normals, normal_warnings) = if params.levels == 0 {
        let (normals, normal_warnings) = limit::limit_normals(&level, &mesh.positions);
        (mesh.positions.clone(), normals, normal_warnings)
    } else {
        limit::project(&level)
    };
    warnings.extend(normal_warnings);

    let boundary_vertices = (0..level.vertex_count())
        .filter(|&v| level.is_boundary(v))
        .count();
    let irregular_vertices = (0..level.vertex_count())
        .filter(|&v| !level.is_regular(v))
        .count();

    let refined = emit(&level, &positions, &normals);

    let result = RefineResult {
        original_faces: mesh.face_count(),
        final_faces: refined.face_count(),
        original_vertices: mesh.vertex_count(),
        final_vertices: refined.vertex_count(),
        levels: params.levels,
        boundary_vertices,
        irregular_vertices,
        warnings,
        mesh: refined,
    };

    debug!("{}", result);
    Ok(result)
}

/// Refine independent control meshes, one shape per worker.
///
/// Runs on the rayon pool when `params.parallel` is set. Each shape gets its
/// own result, so one malformed shape does not affect the others.
///
/// # Examples
///
/// ```
/// use mesh_loop_subdiv::{refine_batch, ControlMesh, SubdivideParams};
/// use nalgebra::Point3;
///
/// let triangle = ControlMesh::from_parts(
///     vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
///     vec![[0, 1, 2]],
/// );
///
/// let results = refine_batch(&[triangle, ControlMesh::new()], &SubdivideParams::new());
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err());
/// ```
#[must_use]
pub fn refine_batch(
    meshes: &[ControlMesh],
    params: &SubdivideParams,
) -> Vec<SubdivideResult<RefineResult>> {
    let results: Vec<_> = if params.parallel {
        meshes.par_iter().map(|m| refine_mesh(m, params)).collect()
    } else {
        meshes.iter().map(|m| refine_mesh(m, params)).collect()
    };

    let failed = results.iter().filter(|r| r.is_err()).count();
    let faces: usize = results
        .iter()
        .flatten()
        .map(|r| r.final_faces)
        .sum();
    info!(
        "Refined {} shapes ({} failed): {} faces total, {} levels",
        meshes.len(),
        failed,
        faces,
        params.levels
    );

    results
}

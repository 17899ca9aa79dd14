//! Loop subdivision surfaces.
//!
//! Refines a coarse triangle control mesh into a dense mesh on its Loop limit
//! surface, with per-vertex limit normals:
//!
//! - **Topology**: face adjacency, boundary detection and vertex
//!   classification for the control mesh ([`Level::from_control`])
//! - **Subdivision**: one level at a time, each triangle split into four
//!   with Loop's even/odd vertex rules ([`Level::subdivide`])
//! - **Limit projection**: every final vertex pushed onto the limit surface,
//!   normals from the Loop tangent masks
//! - **Emission**: flat index/position/normal buffers ([`RefinedMesh`])
//!
//! Open meshes are supported; boundary vertices and edges use the boundary
//! rules. Non-manifold edges and winding conflicts are left unlinked with a
//! [`RefineWarning`], or rejected with [`SubdivideParams::strict`].
//!
//! # Examples
//!
//! ```
//! use mesh_loop_subdiv::{refine_mesh, ControlMesh, SubdivideParams};
//! use nalgebra::Point3;
//!
//! // A regular tetrahedron
//! let mesh = ControlMesh::from_parts(
//!     vec![
//!         Point3::new(1.0, 1.0, 1.0),
//!         Point3::new(1.0, -1.0, -1.0),
//!         Point3::new(-1.0, 1.0, -1.0),
//!         Point3::new(-1.0, -1.0, 1.0),
//!     ],
//!     vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]],
//! );
//!
//! let result = refine_mesh(&mesh, &SubdivideParams::new().with_levels(2))?;
//!
//! // 4 * 4^2 = 64 faces after 2 levels
//! assert_eq!(result.final_faces, 64);
//! assert_eq!(result.mesh.normals.len(), result.mesh.positions.len());
//! assert_eq!(result.boundary_vertices, 0);
//! # Ok::<(), mesh_loop_subdiv::SubdivideError>(())
//! ```
//!
//! Scene files carry the depth as a signed integer:
//!
//! ```
//! use mesh_loop_subdiv::{SubdivideError, SubdivideParams};
//!
//! assert_eq!(SubdivideParams::from_scene_levels(2)?.levels, 2);
//! assert!(matches!(
//!     SubdivideParams::from_scene_levels(-1),
//!     Err(SubdivideError::InvalidDepth(-1))
//! ));
//! # Ok::<(), SubdivideError>(())
//! ```

#![warn(missing_docs)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod classify;
mod emit;
mod error;
mod limit;
mod mesh;
mod params;
mod refine;
mod result;
mod step;
mod topology;
mod weights;

pub use classify::{REGULAR_BOUNDARY_VALENCE, REGULAR_INTERIOR_VALENCE, is_regular};
pub use error::{RefineWarning, SubdivideError, SubdivideResult};
pub use mesh::{Aabb, ControlMesh, RefinedMesh};
pub use params::{DEFAULT_LEVELS, SubdivideParams};
pub use refine::{refine_batch, refine_mesh};
pub use result::RefineResult;
pub use topology::Level;
pub use weights::{BOUNDARY_BETA, BOUNDARY_LIMIT_WEIGHT, REGULAR_BETA, beta, gamma};

pub use nalgebra::{Point3, Vector3};

//! Error and diagnostic types for Loop refinement.
//!
//! Structural problems with the control mesh are [`SubdivideError`]s and abort
//! refinement of that shape. Problems that can be repaired locally are
//! [`RefineWarning`]s: they are logged, collected on the result, and
//! refinement continues.

use thiserror::Error;

/// Errors that abort refinement of a single shape.
#[derive(Debug, Error)]
pub enum SubdivideError {
    /// Mesh has no vertices.
    #[error("Mesh has no vertices")]
    EmptyMesh,

    /// Mesh has no faces.
    #[error("Mesh has no faces")]
    NoFaces,

    /// A flat input buffer does not hold whole triples.
    #[error("{buffer} buffer length {len} is not a multiple of 3")]
    MalformedBuffer {
        /// Which buffer was malformed (`"positions"` or `"indices"`).
        buffer: &'static str,
        /// Length of the buffer.
        len: usize,
    },

    /// A face references a vertex outside the position array.
    #[error("face {face} references vertex {index} (mesh has {vertex_count} vertices)")]
    MalformedIndex {
        /// Offending face.
        face: usize,
        /// The out-of-range index.
        index: u32,
        /// Number of vertices in the control mesh.
        vertex_count: usize,
    },

    /// A face repeats a vertex or has zero area.
    #[error("face {face} is degenerate (repeated vertex or zero area)")]
    DegenerateFace {
        /// Offending face.
        face: usize,
    },

    /// A vertex is not used by any face, so it has no one-ring.
    #[error("vertex {vertex} is not referenced by any face")]
    IsolatedVertex {
        /// Offending vertex.
        vertex: usize,
    },

    /// A third face shares an edge that already joins two faces.
    #[error("edge ({}, {}) is shared by more than two faces (extra face {face})", edge.0, edge.1)]
    NonManifoldEdge {
        /// The edge as an ordered `(min, max)` vertex pair.
        edge: (u32, u32),
        /// The face that would have been the third on this edge.
        face: usize,
    },

    /// Two faces traverse their shared edge in the same direction.
    #[error("faces {first} and {second} traverse edge ({}, {}) in the same direction", edge.0, edge.1)]
    InconsistentOrientation {
        /// The edge as an ordered `(min, max)` vertex pair.
        edge: (u32, u32),
        /// The face that introduced the edge.
        first: usize,
        /// The face that repeated it with the same direction.
        second: usize,
    },

    /// Requested subdivision depth is negative or unrepresentable.
    #[error("Invalid subdivision depth: {0} (must be >= 0)")]
    InvalidDepth(i64),

    /// Mesh would exceed maximum size.
    #[error("Subdivision would exceed maximum mesh size ({current} -> {projected} faces, max {max})")]
    MeshTooLarge {
        /// Current face count.
        current: usize,
        /// Projected face count after subdivision.
        projected: usize,
        /// Maximum allowed face count.
        max: usize,
    },
}

/// Result type for subdivision operations.
pub type SubdivideResult<T> = std::result::Result<T, SubdivideError>;

/// Recoverable conditions found while refining a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefineWarning {
    /// A third face on an edge was left unlinked across that edge.
    NonManifoldEdge {
        /// The edge as an ordered `(min, max)` vertex pair.
        edge: (u32, u32),
        /// The face that was left unlinked.
        face: usize,
    },

    /// Two faces with conflicting winding were left unlinked across their edge.
    InconsistentOrientation {
        /// The edge as an ordered `(min, max)` vertex pair.
        edge: (u32, u32),
        /// The face that introduced the edge.
        first: usize,
        /// The face that repeated it with the same direction.
        second: usize,
    },

    /// The neighbor walk around a control vertex reached fewer faces than
    /// reference it; only the walked fan takes part in its stencils.
    NonManifoldVertex {
        /// Control-mesh vertex.
        vertex: usize,
        /// Faces reached by the walk.
        walked: usize,
        /// Faces that reference the vertex.
        referenced: usize,
    },

    /// The limit tangents were parallel; a face normal was substituted.
    DegenerateNormal {
        /// Vertex of the refined mesh.
        vertex: usize,
    },
}

impl std::fmt::Display for RefineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonManifoldEdge { edge, face } => write!(
                f,
                "non-manifold edge ({}, {}): face {face} left unlinked",
                edge.0, edge.1
            ),
            Self::InconsistentOrientation {
                edge,
                first,
                second,
            } => write!(
                f,
                "faces {first} and {second} disagree on winding across edge ({}, {})",
                edge.0, edge.1
            ),
            Self::NonManifoldVertex {
                vertex,
                walked,
                referenced,
            } => write!(
                f,
                "non-manifold vertex {vertex}: walked {walked} of {referenced} faces"
            ),
            Self::DegenerateNormal { vertex } => {
                write!(f, "degenerate limit normal at vertex {vertex}")
            }
        }
    }
}

//! Control and refined mesh buffers.
//!
//! Both meshes use counter-clockwise winding seen from outside. Limit normals
//! are the Loop tangent cross product `S×T`, which points against the
//! right-hand-rule face normal.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SubdivideError, SubdivideResult};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// An empty box (min > max) that any point expands.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing every point.
    #[must_use]
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand(p);
        }
        aabb
    }

    /// Grow the box to include `p`.
    pub fn expand(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// True if no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// True if `p` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, p: &Point3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

/// The coarse triangle mesh handed in by the scene loader.
///
/// # Example
///
/// ```
/// use mesh_loop_subdiv::ControlMesh;
///
/// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
/// let indices = [0, 1, 2];
///
/// let mesh = ControlMesh::from_raw(&positions, &indices)?;
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// # Ok::<(), mesh_loop_subdiv::SubdivideError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlMesh {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,

    /// Triangle faces as indices into `positions`.
    pub faces: Vec<[u32; 3]>,
}

impl ControlMesh {
    /// Create a new empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh from positions and faces.
    #[must_use]
    pub const fn from_parts(positions: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self { positions, faces }
    }

    /// Create a mesh from flat `[x0, y0, z0, ...]` and `[a0, b0, c0, ...]` buffers.
    ///
    /// # Errors
    ///
    /// Returns [`SubdivideError::MalformedBuffer`] if either buffer length is
    /// not a multiple of 3. Index ranges are checked later, by refinement.
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> SubdivideResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(SubdivideError::MalformedBuffer {
                buffer: "positions",
                len: positions.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(SubdivideError::MalformedBuffer {
                buffer: "indices",
                len: indices.len(),
            });
        }

        let positions = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        Ok(Self { positions, faces })
    }

    /// Number of control vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of control faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True if the mesh has no vertices or no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.faces.is_empty()
    }

    /// Object-space bound of the shape.
    ///
    /// Loop subdivision stays inside the convex hull of the control points,
    /// so this also bounds the refined surface.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }
}

/// A refined triangle mesh on the limit surface.
///
/// `positions` and `normals` are parallel arrays; `indices` reference both.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefinedMesh {
    /// Triangles as indices into `positions`/`normals`.
    pub indices: Vec<[u32; 3]>,

    /// Limit-surface positions.
    pub positions: Vec<Point3<f64>>,

    /// Unit limit-surface normals, `normalize(S×T)`.
    pub normals: Vec<Vector3<f64>>,
}

impl RefinedMesh {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.indices.len()
    }

    /// Corner positions of triangle `face`, or `None` if out of range.
    #[must_use]
    pub fn triangle_positions(&self, face: usize) -> Option<[Point3<f64>; 3]> {
        let [a, b, c] = *self.indices.get(face)?;
        Some([
            *self.positions.get(a as usize)?,
            *self.positions.get(b as usize)?,
            *self.positions.get(c as usize)?,
        ])
    }

    /// Bound of the refined positions.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }
}

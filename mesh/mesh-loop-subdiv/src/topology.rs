//! Per-level index arena and control-mesh topology construction.
//!
//! A [`Level`] owns one vertex array and one face array. Every cross link
//! (vertex to incident face, face to neighbor face, parent to child) is a
//! plain `u32` index into the owning level's arrays, so a level is freed in
//! bulk when it is superseded.
//!
//! Face neighbor slot `k` holds the face across the edge `v[k] -> v[k + 1]`.

// Arena ids are u32; counts are checked before each step
#![allow(clippy::cast_possible_truncation)]

use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, Vector3};
use tracing::{debug, warn};

use crate::classify;
use crate::error::{RefineWarning, SubdivideError, SubdivideResult};
use crate::mesh::ControlMesh;
use crate::params::SubdivideParams;

/// Faces whose cross product is this small relative to their edge lengths
/// count as zero-area.
const DEGENERATE_AREA_TOLERANCE: f64 = 1e-12;

#[inline]
pub(crate) const fn next(i: usize) -> usize {
    (i + 1) % 3
}

#[inline]
pub(crate) const fn prev(i: usize) -> usize {
    (i + 2) % 3
}

/// Normalize edge so smaller vertex index comes first.
#[inline]
pub(crate) const fn edge_key(v0: u32, v1: u32) -> (u32, u32) {
    if v0 <= v1 { (v0, v1) } else { (v1, v0) }
}

/// A vertex of one subdivision level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SubdivVertex {
    pub position: Point3<f64>,
    /// Any face that uses this vertex; walks around the vertex start here.
    pub start_face: Option<u32>,
    /// Even child in the next level, once that level is allocated.
    pub child: Option<u32>,
    pub regular: bool,
    pub boundary: bool,
}

impl SubdivVertex {
    pub(crate) const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            start_face: None,
            child: None,
            regular: false,
            boundary: false,
        }
    }
}

/// A triangle of one subdivision level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SubdivFace {
    pub v: [u32; 3],
    pub neighbors: [Option<u32>; 3],
    /// Corner children at `v[0]`, `v[1]`, `v[2]`, then the center child.
    pub children: Option<[u32; 4]>,
}

impl SubdivFace {
    pub(crate) const fn new(v: [u32; 3]) -> Self {
        Self {
            v,
            neighbors: [None; 3],
            children: None,
        }
    }

    /// Slot of `vert` in this face.
    #[inline]
    pub(crate) fn vnum(&self, vert: u32) -> Option<usize> {
        self.v.iter().position(|&x| x == vert)
    }

    /// The corner that is neither `a` nor `b`.
    #[inline]
    pub(crate) fn other_vert(&self, a: u32, b: u32) -> Option<u32> {
        self.v.iter().copied().find(|&x| x != a && x != b)
    }
}

/// One level of the subdivision hierarchy.
///
/// Level 0 is built from a [`ControlMesh`] with [`Level::from_control`];
/// each call to [`Level::subdivide`] produces the next level. Vertex and face
/// ids are dense indices, stable for the lifetime of the level.
///
/// # Example
///
/// ```
/// use mesh_loop_subdiv::{ControlMesh, Level, SubdivideParams};
/// use nalgebra::Point3;
///
/// let mesh = ControlMesh::from_parts(
///     vec![
///         Point3::new(1.0, 1.0, 1.0),
///         Point3::new(1.0, -1.0, -1.0),
///         Point3::new(-1.0, 1.0, -1.0),
///         Point3::new(-1.0, -1.0, 1.0),
///     ],
///     vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]],
/// );
///
/// let (mut level, warnings) = Level::from_control(&mesh, &SubdivideParams::default())?;
/// assert!(warnings.is_empty());
/// assert_eq!(level.edge_count(), 6);
/// assert_eq!(level.valence(0), 3);
///
/// let next = level.subdivide()?;
/// assert_eq!(next.vertex_count(), 4 + 6);
/// assert_eq!(next.face_count(), 16);
/// # Ok::<(), mesh_loop_subdiv::SubdivideError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Level {
    pub(crate) vertices: Vec<SubdivVertex>,
    pub(crate) faces: Vec<SubdivFace>,
    /// Unique undirected edges; the next level adds one vertex per edge.
    pub(crate) edge_count: usize,
}

impl Level {
    /// Validate a control mesh and build its level-0 topology.
    ///
    /// Vertices are classified (boundary, regular) before returning.
    /// Recoverable problems are returned as warnings and logged.
    ///
    /// # Errors
    ///
    /// - [`SubdivideError::EmptyMesh`] / [`SubdivideError::NoFaces`]
    /// - [`SubdivideError::MalformedIndex`] for an out-of-range index
    /// - [`SubdivideError::DegenerateFace`] for a repeated index, or a
    ///   zero-area face when `params.reject_degenerate_faces` is set
    /// - [`SubdivideError::IsolatedVertex`] for a vertex no face uses
    /// - [`SubdivideError::NonManifoldEdge`] and
    ///   [`SubdivideError::InconsistentOrientation`] in strict mode
    pub fn from_control(
        mesh: &ControlMesh,
        params: &SubdivideParams,
    ) -> SubdivideResult<(Self, Vec<RefineWarning>)> {
        validate_control(mesh, params)?;

        let (mut level, mut warnings) = build_topology(mesh, params.strict_manifold)?;
        warnings.extend(classify::classify_control_level(&mut level));

        debug!(
            "Built control topology: {} vertices, {} faces, {} edges, {} warnings",
            level.vertices.len(),
            level.faces.len(),
            level.edge_count,
            warnings.len()
        );

        Ok((level, warnings))
    }

    /// Number of vertices in this level.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces in this level.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of unique undirected edges in this level.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Position of vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn position(&self, v: usize) -> Point3<f64> {
        self.vertices[v].position
    }

    /// Whether vertex `v` lies on the mesh boundary.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn is_boundary(&self, v: usize) -> bool {
        self.vertices[v].boundary
    }

    /// Whether vertex `v` is regular (valence 6 interior, valence 4 boundary).
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn is_regular(&self, v: usize) -> bool {
        self.vertices[v].regular
    }

    /// Vertex ids of face `f`.
    ///
    /// # Panics
    ///
    /// Panics if `f` is out of range.
    #[must_use]
    pub fn face_vertices(&self, f: usize) -> [u32; 3] {
        self.faces[f].v
    }

    /// Neighbor faces of face `f` across each of its edges.
    ///
    /// # Panics
    ///
    /// Panics if `f` is out of range.
    #[must_use]
    pub fn face_neighbors(&self, f: usize) -> [Option<u32>; 3] {
        self.faces[f].neighbors
    }

    /// Valence of vertex `v`: incident faces for an interior vertex,
    /// incident edges (faces + 1) for a boundary vertex.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn valence(&self, v: usize) -> usize {
        let mut fan = Vec::new();
        let closed = self.fan_into(v as u32, &mut fan);
        if closed { fan.len() } else { fan.len() + 1 }
    }

    /// One-ring of vertex `v` as vertex ids.
    ///
    /// Interior rings run once around the vertex; boundary rings run from one
    /// boundary neighbor to the other, so `ring[0]` and `ring[last]` are the
    /// two boundary-adjacent vertices.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn one_ring(&self, v: usize) -> Vec<u32> {
        let mut ring = Vec::new();
        self.one_ring_into(v as u32, &mut ring);
        ring
    }

    /// Subdivide once, returning the next level.
    ///
    /// Records the child links of this level's vertices and faces.
    ///
    /// # Errors
    ///
    /// Returns [`SubdivideError::MeshTooLarge`] if the next level would have
    /// more vertices or faces than `u32` ids can address.
    pub fn subdivide(&mut self) -> SubdivideResult<Self> {
        crate::step::subdivide_level(self)
    }

    #[inline]
    pub(crate) fn next_face(&self, f: u32, v: u32) -> Option<u32> {
        let face = &self.faces[f as usize];
        face.neighbors[face.vnum(v)?]
    }

    #[inline]
    pub(crate) fn prev_face(&self, f: u32, v: u32) -> Option<u32> {
        let face = &self.faces[f as usize];
        face.neighbors[prev(face.vnum(v)?)]
    }

    #[inline]
    pub(crate) fn next_vert(&self, f: u32, v: u32) -> Option<u32> {
        let face = &self.faces[f as usize];
        Some(face.v[next(face.vnum(v)?)])
    }

    #[inline]
    pub(crate) fn prev_vert(&self, f: u32, v: u32) -> Option<u32> {
        let face = &self.faces[f as usize];
        Some(face.v[prev(face.vnum(v)?)])
    }

    /// The corner child of face `f` that touches `v`.
    #[inline]
    pub(crate) fn corner_child(&self, f: u32, v: u32) -> Option<u32> {
        let face = &self.faces[f as usize];
        let k = face.vnum(v)?;
        face.children.map(|c| c[k])
    }

    /// Collect the faces around `v` by walking neighbor links from its start
    /// face. Returns `true` if the walk came back to the start face.
    ///
    /// Open fans are collected forward from the start face, then backward.
    pub(crate) fn fan_into(&self, v: u32, fan: &mut Vec<u32>) -> bool {
        fan.clear();
        let Some(start) = self.vertices[v as usize].start_face else {
            return false;
        };
        let limit = self.faces.len();
        fan.push(start);

        let mut f = start;
        while fan.len() <= limit {
            match self.next_face(f, v) {
                Some(n) if n == start => return true,
                Some(n) => {
                    fan.push(n);
                    f = n;
                }
                None => break,
            }
        }

        let mut f = start;
        while fan.len() <= limit {
            match self.prev_face(f, v) {
                Some(p) => {
                    fan.push(p);
                    f = p;
                }
                None => break,
            }
        }
        false
    }

    /// Gather the one-ring of `v` into `ring` (cleared first).
    pub(crate) fn one_ring_into(&self, v: u32, ring: &mut Vec<u32>) {
        ring.clear();
        let vert = &self.vertices[v as usize];
        let Some(start) = vert.start_face else {
            return;
        };
        let limit = self.faces.len();

        if vert.boundary {
            // Run forward to the face on one boundary edge, then sweep back.
            let mut f = start;
            for _ in 0..limit {
                match self.next_face(f, v) {
                    Some(n) => f = n,
                    None => break,
                }
            }
            ring.extend(self.next_vert(f, v));

            let mut face = Some(f);
            while let Some(cur) = face {
                if ring.len() > limit {
                    break;
                }
                ring.extend(self.prev_vert(cur, v));
                face = self.prev_face(cur, v);
            }
        } else {
            let mut f = start;
            for _ in 0..limit {
                ring.extend(self.next_vert(f, v));
                match self.next_face(f, v) {
                    Some(n) if n != start => f = n,
                    _ => break,
                }
            }
        }
    }

    /// Geometric normal of face `f` under `positions`, not normalized.
    pub(crate) fn face_normal(&self, f: u32, positions: &[Point3<f64>]) -> Vector3<f64> {
        let [a, b, c] = self.faces[f as usize].v;
        let pa = positions[a as usize];
        (positions[b as usize] - pa).cross(&(positions[c as usize] - pa))
    }
}

/// Reject control meshes the arena cannot represent, before allocating it.
fn validate_control(mesh: &ControlMesh, params: &SubdivideParams) -> SubdivideResult<()> {
    if mesh.positions.is_empty() {
        return Err(SubdivideError::EmptyMesh);
    }
    if mesh.faces.is_empty() {
        return Err(SubdivideError::NoFaces);
    }

    let vertex_count = mesh.positions.len();
    let mut referenced = vec![false; vertex_count];

    for (face, tri) in mesh.faces.iter().enumerate() {
        for &index in tri {
            if index as usize >= vertex_count {
                return Err(SubdivideError::MalformedIndex {
                    face,
                    index,
                    vertex_count,
                });
            }
            referenced[index as usize] = true;
        }

        let [a, b, c] = *tri;
        if a == b || b == c || c == a {
            return Err(SubdivideError::DegenerateFace { face });
        }
        if params.reject_degenerate_faces && is_zero_area(mesh, *tri) {
            return Err(SubdivideError::DegenerateFace { face });
        }
    }

    if let Some(vertex) = referenced.iter().position(|&used| !used) {
        return Err(SubdivideError::IsolatedVertex { vertex });
    }

    Ok(())
}

fn is_zero_area(mesh: &ControlMesh, [a, b, c]: [u32; 3]) -> bool {
    let pa = mesh.positions[a as usize];
    let e1 = mesh.positions[b as usize] - pa;
    let e2 = mesh.positions[c as usize] - pa;
    let area2 = e1.cross(&e2).norm();
    area2 <= DEGENERATE_AREA_TOLERANCE * e1.norm() * e2.norm()
}

/// First face and slot that introduced a not-yet-matched edge.
struct OpenEdge {
    face: u32,
    slot: usize,
    from: u32,
}

/// Wire face-to-vertex, vertex-to-face and face-to-face links for level 0.
///
/// Expects a validated mesh.
fn build_topology(
    mesh: &ControlMesh,
    strict: bool,
) -> SubdivideResult<(Level, Vec<RefineWarning>)> {
    let mut vertices: Vec<SubdivVertex> =
        mesh.positions.iter().map(|&p| SubdivVertex::new(p)).collect();
    let mut faces: Vec<SubdivFace> = mesh.faces.iter().map(|&v| SubdivFace::new(v)).collect();

    for (fi, face) in faces.iter().enumerate() {
        for &v in &face.v {
            vertices[v as usize].start_face = Some(fi as u32);
        }
    }

    let mut warnings = Vec::new();
    let mut open: HashMap<(u32, u32), OpenEdge> = HashMap::with_capacity(faces.len() * 3 / 2);
    let mut matched: HashSet<(u32, u32)> = HashSet::with_capacity(faces.len() * 3 / 2);
    let mut edge_count = 0;

    for fi in 0..faces.len() {
        for slot in 0..3 {
            let from = faces[fi].v[slot];
            let to = faces[fi].v[next(slot)];
            let edge = edge_key(from, to);

            if matched.contains(&edge) {
                if strict {
                    return Err(SubdivideError::NonManifoldEdge { edge, face: fi });
                }
                warn!(
                    "Non-manifold edge ({}, {}): leaving face {} unlinked",
                    edge.0, edge.1, fi
                );
                warnings.push(RefineWarning::NonManifoldEdge { edge, face: fi });
                continue;
            }

            match open.remove(&edge) {
                None => {
                    open.insert(
                        edge,
                        OpenEdge {
                            face: fi as u32,
                            slot,
                            from,
                        },
                    );
                    edge_count += 1;
                }
                Some(first) if first.from == from => {
                    if strict {
                        return Err(SubdivideError::InconsistentOrientation {
                            edge,
                            first: first.face as usize,
                            second: fi,
                        });
                    }
                    warn!(
                        "Faces {} and {} traverse edge ({}, {}) in the same direction; leaving it unlinked",
                        first.face, fi, edge.0, edge.1
                    );
                    warnings.push(RefineWarning::InconsistentOrientation {
                        edge,
                        first: first.face as usize,
                        second: fi,
                    });
                    matched.insert(edge);
                }
                Some(first) => {
                    faces[first.face as usize].neighbors[first.slot] = Some(fi as u32);
                    faces[fi].neighbors[slot] = Some(first.face);
                    matched.insert(edge);
                }
            }
        }
    }

    Ok((
        Level {
            vertices,
            faces,
            edge_count,
        },
        warnings,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn tetrahedron() -> ControlMesh {
        ControlMesh::from_parts(
            vec![
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(1.0, -1.0, -1.0),
                Point3::new(-1.0, 1.0, -1.0),
                Point3::new(-1.0, -1.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]],
        )
    }

    fn unit_square() -> ControlMesh {
        ControlMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    fn build(mesh: &ControlMesh) -> Level {
        let (level, warnings) = Level::from_control(mesh, &SubdivideParams::default()).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        level
    }

    #[test]
    fn test_edge_key() {
        assert_eq!(edge_key(0, 1), (0, 1));
        assert_eq!(edge_key(1, 0), (0, 1));
        assert_eq!(edge_key(5, 3), (3, 5));
    }

    #[test]
    fn test_closed_mesh_links_every_edge() {
        let level = build(&tetrahedron());

        assert_eq!(level.edge_count(), 6);
        for f in 0..level.face_count() {
            assert!(level.face_neighbors(f).iter().all(Option::is_some));
        }
    }

    #[test]
    fn test_neighbor_links_are_symmetric() {
        let level = build(&tetrahedron());

        for (fi, face) in level.faces.iter().enumerate() {
            for k in 0..3 {
                let g = face.neighbors[k].unwrap() as usize;
                let (a, b) = (face.v[k], face.v[next(k)]);
                let other = &level.faces[g];
                let j = other.vnum(b).expect("neighbor shares the edge");
                // Opposite traversal: b -> a in the neighbor.
                assert_eq!(other.v[next(j)], a);
                assert_eq!(other.neighbors[j], Some(fi as u32));
            }
        }
    }

    #[test]
    fn test_open_mesh_boundary_slots() {
        let level = build(&unit_square());

        assert_eq!(level.edge_count(), 5);
        // Only the diagonal (0, 2) is shared.
        assert_eq!(level.face_neighbors(0), [None, None, Some(1)]);
        assert_eq!(level.face_neighbors(1), [Some(0), None, None]);
    }

    #[test]
    fn test_one_ring_boundary_order() {
        let level = build(&unit_square());

        // Corner 1 sees a single face: ring runs from one boundary neighbor to the other.
        assert_eq!(level.one_ring(1), vec![2, 0]);
        // Corner 0 sits on the diagonal: both boundary neighbors at the ends.
        let ring = level.one_ring(0);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring[1], 2);
        let ends = edge_key(ring[0], ring[2]);
        assert_eq!(ends, (1, 3));
    }

    #[test]
    fn test_one_ring_interior_visits_each_neighbor_once() {
        let level = build(&tetrahedron());

        for v in 0..4 {
            let mut ring = level.one_ring(v);
            ring.sort_unstable();
            let expected: Vec<u32> = (0..4).filter(|&x| x != v as u32).collect();
            assert_eq!(ring, expected);
        }
    }

    #[test]
    fn test_rejects_empty() {
        let params = SubdivideParams::default();
        assert!(matches!(
            Level::from_control(&ControlMesh::new(), &params),
            Err(SubdivideError::EmptyMesh)
        ));

        let mesh = ControlMesh::from_parts(vec![Point3::origin()], Vec::new());
        assert!(matches!(
            Level::from_control(&mesh, &params),
            Err(SubdivideError::NoFaces)
        ));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let mut mesh = unit_square();
        mesh.faces.push([1, 2, 4]);

        let result = Level::from_control(&mesh, &SubdivideParams::default());
        assert!(matches!(
            result,
            Err(SubdivideError::MalformedIndex {
                face: 2,
                index: 4,
                vertex_count: 4
            })
        ));
    }

    #[test]
    fn test_rejects_degenerate_faces() {
        let mut mesh = unit_square();
        mesh.faces[1] = [0, 2, 2];
        assert!(matches!(
            Level::from_control(&mesh, &SubdivideParams::default()),
            Err(SubdivideError::DegenerateFace { face: 1 })
        ));

        // Collinear corners: zero area.
        let mut mesh = unit_square();
        mesh.positions[3] = Point3::new(2.0, 2.0, 0.0);
        assert!(matches!(
            Level::from_control(&mesh, &SubdivideParams::default()),
            Err(SubdivideError::DegenerateFace { face: 1 })
        ));

        let params = SubdivideParams::default().with_reject_degenerate_faces(false);
        assert!(Level::from_control(&mesh, &params).is_ok());
    }

    #[test]
    fn test_rejects_isolated_vertex() {
        let mut mesh = unit_square();
        mesh.positions.push(Point3::new(5.0, 5.0, 5.0));

        assert!(matches!(
            Level::from_control(&mesh, &SubdivideParams::default()),
            Err(SubdivideError::IsolatedVertex { vertex: 4 })
        ));
    }

    #[test]
    fn test_non_manifold_edge_policy() {
        let mesh = ControlMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
                Point3::new(0.5, -1.0, 0.0),
                Point3::new(0.5, 0.0, 1.0),
            ],
            vec![[0, 1, 2], [1, 0, 3], [0, 1, 4]],
        );

        let (level, warnings) = Level::from_control(&mesh, &SubdivideParams::default()).unwrap();
        assert!(warnings.contains(&RefineWarning::NonManifoldEdge {
            edge: (0, 1),
            face: 2
        }));
        // The first two faces keep their link; the third stays open.
        assert_eq!(level.face_neighbors(0)[0], Some(1));
        assert_eq!(level.face_neighbors(1)[0], Some(0));
        assert_eq!(level.face_neighbors(2)[0], None);

        let result = Level::from_control(&mesh, &SubdivideParams::strict());
        assert!(matches!(
            result,
            Err(SubdivideError::NonManifoldEdge {
                edge: (0, 1),
                face: 2
            })
        ));
    }

    #[test]
    fn test_inconsistent_orientation_policy() {
        let mesh = ControlMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
                Point3::new(0.5, -1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 1, 3]],
        );

        let (level, warnings) = Level::from_control(&mesh, &SubdivideParams::default()).unwrap();
        assert_eq!(
            warnings[0],
            RefineWarning::InconsistentOrientation {
                edge: (0, 1),
                first: 0,
                second: 1
            }
        );
        // Unlinked, the two faces form separate fans around the shared vertices.
        assert!(warnings[1..]
            .iter()
            .all(|w| matches!(w, RefineWarning::NonManifoldVertex { .. })));
        assert_eq!(level.face_neighbors(0), [None; 3]);
        assert_eq!(level.face_neighbors(1), [None; 3]);

        assert!(matches!(
            Level::from_control(&mesh, &SubdivideParams::strict()),
            Err(SubdivideError::InconsistentOrientation { .. })
        ));
    }
}

//! One level of Loop subdivision.
//!
//! The step runs as four level-wide passes. Each pass finishes for every
//! vertex and face before the next one starts, because rewiring (phase D)
//! reads the children of neighboring faces.
//!
//! - A: allocate one even child per vertex and four children per face
//! - B: even-vertex positions
//! - C: one odd vertex per undirected edge
//! - D: child vertex and neighbor links

// Arena ids are u32; counts are checked before each step
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::classify;
use crate::error::{SubdivideError, SubdivideResult};
use crate::topology::{Level, SubdivFace, SubdivVertex, edge_key, next, prev};
use crate::weights::{BOUNDARY_BETA, REGULAR_BETA, beta, weight_boundary, weight_one_ring};

/// Largest vertex or face count a level can address with `u32` ids.
const MAX_LEVEL_ELEMENTS: usize = u32::MAX as usize;

/// Subdivide `level` once and return the next level.
///
/// Sets the `child`/`children` links of `level` along the way. Fails with
/// [`SubdivideError::MeshTooLarge`] before touching `level` when the next
/// level's ids would overflow `u32`.
pub(crate) fn subdivide_level(level: &mut Level) -> SubdivideResult<Level> {
    check_child_counts(level.vertices.len(), level.faces.len(), level.edge_count)?;

    let mut vertices = allocate_even_children(level);
    let mut faces = allocate_face_children(level);

    update_even_positions(level, &mut vertices);
    let edge_verts = create_odd_vertices(level, &mut vertices);

    link_even_start_faces(level, &mut vertices);
    link_child_neighbors(level, &mut faces);
    link_child_vertices(level, &edge_verts, &mut faces);

    let refined = Level {
        edge_count: 2 * edge_verts.len() + 3 * level.faces.len(),
        vertices,
        faces,
    };

    debug!(
        "Loop step: {} -> {} faces, {} -> {} vertices ({} edges split)",
        level.faces.len(),
        refined.faces.len(),
        level.vertices.len(),
        refined.vertices.len(),
        edge_verts.len()
    );

    Ok(refined)
}

/// The next level has `V + E` vertices and `4F` faces.
fn check_child_counts(vertices: usize, faces: usize, edges: usize) -> SubdivideResult<()> {
    let child_faces = faces.saturating_mul(4);
    let child_vertices = vertices.saturating_add(edges);
    if child_faces > MAX_LEVEL_ELEMENTS || child_vertices > MAX_LEVEL_ELEMENTS {
        return Err(SubdivideError::MeshTooLarge {
            current: faces,
            projected: child_faces,
            max: MAX_LEVEL_ELEMENTS,
        });
    }
    Ok(())
}

/// Phase A: even child `i` of vertex `i`, flags copied from the parent.
///
/// The vector is sized for the odd vertices phase C appends.
fn allocate_even_children(level: &mut Level) -> Vec<SubdivVertex> {
    let mut vertices = Vec::with_capacity(level.vertices.len() + level.edge_count);
    for (i, v) in level.vertices.iter_mut().enumerate() {
        v.child = Some(i as u32);
        vertices.push(classify::even_child(v));
    }
    vertices
}

/// Phase A: children `4j..4j+4` of face `j`.
fn allocate_face_children(level: &mut Level) -> Vec<SubdivFace> {
    for (j, face) in level.faces.iter_mut().enumerate() {
        let first = 4 * j as u32;
        face.children = Some([first, first + 1, first + 2, first + 3]);
    }
    vec![SubdivFace::default(); 4 * level.faces.len()]
}

/// Phase B: reposition every even child from its parent's one-ring.
fn update_even_positions(level: &Level, vertices: &mut [SubdivVertex]) {
    let mut ring_ids = Vec::with_capacity(16);
    let mut ring = Vec::with_capacity(16);

    for (i, v) in level.vertices.iter().enumerate() {
        level.one_ring_into(i as u32, &mut ring_ids);
        ring.clear();
        ring.extend(ring_ids.iter().map(|&r| level.vertices[r as usize].position));

        vertices[i].position = if v.boundary {
            weight_boundary(v.position, &ring, BOUNDARY_BETA)
        } else if v.regular {
            weight_one_ring(v.position, &ring, REGULAR_BETA)
        } else {
            weight_one_ring(v.position, &ring, beta(ring.len()))
        };
    }
}

/// Phase C: one odd vertex per undirected edge, keyed by its endpoints.
///
/// The map lives for this step only; the second face on an edge reuses the
/// vertex the first face created.
fn create_odd_vertices(
    level: &Level,
    vertices: &mut Vec<SubdivVertex>,
) -> HashMap<(u32, u32), u32> {
    let mut edge_verts: HashMap<(u32, u32), u32> = HashMap::with_capacity(level.edge_count);

    for face in &level.faces {
        let Some(children) = face.children else {
            continue;
        };
        for k in 0..3 {
            let (a, b) = (face.v[k], face.v[next(k)]);
            let edge = edge_key(a, b);
            if edge_verts.contains_key(&edge) {
                continue;
            }

            let pa = level.vertices[a as usize].position;
            let pb = level.vertices[b as usize].position;
            let opposite = face.neighbors[k].and_then(|n| {
                let near = face.other_vert(a, b)?;
                let far = level.faces[n as usize].other_vert(a, b)?;
                Some((
                    level.vertices[near as usize].position,
                    level.vertices[far as usize].position,
                ))
            });

            let position = match opposite {
                Some((near, far)) => Point3::from(
                    (pa.coords + pb.coords) * (3.0 / 8.0) + (near.coords + far.coords) * (1.0 / 8.0),
                ),
                None => nalgebra::center(&pa, &pb),
            };

            let id = vertices.len() as u32;
            vertices.push(classify::odd_vertex(
                position,
                face.neighbors[k].is_none(),
                children[3],
            ));
            edge_verts.insert(edge, id);
        }
    }

    edge_verts
}

/// Phase D: an even child starts at the corner child of its parent's start face.
fn link_even_start_faces(level: &Level, vertices: &mut [SubdivVertex]) {
    for (i, v) in level.vertices.iter().enumerate() {
        let Some(child) = v.child else {
            continue;
        };
        vertices[child as usize].start_face = v
            .start_face
            .and_then(|f| level.corner_child(f, i as u32));
    }
}

/// Phase D: neighbor links between siblings and across parent edges.
///
/// A corner child's outer neighbors are the corner children of the parent's
/// neighbors at the same corner vertex.
fn link_child_neighbors(level: &Level, faces: &mut [SubdivFace]) {
    for face in &level.faces {
        let Some(ch) = face.children else {
            continue;
        };
        for k in 0..3 {
            faces[ch[3] as usize].neighbors[k] = Some(ch[next(k)]);
            faces[ch[k] as usize].neighbors[next(k)] = Some(ch[3]);

            faces[ch[k] as usize].neighbors[k] = face.neighbors[k]
                .and_then(|f2| level.corner_child(f2, face.v[k]));
            faces[ch[k] as usize].neighbors[prev(k)] = face.neighbors[prev(k)]
                .and_then(|f2| level.corner_child(f2, face.v[k]));
        }
    }
}

/// Phase D: corner child `k` is (even `v[k]`, odd on edge k, odd on edge k-1);
/// the center child is the three odd vertices.
fn link_child_vertices(
    level: &Level,
    edge_verts: &HashMap<(u32, u32), u32>,
    faces: &mut [SubdivFace],
) {
    for face in &level.faces {
        let Some(ch) = face.children else {
            continue;
        };
        for k in 0..3 {
            if let Some(even) = level.vertices[face.v[k] as usize].child {
                faces[ch[k] as usize].v[k] = even;
            }
            if let Some(&odd) = edge_verts.get(&edge_key(face.v[k], face.v[next(k)])) {
                faces[ch[k] as usize].v[next(k)] = odd;
                faces[ch[next(k)] as usize].v[k] = odd;
                faces[ch[3] as usize].v[k] = odd;
            }
        }
    }
}

//! Benchmarks for mesh-loop-subdiv operations.
//!
//! Run with: cargo bench -p mesh-loop-subdiv
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-loop-subdiv -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-loop-subdiv -- --baseline main

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_loop_subdiv::{ControlMesh, Point3, SubdivideParams, refine_batch, refine_mesh};

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Unit icosahedron, wound outward.
fn create_icosahedron() -> ControlMesh {
    let phi = f64::midpoint(1.0, 5.0_f64.sqrt());
    let a = 1.0;
    let b = 1.0 / phi;

    let ico_verts = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ];

    let positions = ico_verts
        .iter()
        .map(|v| {
            let len = v[2].mul_add(v[2], v[0].mul_add(v[0], v[1] * v[1])).sqrt();
            Point3::new(v[0] / len, v[1] / len, v[2] / len)
        })
        .collect();

    let faces = vec![
        [0, 2, 1],
        [3, 1, 2],
        [3, 5, 4],
        [3, 4, 8],
        [0, 7, 6],
        [0, 6, 9],
        [4, 11, 10],
        [6, 10, 11],
        [2, 9, 5],
        [11, 5, 9],
        [1, 8, 7],
        [10, 7, 8],
        [3, 2, 5],
        [3, 8, 1],
        [0, 9, 2],
        [0, 1, 7],
        [6, 11, 9],
        [6, 7, 10],
        [4, 5, 11],
        [4, 10, 8],
    ];

    ControlMesh::from_parts(positions, faces)
}

/// Planar `n`×`n` grid: mostly regular, with a boundary.
fn create_grid(n: u32) -> ControlMesh {
    let row = n + 1;
    let positions = (0..row)
        .flat_map(|j| (0..row).map(move |i| Point3::new(f64::from(i), f64::from(j), 0.0)))
        .collect();
    let faces = (0..n)
        .flat_map(|j| {
            (0..n).flat_map(move |i| {
                let a = j * row + i;
                [[a, a + 1, a + row + 1], [a, a + row + 1, a + row]]
            })
        })
        .collect();
    ControlMesh::from_parts(positions, faces)
}

// =============================================================================
// Refinement Benchmarks
// =============================================================================

fn bench_refine(c: &mut Criterion) {
    let mut group = c.benchmark_group("Refine");

    let test_cases = [
        ("icosahedron_20tri", create_icosahedron()),
        ("grid_128tri", create_grid(8)),
    ];

    for (name, mesh) in &test_cases {
        for levels in 1..=4u32 {
            let params = SubdivideParams::new().with_levels(levels);
            group.throughput(Throughput::Elements(params.expected_faces(mesh.face_count()) as u64));

            group.bench_with_input(
                BenchmarkId::new(format!("levels_{levels}"), name),
                &(mesh, params),
                |b, (mesh, params)| {
                    b.iter(|| refine_mesh(black_box(mesh), black_box(params)));
                },
            );
        }
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Batch");
    group.sample_size(20); // Each sample refines every shape

    let meshes: Vec<_> = (0..32).map(|_| create_icosahedron()).collect();

    for parallel in [false, true] {
        let params = SubdivideParams::new().with_levels(3).with_parallel(parallel);
        let id = if parallel { "parallel" } else { "sequential" };

        group.bench_with_input(
            BenchmarkId::new("icosahedron_x32", id),
            &params,
            |b, params| {
                b.iter(|| refine_batch(black_box(&meshes), black_box(params)));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_refine, bench_batch);
criterion_main!(benches);

//! ECS traversal and churn benchmarks.
//!
//! Measures the two access patterns the simulation leans on every tick:
//! mutable `each` traversal with per-entity world access, and the
//! create/destroy/sweep churn produced by short-lived actors (projectiles,
//! score numbers, effects).
//!
//! Run with: `cargo bench --bench ecs_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sable_ecs::prelude::*;

// ---------------------------------------------------------------------------
// Benchmark component types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
struct Position {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
struct Velocity {
    dx: i32,
    dy: i32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn setup_world(entity_count: usize) -> World {
    let mut world = World::new();
    world.register_component::<Position>("position");
    world.register_component::<Velocity>("velocity");
    for i in 0..entity_count as i32 {
        if i % 2 == 0 {
            world.spawn((Position { x: i, y: 0 }, Velocity { dx: 1, dy: 0 }));
        } else {
            world.spawn_with(Position { x: i, y: 0 });
        }
    }
    world
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_each_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("each_position_velocity");
    for count in [100usize, 1_000, 10_000] {
        let mut world = setup_world(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &_count| {
            b.iter(|| {
                world.each::<(Position, Velocity)>(|world, e| {
                    let dx = world.component::<Velocity>(e).dx;
                    world.component_mut::<Position>(e).x += dx;
                });
            });
        });
    }
    group.finish();
}

fn bench_query_read_only(c: &mut Criterion) {
    let world = setup_world(1_000);
    c.bench_function("query_1k_read_only", |b| {
        b.iter(|| {
            let sum: i32 = world
                .query::<(&Position, Option<&Velocity>)>()
                .map(|(_, (p, v))| p.x + v.map_or(0, |v| v.dx))
                .sum();
            black_box(sum);
        });
    });
}

fn bench_spawn_destroy_sweep(c: &mut Criterion) {
    let mut world = setup_world(1_000);
    c.bench_function("churn_100_spawn_destroy_sweep", |b| {
        b.iter(|| {
            let spawned: Vec<EntityId> = (0..100)
                .map(|i| world.spawn((Position { x: i, y: 0 }, Velocity { dx: 0, dy: 1 })))
                .collect();
            for e in spawned {
                world.destroy(e);
            }
            black_box(world.sweep_destroyed());
        });
    });
}

// ---------------------------------------------------------------------------
// Criterion groups and main
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_each_scaling,
    bench_query_read_only,
    bench_spawn_destroy_sweep,
);
criterion_main!(benches);

use std::hint::black_box;
use std::time::Instant;

use glam::Vec3;
use orrery_common::NodeHandle;
use orrery_kernel::{Body, NodeSink, OrbitAnimator};

/// Discards every write so only the orbital math is measured.
struct NullSink;

impl NodeSink for NullSink {
    fn set_node_position(&mut self, node: NodeHandle, position: Vec3) {
        black_box((node, position));
    }

    fn set_node_rotation_y(&mut self, node: NodeHandle, angle: f32) {
        black_box((node, angle));
    }
}

fn make_bodies(planets: usize, moons_per_planet: usize) -> Vec<Body> {
    let mut handle = 0u32;
    let mut next = || {
        handle += 1;
        NodeHandle(handle)
    };
    (0..planets)
        .map(|i| {
            let mut planet = Body::new(format!("planet-{i}"), 0.001 * (i + 1) as f64, 5.0 * (i + 1) as f64)
                .bound_to(next());
            for j in 0..moons_per_planet {
                planet = planet.with_satellite(
                    Body::new(format!("moon-{i}-{j}"), 0.01 * (j + 1) as f64, (j + 1) as f64)
                        .bound_to(next()),
                );
            }
            planet
        })
        .collect()
}

fn bench_advance(planets: usize, moons: usize, iterations: usize) {
    let mut bodies = make_bodies(planets, moons);
    let mut animator = OrbitAnimator::new();
    let mut sink = NullSink;

    let start = Instant::now();
    for _ in 0..iterations {
        animator.advance(black_box(&mut bodies), &mut [], &mut sink);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  advance ({planets} planets x {moons} moons, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Orbit Advance Benchmarks ===\n");

    bench_advance(4, 1, 100_000);
    bench_advance(100, 2, 10_000);
    bench_advance(1000, 4, 1000);

    println!("\n=== Done ===");
}

use glam::Vec3;
use orrery_common::NodeHandle;

use crate::body::Body;

/// Write-back seam between the animator and whatever owns the visual nodes.
pub trait NodeSink {
    fn set_node_position(&mut self, node: NodeHandle, position: Vec3);

    /// Set the node's rotation to a pure rotation about Y.
    fn set_node_rotation_y(&mut self, node: NodeHandle, angle: f32);
}

/// A node that turns in place at a fixed rate, like the sun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spinner {
    pub node: NodeHandle,
    /// Radians per tick.
    pub rate: f64,
    angle: f64,
}

impl Spinner {
    pub fn new(node: NodeHandle, rate: f64) -> Self {
        Self {
            node,
            rate,
            angle: 0.0,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }
}

/// Advances orbital phases once per rendered frame.
///
/// There is no state machine: the animator has one mode and is invoked
/// repeatedly for the life of the session.
#[derive(Debug, Clone, Default)]
pub struct OrbitAnimator {
    tick: u64,
}

impl OrbitAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed advances.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance every body, then every spinner, and write results to `sink`.
    ///
    /// Bodies are processed in list order; each satellite is advanced right
    /// after its parent. A body's phase is also written as the node's Y
    /// rotation, so children composed by the renderer turn with it.
    pub fn advance(&mut self, bodies: &mut [Body], spinners: &mut [Spinner], sink: &mut impl NodeSink) {
        self.tick += 1;
        let _span = tracing::debug_span!("orbit_advance", tick = self.tick).entered();
        for body in bodies.iter_mut() {
            advance_body(body, sink);
        }
        for spinner in spinners.iter_mut() {
            spinner.angle += spinner.rate;
            sink.set_node_rotation_y(spinner.node, spinner.angle as f32);
        }
    }
}

fn advance_body(body: &mut Body, sink: &mut impl NodeSink) {
    let position = body.advance_phase();
    if let Some(node) = body.node() {
        sink.set_node_position(node, position.as_vec3());
        sink.set_node_rotation_y(node, body.phase() as f32);
    }
    for satellite in body.satellites_mut() {
        advance_body(satellite, sink);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Captures the last value written per node.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        pub positions: BTreeMap<NodeHandle, Vec3>,
        pub rotations: BTreeMap<NodeHandle, f32>,
        pub writes: usize,
    }

    impl NodeSink for RecordingSink {
        fn set_node_position(&mut self, node: NodeHandle, position: Vec3) {
            self.positions.insert(node, position);
            self.writes += 1;
        }

        fn set_node_rotation_y(&mut self, node: NodeHandle, angle: f32) {
            self.rotations.insert(node, angle);
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn phase_accumulates_without_wrapping() {
        let mut bodies = vec![Body::new("Fast", 1.0, 1.0)];
        let mut sink = RecordingSink::default();
        let mut animator = OrbitAnimator::new();
        for _ in 0..10 {
            animator.advance(&mut bodies, &mut [], &mut sink);
        }
        assert!(close(bodies[0].phase(), 10.0));
        assert!(bodies[0].phase() > std::f64::consts::TAU);
        assert_eq!(animator.tick(), 10);
    }

    #[test]
    fn hundred_ticks_reach_one_radian() {
        let mut bodies = vec![Body::new("Mercury", 0.01, 10.0).bound_to(NodeHandle(0))];
        let mut sink = RecordingSink::default();
        let mut animator = OrbitAnimator::new();
        for _ in 0..100 {
            animator.advance(&mut bodies, &mut [], &mut sink);
        }
        let body = &bodies[0];
        assert!(close(body.phase(), 1.0));
        assert!(close(body.position().x, 8.414_709_848));
        assert!(close(body.position().z, 5.403_023_058));
        assert_eq!(body.position().x, body.phase().sin() * 10.0);
        assert_eq!(body.position().z, body.phase().cos() * 10.0);

        let written = sink.positions[&NodeHandle(0)];
        assert!((written.x - 8.414_71).abs() < 1e-4);
        assert!((written.z - 5.403_02).abs() < 1e-4);
    }

    #[test]
    fn closed_form_holds_for_any_tick_count() {
        let (s, r) = (0.037, 4.5);
        let mut bodies = vec![Body::new("B", s, r)];
        let mut animator = OrbitAnimator::new();
        let mut sink = RecordingSink::default();
        for n in 1..=500u32 {
            animator.advance(&mut bodies, &mut [], &mut sink);
            let expected = f64::from(n) * s;
            assert!(close(bodies[0].phase(), expected));
            assert!(close(bodies[0].position().x, expected.sin() * r));
            assert!(close(bodies[0].position().z, expected.cos() * r));
        }
    }

    #[test]
    fn zero_radius_stays_at_origin() {
        let mut bodies = vec![Body::new("Still", 0.3, 0.0).with_height(2.0)];
        let mut animator = OrbitAnimator::new();
        let mut sink = RecordingSink::default();
        for _ in 0..50 {
            animator.advance(&mut bodies, &mut [], &mut sink);
            let p = bodies[0].position();
            assert_eq!(p.x.abs(), 0.0);
            assert_eq!(p.z.abs(), 0.0);
            assert_eq!(p.y, 2.0);
        }
    }

    #[test]
    fn zero_speed_is_constant() {
        let mut bodies = vec![Body::new("Parked", 0.0, 7.0)];
        let mut animator = OrbitAnimator::new();
        let mut sink = RecordingSink::default();
        for _ in 0..25 {
            animator.advance(&mut bodies, &mut [], &mut sink);
            assert_eq!(bodies[0].position().x, 0.0);
            assert_eq!(bodies[0].position().z, 7.0);
        }
    }

    #[test]
    fn satellite_local_position_ignores_parent_speed() {
        let run = |parent_speed: f64| {
            let mut bodies = vec![
                Body::new("Earth", parent_speed, 20.0)
                    .with_satellite(Body::new("Moon", 0.015, 3.0)),
            ];
            let mut animator = OrbitAnimator::new();
            let mut sink = RecordingSink::default();
            for _ in 0..40 {
                animator.advance(&mut bodies, &mut [], &mut sink);
            }
            bodies[0].satellites()[0].position()
        };
        assert_eq!(run(0.005), run(0.5));
        assert_eq!(run(0.005), run(0.0));
    }

    #[test]
    fn satellite_one_tick_reference_values() {
        let mut bodies =
            vec![Body::new("Earth", 0.005, 20.0).with_satellite(Body::new("Moon", 0.015, 3.0))];
        let mut animator = OrbitAnimator::new();
        animator.advance(&mut bodies, &mut [], &mut RecordingSink::default());
        let moon = bodies[0].satellites()[0].position();
        assert!((moon.x - 0.044_998_3).abs() < 1e-6);
        assert!((moon.z - 2.999_662_5).abs() < 1e-6);
    }

    #[test]
    fn reordering_bodies_keeps_trajectories() {
        let make = || {
            vec![
                Body::new("A", 0.01, 10.0),
                Body::new("B", 0.007, 15.0).with_satellite(Body::new("b", 0.02, 1.0)),
                Body::new("C", 0.003, 25.0),
            ]
        };
        let mut forward = make();
        let mut reversed = make();
        reversed.reverse();
        let mut a1 = OrbitAnimator::new();
        let mut a2 = OrbitAnimator::new();
        for _ in 0..200 {
            a1.advance(&mut forward, &mut [], &mut RecordingSink::default());
            a2.advance(&mut reversed, &mut [], &mut RecordingSink::default());
        }
        for body in &forward {
            let twin = reversed.iter().find(|b| b.name() == body.name()).unwrap();
            assert_eq!(body, twin);
        }
    }

    #[test]
    fn only_bound_bodies_are_written() {
        let mut bodies = vec![
            Body::new("Bound", 0.1, 1.0)
                .bound_to(NodeHandle(3))
                .with_satellite(Body::new("Unbound", 0.1, 1.0)),
        ];
        let mut sink = RecordingSink::default();
        OrbitAnimator::new().advance(&mut bodies, &mut [], &mut sink);
        assert_eq!(sink.writes, 1);
        assert!((sink.rotations[&NodeHandle(3)] - 0.1).abs() < 1e-7);
    }

    #[test]
    fn spinners_turn_each_tick() {
        let mut spinners = vec![Spinner::new(NodeHandle(9), 0.01)];
        let mut sink = RecordingSink::default();
        let mut animator = OrbitAnimator::new();
        for _ in 0..3 {
            animator.advance(&mut [], &mut spinners, &mut sink);
        }
        assert!((spinners[0].angle() - 0.03).abs() < 1e-12);
        assert!((sink.rotations[&NodeHandle(9)] - 0.03).abs() < 1e-6);
        assert!(sink.positions.is_empty());
    }

    #[test]
    fn spinner_angle_keeps_precision_over_long_runs() {
        let mut spinners = vec![Spinner::new(NodeHandle(0), 0.01)];
        let mut sink = RecordingSink::default();
        let mut animator = OrbitAnimator::new();
        let ticks = 1_000_000u32;
        for _ in 0..ticks {
            animator.advance(&mut [], &mut spinners, &mut sink);
        }
        // Same accumulation as a body phase with speed 0.01.
        let mut body = Body::new("ref", 0.01, 1.0);
        for _ in 0..ticks {
            body.advance_phase();
        }
        assert_eq!(spinners[0].angle(), body.phase());
        assert!((spinners[0].angle() - 10_000.0).abs() < 1e-3);
    }
}

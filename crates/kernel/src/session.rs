use crate::animator::{NodeSink, OrbitAnimator, Spinner};
use crate::body::Body;

/// One running animation: the bodies, the spinners and the sink they write to.
///
/// All state is owned here and passed explicitly into each advance; there is
/// no shared global scene.
#[derive(Debug)]
pub struct Session<S: NodeSink> {
    bodies: Vec<Body>,
    spinners: Vec<Spinner>,
    animator: OrbitAnimator,
    sink: S,
}

impl<S: NodeSink> Session<S> {
    pub fn new(sink: S) -> Self {
        Self {
            bodies: Vec::new(),
            spinners: Vec::new(),
            animator: OrbitAnimator::new(),
            sink,
        }
    }

    /// Append a top-level body. Satellites must already be nested inside it.
    pub fn add_body(&mut self, body: Body) {
        self.bodies.push(body);
    }

    pub fn add_spinner(&mut self, spinner: Spinner) {
        self.spinners.push(spinner);
    }

    /// Advance the animation by one tick.
    pub fn tick(&mut self) {
        self.animator
            .advance(&mut self.bodies, &mut self.spinners, &mut self.sink);
    }

    /// Advance `n` ticks.
    pub fn run(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.animator.tick()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn spinners(&self) -> &[Spinner] {
        &self.spinners
    }

    /// Total number of satellites across all bodies.
    pub fn satellite_count(&self) -> usize {
        self.bodies.iter().map(Body::descendant_count).sum()
    }

    /// Depth-first lookup by name, satellites included.
    pub fn find_body(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find_map(|b| b.find(name))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

use glam::DVec3;
use orrery_common::NodeHandle;

/// An orbiting entity: a planet, or a satellite nested under one.
///
/// Orbital math runs in `f64`. The phase accumulates without wrapping; it is
/// only ever fed to `sin`/`cos`.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    name: String,
    angular_speed: f64,
    orbital_radius: f64,
    phase: f64,
    position: DVec3,
    node: Option<NodeHandle>,
    satellites: Vec<Body>,
}

impl Body {
    /// A body at phase 0, placed on +X at its orbital radius until the first tick.
    pub fn new(name: impl Into<String>, angular_speed: f64, orbital_radius: f64) -> Self {
        Self {
            name: name.into(),
            angular_speed,
            orbital_radius,
            phase: 0.0,
            position: DVec3::new(orbital_radius, 0.0, 0.0),
            node: None,
            satellites: Vec::new(),
        }
    }

    /// Set the vertical coordinate. Advancing never changes it.
    pub fn with_height(mut self, y: f64) -> Self {
        self.position.y = y;
        self
    }

    pub fn with_satellite(mut self, satellite: Body) -> Self {
        self.satellites.push(satellite);
        self
    }

    /// Associate the renderer node this body writes its position to.
    pub fn bound_to(mut self, node: NodeHandle) -> Self {
        self.node = Some(node);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn angular_speed(&self) -> f64 {
        self.angular_speed
    }

    pub fn orbital_radius(&self) -> f64 {
        self.orbital_radius
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Last computed position, in the parent's frame for satellites.
    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }

    pub fn satellites(&self) -> &[Body] {
        &self.satellites
    }

    pub(crate) fn satellites_mut(&mut self) -> &mut [Body] {
        &mut self.satellites
    }

    /// Advance the phase by one tick and derive the planar position.
    pub fn advance_phase(&mut self) -> DVec3 {
        self.phase += self.angular_speed;
        self.position.x = self.phase.sin() * self.orbital_radius;
        self.position.z = self.phase.cos() * self.orbital_radius;
        self.position
    }

    /// Depth-first search for `name` among this body and its satellites.
    pub fn find(&self, name: &str) -> Option<&Body> {
        if self.name == name {
            return Some(self);
        }
        self.satellites.iter().find_map(|s| s.find(name))
    }

    /// Number of satellites at every depth below this body.
    pub fn descendant_count(&self) -> usize {
        self.satellites
            .iter()
            .map(|s| 1 + s.descendant_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_body_starts_at_zero_phase() {
        let b = Body::new("Mercury", 0.01, 10.0);
        assert_eq!(b.phase(), 0.0);
        assert_eq!(b.position(), DVec3::new(10.0, 0.0, 0.0));
        assert!(b.node().is_none());
    }

    #[test]
    fn advance_keeps_height() {
        let mut b = Body::new("Tilted", 0.5, 2.0).with_height(1.25);
        for _ in 0..10 {
            b.advance_phase();
        }
        assert_eq!(b.position().y, 1.25);
    }

    #[test]
    fn find_searches_satellites() {
        let mars = Body::new("Mars", 0.003, 25.0)
            .with_satellite(Body::new("Phobos", 0.01, 2.0))
            .with_satellite(Body::new("Deimos", 0.03, 3.0));
        assert_eq!(mars.find("Deimos").map(Body::orbital_radius), Some(3.0));
        assert!(mars.find("Moon").is_none());
        assert_eq!(mars.descendant_count(), 2);
    }

    #[test]
    fn single_advance_matches_closed_form() {
        let mut b = Body::new("Moon", 0.015, 3.0);
        let p = b.advance_phase();
        assert!((p.x - 0.015f64.sin() * 3.0).abs() < 1e-12);
        assert!((p.z - 0.015f64.cos() * 3.0).abs() < 1e-12);
    }
}

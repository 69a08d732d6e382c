use glam::DVec3;
use orrery_kernel::{Body, NodeSink, Session};

/// Read-only queries against a running session for debugging and UI.
pub struct SessionInspector;

impl SessionInspector {
    /// Produce a summary of the session state.
    pub fn summary<S: NodeSink>(session: &Session<S>) -> SessionSummary {
        SessionSummary {
            tick: session.tick_count(),
            body_count: session.bodies().len(),
            satellite_count: session.satellite_count(),
            spinner_count: session.spinners().len(),
        }
    }

    /// Every body, depth-first, satellites right after their parent.
    pub fn bodies<S: NodeSink>(session: &Session<S>) -> Vec<BodyInfo> {
        let mut out = Vec::new();
        for body in session.bodies() {
            collect(body, 0, &mut out);
        }
        out
    }

    pub fn inspect_body<S: NodeSink>(session: &Session<S>, name: &str) -> Option<BodyInfo> {
        Self::bodies(session).into_iter().find(|b| b.name == name)
    }
}

fn collect(body: &Body, depth: usize, out: &mut Vec<BodyInfo>) {
    out.push(BodyInfo {
        name: body.name().to_string(),
        depth,
        phase: body.phase(),
        position: body.position(),
    });
    for satellite in body.satellites() {
        collect(satellite, depth + 1, out);
    }
}

/// Summary of session state for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub tick: u64,
    pub body_count: usize,
    pub satellite_count: usize,
    pub spinner_count: usize,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Session: tick={} bodies={} satellites={} spinners={}",
            self.tick, self.body_count, self.satellite_count, self.spinner_count
        )
    }
}

/// Detailed info about a single body. Satellite positions are parent-local.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyInfo {
    pub name: String,
    pub depth: usize,
    pub phase: f64,
    pub position: DVec3,
}

impl std::fmt::Display for BodyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:indent$}{} phase={:.4} pos=({:.3}, {:.3}, {:.3})",
            "",
            self.name,
            self.phase,
            self.position.x,
            self.position.y,
            self.position.z,
            indent = self.depth * 2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_render::{SceneGraph, Stage};
    use orrery_scene::presets;

    fn solar() -> Session<SceneGraph> {
        Stage::build(&presets::solar_system(), SceneGraph::default()).unwrap()
    }

    #[test]
    fn summary_fresh_session() {
        let summary = SessionInspector::summary(&solar());
        assert_eq!(
            summary,
            SessionSummary {
                tick: 0,
                body_count: 4,
                satellite_count: 3,
                spinner_count: 1,
            }
        );
    }

    #[test]
    fn bodies_listed_depth_first() {
        let names: Vec<String> = SessionInspector::bodies(&solar())
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(
            names,
            vec!["Mercury", "Venus", "Earth", "Moon", "Mars", "Phobos", "Deimos"]
        );
    }

    #[test]
    fn inspect_body_after_ticks() {
        let mut session = solar();
        session.run(100);
        let info = SessionInspector::inspect_body(&session, "Mercury").unwrap();
        assert!((info.phase - 1.0).abs() < 1e-9);
        assert_eq!(info.depth, 0);
        assert!(info.to_string().starts_with("Mercury phase=1.0000"));
        assert!(SessionInspector::inspect_body(&session, "Pluto").is_none());
    }

    #[test]
    fn summary_display() {
        let s = SessionInspector::summary(&solar()).to_string();
        assert!(s.contains("tick=0"));
        assert!(s.contains("satellites=3"));
    }

    #[test]
    fn satellite_info_is_indented() {
        let info = SessionInspector::inspect_body(&solar(), "Moon").unwrap();
        assert_eq!(info.depth, 1);
        assert!(info.to_string().starts_with("  Moon"));
    }
}

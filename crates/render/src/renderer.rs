use glam::Vec3;
use orrery_common::NodeHandle;
use orrery_kernel::NodeSink;
use orrery_scene::Viewport;

use crate::error::RenderError;
use crate::graph::{Environment, FrameStats, NodeDescriptor, NodeKind, SceneGraph};

/// Renderer-side collaborator of the orbit kernel.
///
/// Owns the visual nodes. The kernel only ever reaches it through the
/// [`NodeSink`] supertrait.
pub trait SceneRenderer: NodeSink {
    /// The output type produced per frame.
    type Frame;

    /// Replace camera, lights and backdrop.
    fn set_environment(&mut self, environment: Environment);

    fn create_node(
        &mut self,
        descriptor: NodeDescriptor,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, RenderError>;

    /// Window resize: update the drawable size and camera aspect.
    fn resize(&mut self, viewport: Viewport);

    /// Draw one frame of the current node state.
    fn render_frame(&mut self) -> Self::Frame;
}

impl SceneRenderer for SceneGraph {
    type Frame = FrameStats;

    fn set_environment(&mut self, environment: Environment) {
        let viewport = self.viewport();
        self.environment = environment;
        self.environment.camera.set_viewport(&viewport);
    }

    fn create_node(
        &mut self,
        descriptor: NodeDescriptor,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, RenderError> {
        self.insert(descriptor, parent)
    }

    fn resize(&mut self, viewport: Viewport) {
        self.set_viewport(viewport);
    }

    fn render_frame(&mut self) -> FrameStats {
        self.finish_frame()
    }
}

/// Headless renderer that prints every node's world position per frame.
///
/// Backs the CLI `simulate` command.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    graph: SceneGraph,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }
}

impl NodeSink for DebugTextRenderer {
    fn set_node_position(&mut self, node: NodeHandle, position: Vec3) {
        self.graph.set_node_position(node, position);
    }

    fn set_node_rotation_y(&mut self, node: NodeHandle, angle: f32) {
        self.graph.set_node_rotation_y(node, angle);
    }
}

impl SceneRenderer for DebugTextRenderer {
    type Frame = String;

    fn set_environment(&mut self, environment: Environment) {
        self.graph.set_environment(environment);
    }

    fn create_node(
        &mut self,
        descriptor: NodeDescriptor,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, RenderError> {
        self.graph.insert(descriptor, parent)
    }

    fn resize(&mut self, viewport: Viewport) {
        self.graph.set_viewport(viewport);
    }

    fn render_frame(&mut self) -> String {
        let stats = self.graph.finish_frame();
        let cam = self.graph.camera();
        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} (nodes={}, meshes={}) ===\n",
            stats.frame, stats.nodes, stats.meshes
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.2}\n",
            cam.position.x, cam.position.y, cam.position.z, cam.fov_degrees, cam.aspect
        ));

        for (handle, node) in self.graph.iter() {
            let Some(p) = self.graph.world_position(handle) else {
                continue;
            };
            let depth = std::iter::successors(node.parent, |h| {
                self.graph.get(*h).and_then(|n| n.parent)
            })
            .count();
            let kind = match &node.kind {
                NodeKind::Group => "group".to_string(),
                NodeKind::Mesh { geometry, .. } => geometry.kind().to_string(),
            };
            out.push_str(&format!(
                "{:indent$}[{}] {} ({}) pos=({:.3}, {:.3}, {:.3})\n",
                "",
                handle,
                node.name,
                kind,
                p.x,
                p.y,
                p.z,
                indent = 2 + depth * 2
            ));
        }

        out
    }
}

use glam::{Mat4, Quat, Vec3};
use orrery_common::{NodeHandle, Transform};
use orrery_kernel::NodeSink;
use orrery_scene::{
    Background, Fog, Geometry, Light, Material, PerspectiveCamera, SceneDescription,
    ShadowMapType, Viewport,
};

use crate::error::RenderError;

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Transform-only node used to parent other nodes.
    Group,
    Mesh {
        geometry: Geometry,
        material_name: String,
        material: Material,
        cast_shadow: bool,
        receive_shadow: bool,
    },
}

/// Everything needed to create a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
}

impl NodeDescriptor {
    pub fn group(name: &str, transform: Transform) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Group,
            transform,
        }
    }

    pub fn mesh(
        name: &str,
        geometry: Geometry,
        material_name: &str,
        material: Material,
        transform: Transform,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Mesh {
                geometry,
                material_name: material_name.to_string(),
                material,
                cast_shadow: false,
                receive_shadow: false,
            },
            transform,
        }
    }
}

/// A node held by the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub local: Transform,
    pub parent: Option<NodeHandle>,
    pub children: Vec<NodeHandle>,
}

/// Scene-wide render settings: camera, lights and backdrop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Environment {
    pub camera: PerspectiveCamera,
    pub background: Background,
    pub fog: Option<Fog>,
    pub lights: Vec<Light>,
    pub shadows: Option<ShadowMapType>,
}

impl Environment {
    pub fn from_description(scene: &SceneDescription) -> Self {
        Self {
            camera: scene.camera,
            background: scene.background.clone(),
            fog: scene.fog,
            lights: scene.lights.clone(),
            shadows: scene.shadows,
        }
    }
}

/// Counters reported for each rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub frame: u64,
    pub nodes: usize,
    pub meshes: usize,
}

/// Retained scene graph. Handles index into node storage and are never reused.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    pub environment: Environment,
    viewport: Viewport,
    frames: u64,
}

impl SceneGraph {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.environment.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.environment.camera
    }

    /// Add a node under `parent` (or at the root).
    pub fn insert(
        &mut self,
        descriptor: NodeDescriptor,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, RenderError> {
        if let Some(p) = parent {
            if self.get(p).is_none() {
                return Err(RenderError::UnknownParent(p));
            }
        }
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            name: descriptor.name,
            kind: descriptor.kind,
            local: descriptor.transform,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p.0 as usize].children.push(handle);
        }
        Ok(handle)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle.0 as usize)
    }

    fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode> {
        self.nodes.get_mut(handle.0 as usize)
    }

    /// First node with the given name, in creation order.
    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeHandle(i as u32))
    }

    /// Nodes paired with their handles, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeHandle(i as u32), n))
    }

    /// Local-to-world matrix: the parent chain composed root first.
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Mat4> {
        let node = self.get(handle)?;
        let local = node.local.matrix();
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.world_matrix(handle)
            .map(|m| m.transform_point3(Vec3::ZERO))
    }

    /// Replace the material on every mesh that references `name`.
    /// Returns the number of nodes updated.
    pub fn update_material(&mut self, name: &str, material: &Material) -> usize {
        let mut updated = 0;
        for node in &mut self.nodes {
            if let NodeKind::Mesh {
                material_name,
                material: slot,
                ..
            } = &mut node.kind
            {
                if material_name == name {
                    *slot = material.clone();
                    updated += 1;
                }
            }
        }
        updated
    }

    /// Look up the material currently used under `name`.
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::Mesh {
                material_name,
                material,
                ..
            } if material_name == name => Some(material),
            _ => None,
        })
    }

    /// Resize handler: track the viewport and keep the camera aspect in step.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.environment.camera.set_viewport(&viewport);
    }

    /// Close out a frame and report what would be drawn.
    pub fn finish_frame(&mut self) -> FrameStats {
        self.frames += 1;
        FrameStats {
            frame: self.frames,
            nodes: self.nodes.len(),
            meshes: self
                .nodes
                .iter()
                .filter(|n| matches!(n.kind, NodeKind::Mesh { .. }))
                .count(),
        }
    }
}

impl NodeSink for SceneGraph {
    fn set_node_position(&mut self, node: NodeHandle, position: Vec3) {
        match self.get_mut(node) {
            Some(n) => n.local.position = position,
            None => tracing::warn!(%node, "position written to unknown node"),
        }
    }

    fn set_node_rotation_y(&mut self, node: NodeHandle, angle: f32) {
        match self.get_mut(node) {
            Some(n) => n.local.rotation = Quat::from_rotation_y(angle),
            None => tracing::warn!(%node, "rotation written to unknown node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_scene::material::StandardMaterial;

    fn sphere(name: &str, transform: Transform) -> NodeDescriptor {
        NodeDescriptor::mesh(
            name,
            Geometry::sphere(1.0, 8),
            "rock",
            Material::Standard(StandardMaterial::default()),
            transform,
        )
    }

    #[test]
    fn insert_links_parent_and_child() {
        let mut g = SceneGraph::default();
        let parent = g.insert(NodeDescriptor::group("root", Transform::default()), None).unwrap();
        let child = g.insert(sphere("child", Transform::default()), Some(parent)).unwrap();
        assert_eq!(g.get(parent).unwrap().children, vec![child]);
        assert_eq!(g.get(child).unwrap().parent, Some(parent));
        assert_eq!(g.find("child"), Some(child));
    }

    #[test]
    fn unknown_parent_rejected() {
        let mut g = SceneGraph::default();
        let err = g.insert(sphere("orphan", Transform::default()), Some(NodeHandle(5)));
        assert!(matches!(err, Err(RenderError::UnknownParent(NodeHandle(5)))));
        assert!(g.is_empty());
    }

    #[test]
    fn child_position_composes_with_parent() {
        let mut g = SceneGraph::default();
        let planet = g
            .insert(sphere("planet", Transform::from_position(Vec3::new(20.0, 0.0, 0.0))), None)
            .unwrap();
        let moon = g
            .insert(sphere("moon", Transform::from_position(Vec3::new(0.0, 0.0, 3.0))), Some(planet))
            .unwrap();
        let p = g.world_position(moon).unwrap();
        assert!((p - Vec3::new(20.0, 0.0, 3.0)).length() < 1e-5);

        // A quarter turn of the parent carries the child around with it.
        g.set_node_rotation_y(planet, std::f32::consts::FRAC_PI_2);
        let p = g.world_position(moon).unwrap();
        assert!((p - Vec3::new(23.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn parent_scale_applies_to_children() {
        let mut g = SceneGraph::default();
        let scaled = Transform {
            scale: Vec3::splat(0.5),
            ..Transform::default()
        };
        let parent = g.insert(sphere("mars", scaled), None).unwrap();
        let child = g
            .insert(sphere("phobos", Transform::from_position(Vec3::new(2.0, 0.0, 0.0))), Some(parent))
            .unwrap();
        let p = g.world_position(child).unwrap();
        assert!((p.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sink_writes_update_local_transform() {
        let mut g = SceneGraph::default();
        let n = g.insert(sphere("n", Transform::default()), None).unwrap();
        g.set_node_position(n, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(g.get(n).unwrap().local.position, Vec3::new(1.0, 2.0, 3.0));
        // Unknown handles are ignored.
        g.set_node_position(NodeHandle(99), Vec3::ONE);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn update_material_touches_matching_meshes() {
        let mut g = SceneGraph::default();
        g.insert(sphere("a", Transform::default()), None).unwrap();
        g.insert(sphere("b", Transform::default()), None).unwrap();
        g.insert(NodeDescriptor::group("g", Transform::default()), None).unwrap();
        let shiny = Material::Standard(StandardMaterial {
            metalness: 1.0,
            ..StandardMaterial::default()
        });
        assert_eq!(g.update_material("rock", &shiny), 2);
        assert_eq!(g.material("rock"), Some(&shiny));
        assert_eq!(g.update_material("none", &shiny), 0);
    }

    #[test]
    fn viewport_updates_camera_aspect() {
        let mut g = SceneGraph::default();
        g.set_viewport(Viewport::new(1000, 500));
        assert_eq!(g.camera().aspect, 2.0);
        assert_eq!(g.viewport().width, 1000);
    }

    #[test]
    fn frame_stats_count_meshes() {
        let mut g = SceneGraph::default();
        g.insert(NodeDescriptor::group("g", Transform::default()), None).unwrap();
        g.insert(sphere("s", Transform::default()), None).unwrap();
        let stats = g.finish_frame();
        assert_eq!(stats, FrameStats { frame: 1, nodes: 2, meshes: 1 });
    }
}

//! wgpu render backend for the orrery.
//!
//! Draws a [`orrery_render::SceneGraph`]: each geometry primitive is
//! tessellated once and drawn instanced, one draw per geometry, with
//! opaque batches before translucent ones.
//!
//! # Invariants
//! - Renderer never mutates the scene graph.
//! - Camera motion is NOT part of the orbit kernel.
//! - Kernel tick and render frame rate are coupled only by the caller.

mod camera;
mod gpu;
mod mesh;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
pub use mesh::{MeshData, Vertex, tessellate};

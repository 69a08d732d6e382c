//! Rendering Adapter: the scene-renderer collaborator of the orbit kernel.
//!
//! # Invariants
//! - The renderer owns visual nodes; the kernel only writes positions and
//!   rotations through handles.
//! - World transforms compose the parent chain, so satellite positions stay
//!   in parent-local space.
//!
//! # Workaround
//! Provides a retained [`SceneGraph`] and a debug text renderer as a headless
//! stand-in for the GPU backend. The trait is stable; the wgpu backend draws
//! the same graph.

mod error;
mod graph;
mod renderer;
mod stage;

pub use error::RenderError;
pub use graph::{Environment, FrameStats, NodeDescriptor, NodeKind, SceneGraph, SceneNode};
pub use renderer::{DebugTextRenderer, SceneRenderer};
pub use stage::Stage;

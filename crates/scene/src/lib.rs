//! Scene descriptions: what a demo stages before the first frame.
//!
//! A [`SceneDescription`] is plain data. It is loaded once at startup (from a
//! preset or a YAML/JSON file), validated, and handed to a renderer to build
//! nodes from. Nothing here is mutated per frame except through debug-panel
//! bindings.
//!
//! # Invariants
//! - Every material reference resolves to an entry in the material table.
//! - Orbital radii are finite and non-negative once validated.

pub mod camera;
pub mod description;
mod error;
pub mod geometry;
pub mod light;
pub mod material;
pub mod orbit;
pub mod presets;

pub use camera::{PerspectiveCamera, Viewport};
pub use description::{
    Axis, Background, BindingSpec, ControlsConfig, Fog, MeshDescriptor, ObjectDescriptor,
    ParamTarget, SceneDescription, ShadowMapType,
};
pub use error::SceneError;
pub use geometry::Geometry;
pub use light::{Light, ShadowConfig};
pub use material::{Material, MaterialParam, Side, TextureRef};
pub use orbit::{MoonDescriptor, OrbitalSystem, PlanetDescriptor, SunDescriptor};

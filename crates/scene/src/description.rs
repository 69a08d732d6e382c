//! The top-level scene description and its file formats.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::camera::PerspectiveCamera;
use crate::error::SceneError;
use crate::geometry::Geometry;
use crate::light::Light;
use crate::material::{Material, MaterialParam};
use crate::orbit::OrbitalSystem;
use orrery_common::{Color, Transform};

/// Scene backdrop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    Color { color: Color },
    /// Six face images under `path`, ordered nx, ny, nz, px, py, pz.
    CubeMap { path: String, faces: [String; 6] },
}

impl Default for Background {
    fn default() -> Self {
        Self::Color {
            color: Color::BLACK,
        }
    }
}

impl Background {
    /// Color used to clear the frame; cube maps clear to black.
    pub fn clear_color(&self) -> Color {
        match self {
            Self::Color { color } => *color,
            Self::CubeMap { .. } => Color::BLACK,
        }
    }
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Fog blend factor in `[0, 1]` at `distance` from the eye.
    pub fn factor(&self, distance: f32) -> f32 {
        ((distance - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

/// Shadow-map filtering used when shadows are enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowMapType {
    Basic,
    Pcf,
    #[default]
    PcfSoft,
}

/// Interactive orbit-camera settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            auto_rotate: false,
        }
    }
}

/// A drawable surface: geometry plus a named material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDescriptor {
    pub geometry: Geometry,
    pub material: String,
}

fn one() -> Vec3 {
    Vec3::ONE
}

/// A static scene node. Objects without a mesh act as groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub name: String,
    #[serde(default)]
    pub mesh: Option<MeshDescriptor>,
    #[serde(default)]
    pub position: Vec3,
    /// XYZ Euler angles in radians.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "one")]
    pub scale: Vec3,
    #[serde(default)]
    pub cast_shadow: bool,
    #[serde(default)]
    pub receive_shadow: bool,
    #[serde(default)]
    pub children: Vec<ObjectDescriptor>,
}

impl ObjectDescriptor {
    pub fn mesh(name: &str, geometry: Geometry, material: &str) -> Self {
        Self {
            name: name.to_string(),
            mesh: Some(MeshDescriptor {
                geometry,
                material: material.to_string(),
            }),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            cast_shadow: false,
            receive_shadow: false,
            children: Vec::new(),
        }
    }

    pub fn group(name: &str, children: Vec<ObjectDescriptor>) -> Self {
        Self {
            mesh: None,
            children,
            ..Self::mesh(name, Geometry::unit_box(), "")
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn transform(&self) -> Transform {
        Transform::from_parts(self.position, self.rotation, self.scale)
    }

    /// Depth-first walk over this object and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ObjectDescriptor)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Coordinate axis selector for vector bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// What a debug-panel binding reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamTarget {
    Material {
        material: String,
        param: MaterialParam,
    },
    CameraPosition {
        axis: Axis,
    },
}

impl ParamTarget {
    pub fn default_label(&self) -> String {
        match self {
            Self::Material { param, .. } => param.name().to_string(),
            Self::CameraPosition { axis } => format!("position.{}", ["x", "y", "z"][axis.index()]),
        }
    }
}

/// Declarative debug-panel binding: `{min, max, step, label}` over a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSpec {
    pub target: ParamTarget,
    #[serde(default)]
    pub min: Option<f32>,
    #[serde(default)]
    pub max: Option<f32>,
    #[serde(default)]
    pub step: Option<f32>,
    #[serde(default)]
    pub label: Option<String>,
}

impl BindingSpec {
    pub fn material(material: &str, param: MaterialParam, min: f32, max: f32, step: f32) -> Self {
        Self {
            target: ParamTarget::Material {
                material: material.to_string(),
                param,
            },
            min: Some(min),
            max: Some(max),
            step: Some(step),
            label: None,
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.target.default_label())
    }
}

/// Everything needed to stage and animate one demo scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub name: String,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub fog: Option<Fog>,
    #[serde(default)]
    pub camera: PerspectiveCamera,
    #[serde(default)]
    pub controls: ControlsConfig,
    /// `None` disables shadow mapping.
    #[serde(default)]
    pub shadows: Option<ShadowMapType>,
    #[serde(default)]
    pub materials: BTreeMap<String, Material>,
    #[serde(default)]
    pub objects: Vec<ObjectDescriptor>,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub orbits: Option<OrbitalSystem>,
    #[serde(default)]
    pub bindings: Vec<BindingSpec>,
}

impl SceneDescription {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            background: Background::default(),
            fog: None,
            camera: PerspectiveCamera::default(),
            controls: ControlsConfig::default(),
            shadows: None,
            materials: BTreeMap::new(),
            objects: Vec::new(),
            lights: Vec::new(),
            orbits: None,
            bindings: Vec::new(),
        }
    }

    /// Load a description from `.yaml`, `.yml` or `.json`, then validate it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let scene: Self = match extension(path).as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            other => return Err(SceneError::UnknownFormat(other.map(str::to_string))),
        };
        scene.validate()?;
        tracing::info!(
            scene = %scene.name,
            objects = scene.objects.len(),
            lights = scene.lights.len(),
            "loaded scene from {}",
            path.display()
        );
        Ok(scene)
    }

    /// Write the description; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        let text = match extension(path).as_deref() {
            Some("yaml" | "yml") => self.to_yaml()?,
            Some("json") => self.to_json()?,
            other => return Err(SceneError::UnknownFormat(other.map(str::to_string))),
        };
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the description at the configuration boundary.
    ///
    /// The orbit animator itself accepts any values; rejecting negative or
    /// non-finite orbital parameters here is stricter than the animator.
    pub fn validate(&self) -> Result<(), SceneError> {
        if !self.camera.is_well_formed() {
            return Err(SceneError::InvalidCamera);
        }
        if let Some(fog) = &self.fog {
            if fog.near < 0.0 || fog.near >= fog.far {
                return Err(SceneError::InvalidFog);
            }
        }

        let mut result = Ok(());
        for object in &self.objects {
            object.walk(&mut |o| {
                if result.is_err() {
                    return;
                }
                if let Some(mesh) = &o.mesh {
                    if !mesh.geometry.is_well_formed() {
                        result = Err(SceneError::InvalidGeometry {
                            name: o.name.clone(),
                            kind: mesh.geometry.kind(),
                        });
                    } else if let Err(e) = self.require_material(&mesh.material, &o.name) {
                        result = Err(e);
                    }
                }
            });
        }
        result?;

        if let Some(system) = &self.orbits {
            self.validate_orbits(system)?;
        }

        for (index, binding) in self.bindings.iter().enumerate() {
            self.validate_binding(index, binding)?;
        }
        Ok(())
    }

    fn require_material(&self, material: &str, referrer: &str) -> Result<(), SceneError> {
        if self.materials.contains_key(material) {
            Ok(())
        } else {
            Err(SceneError::UnknownMaterial {
                material: material.to_string(),
                referrer: referrer.to_string(),
            })
        }
    }

    fn validate_orbits(&self, system: &OrbitalSystem) -> Result<(), SceneError> {
        if !system.body_geometry.is_well_formed() {
            return Err(SceneError::InvalidGeometry {
                name: "orbits".into(),
                kind: system.body_geometry.kind(),
            });
        }
        if let Some(sun) = &system.sun {
            self.require_material(&sun.material, "sun")?;
        }
        self.require_material(&system.moon_material, "moons")?;
        for planet in &system.planets {
            check_body(&planet.name, planet.radius, planet.distance, planet.speed)?;
            self.require_material(&planet.material, &planet.name)?;
            for moon in &planet.moons {
                check_body(&moon.name, moon.radius, moon.distance, moon.speed)?;
                self.require_material(moon.material_or(&system.moon_material), &moon.name)?;
            }
        }
        Ok(())
    }

    fn validate_binding(&self, index: usize, binding: &BindingSpec) -> Result<(), SceneError> {
        let invalid = |reason| SceneError::InvalidBinding { index, reason };
        if let (Some(min), Some(max)) = (binding.min, binding.max) {
            if min > max {
                return Err(invalid("min exceeds max"));
            }
        }
        if let Some(step) = binding.step {
            if !(step.is_finite() && step > 0.0) {
                return Err(invalid("step must be positive"));
            }
        }
        if let ParamTarget::Material { material, param } = &binding.target {
            let m = self
                .materials
                .get(material)
                .ok_or_else(|| invalid("unknown material"))?;
            if m.param(*param).is_none() {
                return Err(invalid("material has no such parameter"));
            }
        }
        Ok(())
    }
}

fn check_body(name: &str, radius: f32, distance: f64, speed: f64) -> Result<(), SceneError> {
    let invalid = |reason| SceneError::InvalidBody {
        name: name.to_string(),
        reason,
    };
    if !(radius.is_finite() && radius >= 0.0) {
        return Err(invalid("radius must be finite and non-negative"));
    }
    if !(distance.is_finite() && distance >= 0.0) {
        return Err(invalid("distance must be finite and non-negative"));
    }
    if !speed.is_finite() {
        return Err(invalid("speed must be finite"));
    }
    Ok(())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

use orrery_common::Color;
use serde::{Deserialize, Serialize};

/// Reference to an image on disk. Decoding is left to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureRef(pub String);

impl TextureRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

/// Which faces of a surface are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Unlit material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicMaterial {
    pub color: Color,
    pub map: Option<TextureRef>,
    pub transparent: bool,
    pub opacity: f32,
    pub side: Side,
    pub fog: bool,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            transparent: false,
            opacity: 1.0,
            side: Side::Front,
            fog: true,
        }
    }
}

/// Metalness/roughness PBR material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardMaterial {
    pub color: Color,
    pub map: Option<TextureRef>,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            metalness: 0.0,
            roughness: 1.0,
        }
    }
}

/// Extended PBR material with clearcoat, reflectivity and a full map set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalMaterial {
    pub color: Color,
    pub map: Option<TextureRef>,
    pub metalness: f32,
    pub roughness: f32,
    pub reflectivity: f32,
    pub clearcoat: f32,
    pub ao_map: Option<TextureRef>,
    pub ao_map_intensity: f32,
    pub normal_map: Option<TextureRef>,
    pub roughness_map: Option<TextureRef>,
    pub metalness_map: Option<TextureRef>,
    pub displacement_map: Option<TextureRef>,
    pub displacement_scale: f32,
}

impl Default for PhysicalMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            metalness: 0.0,
            roughness: 1.0,
            reflectivity: 0.5,
            clearcoat: 0.0,
            ao_map: None,
            ao_map_intensity: 1.0,
            normal_map: None,
            roughness_map: None,
            metalness_map: None,
            displacement_map: None,
            displacement_scale: 1.0,
        }
    }
}

/// Surface appearance of a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Material {
    Basic(BasicMaterial),
    Standard(StandardMaterial),
    Physical(PhysicalMaterial),
}

/// Scalar material parameters a debug panel can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialParam {
    Metalness,
    Roughness,
    Reflectivity,
    Clearcoat,
    AoMapIntensity,
    Opacity,
}

impl MaterialParam {
    pub fn name(self) -> &'static str {
        match self {
            Self::Metalness => "metalness",
            Self::Roughness => "roughness",
            Self::Reflectivity => "reflectivity",
            Self::Clearcoat => "clearcoat",
            Self::AoMapIntensity => "ao_map_intensity",
            Self::Opacity => "opacity",
        }
    }
}

impl Material {
    pub fn basic(color: Color) -> Self {
        Self::Basic(BasicMaterial {
            color,
            ..BasicMaterial::default()
        })
    }

    pub fn standard_mapped(path: &str) -> Self {
        Self::Standard(StandardMaterial {
            map: Some(TextureRef::new(path)),
            ..StandardMaterial::default()
        })
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Basic(m) => m.color,
            Self::Standard(m) => m.color,
            Self::Physical(m) => m.color,
        }
    }

    /// Opacity for drawing; only basic materials marked transparent are translucent.
    pub fn alpha(&self) -> f32 {
        match self {
            Self::Basic(m) if m.transparent => m.opacity,
            _ => 1.0,
        }
    }

    pub fn map(&self) -> Option<&TextureRef> {
        match self {
            Self::Basic(m) => m.map.as_ref(),
            Self::Standard(m) => m.map.as_ref(),
            Self::Physical(m) => m.map.as_ref(),
        }
    }

    /// Every texture path this material references.
    pub fn textures(&self) -> Vec<&TextureRef> {
        match self {
            Self::Basic(m) => m.map.iter().collect(),
            Self::Standard(m) => m.map.iter().collect(),
            Self::Physical(m) => [
                &m.map,
                &m.ao_map,
                &m.normal_map,
                &m.roughness_map,
                &m.metalness_map,
                &m.displacement_map,
            ]
            .into_iter()
            .flatten()
            .collect(),
        }
    }

    /// Read a bindable parameter. `None` when this material kind lacks it.
    pub fn param(&self, param: MaterialParam) -> Option<f32> {
        use MaterialParam::*;
        match (self, param) {
            (Self::Basic(m), Opacity) => Some(m.opacity),
            (Self::Standard(m), Metalness) => Some(m.metalness),
            (Self::Standard(m), Roughness) => Some(m.roughness),
            (Self::Physical(m), Metalness) => Some(m.metalness),
            (Self::Physical(m), Roughness) => Some(m.roughness),
            (Self::Physical(m), Reflectivity) => Some(m.reflectivity),
            (Self::Physical(m), Clearcoat) => Some(m.clearcoat),
            (Self::Physical(m), AoMapIntensity) => Some(m.ao_map_intensity),
            _ => None,
        }
    }

    /// Write a bindable parameter. Returns false when this material kind lacks it.
    pub fn set_param(&mut self, param: MaterialParam, value: f32) -> bool {
        use MaterialParam::*;
        let slot = match (self, param) {
            (Self::Basic(m), Opacity) => &mut m.opacity,
            (Self::Standard(m), Metalness) => &mut m.metalness,
            (Self::Standard(m), Roughness) => &mut m.roughness,
            (Self::Physical(m), Metalness) => &mut m.metalness,
            (Self::Physical(m), Roughness) => &mut m.roughness,
            (Self::Physical(m), Reflectivity) => &mut m.reflectivity,
            (Self::Physical(m), Clearcoat) => &mut m.clearcoat,
            (Self::Physical(m), AoMapIntensity) => &mut m.ao_map_intensity,
            _ => return false,
        };
        *slot = value;
        true
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::Standard(StandardMaterial::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_params_round_trip() {
        let mut m = Material::Physical(PhysicalMaterial::default());
        assert!(m.set_param(MaterialParam::Clearcoat, 0.7));
        assert_eq!(m.param(MaterialParam::Clearcoat), Some(0.7));
        assert_eq!(m.param(MaterialParam::Opacity), None);
    }

    #[test]
    fn basic_material_has_no_metalness() {
        let mut m = Material::basic(Color::WHITE);
        assert!(!m.set_param(MaterialParam::Metalness, 1.0));
        assert_eq!(m.param(MaterialParam::Metalness), None);
    }

    #[test]
    fn alpha_only_for_transparent_basic() {
        let opaque = Material::basic(Color::WHITE);
        assert_eq!(opaque.alpha(), 1.0);
        let glass = Material::Basic(BasicMaterial {
            transparent: true,
            opacity: 0.5,
            ..BasicMaterial::default()
        });
        assert_eq!(glass.alpha(), 0.5);
    }

    #[test]
    fn physical_textures_are_collected() {
        let m = Material::Physical(PhysicalMaterial {
            map: Some(TextureRef::new("albedo.png")),
            normal_map: Some(TextureRef::new("normal.png")),
            ..PhysicalMaterial::default()
        });
        let paths: Vec<&str> = m.textures().iter().map(|t| t.0.as_str()).collect();
        assert_eq!(paths, vec!["albedo.png", "normal.png"]);
    }

    #[test]
    fn yaml_uses_kind_tag() {
        let yaml = "kind: standard\nmetalness: 0.25\n";
        let m: Material = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(m.param(MaterialParam::Metalness), Some(0.25));
        assert_eq!(m.param(MaterialParam::Roughness), Some(1.0));
    }
}

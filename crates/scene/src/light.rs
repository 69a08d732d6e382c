use glam::Vec3;
use orrery_common::Color;
use serde::{Deserialize, Serialize};

/// Shadow-map settings for shadow-casting lights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Shadow map resolution in texels per side.
    pub map_size: u32,
    /// Blur radius applied to shadow edges.
    pub radius: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 512,
            radius: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    Point {
        color: Color,
        intensity: f32,
        /// Cutoff distance; `0` means unlimited.
        #[serde(default)]
        distance: f32,
        #[serde(default)]
        position: Vec3,
        #[serde(default)]
        helper: bool,
    },
    Directional {
        color: Color,
        intensity: f32,
        position: Vec3,
        #[serde(default)]
        target: Vec3,
        #[serde(default)]
        cast_shadow: bool,
        #[serde(default)]
        shadow: ShadowConfig,
        #[serde(default)]
        helper: bool,
    },
    Spot {
        color: Color,
        intensity: f32,
        position: Vec3,
        #[serde(default)]
        target: Vec3,
        /// Cone half-angle in radians.
        angle: f32,
        #[serde(default)]
        helper: bool,
    },
    RectArea {
        color: Color,
        intensity: f32,
        width: f32,
        height: f32,
        position: Vec3,
        #[serde(default)]
        look_at: Vec3,
        #[serde(default)]
        helper: bool,
    },
}

impl Light {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ambient { .. } => "ambient",
            Self::Point { .. } => "point",
            Self::Directional { .. } => "directional",
            Self::Spot { .. } => "spot",
            Self::RectArea { .. } => "rect_area",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Ambient { color, .. }
            | Self::Point { color, .. }
            | Self::Directional { color, .. }
            | Self::Spot { color, .. }
            | Self::RectArea { color, .. } => *color,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Self::Ambient { intensity, .. }
            | Self::Point { intensity, .. }
            | Self::Directional { intensity, .. }
            | Self::Spot { intensity, .. }
            | Self::RectArea { intensity, .. } => *intensity,
        }
    }

    /// World position, `None` for ambient light.
    pub fn position(&self) -> Option<Vec3> {
        match self {
            Self::Ambient { .. } => None,
            Self::Point { position, .. }
            | Self::Directional { position, .. }
            | Self::Spot { position, .. }
            | Self::RectArea { position, .. } => Some(*position),
        }
    }

    pub fn casts_shadow(&self) -> bool {
        matches!(
            self,
            Self::Directional {
                cast_shadow: true,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_has_no_position() {
        let light = Light::Ambient {
            color: Color::WHITE,
            intensity: 0.05,
        };
        assert_eq!(light.position(), None);
        assert_eq!(light.kind(), "ambient");
    }

    #[test]
    fn directional_defaults_from_yaml() {
        let yaml = "kind: directional\ncolor: '#59ffe9'\nintensity: 2.0\nposition: [0.0, 3.0, 0.0]\n";
        let light: Light = serde_yaml::from_str(yaml).unwrap();
        assert!(!light.casts_shadow());
        assert_eq!(light.color().to_hex(), 0x59ffe9);
        match light {
            Light::Directional { shadow, .. } => assert_eq!(shadow.map_size, 512),
            other => panic!("unexpected light {other:?}"),
        }
    }
}

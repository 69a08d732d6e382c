use serde::{Deserialize, Serialize};

/// Parametric geometry primitives. Tessellation belongs to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Plane {
        width: f32,
        height: f32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    TorusKnot {
        radius: f32,
        tube: f32,
        tubular_segments: u32,
        radial_segments: u32,
    },
}

impl Geometry {
    pub fn unit_box() -> Self {
        Self::Box {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
    }

    pub fn sphere(radius: f32, segments: u32) -> Self {
        Self::Sphere {
            radius,
            width_segments: segments,
            height_segments: segments,
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane { width, height }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Plane { .. } => "plane",
            Self::Cylinder { .. } => "cylinder",
            Self::TorusKnot { .. } => "torus_knot",
        }
    }

    /// All extents finite and positive, segment counts non-zero.
    pub fn is_well_formed(&self) -> bool {
        let pos = |v: f32| v.is_finite() && v > 0.0;
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => pos(width) && pos(height) && pos(depth),
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => pos(radius) && width_segments >= 3 && height_segments >= 2,
            Self::Plane { width, height } => pos(width) && pos(height),
            Self::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => {
                radius_top.is_finite()
                    && radius_bottom.is_finite()
                    && radius_top >= 0.0
                    && radius_bottom >= 0.0
                    && (radius_top > 0.0 || radius_bottom > 0.0)
                    && pos(height)
                    && radial_segments >= 3
            }
            Self::TorusKnot {
                radius,
                tube,
                tubular_segments,
                radial_segments,
            } => pos(radius) && pos(tube) && tubular_segments >= 3 && radial_segments >= 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_well_formed() {
        assert!(Geometry::unit_box().is_well_formed());
        assert!(Geometry::sphere(1.0, 32).is_well_formed());
        assert!(Geometry::plane(1.0, 1.0).is_well_formed());
    }

    #[test]
    fn degenerate_shapes_rejected() {
        assert!(!Geometry::sphere(0.0, 32).is_well_formed());
        assert!(!Geometry::sphere(1.0, 2).is_well_formed());
        assert!(
            !Geometry::Cylinder {
                radius_top: 0.0,
                radius_bottom: 0.0,
                height: 1.0,
                radial_segments: 32,
            }
            .is_well_formed()
        );
    }

    #[test]
    fn cone_is_a_valid_cylinder() {
        let cone = Geometry::Cylinder {
            radius_top: 0.0,
            radius_bottom: 0.5,
            height: 1.0,
            radial_segments: 16,
        };
        assert!(cone.is_well_formed());
        assert_eq!(cone.kind(), "cylinder");
    }
}

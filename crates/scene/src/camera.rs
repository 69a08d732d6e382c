use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Upper bound on the device pixel ratio used for rendering.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Drawable surface size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Width over height; a zero height is treated as one pixel.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Pixel ratio capped at [`MAX_PIXEL_RATIO`].
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Backing-store size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        (
            (self.width as f32 * ratio).round() as u32,
            (self.height as f32 * ratio).round() as u32,
        )
    }
}

/// Perspective camera looking at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 50.0,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, near: f32, far: f32, position: Vec3) -> Self {
        Self {
            fov_degrees,
            near,
            far,
            position,
            ..Self::default()
        }
    }

    /// Resize handler: keep the projection in step with the viewport.
    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.aspect = viewport.aspect();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn is_well_formed(&self) -> bool {
        self.fov_degrees > 0.0
            && self.fov_degrees < 180.0
            && self.near > 0.0
            && self.near < self.far
            && self.position.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_aspect() {
        let mut cam = PerspectiveCamera::default();
        cam.set_viewport(&Viewport::new(800, 400));
        assert_eq!(cam.aspect, 2.0);
    }

    #[test]
    fn zero_height_viewport_does_not_divide_by_zero() {
        let vp = Viewport::new(640, 0);
        assert_eq!(vp.aspect(), 640.0);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        let vp = Viewport {
            width: 100,
            height: 50,
            device_pixel_ratio: 3.0,
        };
        assert_eq!(vp.pixel_ratio(), 2.0);
        assert_eq!(vp.physical_size(), (200, 100));
    }

    #[test]
    fn view_projection_is_finite() {
        let cam = PerspectiveCamera::default();
        let vp = cam.view_projection();
        assert!(vp.is_finite());
        assert!(cam.is_well_formed());
    }

    #[test]
    fn inverted_clip_planes_rejected() {
        let cam = PerspectiveCamera {
            near: 10.0,
            far: 1.0,
            ..PerspectiveCamera::default()
        };
        assert!(!cam.is_well_formed());
    }
}

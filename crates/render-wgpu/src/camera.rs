use glam::Vec3;
use orrery_scene::{ControlsConfig, PerspectiveCamera};

const MIN_DISTANCE: f32 = 0.5;
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;
/// Per-frame yaw while auto-rotating: one revolution every 30s at 60fps.
const AUTO_ROTATE_STEP: f32 = std::f32::consts::TAU / 1800.0;
const ZOOM_BASE: f32 = 0.95;

/// Orbit camera circling a target point, with optional inertial damping.
///
/// Camera motion lives outside the kernel; it only writes the camera the
/// scene graph renders with.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Fraction of velocity shed each frame; `None` stops motion immediately.
    pub damping: Option<f32>,
    pub auto_rotate: bool,
    pub sensitivity: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_camera(&PerspectiveCamera::default(), &ControlsConfig::default())
    }
}

impl OrbitCamera {
    /// Start from wherever `camera` currently sits.
    pub fn from_camera(camera: &PerspectiveCamera, controls: &ControlsConfig) -> Self {
        let mut orbit = Self {
            target: camera.target,
            distance: MIN_DISTANCE,
            yaw: 0.0,
            pitch: 0.0,
            damping: controls
                .enable_damping
                .then_some(controls.damping_factor.clamp(0.0, 1.0)),
            auto_rotate: controls.auto_rotate,
            sensitivity: 0.005,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
        };
        orbit.reset_from(camera);
        orbit
    }

    /// Re-derive yaw, pitch and distance from an externally moved camera.
    pub fn reset_from(&mut self, camera: &PerspectiveCamera) {
        self.target = camera.target;
        let offset = camera.position - camera.target;
        let distance = offset.length();
        if distance < f32::EPSILON {
            self.distance = MIN_DISTANCE;
            self.yaw = 0.0;
            self.pitch = 0.0;
        } else {
            self.distance = distance.max(MIN_DISTANCE);
            self.yaw = offset.x.atan2(offset.z);
            self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        }
        self.yaw_velocity = 0.0;
        self.pitch_velocity = 0.0;
        self.zoom_velocity = 0.0;
    }

    pub fn position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * sy, sp, cp * cy) * self.distance
    }

    /// Mouse drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw_velocity -= dx * self.sensitivity;
        self.pitch_velocity += dy * self.sensitivity;
    }

    /// Scroll in lines; positive zooms in.
    pub fn zoom(&mut self, lines: f32) {
        self.zoom_velocity += lines;
    }

    /// Integrate one frame. Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        let before = (self.yaw, self.pitch, self.distance);

        if self.auto_rotate {
            self.yaw += AUTO_ROTATE_STEP;
        }
        self.yaw += self.yaw_velocity;
        self.pitch = (self.pitch + self.pitch_velocity).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance * ZOOM_BASE.powf(self.zoom_velocity)).max(MIN_DISTANCE);

        let keep = self.damping.map_or(0.0, |d| 1.0 - d);
        self.yaw_velocity *= keep;
        self.pitch_velocity *= keep;
        self.zoom_velocity *= keep;

        before != (self.yaw, self.pitch, self.distance)
    }

    /// Write eye and target into the camera used for rendering.
    pub fn apply_to(&self, camera: &mut PerspectiveCamera) {
        camera.position = self.position();
        camera.target = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn reproduces_starting_camera() {
        let camera = PerspectiveCamera::new(75.0, 0.1, 400.0, Vec3::new(3.0, 4.0, 40.0));
        let orbit = OrbitCamera::from_camera(&camera, &ControlsConfig::default());
        assert!(close(orbit.position(), camera.position));
    }

    #[test]
    fn damping_lets_motion_coast() {
        let mut orbit = OrbitCamera::default();
        orbit.rotate(100.0, 0.0);
        assert!(orbit.update());
        let yaw_after_first = orbit.yaw;
        assert!(orbit.update());
        assert!(orbit.yaw < yaw_after_first);
    }

    #[test]
    fn undamped_motion_stops_immediately() {
        let controls = ControlsConfig {
            enable_damping: false,
            ..ControlsConfig::default()
        };
        let mut orbit = OrbitCamera::from_camera(&PerspectiveCamera::default(), &controls);
        orbit.rotate(10.0, 10.0);
        assert!(orbit.update());
        assert!(!orbit.update());
    }

    #[test]
    fn pitch_and_distance_are_bounded() {
        let mut orbit = OrbitCamera::default();
        orbit.rotate(0.0, 1.0e6);
        orbit.zoom(1.0e4);
        orbit.update();
        assert!(orbit.pitch <= MAX_PITCH);
        assert_eq!(orbit.distance, MIN_DISTANCE);
    }

    #[test]
    fn apply_writes_eye_and_target() {
        let mut camera = PerspectiveCamera::default();
        let mut orbit = OrbitCamera::from_camera(&camera, &ControlsConfig::default());
        orbit.target = Vec3::new(1.0, 0.0, 0.0);
        orbit.apply_to(&mut camera);
        assert_eq!(camera.target, orbit.target);
        assert!(close(camera.position, orbit.position()));
    }

    #[test]
    fn degenerate_camera_gets_minimum_distance() {
        let mut camera = PerspectiveCamera::default();
        camera.position = camera.target;
        let orbit = OrbitCamera::from_camera(&camera, &ControlsConfig::default());
        assert_eq!(orbit.distance, MIN_DISTANCE);
    }
}

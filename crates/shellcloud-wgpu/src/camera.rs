//! Orbit camera circling the origin.

use glam::{Mat4, Vec3};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use crate::config::CameraConfig;

const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 900.0;
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Orbit camera with auto-rotation, damping, mouse drag and gamepad input.
///
/// Yaw is measured around +Y from +Z toward +X; pitch is elevation above
/// the XZ plane.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub auto_rotate: bool,
    /// Orbits per minute
    pub auto_rotate_speed: f32,
    /// Fraction of velocity lost per 60 Hz frame
    pub damping: f32,
    /// Mouse sensitivity (radians per pixel)
    pub sensitivity: f32,
    /// Gamepad stick sensitivity (radians per second at full tilt)
    pub gamepad_sensitivity: f32,

    home: CameraConfig,

    // Orbit velocity, decayed by damping
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,

    // Input state
    dragging: bool,
    last_mouse: Option<(f64, f64)>,
    orbit_left: bool,
    orbit_right: bool,
    orbit_up: bool,
    orbit_down: bool,
    gamepad_orbit_x: f32,
    gamepad_orbit_y: f32,
    gamepad_zoom: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        let distance = config.distance.hypot(config.height).max(MIN_DISTANCE);
        Self {
            target: Vec3::ZERO,
            distance,
            yaw: 0.0,
            pitch: (config.height / distance).asin(),
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            auto_rotate: config.auto_rotate,
            auto_rotate_speed: config.auto_rotate_speed,
            damping: config.damping.clamp(0.0, 1.0),
            sensitivity: 0.005,
            gamepad_sensitivity: 2.0,
            home: config.clone(),
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
            dragging: false,
            last_mouse: None,
            orbit_left: false,
            orbit_right: false,
            orbit_up: false,
            orbit_down: false,
            gamepad_orbit_x: 0.0,
            gamepad_orbit_y: 0.0,
            gamepad_zoom: 0.0,
        }
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Angular speed of auto-rotation in radians per second.
    pub fn auto_rotate_rate(&self) -> f32 {
        std::f32::consts::TAU / 60.0 * self.auto_rotate_speed
    }

    /// Advance the orbit by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.auto_rotate {
            self.yaw -= self.auto_rotate_rate() * dt;
        }

        // Held keys and sticks feed velocity; damping bleeds it off
        let key_x = (self.orbit_right as i32 - self.orbit_left as i32) as f32;
        let key_y = (self.orbit_up as i32 - self.orbit_down as i32) as f32;
        let push_x = key_x + self.gamepad_orbit_x;
        let push_y = key_y + self.gamepad_orbit_y;
        self.yaw_velocity += push_x * self.gamepad_sensitivity * dt;
        self.pitch_velocity += push_y * self.gamepad_sensitivity * dt;
        self.zoom_velocity += self.gamepad_zoom * dt;

        self.yaw += self.yaw_velocity;
        self.pitch = (self.pitch + self.pitch_velocity).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance * (1.0 + self.zoom_velocity)).clamp(MIN_DISTANCE, MAX_DISTANCE);

        let keep = (1.0 - self.damping).powf(dt * 60.0);
        self.yaw_velocity *= keep;
        self.pitch_velocity *= keep;
        self.zoom_velocity *= keep;
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.auto_rotate = !self.auto_rotate;
    }

    /// Back to the configured starting view.
    pub fn reset(&mut self) {
        let auto_rotate = self.auto_rotate;
        *self = Self::from_config(&self.home.clone());
        self.auto_rotate = auto_rotate;
    }

    pub fn set_gamepad_orbit(&mut self, x: f32, y: f32) {
        self.gamepad_orbit_x = x;
        self.gamepad_orbit_y = y;
    }

    /// Positive zooms out, negative zooms in.
    pub fn set_gamepad_zoom(&mut self, zoom: f32) {
        self.gamepad_zoom = zoom;
    }

    pub fn handle_keyboard(&mut self, key: KeyCode, state: ElementState) {
        let pressed = state == ElementState::Pressed;

        match key {
            KeyCode::ArrowLeft => self.orbit_left = pressed,
            KeyCode::ArrowRight => self.orbit_right = pressed,
            KeyCode::ArrowUp => self.orbit_up = pressed,
            KeyCode::ArrowDown => self.orbit_down = pressed,
            KeyCode::Home => {
                if pressed {
                    self.reset();
                }
            }
            _ => {}
        }
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state == ElementState::Pressed;
            if !self.dragging {
                self.last_mouse = None;
            }
        }
    }

    pub fn handle_mouse_motion(&mut self, x: f64, y: f64) {
        if !self.dragging {
            return;
        }

        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (x - last_x) as f32;
            let dy = (y - last_y) as f32;
            self.yaw_velocity -= dx * self.sensitivity * self.damping.max(0.05);
            self.pitch_velocity += dy * self.sensitivity * self.damping.max(0.05);
        }

        self.last_mouse = Some((x, y));
    }

    /// Scroll up zooms in.
    pub fn handle_scroll(&mut self, delta: f32) {
        self.zoom_velocity -= delta * 0.02;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_positive_z() {
        let cam = OrbitCamera::default();
        let pos = cam.position();
        assert!((pos.z - 100.0).abs() < 1e-2);
        assert!((pos.y - 1.0).abs() < 1e-3);
        assert!(pos.x.abs() < 1e-4);
    }

    #[test]
    fn view_matrix_is_valid() {
        let cam = OrbitCamera::default();
        assert!(cam.view_matrix().determinant().abs() > 0.0001);
    }

    #[test]
    fn auto_rotation_orbits_once_per_minute_at_unit_speed() {
        let mut cam = OrbitCamera::default();
        cam.auto_rotate_speed = 1.0;
        cam.damping = 0.0;
        for _ in 0..600 {
            cam.update(0.1);
        }
        assert!((cam.yaw + std::f32::consts::TAU).abs() < 1e-3);
    }

    #[test]
    fn distance_is_preserved_while_rotating() {
        let mut cam = OrbitCamera::default();
        let before = cam.position().length();
        cam.update(1.0);
        assert!((cam.position().length() - before).abs() < 1e-3);
    }

    #[test]
    fn damping_stops_orbit() {
        let mut cam = OrbitCamera::default();
        cam.auto_rotate = false;
        cam.handle_keyboard(KeyCode::ArrowRight, ElementState::Pressed);
        cam.update(0.1);
        cam.handle_keyboard(KeyCode::ArrowRight, ElementState::Released);
        for _ in 0..600 {
            cam.update(1.0 / 60.0);
        }
        let yaw = cam.yaw;
        cam.update(1.0 / 60.0);
        assert!((cam.yaw - yaw).abs() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.auto_rotate = false;
        cam.pitch_velocity = 10.0;
        cam.update(0.016);
        assert!(cam.pitch <= MAX_PITCH);
    }

    #[test]
    fn reset_keeps_rotation_toggle() {
        let mut cam = OrbitCamera::default();
        cam.toggle_auto_rotate();
        cam.distance = 10.0;
        cam.reset();
        assert!(!cam.auto_rotate);
        assert!(cam.distance > 99.0);
    }
}

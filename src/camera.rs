use glam::{Mat4, Vec3};

/// Direction of a keyboard-driven camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person fly camera using Euler angles in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub world_up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
}

impl Camera {
    pub const YAW: f32 = -90.0;
    pub const PITCH: f32 = 0.0;
    pub const SPEED: f32 = 2.5;
    pub const SENSITIVITY: f32 = 0.1;
    pub const ZOOM: f32 = 45.0;
    pub const MAX_PITCH: f32 = 89.0;
    pub const MIN_ZOOM: f32 = 1.0;

    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: Self::YAW,
            pitch: Self::PITCH,
            movement_speed: Self::SPEED,
            mouse_sensitivity: Self::SENSITIVITY,
            zoom: Self::ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect.max(0.01), near, far)
    }

    pub fn process_keyboard(&mut self, direction: Movement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            Movement::Forward => self.position += self.front * velocity,
            Movement::Backward => self.position -= self.front * velocity,
            Movement::Left => self.position -= self.right * velocity,
            Movement::Right => self.position += self.right * velocity,
        }
    }

    /// Offsets are in cursor units; positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity)
            .clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(Self::MIN_ZOOM, Self::ZOOM);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 1.2, 3.0));
        assert!(approx(camera.front, Vec3::NEG_Z));
        assert!(approx(camera.right, Vec3::X));
        assert!(approx(camera.up, Vec3::Y));
    }

    #[test]
    fn forward_moves_speed_times_delta() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_keyboard(Movement::Forward, 0.5);
        assert!(approx(camera.position, Vec3::new(0.0, 0.0, -1.25)));
        camera.process_keyboard(Movement::Right, 0.4);
        assert!(approx(camera.position, Vec3::new(1.0, 0.0, -1.25)));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_movement(0.0, 10_000.0);
        assert_eq!(camera.pitch, Camera::MAX_PITCH);
        camera.process_mouse_movement(0.0, -20_000.0);
        assert_eq!(camera.pitch, -Camera::MAX_PITCH);
        assert!((camera.front.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn yaw_follows_horizontal_offset() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_movement(900.0, 0.0);
        assert!((camera.yaw - 0.0).abs() < 1e-4);
        assert!(approx(camera.front, Vec3::X));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.process_mouse_scroll(-5.0);
        assert_eq!(camera.zoom, 45.0);
        camera.process_mouse_scroll(50.0);
        assert_eq!(camera.zoom, 1.0);
        camera.process_mouse_scroll(-2.0);
        assert_eq!(camera.zoom, 3.0);
    }

    #[test]
    fn view_matrix_has_no_nan() {
        let camera = Camera::new(Vec3::new(0.0, 1.2, 3.0));
        let view_proj = camera.projection_matrix(800.0 / 600.0, 0.1, 100.0) * camera.view_matrix();
        assert!(!view_proj.is_nan());
    }
}

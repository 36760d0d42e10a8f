use glam::{Mat4, Vec2, Vec3};

use crate::camera::{Camera, Movement};
use crate::input::{self, InputState, KeyCode, MouseLook};
use crate::render::CameraParams;
use crate::scene::{self, DrawItem, PointLight};

pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;
pub const WINDOW_TITLE: &str = "Courtside";
pub const CLEAR_COLOR: [f64; 4] = [0.05, 0.05, 0.05, 1.0];
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 1.2, 3.0);

const MOVEMENT_KEYS: [(KeyCode, Movement); 4] = [
    (KeyCode::W, Movement::Forward),
    (KeyCode::S, Movement::Backward),
    (KeyCode::A, Movement::Left),
    (KeyCode::D, Movement::Right),
];

/// Tracks the time between consecutive frames.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    last_frame: f32,
    delta: f32,
}

impl FrameTimer {
    /// `now` is seconds since startup.
    pub fn advance(&mut self, now: f32) -> f32 {
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.delta
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct FrameState {
    pub camera: CameraParams,
    pub light: PointLight,
    pub draws: Vec<DrawItem>,
    pub markers: [Mat4; 4],
}

/// Mutable state shared by the render loop and the window event handlers.
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub camera: Camera,
    pub light: PointLight,
    pub input: InputState,
    mouse: MouseLook,
    timer: FrameTimer,
    close_requested: bool,
}

impl Default for SceneContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneContext {
    pub fn new() -> Self {
        Self {
            camera: Camera::new(CAMERA_START),
            light: PointLight::default(),
            input: InputState::new(),
            mouse: MouseLook::new(Vec2::new(
                WINDOW_WIDTH as f32 / 2.0,
                WINDOW_HEIGHT as f32 / 2.0,
            )),
            timer: FrameTimer::default(),
            close_requested: false,
        }
    }

    pub fn on_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.input.set_key_down(key);
        } else {
            self.input.set_key_up(key);
        }
    }

    /// Forwards a window key event; keys the viewer does not use are dropped.
    pub fn on_physical_key(&mut self, code: winit::keyboard::KeyCode, pressed: bool) {
        if let Some(key) = input::map_keycode(code) {
            self.on_key(key, pressed);
        }
    }

    pub fn on_cursor_moved(&mut self, position: Vec2) {
        let offset = self.mouse.on_cursor_moved(position);
        self.camera.process_mouse_movement(offset.x, offset.y);
    }

    pub fn on_scroll(&mut self, y_offset: f32) {
        self.camera.process_mouse_scroll(y_offset);
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Applies held keys, scaled by the last frame delta.
    pub fn process_input(&mut self) {
        if self.input.is_key_down(KeyCode::Escape) {
            self.request_close();
        }
        let delta = self.timer.delta();
        for (key, movement) in MOVEMENT_KEYS {
            if self.input.is_key_down(key) {
                self.camera.process_keyboard(movement, delta);
            }
        }
    }

    /// Advances time to `now`, applies input and animates the scene.
    pub fn tick(&mut self, now: f32, aspect: f32) -> FrameState {
        self.timer.advance(now);
        self.process_input();
        self.light.position = scene::orbit_position(now);

        FrameState {
            camera: CameraParams {
                projection: self.camera.projection_matrix(aspect, NEAR_PLANE, FAR_PLANE),
                view: self.camera.view_matrix(),
                position: self.camera.position,
            },
            light: self.light,
            draws: scene::draw_list(now),
            markers: scene::marker_transforms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASPECT: f32 = WINDOW_WIDTH as f32 / WINDOW_HEIGHT as f32;

    #[test]
    fn timer_reports_frame_delta() {
        let mut timer = FrameTimer::default();
        assert_eq!(timer.advance(0.5), 0.5);
        assert!((timer.advance(0.75) - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn escape_requests_close() {
        let mut ctx = SceneContext::new();
        ctx.on_key(KeyCode::Escape, true);
        ctx.tick(0.1, ASPECT);
        assert!(ctx.close_requested());
    }

    #[test]
    fn unrelated_keys_do_nothing() {
        let mut ctx = SceneContext::new();
        use winit::keyboard::KeyCode as Key;
        for code in [Key::KeyQ, Key::KeyE, Key::Digit1, Key::Space, Key::ArrowUp] {
            ctx.on_physical_key(code, true);
        }
        ctx.tick(0.2, ASPECT);
        ctx.tick(0.4, ASPECT);
        assert_eq!(ctx.camera.position, CAMERA_START);
        assert!(!ctx.close_requested());
    }

    #[test]
    fn physical_w_key_moves_camera() {
        let mut ctx = SceneContext::new();
        ctx.on_physical_key(winit::keyboard::KeyCode::KeyW, true);
        ctx.tick(0.5, ASPECT);
        assert_ne!(ctx.camera.position, CAMERA_START);
    }

    #[test]
    fn released_keys_leave_camera_still() {
        let mut ctx = SceneContext::new();
        ctx.on_key(KeyCode::W, true);
        ctx.tick(0.1, ASPECT);
        ctx.on_key(KeyCode::W, false);
        let before = ctx.camera.position;
        ctx.tick(0.2, ASPECT);
        ctx.tick(0.3, ASPECT);
        assert_eq!(ctx.camera.position, before);
    }

    #[test]
    fn forward_key_moves_by_speed_times_delta() {
        let mut ctx = SceneContext::new();
        ctx.on_key(KeyCode::W, true);
        ctx.tick(0.4, ASPECT);
        let moved = ctx.camera.position - CAMERA_START;
        assert!((moved.length() - Camera::SPEED * 0.4).abs() < 1e-5);
        assert!(moved.z < 0.0);
    }

    #[test]
    fn first_cursor_event_does_not_turn_camera() {
        let mut ctx = SceneContext::new();
        let yaw = ctx.camera.yaw;
        ctx.on_cursor_moved(Vec2::new(5000.0, -3000.0));
        assert_eq!(ctx.camera.yaw, yaw);
        ctx.on_cursor_moved(Vec2::new(5010.0, -3000.0));
        assert!((ctx.camera.yaw - (yaw + 1.0)).abs() < 1e-5);
    }

    #[test]
    fn scroll_zooms_in() {
        let mut ctx = SceneContext::new();
        ctx.on_scroll(3.0);
        assert_eq!(ctx.camera.zoom, 42.0);
    }

    #[test]
    fn tick_moves_light_along_orbit() {
        let mut ctx = SceneContext::new();
        let frame = ctx.tick(1.0, ASPECT);
        assert_eq!(frame.light.position, scene::orbit_position(1.0));
        assert_eq!(frame.light.ambient, Vec3::new(0.6, 0.6, 0.3));
        assert_eq!(frame.draws.len(), scene::SCENE.len());
        assert_eq!(frame.camera.position, CAMERA_START);
    }
}

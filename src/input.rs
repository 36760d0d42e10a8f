use std::collections::HashSet;

use glam::Vec2;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    W,
    A,
    S,
    D,
}

/// Maps a physical window key to a viewer key. Every other key is ignored.
pub fn map_keycode(code: winit::keyboard::KeyCode) -> Option<KeyCode> {
    use winit::keyboard::KeyCode as Key;
    Some(match code {
        Key::Escape => KeyCode::Escape,
        Key::KeyW => KeyCode::W,
        Key::KeyA => KeyCode::A,
        Key::KeyS => KeyCode::S,
        Key::KeyD => KeyCode::D,
        _ => return None,
    })
}

/// Keys currently held down, polled once per frame.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn release_all(&mut self) {
        self.keys.clear();
    }
}

/// Turns absolute cursor positions into look offsets.
///
/// The first reported position only seeds the tracker, so a cursor that
/// starts far from the initial guess does not snap the view.
#[derive(Debug, Clone)]
pub struct MouseLook {
    last: Vec2,
    first: bool,
}

impl MouseLook {
    pub fn new(initial: Vec2) -> Self {
        Self {
            last: initial,
            first: true,
        }
    }

    /// Returns `(x - last_x, last_y - y)`; screen Y grows downwards.
    pub fn on_cursor_moved(&mut self, position: Vec2) -> Vec2 {
        if self.first {
            self.last = position;
            self.first = false;
        }
        let offset = Vec2::new(position.x - self.last.x, self.last.y - position.y);
        self.last = position;
        offset
    }
}

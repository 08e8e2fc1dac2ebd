//! Keyboard input handling for flight controls.

use std::collections::HashSet;

/// Manages keyboard state for the current frame.
///
/// Level queries (`*_held`) poll keys that act while held — flight axes and
/// throttle. Edge queries (`*_pressed`) fire once per key-down transition —
/// camera cycling and the day/night toggle.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
            }
        }
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    // Flight bindings

    /// Roll axis: A rolls left (+), D rolls right (-).
    pub fn roll_input(&self) -> f32 {
        let mut roll = 0.0;
        if self.is_key_held(KeyCode::KeyA) {
            roll += 1.0;
        }
        if self.is_key_held(KeyCode::KeyD) {
            roll -= 1.0;
        }
        roll
    }

    /// Pitch axis: W pitches down (-), S pitches up (+).
    pub fn pitch_input(&self) -> f32 {
        let mut pitch = 0.0;
        if self.is_key_held(KeyCode::KeyW) {
            pitch -= 1.0;
        }
        if self.is_key_held(KeyCode::KeyS) {
            pitch += 1.0;
        }
        pitch
    }

    /// Yaw axis: Q yaws left (+), E yaws right (-).
    pub fn yaw_input(&self) -> f32 {
        let mut yaw = 0.0;
        if self.is_key_held(KeyCode::KeyQ) {
            yaw += 1.0;
        }
        if self.is_key_held(KeyCode::KeyE) {
            yaw -= 1.0;
        }
        yaw
    }

    /// Throttle up (ArrowUp) held.
    pub fn throttle_up_held(&self) -> bool {
        self.is_key_held(KeyCode::ArrowUp)
    }

    /// Throttle down (ArrowDown) held.
    pub fn throttle_down_held(&self) -> bool {
        self.is_key_held(KeyCode::ArrowDown)
    }

    /// Reset key (R) held. Level-triggered: observed any frame it is down.
    pub fn reset_held(&self) -> bool {
        self.is_key_held(KeyCode::KeyR)
    }

    /// Day/night toggle (N) pressed this frame.
    pub fn day_night_toggle_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyN)
    }

    /// Camera mode cycle (C) pressed this frame.
    pub fn camera_cycle_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::KeyC)
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_roll_keys_cancel() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyA, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyD, ElementState::Pressed);
        assert_eq!(input.roll_input(), 0.0);
        input.process_keyboard(KeyCode::KeyD, ElementState::Released);
        assert_eq!(input.roll_input(), 1.0);
    }

    #[test]
    fn pressed_is_edge_triggered() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyC, ElementState::Pressed);
        assert!(input.camera_cycle_pressed());

        // Key is still held the next frame, but the edge is gone.
        input.begin_frame();
        assert!(!input.camera_cycle_pressed());
        assert!(input.is_key_held(KeyCode::KeyC));

        // OS key repeat must not retrigger the edge while held.
        input.process_keyboard(KeyCode::KeyC, ElementState::Pressed);
        assert!(!input.camera_cycle_pressed());

        // Release and press again: a fresh edge.
        input.begin_frame();
        input.process_keyboard(KeyCode::KeyC, ElementState::Released);
        input.begin_frame();
        input.process_keyboard(KeyCode::KeyC, ElementState::Pressed);
        assert!(input.camera_cycle_pressed());
    }

    #[test]
    fn reset_is_level_triggered() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyR, ElementState::Pressed);
        assert!(input.reset_held());
        input.begin_frame();
        assert!(input.reset_held(), "reset stays observable while held");
    }
}

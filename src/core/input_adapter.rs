use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Held-button state fed from winit window events. Only key-down and
/// key-up change it; nothing is sampled per frame.
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    pressed_keys: HashSet<Button>,
    pressed_vec: Vec<Button>,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mapped button and its new state for keyboard and mouse button
    /// events, `None` for everything else
    pub fn map_event(event: &WindowEvent) -> Option<(Button, bool)> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(keycode) = event.physical_key else {
                    return None;
                };
                Some((Self::keycode_to_button(keycode)?, event.state == ElementState::Pressed))
            }
            WindowEvent::MouseInput { state, button, .. } => Some((
                Self::mouse_button_to_button(*button)?,
                *state == ElementState::Pressed,
            )),
            _ => None,
        }
    }

    /// Record a press or release. Repeated presses are idempotent.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            if self.pressed_keys.insert(button) {
                self.pressed_vec.push(button);
            }
        } else if self.pressed_keys.remove(&button) {
            self.pressed_vec.retain(|&b| b != button);
        }
    }

    /// Keyed on physical position, so WASD holds on any keyboard layout
    pub fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::KeyW => Some(Button::KeyW),
            KeyCode::KeyA => Some(Button::KeyA),
            KeyCode::KeyS => Some(Button::KeyS),
            KeyCode::KeyD => Some(Button::KeyD),
            KeyCode::ArrowUp => Some(Button::ArrowUp),
            KeyCode::ArrowDown => Some(Button::ArrowDown),
            KeyCode::ArrowLeft => Some(Button::ArrowLeft),
            KeyCode::ArrowRight => Some(Button::ArrowRight),
            KeyCode::Space => Some(Button::Space),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            _ => None,
        }
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.pressed_vec
    }
}

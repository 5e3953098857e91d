use winit::event::{ElementState, WindowEvent};

use super::controller::Button;
use super::input_adapter::WinitController;
use super::pointer_lock::{CursorGrab, PointerLock};
use crate::camera::{FlyCamera, MovementState};

/// What the event loop should do after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    None,
    Exit,
}

/// How the overlay saw the event that is being routed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiCapture {
    /// The overlay consumed the event itself
    pub consumed: bool,
    /// The cursor is over an overlay widget
    pub wants_pointer: bool,
}

/// Routes window input into the fly camera: held movement keys, the
/// pointer lock, and the Escape release-then-quit sequence.
#[derive(Debug, Default)]
pub struct FlyControls {
    controller: WinitController,
    pointer_lock: PointerLock,
}

impl FlyControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.pointer_lock.is_locked()
    }

    /// Keyboard and mouse button events. Presses the overlay consumed are
    /// dropped; releases always reach the controller so no key stays held.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        ui: UiCapture,
        target: &dyn CursorGrab,
        camera: &mut FlyCamera,
    ) -> ControlAction {
        let (state, repeat) = match event {
            WindowEvent::KeyboardInput { event, .. } => (event.state, event.repeat),
            WindowEvent::MouseInput { state, .. } => (*state, false),
            _ => return ControlAction::None,
        };
        if ui.consumed && state == ElementState::Pressed {
            return ControlAction::None;
        }
        let Some((button, pressed)) = WinitController::map_event(event) else {
            return ControlAction::None;
        };
        self.apply_button(button, pressed, repeat, ui.wants_pointer, target, camera)
    }

    /// Backend-independent half of `handle_window_event`
    pub fn apply_button(
        &mut self,
        button: Button,
        pressed: bool,
        repeat: bool,
        ui_wants_pointer: bool,
        target: &dyn CursorGrab,
        camera: &mut FlyCamera,
    ) -> ControlAction {
        self.controller.set_button(button, pressed);
        camera.movement = MovementState::from_controller(&self.controller);

        match (button, pressed) {
            (Button::Escape, true) if !repeat => {
                if self.pointer_lock.release(target) {
                    ControlAction::None
                } else {
                    ControlAction::Exit
                }
            }
            (Button::MouseLeft, true) if !ui_wants_pointer => {
                self.pointer_lock.request(target);
                ControlAction::None
            }
            _ => ControlAction::None,
        }
    }

    /// Raw mouse motion; turns the camera only while the lock is held
    pub fn mouse_motion(&self, camera: &mut FlyCamera, dx: f32, dy: f32) -> bool {
        if self.pointer_lock.is_locked() {
            camera.look(dx, dy);
        }
        self.pointer_lock.is_locked()
    }

    /// The window lost focus: the key-ups will never arrive, so drop every
    /// held button along with the lock
    pub fn focus_lost(&mut self, target: &dyn CursorGrab, camera: &mut FlyCamera) {
        self.pointer_lock.release(target);
        self.controller = WinitController::new();
        camera.movement = MovementState::default();
    }

    /// Give the cursor back, e.g. before a modal file dialog
    pub fn release_pointer(&mut self, target: &dyn CursorGrab) -> bool {
        self.pointer_lock.release(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct MockSurface {
        grabs: Cell<u32>,
        releases: Cell<u32>,
    }

    impl MockSurface {
        fn new() -> Self {
            Self {
                grabs: Cell::new(0),
                releases: Cell::new(0),
            }
        }
    }

    impl CursorGrab for MockSurface {
        fn grab_cursor(&self) -> bool {
            self.grabs.set(self.grabs.get() + 1);
            true
        }

        fn release_cursor(&self) {
            self.releases.set(self.releases.get() + 1);
        }
    }

    fn click(controls: &mut FlyControls, surface: &MockSurface, camera: &mut FlyCamera) {
        controls.apply_button(Button::MouseLeft, true, false, false, surface, camera);
        controls.apply_button(Button::MouseLeft, false, false, false, surface, camera);
    }

    #[test]
    fn test_deltas_gated_by_lock() {
        let surface = MockSurface::new();
        let mut controls = FlyControls::new();
        let mut camera = FlyCamera::new();

        assert!(!controls.mouse_motion(&mut camera, 50.0, 25.0));
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, 0.0);

        click(&mut controls, &surface, &mut camera);
        assert!(controls.mouse_motion(&mut camera, 50.0, 25.0));
        assert!(camera.yaw < 0.0);
        assert!(camera.pitch < 0.0);
    }

    #[test]
    fn test_click_over_overlay_does_not_lock() {
        let surface = MockSurface::new();
        let mut controls = FlyControls::new();
        let mut camera = FlyCamera::new();

        controls.apply_button(Button::MouseLeft, true, false, true, &surface, &mut camera);

        assert!(!controls.is_locked());
        assert_eq!(surface.grabs.get(), 0);
    }

    #[test]
    fn test_release_pointer_before_dialog() {
        let surface = MockSurface::new();
        let mut controls = FlyControls::new();
        let mut camera = FlyCamera::new();

        click(&mut controls, &surface, &mut camera);
        assert!(controls.release_pointer(&surface));
        assert!(!controls.release_pointer(&surface));
        assert_eq!(surface.releases.get(), 1);
    }

    fn left_button(state: ElementState) -> WindowEvent {
        WindowEvent::MouseInput {
            // SAFETY: the id is only carried through, never handed back to winit
            device_id: unsafe { winit::event::DeviceId::dummy() },
            state,
            button: winit::event::MouseButton::Left,
        }
    }

    #[test]
    fn test_overlay_consumed_press_is_dropped() {
        let surface = MockSurface::new();
        let mut controls = FlyControls::new();
        let mut camera = FlyCamera::new();
        let consumed = UiCapture {
            consumed: true,
            wants_pointer: true,
        };

        let action = controls.handle_window_event(&left_button(ElementState::Pressed), consumed, &surface, &mut camera);
        assert_eq!(action, ControlAction::None);
        assert!(!controls.is_locked());

        let action = controls.handle_window_event(
            &left_button(ElementState::Pressed),
            UiCapture::default(),
            &surface,
            &mut camera,
        );
        assert_eq!(action, ControlAction::None);
        assert!(controls.is_locked());
        assert_eq!(surface.grabs.get(), 1);
    }

    #[test]
    fn test_unrelated_events_ignored() {
        let surface = MockSurface::new();
        let mut controls = FlyControls::new();
        let mut camera = FlyCamera::new();

        let action = controls.handle_window_event(&WindowEvent::Focused(true), UiCapture::default(), &surface, &mut camera);
        assert_eq!(action, ControlAction::None);
        assert_eq!(surface.grabs.get(), 0);
    }

    #[test]
    fn test_focus_lost_without_lock_still_clears_keys() {
        let surface = MockSurface::new();
        let mut controls = FlyControls::new();
        let mut camera = FlyCamera::new();

        controls.apply_button(Button::KeyW, true, false, false, &surface, &mut camera);
        controls.focus_lost(&surface, &mut camera);

        assert_eq!(camera.movement, MovementState::default());
        assert_eq!(surface.releases.get(), 0);

        // A later key-down starts from an empty held set
        controls.apply_button(Button::KeyD, true, false, false, &surface, &mut camera);
        assert!(camera.movement.right);
        assert!(!camera.movement.forward);
    }
}

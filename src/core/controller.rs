/// Viewer-relevant keys and mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Shift,
    Escape,
    MouseLeft,
}

/// Held-button state, independent of the windowing backend
pub trait Controller {
    fn is_down(&self, button: Button) -> bool;

    /// Held buttons in press order
    fn get_down_keys(&self) -> &[Button];
}

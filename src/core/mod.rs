pub mod clock;
pub mod controller;
pub mod fly_controls;
pub mod input_adapter;
pub mod pointer_lock;

pub use clock::FrameClock;
pub use controller::{Button, Controller};
pub use fly_controls::{ControlAction, FlyControls, UiCapture};
pub use input_adapter::WinitController;
pub use pointer_lock::{CursorGrab, PointerLock};

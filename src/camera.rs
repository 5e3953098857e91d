use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::core::{Button, Controller};

/// Radians of yaw/pitch per pixel of raw pointer motion
pub const MOUSE_SENSITIVITY: f32 = 0.002;
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2;

pub const INITIAL_POSITION: Vec3 = Vec3::new(0.0, 1.6, 3.0);
pub const FOV_Y_DEGREES: f32 = 75.0;
pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 2000.0;

/// Six movement flags, set on key-down and cleared on key-up
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MovementState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MovementState {
    const fn to_direction(positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// Read the flags from whatever buttons the controller holds down
    pub fn from_controller(controller: &dyn Controller) -> Self {
        Self {
            forward: controller.is_down(Button::KeyW) || controller.is_down(Button::ArrowUp),
            backward: controller.is_down(Button::KeyS) || controller.is_down(Button::ArrowDown),
            left: controller.is_down(Button::KeyA) || controller.is_down(Button::ArrowLeft),
            right: controller.is_down(Button::KeyD) || controller.is_down(Button::ArrowRight),
            up: controller.is_down(Button::Space),
            down: controller.is_down(Button::Shift),
        }
    }

    /// Camera-local direction: -Z is forward, +X right, +Y up.
    /// Unit length when any axis is active, zero otherwise.
    pub fn direction(&self) -> Vec3 {
        let direction = Vec3::new(
            Self::to_direction(self.right, self.left),
            Self::to_direction(self.up, self.down),
            Self::to_direction(self.backward, self.forward),
        );

        if direction.length_squared() > 0.0 {
            direction.normalize()
        } else {
            direction
        }
    }
}

/// First-person fly camera. Orientation is rebuilt from yaw and pitch on
/// every update, so roll never accumulates.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub movement: MovementState,
}

impl FlyCamera {
    pub fn new() -> Self {
        Self::with_pose(INITIAL_POSITION, 0.0, 0.0)
    }

    pub fn with_pose(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            movement: MovementState::default(),
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Frame tick: move along the camera-space direction scaled by
    /// `speed * delta` (units per second times seconds)
    pub fn update(&mut self, speed: f32, delta: f32) -> Vec3 {
        let displacement = self.orientation() * self.movement.direction() * (speed * delta);
        self.position += displacement;
        displacement
    }

    /// Apply one raw pointer delta. The caller decides whether the pointer
    /// lock is held.
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * MOUSE_SENSITIVITY;
        self.pitch = (self.pitch - dy * MOUSE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position).inverse()
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect.max(1e-4), NEAR_PLANE, FAR_PLANE)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new()
    }
}

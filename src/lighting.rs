use glam::{Mat4, Vec3};

use crate::math::{hex_to_linear, AABB};
use crate::settings::ViewerSettings;
use crate::types::FrameUniform;

pub const BACKGROUND_COLOR: u32 = 0x1a1a1a;
pub const HEMISPHERE_SKY: u32 = 0xffffff;
pub const HEMISPHERE_GROUND: u32 = 0x444444;
pub const HEMISPHERE_INTENSITY: f32 = 0.5;

pub const SHADOW_MAP_SIZE: u32 = 2048;
pub const SHADOW_BIAS: f32 = -0.0001;

/// Minimum half-extent of the shadow frustum so an empty or tiny scene
/// still gets a usable light camera
const MIN_SHADOW_RADIUS: f32 = 1.0;

/// Unit vector from the origin towards the directional light
pub fn light_direction(position: [f32; 3]) -> Vec3 {
    Vec3::from_array(position).try_normalize().unwrap_or(Vec3::Y)
}

/// Orthographic light camera enclosing `bounds`, looking along the light
pub fn shadow_view_projection(direction: Vec3, bounds: Option<AABB>) -> Mat4 {
    let (center, radius) = match bounds {
        Some(b) => (b.center(), b.radius().max(MIN_SHADOW_RADIUS)),
        None => (Vec3::ZERO, MIN_SHADOW_RADIUS),
    };

    let eye = center + direction * radius * 2.0;
    let up = if direction.abs_diff_eq(Vec3::Y, 1e-3) || direction.abs_diff_eq(Vec3::NEG_Y, 1e-3) {
        Vec3::Z
    } else {
        Vec3::Y
    };

    let view = Mat4::look_at_rh(eye, center, up);
    let projection = Mat4::orthographic_rh(-radius, radius, -radius, radius, radius * 0.5, radius * 3.5);
    projection * view
}

/// Offscreen clear colour; alpha 0 keeps it out of tone mapping
pub fn background_color() -> wgpu::Color {
    let [r, g, b] = hex_to_linear(BACKGROUND_COLOR);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 0.0,
    }
}

fn with_intensity(rgb: [f32; 3], intensity: f32) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], intensity]
}

/// Assemble the per-frame uniform from camera and light state
pub fn frame_uniform(
    view_proj: Mat4,
    camera_position: Vec3,
    settings: &ViewerSettings,
    bounds: Option<AABB>,
) -> FrameUniform {
    let direction = light_direction(settings.directional_position);
    let (env_sky, env_ground, env_intensity) = settings.environment.lighting();

    FrameUniform {
        view_proj: view_proj.to_cols_array_2d(),
        light_view_proj: shadow_view_projection(direction, bounds).to_cols_array_2d(),
        camera_position: camera_position.to_array(),
        _pad0: 0.0,
        light_direction: with_intensity(direction.to_array(), settings.directional_intensity),
        ambient: with_intensity([1.0, 1.0, 1.0], settings.ambient_intensity),
        hemisphere_sky: with_intensity(hex_to_linear(HEMISPHERE_SKY), HEMISPHERE_INTENSITY),
        hemisphere_ground: with_intensity(hex_to_linear(HEMISPHERE_GROUND), HEMISPHERE_INTENSITY),
        environment_sky: with_intensity(env_sky, env_intensity),
        environment_ground: with_intensity(env_ground, env_intensity),
        shadow_params: [SHADOW_BIAS, 1.0 / SHADOW_MAP_SIZE as f32, 0.0, 0.0],
    }
}

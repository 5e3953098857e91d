use glam::Vec3;

use crate::settings::{
    EnvironmentPreset, ViewerSettings, AMBIENT_RANGE, DIRECTIONAL_RANGE, LIGHT_X_RANGE, LIGHT_Y_RANGE,
    LIGHT_Z_RANGE, PIXEL_RATIO_RANGE, SPEED_RANGE,
};

pub const HINT: &str = "Click the view to enable mouse look. Use WASD/Arrow keys, Space (up), Shift (down). Esc releases the mouse.";
pub const DROPZONE: &str = "Drag & drop a large .glb here or use the Upload button above.";

const SPEED_TIP: &str =
    "Camera movement speed (units per second). Increase to move faster around the scene.";
const DPR_TIP: &str = "Scales render resolution. Lower for better performance, higher for a sharper image but heavier GPU load.";

/// Read-only state shown by the overlay
#[derive(Debug, Clone, Default)]
pub struct UiStatus {
    pub fps: f32,
    pub progress: Option<u32>,
    pub loading: Option<String>,
    pub asset: Option<AssetSummary>,
    pub last_error: Option<String>,
    pub pointer_locked: bool,
    pub camera_position: Vec3,
    pub render_size: (u32, u32),
}

#[derive(Debug, Clone)]
pub struct AssetSummary {
    pub name: String,
    pub nodes: usize,
    pub triangles: usize,
}

/// What the operator asked for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiActions {
    pub open_file: bool,
    pub clear_asset: bool,
}

/// "NN%" while a load is pending
pub fn progress_label(percent: Option<u32>) -> Option<String> {
    percent.map(|p| format!("{}%", p))
}

pub fn draw(ctx: &egui::Context, settings: &mut ViewerSettings, status: &UiStatus) -> UiActions {
    let mut actions = UiActions::default();

    egui::Area::new(egui::Id::new("ui_toggle"))
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .show(ctx, |ui| {
            let label = if settings.ui_visible { "Hide UI" } else { "Show UI" };
            if ui.button(label).clicked() {
                settings.ui_visible = !settings.ui_visible;
            }
        });

    if settings.ui_visible {
        egui::Window::new("Viewer")
            .title_bar(true)
            .resizable(false)
            .fixed_pos(egui::pos2(10.0, 10.0))
            .default_width(320.0)
            .show(ctx, |ui| {
                controls(ui, settings, &mut actions);
                ui.add_space(5.0);
                ui.separator();
                status_panel(ui, status, &mut actions);
                ui.add_space(5.0);
                ui.separator();
                ui.label(egui::RichText::new(HINT).size(12.0).color(egui::Color32::GRAY));
            });
    }

    if let Some(label) = progress_label(status.progress) {
        egui::Area::new(egui::Id::new("load_progress"))
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(label).size(32.0).color(egui::Color32::WHITE));
            });
    } else if status.asset.is_none() {
        egui::Area::new(egui::Id::new("dropzone"))
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(DROPZONE)
                        .size(18.0)
                        .color(egui::Color32::from_gray(170)),
                );
            });
    }

    actions
}

fn controls(ui: &mut egui::Ui, settings: &mut ViewerSettings, actions: &mut UiActions) {
    ui.add(
        egui::Slider::new(&mut settings.movement_speed, SPEED_RANGE)
            .step_by(1.0)
            .text("Speed"),
    )
    .on_hover_text(SPEED_TIP);
    ui.add(
        egui::Slider::new(&mut settings.pixel_ratio, PIXEL_RATIO_RANGE)
            .step_by(0.05)
            .fixed_decimals(2)
            .text("DPR"),
    )
    .on_hover_text(DPR_TIP);

    ui.add(
        egui::Slider::new(&mut settings.ambient_intensity, AMBIENT_RANGE)
            .step_by(0.05)
            .fixed_decimals(2)
            .text("Ambient"),
    );
    ui.add(
        egui::Slider::new(&mut settings.directional_intensity, DIRECTIONAL_RANGE)
            .step_by(0.05)
            .fixed_decimals(2)
            .text("Dir Intensity"),
    );

    ui.label("Dir Pos");
    let [x, y, z] = &mut settings.directional_position;
    for (value, range, axis) in [(x, LIGHT_X_RANGE, "X"), (y, LIGHT_Y_RANGE, "Y"), (z, LIGHT_Z_RANGE, "Z")] {
        ui.add(egui::Slider::new(value, range).step_by(0.5).fixed_decimals(1).text(axis));
    }

    ui.horizontal_wrapped(|ui| {
        ui.label("Env");
        for preset in EnvironmentPreset::ALL {
            let mut checked = settings.environment == preset;
            if ui.checkbox(&mut checked, preset.name()).changed() {
                settings.environment = preset;
            }
        }
    });

    ui.add_space(5.0);
    if ui.button("Upload GLB/GLTF").clicked() {
        actions.open_file = true;
    }
}

fn status_panel(ui: &mut egui::Ui, status: &UiStatus, actions: &mut UiActions) {
    ui.heading(
        egui::RichText::new(format!("{:.0} FPS", status.fps))
            .size(20.0)
            .color(egui::Color32::from_rgb(74, 158, 255)),
    );

    if let Some(name) = &status.loading {
        ui.monospace(format!("Loading: {}", name));
    }

    match &status.asset {
        Some(asset) => {
            ui.horizontal(|ui| {
                ui.monospace(&asset.name);
                if ui.small_button("Clear").clicked() {
                    actions.clear_asset = true;
                }
            });
            ui.monospace(format!("Nodes: {}  Triangles: {}", asset.nodes, asset.triangles));
        }
        None => {
            ui.monospace("No model loaded");
        }
    }

    if let Some(error) = &status.last_error {
        ui.label(egui::RichText::new(error).color(egui::Color32::from_rgb(255, 100, 100)));
    }

    let p = status.camera_position;
    ui.monospace(format!("Pos: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
    ui.monospace(format!(
        "Render: {}x{}  Mouse look: {}",
        status.render_size.0,
        status.render_size.1,
        if status.pointer_locked { "on" } else { "off" }
    ));
}

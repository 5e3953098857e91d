use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

use crate::cli::Cli;

pub const SPEED_RANGE: RangeInclusive<f32> = 1.0..=50.0;
pub const PIXEL_RATIO_RANGE: RangeInclusive<f32> = 0.75..=2.0;
pub const AMBIENT_RANGE: RangeInclusive<f32> = 0.0..=5.0;
pub const DIRECTIONAL_RANGE: RangeInclusive<f32> = 0.0..=10.0;
pub const LIGHT_X_RANGE: RangeInclusive<f32> = -20.0..=50.0;
pub const LIGHT_Y_RANGE: RangeInclusive<f32> = 0.0..=100.0;
pub const LIGHT_Z_RANGE: RangeInclusive<f32> = -20.0..=50.0;

/// Image-based lighting presets. Each maps to a sky/ground tint pair that
/// stands in for the preset's HDRI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPreset {
    City,
    Sunset,
    Studio,
    #[default]
    Warehouse,
    Forest,
    Dawn,
}

impl EnvironmentPreset {
    pub const ALL: [EnvironmentPreset; 6] = [
        EnvironmentPreset::City,
        EnvironmentPreset::Sunset,
        EnvironmentPreset::Studio,
        EnvironmentPreset::Warehouse,
        EnvironmentPreset::Forest,
        EnvironmentPreset::Dawn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnvironmentPreset::City => "city",
            EnvironmentPreset::Sunset => "sunset",
            EnvironmentPreset::Studio => "studio",
            EnvironmentPreset::Warehouse => "warehouse",
            EnvironmentPreset::Forest => "forest",
            EnvironmentPreset::Dawn => "dawn",
        }
    }

    /// (sky, ground, intensity), colours in linear RGB
    pub fn lighting(self) -> ([f32; 3], [f32; 3], f32) {
        match self {
            EnvironmentPreset::City => ([0.55, 0.62, 0.75], [0.22, 0.21, 0.20], 0.7),
            EnvironmentPreset::Sunset => ([0.95, 0.55, 0.32], [0.25, 0.16, 0.14], 0.6),
            EnvironmentPreset::Studio => ([0.90, 0.90, 0.90], [0.45, 0.45, 0.45], 0.8),
            EnvironmentPreset::Warehouse => ([0.78, 0.70, 0.58], [0.30, 0.27, 0.24], 0.7),
            EnvironmentPreset::Forest => ([0.50, 0.65, 0.45], [0.16, 0.20, 0.10], 0.5),
            EnvironmentPreset::Dawn => ([0.70, 0.60, 0.75], [0.20, 0.18, 0.22], 0.5),
        }
    }
}

/// Operator-tunable viewer parameters. Plain scalars with range limits only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Camera movement speed in units per second
    pub movement_speed: f32,
    /// Requested render-resolution scale; see `effective_pixel_ratio`
    pub pixel_ratio: f32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub environment: EnvironmentPreset,
    pub ui_visible: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            movement_speed: 10.0,
            pixel_ratio: 1.25,
            ambient_intensity: 0.6,
            directional_intensity: 1.2,
            directional_position: [5.0, 10.0, 5.0],
            environment: EnvironmentPreset::Warehouse,
            ui_visible: true,
        }
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

impl ViewerSettings {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid settings file {:?}", path))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut settings: Self = serde_json::from_str(text)?;
        settings.clamp_to_ranges();
        Ok(settings)
    }

    /// Defaults, then the optional settings file, then CLI flags
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut settings = match &cli.settings {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };

        if let Some(speed) = cli.speed {
            settings.movement_speed = speed;
        }
        if let Some(dpr) = cli.dpr {
            settings.pixel_ratio = dpr;
        }
        if let Some(environment) = cli.env {
            settings.environment = environment;
        }
        if cli.no_ui {
            settings.ui_visible = false;
        }

        settings.clamp_to_ranges();
        Ok(settings)
    }

    pub fn clamp_to_ranges(&mut self) {
        self.movement_speed = clamp_to(self.movement_speed, &SPEED_RANGE);
        self.pixel_ratio = clamp_to(self.pixel_ratio, &PIXEL_RATIO_RANGE);
        self.ambient_intensity = clamp_to(self.ambient_intensity, &AMBIENT_RANGE);
        self.directional_intensity = clamp_to(self.directional_intensity, &DIRECTIONAL_RANGE);
        let [x, y, z] = self.directional_position;
        self.directional_position = [
            clamp_to(x, &LIGHT_X_RANGE),
            clamp_to(y, &LIGHT_Y_RANGE),
            clamp_to(z, &LIGHT_Z_RANGE),
        ];
    }

    /// Render-resolution scale actually applied, limited to [0.75, 2]
    pub fn effective_pixel_ratio(&self) -> f32 {
        self.pixel_ratio.max(0.75).min(2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.movement_speed, 10.0);
        assert_eq!(settings.pixel_ratio, 1.25);
        assert_eq!(settings.ambient_intensity, 0.6);
        assert_eq!(settings.directional_intensity, 1.2);
        assert_eq!(settings.directional_position, [5.0, 10.0, 5.0]);
        assert_eq!(settings.environment, EnvironmentPreset::Warehouse);
        assert!(settings.ui_visible);
    }

    #[test]
    fn test_effective_pixel_ratio_clamps() {
        let mut settings = ViewerSettings::default();
        settings.pixel_ratio = 0.1;
        assert_eq!(settings.effective_pixel_ratio(), 0.75);
        settings.pixel_ratio = 3.0;
        assert_eq!(settings.effective_pixel_ratio(), 2.0);
        settings.pixel_ratio = 1.5;
        assert_eq!(settings.effective_pixel_ratio(), 1.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            ViewerSettings::from_json_str(r#"{ "movement_speed": 25, "environment": "sunset" }"#)
                .unwrap();
        assert_eq!(settings.movement_speed, 25.0);
        assert_eq!(settings.environment, EnvironmentPreset::Sunset);
        assert_eq!(settings.ambient_intensity, 0.6);
    }

    #[test]
    fn test_json_values_clamped() {
        let settings = ViewerSettings::from_json_str(
            r#"{ "movement_speed": 500, "directional_position": [-100, -1, 75] }"#,
        )
        .unwrap();
        assert_eq!(settings.movement_speed, 50.0);
        assert_eq!(settings.directional_position, [-20.0, 0.0, 50.0]);
    }

    #[test]
    fn test_unknown_preset_rejected() {
        assert!(ViewerSettings::from_json_str(r#"{ "environment": "moon" }"#).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(["glb-viewer", "--speed", "3", "--env", "forest", "--no-ui"]);
        let settings = ViewerSettings::resolve(&cli).unwrap();
        assert_eq!(settings.movement_speed, 3.0);
        assert_eq!(settings.environment, EnvironmentPreset::Forest);
        assert!(!settings.ui_visible);
        assert_eq!(settings.pixel_ratio, 1.25);
    }

    #[test]
    fn test_preset_names_unique() {
        let mut names: Vec<_> = EnvironmentPreset::ALL.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EnvironmentPreset::ALL.len());
    }
}

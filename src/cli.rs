// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::settings::EnvironmentPreset;

#[derive(Parser, Debug, Clone)]
#[command(name = "glb-viewer")]
#[command(about = "Fly-through viewer for glTF / GLB models", long_about = None)]
pub struct Cli {
    /// Model to load at start-up (.glb or .gltf)
    pub model: Option<PathBuf>,

    /// Start with the settings overlay hidden
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Camera movement speed in units per second
    #[arg(long)]
    pub speed: Option<f32>,

    /// Render resolution scale (0.75 - 2.0)
    #[arg(long)]
    pub dpr: Option<f32>,

    /// Environment lighting preset
    #[arg(long, value_enum)]
    pub env: Option<EnvironmentPreset>,

    /// JSON file with initial viewer settings
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

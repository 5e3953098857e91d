pub mod assets;
pub mod camera;
pub mod cli;
pub mod core;
pub mod event;
pub mod gpu_scene;
pub mod grid;
pub mod lighting;
pub mod loaders;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod types;
pub mod ui;

pub use assets::{AssetLoader, AssetSlot, AssetSource, SwapOutcome};
pub use camera::{FlyCamera, MovementState};
pub use scene::{SceneAsset, SceneNode};
pub use settings::ViewerSettings;

pub mod api;
pub mod config;
pub mod design;
pub mod materials;
pub mod render;
pub mod scene;
pub mod texture;

pub use config::StudioConfig;
pub use design::{DesignConfig, FontStyle, Rgb};
pub use scene::SceneRuntime;

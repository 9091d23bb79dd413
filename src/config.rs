//! Editor configuration

use glam::Vec3;

pub const DEFAULT_GENERATOR_ADDR: &str = "127.0.0.1:5000";

/// Environment variable overriding the generation service address.
pub const GENERATOR_ADDR_ENV: &str = "MODELBENCH_GENERATOR_ADDR";

#[derive(Clone, Debug)]
pub struct EditorConfig {
    pub window_title: String,
    /// Spawned shapes land within `[-spawn_extent, spawn_extent]` per axis.
    pub spawn_extent: f32,
    pub initial_camera_eye: Vec3,
    pub camera_target: Vec3,
    /// Linear-space clear color (the original editor's dark grey backdrop).
    pub background_color: Vec3,
    /// Address of the model generation service.
    pub generator_addr: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window_title: "modelbench".to_string(),
            spawn_extent: 2.0,
            initial_camera_eye: Vec3::new(0.0, 0.0, 5.0),
            camera_target: Vec3::ZERO,
            background_color: Vec3::splat(0.032),
            generator_addr: DEFAULT_GENERATOR_ADDR.to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var(GENERATOR_ADDR_ENV) {
            config.generator_addr = addr;
        }
        config
    }
}

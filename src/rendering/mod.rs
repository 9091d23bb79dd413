pub mod imgui_renderer;
pub mod instance;
pub mod renderer;
pub mod texture;

pub mod asset;
pub mod camera;
pub mod command_line;
pub mod display;
pub mod error;
pub mod frame_clock;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod shader_model;

#[cfg(windows)]
pub mod color_shader;
#[cfg(windows)]
pub mod dx_sample;
#[cfg(windows)]
pub mod mesh;
#[cfg(windows)]
pub mod render_device;
#[cfg(windows)]
pub mod sample_runner;
#[cfg(windows)]
pub mod shader_compiler;
#[cfg(windows)]
pub mod shader_manager;

/// `DirectX::Colors::CornflowerBlue`
pub const CORNFLOWER_BLUE: [f32; 4] = [0.392_156_87, 0.584_313_75, 0.929_411_8, 1.0];

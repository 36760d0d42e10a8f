mod common;
mod gpu;
mod shaders;
mod textures;

pub use common::CameraParams;
pub use gpu::Renderer;

//! Building blocks for the courtside viewer: a lit, textured basketball
//! court with a free-fly camera.
//!
//! Scene description, camera, input and asset loading are plain data and
//! can be exercised headless. Only the `render` module touches the GPU.

pub mod app;
pub mod assets;
pub mod camera;
pub mod input;
pub mod model;
pub mod render;
pub mod resources;
pub mod scene;
pub mod texture;

pub use app::{FrameState, FrameTimer, SceneContext};
pub use assets::{ModelEntry, SceneAssets, TextureEntry};
pub use camera::{Camera, Movement};
pub use input::{map_keycode, InputState, KeyCode, MouseLook};
pub use model::{MeshData, ModelData, TextureKind};
pub use render::{CameraParams, Renderer};
pub use resources::{AssetError, ResourcePaths};
pub use scene::{DrawItem, ModelId, PointLight, SceneObject, SCENE};
pub use texture::{PixelFormat, TextureData, TextureError};

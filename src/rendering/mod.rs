// Re-export camera components
pub mod camera;
pub use camera::{Camera, CameraController, CameraUniform};

// Re-export pipeline components
pub mod pipeline;
pub use pipeline::{RenderContext, RenderingSystem};

// Other rendering components
pub mod resources;
pub mod shaders;
pub mod texture;

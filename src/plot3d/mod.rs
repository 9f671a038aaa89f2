pub mod camera;
pub mod gpu_types;
pub mod mesh;
pub mod renderer;
pub mod scene;

pub use camera::OrbitCamera;
pub use scene::{build_scene, EntryAnimation, Scene};

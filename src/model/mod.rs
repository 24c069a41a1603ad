// MODEL: Scene state and data
pub mod camera;
pub mod scene;

pub use camera::Camera;
pub use scene::{NodeId, Scene, SceneNode, Transform};

// CONTROLLER: Input, simulation, and the frame loop
pub mod frame_loop;
pub mod input;
pub mod orbit;
pub mod physics;
pub mod text_loader;

pub use frame_loop::{FrameClock, FrameTick};
pub use input::InputState;
pub use orbit::OrbitController;
pub use physics::PhysicsWorld;
pub use text_loader::{TextLoadError, TextLoader, TextState};

//! Headless balloon simulation
//!
//! Everything that moves a balloon or a harpoon lives here. Two worlds
//! built from the same seed must replay bit for bit, so the rules are:
//! - One fixed timestep drives every update
//! - Randomness derives from the world seed alone
//! - Bodies update in stable id order
//! - Nothing renders or reaches the platform layer

pub mod collision;
pub mod noise;
pub mod spawn;
pub mod state;
pub mod terrain;
pub mod tick;

pub use collision::{circle_circle, reflect_velocity, CollisionResult};
pub use spawn::{trajectory_preview, LaunchConfig, Launcher, SpawnConfig, Spawner};
pub use state::{
    Behaviors, Body, BodyKind, NewBody, SimError, VisualHandle, World, WorldEvent,
};
pub use terrain::{Bounds, GenStrategy, Terrain, TerrainConfig};
pub use tick::tick;

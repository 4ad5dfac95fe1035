//! Skypop - a balloon-popping arcade simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, terrain, spawning)
//! - `tuning`: Data-driven game balance
//!
//! The crate is headless: rendering, input, and audio live outside and talk
//! to the world through `add_body`, the terrain queries, and the event
//! stream returned by `tick`.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matching the original frame cadence)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Terrain resolutions below this are clamped upward
    pub const MIN_RESOLUTION: usize = 8;
    /// Sample offset for finite-difference terrain normals
    pub const NORMAL_SAMPLE_EPS: f32 = 0.01;
    /// Speeds below this don't update a harpoon's facing
    pub const SPEED_EPS: f32 = 0.001;
}

/// 2D cross product (z component of the 3D cross)
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Left-handed perpendicular: cross(n, forward) projected back to 2D
#[inline]
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Heading of a velocity vector in degrees (sprite rotation convention)
#[inline]
pub fn heading_deg(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

//! Data-driven game balance
//!
//! Every knob the physics and terrain code reads lives here, so a session
//! can be re-balanced from a JSON file without touching the sim.

use serde::{Deserialize, Serialize};

/// World-space culling rectangle for off-screen balloon removal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge; balloons past it are removed
    pub min_x: f32,
    /// Right edge
    pub max_x: f32,
    /// Top edge; balloons floating above it are removed
    pub top_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            min_x: -10.0,
            max_x: 10.0,
            top_y: 6.0,
        }
    }
}

/// Physics balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Projectiles ===
    /// Gravity applied to harpoon vertical velocity (units/s²)
    pub gravity: f32,
    /// Harpoon speed never drops below this after a tangential hit
    pub harpoon_carry_speed_floor: f32,

    // === Balloon flight ===
    /// Vertical velocity balloons recover toward when knocked below it
    pub min_upward_velocity: f32,
    /// Hard cap on balloon rise speed
    pub max_float_velocity: f32,
    /// Upward acceleration while below `min_upward_velocity` (units/s²)
    pub float_recovery_rate: f32,
    /// Horizontal velocity decay per second
    pub balloon_air_resistance: f32,
    /// Horizontal wobble strength added each tick
    pub balloon_oscillation_amplitude: f32,
    /// Time scale of the wobble noise
    pub balloon_oscillation_speed: f32,

    // === Balloon-balloon contact ===
    /// Bounciness of the restitution impulse
    pub restitution: f32,
    /// Fraction of penetration corrected positionally
    pub soft_body_elasticity: f32,
    /// Tangential friction impulse scale
    pub balloon_collision_friction: f32,
    /// X-velocity damping applied after a collision
    pub balloon_collision_x_decay: f32,
    /// Y-velocity damping applied after a collision
    pub balloon_collision_y_decay: f32,
    /// Spin added per unit of tangential relative speed (deg/s)
    pub balloon_torque_factor: f32,

    // === Balloon rotation ===
    /// Angular velocity decay per second
    pub rotation_drag: f32,
    /// Spring strength pulling rotation back upright
    pub rotation_recovery: f32,
    /// Angular speed clamp (deg/s)
    pub max_angular_speed: f32,

    // === Harpoon-balloon classification ===
    /// Velocity-along-normal at or above this pops the balloon
    pub tangential_threshold: f32,
    /// Push strength of a glancing hit
    pub rigid_impulse_strength: f32,

    // === World ===
    /// Ground height used when no terrain is wired
    pub fallback_ground_y: f32,
    /// Slope magnitude below which terrain counts as a valley floor
    pub low_slope_threshold: f32,
    /// Culling rectangle
    pub viewport: Viewport,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: -9.8,
            harpoon_carry_speed_floor: 1.0,

            min_upward_velocity: 0.5,
            max_float_velocity: 2.0,
            float_recovery_rate: 1.0,
            balloon_air_resistance: 0.1,
            balloon_oscillation_amplitude: 0.05,
            balloon_oscillation_speed: 1.0,

            restitution: 0.8,
            soft_body_elasticity: 0.5,
            balloon_collision_friction: 0.2,
            balloon_collision_x_decay: 0.95,
            balloon_collision_y_decay: 1.0,
            balloon_torque_factor: 5.0,

            rotation_drag: 0.1,
            rotation_recovery: 1.0,
            max_angular_speed: 360.0,

            tangential_threshold: 6.0,
            rigid_impulse_strength: 0.05,

            fallback_ground_y: 0.0,
            low_slope_threshold: 0.5,
            viewport: Viewport::default(),
        }
    }
}

impl Tuning {
    /// Load tuning from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {e}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }
}

//! World state and core simulation types
//!
//! All state that must be persisted for snapshot/replay lives here.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::terrain::{Terrain, TerrainConfig};

/// The two kinds of simulated actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Launched projectile; falls under gravity, faces its velocity
    Harpoon,
    /// Buoyant target; wobbles, rises, spins upright
    Balloon,
}

/// Collision response policies a body opts into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Behaviors {
    /// Removed on a qualifying collision (direct hits, terrain for harpoons)
    pub destroy: bool,
    /// Reflects off terrain
    pub bounce: bool,
    /// Accepts push impulses from glancing hits
    pub push: bool,
    /// Velocity zeroed instead of the usual response
    pub stop: bool,
}

impl Behaviors {
    /// Default harpoon policy
    pub fn harpoon() -> Self {
        Self {
            destroy: true,
            ..Self::default()
        }
    }

    /// Default balloon policy
    pub fn balloon() -> Self {
        Self {
            destroy: true,
            bounce: true,
            push: true,
            stop: false,
        }
    }
}

/// Opaque presentation-layer handle; the sim forwards it, never follows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// A simulated body (harpoon or balloon)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub kind: BodyKind,
    pub pos: Vec2,
    /// Position at the start of the last integration
    pub prev_pos: Vec2,
    pub vel: Vec2,
    /// Sprite rotation in degrees (balloons spring back to 0 = upright)
    pub rotation: f32,
    /// Degrees per second
    pub angular_vel: f32,
    /// Collision circle radius
    pub radius: f32,
    /// Impulse weight; guarded as immovable if it ever reaches zero
    pub mass: f32,
    pub behaviors: Behaviors,
    /// Per-body chaotic horizontal jitter amplitude
    #[serde(default)]
    pub jitter: f32,
    /// Externally-owned render handle, released via `BodyRemoved`
    #[serde(default)]
    pub visual: Option<VisualHandle>,
    /// Flagged by resolution/bounds checks; honored only by the sweep
    #[serde(default)]
    pub pending_destroy: bool,
    /// Balloon ids this harpoon has already collided with
    #[serde(default)]
    pub struck: Vec<u32>,
}

impl Body {
    /// Materialize a validated spawn request under a fresh id
    pub fn from_spec(id: u32, spec: NewBody) -> Self {
        Self {
            id,
            kind: spec.kind,
            pos: spec.pos,
            prev_pos: spec.pos,
            vel: spec.vel,
            rotation: 0.0,
            angular_vel: 0.0,
            radius: spec.radius,
            mass: spec.mass,
            behaviors: spec.behaviors,
            jitter: spec.jitter,
            visual: spec.visual,
            pending_destroy: false,
            struck: Vec::new(),
        }
    }

    /// Facing angle in degrees, following velocity when moving
    pub fn facing_deg(&self) -> f32 {
        if self.vel.length() > crate::consts::SPEED_EPS {
            crate::heading_deg(self.vel)
        } else {
            self.rotation
        }
    }
}

/// Parameters for a spawn request
#[derive(Debug, Clone)]
pub struct NewBody {
    pub kind: BodyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub behaviors: Behaviors,
    pub jitter: f32,
    pub visual: Option<VisualHandle>,
}

impl NewBody {
    /// A harpoon with the canonical radius and mass
    pub fn harpoon(pos: Vec2, vel: Vec2) -> Self {
        Self {
            kind: BodyKind::Harpoon,
            pos,
            vel,
            radius: 0.2,
            mass: 1.0,
            behaviors: Behaviors::harpoon(),
            jitter: 0.0,
            visual: None,
        }
    }

    /// A balloon rising from `pos` with the canonical radius and mass
    pub fn balloon(pos: Vec2) -> Self {
        Self {
            kind: BodyKind::Balloon,
            pos,
            vel: Vec2::Y,
            radius: 0.5,
            mass: 1.0,
            behaviors: Behaviors::balloon(),
            jitter: 0.0,
            visual: None,
        }
    }
}

/// Rejections surfaced by the world's mutation API
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Spawn request with a non-positive radius or mass
    InvalidBody { reason: String },
    /// Terrain configuration that cannot produce a valid profile
    InvalidTerrain { reason: String },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidBody { reason } => write!(f, "invalid body: {reason}"),
            SimError::InvalidTerrain { reason } => write!(f, "invalid terrain: {reason}"),
        }
    }
}

impl std::error::Error for SimError {}

/// Observable side effects of a tick, in detection order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Score changed (direct hit landed)
    ScoreChanged { score: u32 },
    /// Balloon destroyed by a direct hit; spawn a pop effect here
    BalloonPopped {
        id: u32,
        pos: Vec2,
        visual: Option<VisualHandle>,
    },
    /// A popped balloon should be replaced when the spawner next runs
    RespawnRequested,
    /// Glancing harpoon-balloon contact (push + spin, no destruction)
    TangentialHit { harpoon: u32, balloon: u32 },
    /// Body left the world; release its visual handle
    BodyRemoved {
        id: u32,
        kind: BodyKind,
        visual: Option<VisualHandle>,
    },
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Run seed; drives wobble phase and default regeneration
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Balloons popped by direct hits
    pub score: u32,
    /// Balance parameters
    pub tuning: crate::Tuning,
    /// Active harpoons (sorted by id)
    pub harpoons: Vec<Body>,
    /// Active balloons (sorted by id)
    pub balloons: Vec<Body>,
    /// Injected terrain collaborator
    terrain: Option<Terrain>,
    /// Next entity ID
    next_id: u32,
    /// One-shot warning flags for guarded degeneracies
    #[serde(default)]
    warned_no_terrain: bool,
    #[serde(default)]
    warned_degenerate_mass: bool,
}

impl World {
    /// Create an empty world with the given seed; terrain is wired separately
    pub fn new(seed: u64, tuning: crate::Tuning) -> Self {
        Self {
            seed,
            time_ticks: 0,
            score: 0,
            tuning,
            harpoons: Vec::new(),
            balloons: Vec::new(),
            terrain: None,
            next_id: 1,
            warned_no_terrain: false,
            warned_degenerate_mass: false,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Inject the terrain collaborator
    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = Some(terrain);
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }

    /// Replace the active terrain with a freshly generated profile.
    ///
    /// Fails closed: on a bad config the previous profile stays active.
    /// Call between ticks only.
    pub fn regenerate_terrain(&mut self, config: &TerrainConfig) -> Result<(), SimError> {
        let terrain = Terrain::generate(config)?;
        log::info!(
            "Terrain regenerated: {} points over [{}, {}]",
            terrain.points().len(),
            terrain.bounds().min_x,
            terrain.bounds().max_x
        );
        self.terrain = Some(terrain);
        Ok(())
    }

    /// Ground height for harpoon collision at `x`, with the no-terrain fallback
    pub(crate) fn ground_height_at(&mut self, x: f32) -> f32 {
        match &self.terrain {
            Some(t) => t.surface_height_at(x),
            None => {
                self.warn_no_terrain();
                self.tuning.fallback_ground_y
            }
        }
    }

    /// Terrain height for balloon collision at `x`, with the no-terrain fallback
    pub(crate) fn terrain_height_at(&mut self, x: f32) -> f32 {
        match &self.terrain {
            Some(t) => t.height_at(x),
            None => {
                self.warn_no_terrain();
                self.tuning.fallback_ground_y
            }
        }
    }

    fn warn_no_terrain(&mut self) {
        if !self.warned_no_terrain {
            log::warn!(
                "No terrain wired; using flat ground at y={}",
                self.tuning.fallback_ground_y
            );
            self.warned_no_terrain = true;
        }
    }

    /// Inverse mass with the degenerate-mass guard (zero = immovable)
    pub(crate) fn inv_mass(&mut self, mass: f32) -> f32 {
        if mass > f32::EPSILON {
            1.0 / mass
        } else {
            if !self.warned_degenerate_mass {
                log::warn!("Degenerate mass treated as immovable");
                self.warned_degenerate_mass = true;
            }
            0.0
        }
    }

    /// Add a body to the world. Rejects non-positive radius or mass.
    pub fn add_body(&mut self, spec: NewBody) -> Result<u32, SimError> {
        if !(spec.radius > 0.0) {
            let reason = format!("radius {} must be positive", spec.radius);
            log::warn!("Rejected spawn: {reason}");
            return Err(SimError::InvalidBody { reason });
        }
        if !(spec.mass > 0.0) {
            let reason = format!("mass {} must be positive", spec.mass);
            log::warn!("Rejected spawn: {reason}");
            return Err(SimError::InvalidBody { reason });
        }

        let id = self.next_entity_id();
        let kind = spec.kind;
        let body = Body::from_spec(id, spec);

        // Monotone ids keep each vector sorted by construction
        match kind {
            BodyKind::Harpoon => self.harpoons.push(body),
            BodyKind::Balloon => self.balloons.push(body),
        }
        Ok(id)
    }

    /// Remove a body by id. Idempotent; returns whether anything was removed.
    pub fn remove_body(&mut self, id: u32) -> bool {
        let before = self.harpoons.len() + self.balloons.len();
        self.harpoons.retain(|b| b.id != id);
        self.balloons.retain(|b| b.id != id);
        let removed = self.harpoons.len() + self.balloons.len() != before;

        if removed {
            // A removed balloon's id must not linger in harpoon memos
            for harpoon in &mut self.harpoons {
                harpoon.struck.retain(|&hit| hit != id);
            }
        }
        removed
    }

    /// Ordered read-only snapshot of one kind, for spawners and presenters
    pub fn bodies_of_kind(&self, kind: BodyKind) -> &[Body] {
        match kind {
            BodyKind::Harpoon => &self.harpoons,
            BodyKind::Balloon => &self.balloons,
        }
    }
}

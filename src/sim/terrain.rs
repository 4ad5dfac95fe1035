//! Procedural valley terrain
//!
//! A 1-D height-field polyline plus a derived ground-collision line.
//! Physics queries interpolate the polyline every tick, so the profile is
//! immutable once generated; regeneration builds a full replacement.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::noise;
use super::state::SimError;
use crate::consts::{MIN_RESOLUTION, NORMAL_SAMPLE_EPS};

/// Axis-aligned bounds of the active profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

/// How the height-field is generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenStrategy {
    /// Explicit segments: flat shoulders, lerped slopes, flat valley floor
    Valley {
        /// Shoulder height
        base_y: f32,
        /// How far the valley floor sits below the shoulders
        depth: f32,
        /// Fraction of the sample budget spent on the floor (clamped 0.05..0.7)
        valley_fraction: f32,
        /// Samples on each slope
        slope_points: usize,
    },
    /// Octave noise with a flat launcher pad at the left edge
    Ridged {
        base_y: f32,
        amplitude: f32,
        frequency: f32,
        octaves: u32,
        /// Leading samples forced flat for the launcher to stand on
        pad_points: usize,
        pad_y: f32,
    },
}

/// Terrain generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    pub min_x: f32,
    pub max_x: f32,
    /// Requested sample count; clamped up to `MIN_RESOLUTION`
    pub resolution: usize,
    /// Vertical bias of the ground-collision line above the profile
    pub surface_offset: f32,
    /// X-shift applied to surface points at sharp elevation changes
    pub overhang_shift: f32,
    /// Step change in elevation that counts as sharp
    pub sharp_angle_threshold: f32,
    pub seed: u64,
    pub strategy: GenStrategy,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            min_x: -10.0,
            max_x: 10.0,
            resolution: 24,
            surface_offset: 1.0,
            overhang_shift: 0.2,
            sharp_angle_threshold: 1.0,
            seed: 0,
            strategy: GenStrategy::Valley {
                base_y: -4.0,
                depth: 1.0,
                valley_fraction: 0.3,
                slope_points: 3,
            },
        }
    }
}

/// The active height-field profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    /// Raw profile samples, strictly increasing x
    points: Vec<Vec2>,
    /// Ground-collision line: profile offset upward, x-shifted at sharp steps
    surface: Vec<Vec2>,
    bounds: Bounds,
}

impl Terrain {
    /// Build a profile from a config. Deterministic for a given config+seed.
    pub fn generate(config: &TerrainConfig) -> Result<Self, SimError> {
        validate(config)?;

        let resolution = config.resolution.max(MIN_RESOLUTION);
        let mut rng = Pcg32::seed_from_u64(config.seed);

        let points = match config.strategy {
            GenStrategy::Valley {
                base_y,
                depth,
                valley_fraction,
                slope_points,
            } => valley_points(
                config.min_x,
                config.max_x,
                resolution,
                base_y,
                depth,
                valley_fraction,
                slope_points,
                &mut rng,
            ),
            GenStrategy::Ridged {
                base_y,
                amplitude,
                frequency,
                octaves,
                pad_points,
                pad_y,
            } => ridged_points(
                config.min_x,
                config.max_x,
                resolution,
                base_y,
                amplitude,
                frequency,
                octaves,
                pad_points,
                pad_y,
                &mut rng,
            ),
        };

        let surface = derive_surface(
            &points,
            config.surface_offset,
            config.overhang_shift,
            config.sharp_angle_threshold,
        );
        let bounds = compute_bounds(&points);

        Ok(Self {
            points,
            surface,
            bounds,
        })
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn surface(&self) -> &[Vec2] {
        &self.surface
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Profile height at `x`: piecewise-linear, clamped to the edge samples
    pub fn height_at(&self, x: f32) -> f32 {
        interpolate(&self.points, x)
    }

    /// Ground-collision line height at `x` (what harpoons stick into)
    pub fn surface_height_at(&self, x: f32) -> f32 {
        interpolate(&self.surface, x)
    }

    /// Surface normal at `x`, estimated by finite differences
    pub fn normal_at(&self, x: f32) -> Vec2 {
        let left = self.height_at(x - NORMAL_SAMPLE_EPS);
        let right = self.height_at(x + NORMAL_SAMPLE_EPS);
        let slope = Vec2::new(2.0 * NORMAL_SAMPLE_EPS, right - left);
        Vec2::new(-slope.y, slope.x).normalize_or(Vec2::Y)
    }

    /// Nearest profile sample to `pos` (brute force; the profile is small)
    pub fn closest_point(&self, pos: Vec2) -> Vec2 {
        let mut closest = self.points[0];
        let mut best = pos.distance_squared(closest);
        for &p in &self.points[1..] {
            let d = pos.distance_squared(p);
            if d < best {
                best = d;
                closest = p;
            }
        }
        closest
    }

    /// True when both one-sided slopes at `x` stay below `threshold`.
    ///
    /// Used to classify valley-floor zones suitable for balloon spawns.
    pub fn is_low_slope(&self, x: f32, eps: f32, threshold: f32) -> bool {
        let here = self.height_at(x);
        let left = (here - self.height_at(x - eps)) / eps;
        let right = (self.height_at(x + eps) - here) / eps;
        left.abs().max(right.abs()) < threshold
    }
}

fn validate(config: &TerrainConfig) -> Result<(), SimError> {
    if !(config.min_x < config.max_x) {
        return Err(SimError::InvalidTerrain {
            reason: format!("span [{}, {}] is empty", config.min_x, config.max_x),
        });
    }

    let mut params = vec![
        config.min_x,
        config.max_x,
        config.surface_offset,
        config.overhang_shift,
        config.sharp_angle_threshold,
    ];
    match config.strategy {
        GenStrategy::Valley {
            base_y,
            depth,
            valley_fraction,
            ..
        } => params.extend([base_y, depth, valley_fraction]),
        GenStrategy::Ridged {
            base_y,
            amplitude,
            frequency,
            pad_y,
            ..
        } => params.extend([base_y, amplitude, frequency, pad_y]),
    }
    if params.iter().any(|p| !p.is_finite()) {
        return Err(SimError::InvalidTerrain {
            reason: "non-finite parameter".into(),
        });
    }
    Ok(())
}

/// Flat shoulder, descent, valley floor, ascent, flat shoulder.
///
/// The seed perturbs depth and floor length a little so regeneration varies.
#[allow(clippy::too_many_arguments)]
fn valley_points(
    min_x: f32,
    max_x: f32,
    resolution: usize,
    base_y: f32,
    depth: f32,
    valley_fraction: f32,
    slope_points: usize,
    rng: &mut Pcg32,
) -> Vec<Vec2> {
    let depth = depth * rng.random_range(0.9..1.1f32);
    let fraction = (valley_fraction * rng.random_range(0.9..1.1f32)).clamp(0.05, 0.7);
    let low_y = base_y - depth;

    let flat_len = resolution / 4;
    let slope_len = slope_points.max(2);
    let valley_len = (resolution as f32 * fraction).round() as usize;
    let total = flat_len * 2 + slope_len * 2 + valley_len;
    let spacing = (max_x - min_x) / (total - 1) as f32;

    let mut points = Vec::with_capacity(total);
    let x_at = |index: usize| min_x + index as f32 * spacing;

    for _ in 0..flat_len {
        points.push(Vec2::new(x_at(points.len()), base_y));
    }
    for i in 0..slope_len {
        let t = i as f32 / (slope_len - 1) as f32;
        let y = base_y + (low_y - base_y) * t;
        points.push(Vec2::new(x_at(points.len()), y));
    }
    for _ in 0..valley_len {
        points.push(Vec2::new(x_at(points.len()), low_y));
    }
    for i in 0..slope_len {
        let t = i as f32 / (slope_len - 1) as f32;
        let y = low_y + (base_y - low_y) * t;
        points.push(Vec2::new(x_at(points.len()), y));
    }
    for _ in 0..flat_len {
        points.push(Vec2::new(x_at(points.len()), base_y));
    }

    points
}

/// Noise heightfield with a flat launcher pad on the left.
#[allow(clippy::too_many_arguments)]
fn ridged_points(
    min_x: f32,
    max_x: f32,
    resolution: usize,
    base_y: f32,
    amplitude: f32,
    frequency: f32,
    octaves: u32,
    pad_points: usize,
    pad_y: f32,
    rng: &mut Pcg32,
) -> Vec<Vec2> {
    let phase: f32 = rng.random_range(0.0..1000.0);
    let channel: f32 = rng.random_range(0.0..100.0);
    let spacing = (max_x - min_x) / (resolution - 1) as f32;

    (0..resolution)
        .map(|i| {
            let x = min_x + i as f32 * spacing;
            let y = if i < pad_points {
                pad_y
            } else {
                let n = noise::fbm(x * frequency + phase, channel, octaves.max(1));
                base_y + (n - 0.5) * 2.0 * amplitude
            };
            Vec2::new(x, y)
        })
        .collect()
}

/// Offset the profile upward; shift x at sharp steps so steep transitions
/// read as overhangs instead of smeared slopes.
fn derive_surface(points: &[Vec2], offset: f32, shift: f32, sharp_threshold: f32) -> Vec<Vec2> {
    let n = points.len();
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut x_offset = 0.0;
            if i > 0 && i < n - 1 {
                let mut delta_y = points[i].y - points[i - 1].y;
                if delta_y == 0.0 {
                    delta_y = points[i + 1].y - points[i].y;
                }
                if delta_y.abs() > sharp_threshold {
                    // Sharp descent juts forward, sharp ascent tucks back
                    x_offset = if delta_y < 0.0 { shift } else { -shift };
                }
            }
            Vec2::new(p.x + x_offset, p.y + offset)
        })
        .collect()
}

fn compute_bounds(points: &[Vec2]) -> Bounds {
    let mut bounds = Bounds {
        min_x: points[0].x,
        max_x: points[0].x,
        min_y: points[0].y,
        max_y: points[0].y,
    };
    for p in points {
        bounds.min_x = bounds.min_x.min(p.x);
        bounds.max_x = bounds.max_x.max(p.x);
        bounds.min_y = bounds.min_y.min(p.y);
        bounds.max_y = bounds.max_y.max(p.y);
    }
    bounds
}

/// Piecewise-linear interpolation; x outside the span clamps to the edge y
fn interpolate(points: &[Vec2], x: f32) -> f32 {
    for pair in points.windows(2) {
        if x >= pair[0].x && x <= pair[1].x {
            let t = (x - pair[0].x) / (pair[1].x - pair[0].x);
            return pair[0].y + (pair[1].y - pair[0].y) * t;
        }
    }
    if x < points[0].x {
        points[0].y
    } else {
        points[points.len() - 1].y
    }
}

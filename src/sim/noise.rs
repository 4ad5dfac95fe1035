//! Hash-based value noise
//!
//! Smooth pseudo-random signals without touching the RNG stream: balloon
//! wobble and the ridged terrain strategy both sample these, so replays
//! stay identical as long as ids and seeds do.

/// Hash a 1D lattice coordinate (plus a seed channel) to [0, 1)
#[inline]
pub fn hash_01(x: f32, seed: f32) -> f32 {
    let n = (x * 127.1 + seed * 311.7).sin() * 43758.5453;
    n.fract().abs()
}

/// Smoothstep interpolation
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// 1D value noise in [0, 1): smoothstep-blended lattice hashes
pub fn value_noise(x: f32, seed: f32) -> f32 {
    let ix = x.floor();
    let fx = x - ix;

    let v0 = hash_01(ix, seed);
    let v1 = hash_01(ix + 1.0, seed);

    v0 + (v1 - v0) * smoothstep(fx)
}

/// Octave-summed value noise in [0, 1)
pub fn fbm(x: f32, seed: f32, octaves: u32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        value += amplitude * value_noise(x * frequency, seed);
        max_value += amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }

    value / max_value
}

/// Integer-pair hash to [0, 1), for per-tick jitter keyed by (id, tick)
#[inline]
pub fn hash_pair(a: u32, b: u32) -> f32 {
    let h = a
        .wrapping_mul(2654435761)
        .wrapping_add(b.wrapping_mul(40503))
        .wrapping_mul(2654435761);
    (h >> 8) as f32 / (1u32 << 24) as f32
}

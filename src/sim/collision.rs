//! Collision detection and response for circle bodies
//!
//! Detection produces a `CollisionResult` with the contact normal and
//! penetration depth; response splits into the soft balloon-to-balloon
//! resolver and plain reflection for terrain bounces.

use glam::Vec2;

use super::state::Body;
use crate::consts::SPEED_EPS;
use crate::{perp, Tuning};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Collision point (if hit)
    pub point: Vec2,
    /// Contact normal pointing from the first body toward the second
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between two circles.
///
/// The normal points from `a` toward `b`; coincident centers fall back to
/// straight up so the resolver always has a direction to separate along.
pub fn circle_circle(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> CollisionResult {
    let delta = pos_b - pos_a;
    let dist = delta.length();
    let reach = radius_a + radius_b;

    if dist >= reach {
        return CollisionResult::miss();
    }

    let normal = if dist > SPEED_EPS {
        delta / dist
    } else {
        Vec2::Y
    };

    CollisionResult {
        hit: true,
        point: pos_a + normal * radius_a,
        normal,
        penetration: reach - dist,
    }
}

/// Reflect a velocity vector off a surface with the given normal
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// True when the projectile is driving into the target hard enough to pop it
/// rather than graze it.
pub fn is_direct_hit(projectile_vel: Vec2, contact_normal: Vec2, threshold: f32) -> bool {
    projectile_vel.dot(contact_normal) >= threshold
}

/// Resolve a balloon-balloon contact in place.
///
/// Separation is soft (fractional, split evenly) so clustered balloons squash
/// instead of teleporting apart. The impulse skips separating pairs and
/// immovable-vs-immovable pairs. Velocities then pick up friction along the
/// tangent, per-axis damping, and counter-rotating spin from the graze speed.
pub fn resolve_balloon_pair(
    a: &mut Body,
    b: &mut Body,
    contact: &CollisionResult,
    inv_mass_a: f32,
    inv_mass_b: f32,
    tuning: &Tuning,
) {
    let normal = contact.normal;

    let shift = normal * (contact.penetration * tuning.soft_body_elasticity * 0.5);
    a.pos -= shift;
    b.pos += shift;

    let rel = b.vel - a.vel;
    let approach = rel.dot(normal);
    if approach >= 0.0 {
        return;
    }

    let inv_sum = inv_mass_a + inv_mass_b;
    if inv_sum <= 0.0 {
        return;
    }

    let impulse = -(1.0 + tuning.restitution) * approach / inv_sum;
    a.vel -= normal * (impulse * inv_mass_a);
    b.vel += normal * (impulse * inv_mass_b);

    let rel = b.vel - a.vel;
    let tangent = rel - normal * rel.dot(normal);
    if tangent.length() > SPEED_EPS {
        let tangent_dir = tangent.normalize();
        let drag = rel.dot(tangent_dir) * tuning.balloon_collision_friction;
        a.vel += tangent_dir * (drag * inv_mass_a);
        b.vel -= tangent_dir * (drag * inv_mass_b);
    }

    a.vel.x *= tuning.balloon_collision_x_decay;
    b.vel.x *= tuning.balloon_collision_x_decay;
    a.vel.y *= tuning.balloon_collision_y_decay;
    b.vel.y *= tuning.balloon_collision_y_decay;

    let graze = (a.vel - b.vel).dot(perp(normal));
    a.angular_vel += graze * tuning.balloon_torque_factor;
    b.angular_vel -= graze * tuning.balloon_torque_factor;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::NewBody;
    use proptest::prelude::*;

    fn balloon_at(pos: Vec2, vel: Vec2) -> Body {
        let mut spec = NewBody::balloon(pos);
        spec.vel = vel;
        Body::from_spec(1, spec)
    }

    fn pair(ax: f32, avx: f32, bx: f32, bvx: f32) -> (Body, Body) {
        (
            balloon_at(Vec2::new(ax, 0.0), Vec2::new(avx, 0.0)),
            balloon_at(Vec2::new(bx, 0.0), Vec2::new(bvx, 0.0)),
        )
    }

    /// Tuning that isolates the impulse: no separation, friction, decay, spin
    fn impulse_only() -> Tuning {
        Tuning {
            restitution: 1.0,
            soft_body_elasticity: 0.0,
            balloon_collision_friction: 0.0,
            balloon_collision_x_decay: 1.0,
            balloon_collision_y_decay: 1.0,
            balloon_torque_factor: 0.0,
            ..Tuning::default()
        }
    }

    #[test]
    fn test_circle_overlap_hit() {
        let result = circle_circle(Vec2::ZERO, 0.5, Vec2::new(0.8, 0.0), 0.5);
        assert!(result.hit);
        assert!((result.penetration - 0.2).abs() < 1e-5);
        assert!((result.normal - Vec2::X).length() < 1e-5);
        assert!((result.point - Vec2::new(0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_circle_touching_is_miss() {
        let result = circle_circle(Vec2::ZERO, 0.5, Vec2::new(1.0, 0.0), 0.5);
        assert!(!result.hit);
        let result = circle_circle(Vec2::ZERO, 0.5, Vec2::new(3.0, 0.0), 0.5);
        assert!(!result.hit);
    }

    #[test]
    fn test_coincident_centers_use_up_normal() {
        let result = circle_circle(Vec2::ZERO, 0.5, Vec2::ZERO, 0.5);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_reflect_velocity() {
        let velocity = Vec2::new(1.0, -1.0);
        let normal = Vec2::new(0.0, 1.0);
        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected - Vec2::new(1.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_direct_hit_threshold_inclusive() {
        let normal = Vec2::X;
        assert!(is_direct_hit(Vec2::new(6.0, 0.0), normal, 6.0));
        assert!(is_direct_hit(Vec2::new(9.0, 0.0), normal, 6.0));
        assert!(!is_direct_hit(Vec2::new(5.9, 0.0), normal, 6.0));
        assert!(!is_direct_hit(Vec2::new(0.0, 8.0), normal, 6.0));
    }

    #[test]
    fn test_head_on_equal_mass_exchanges_velocities() {
        let (mut a, mut b) = pair(-0.4, 2.0, 0.4, -1.0);
        let contact = circle_circle(a.pos, a.radius, b.pos, b.radius);
        assert!(contact.hit);

        resolve_balloon_pair(&mut a, &mut b, &contact, 1.0, 1.0, &impulse_only());

        assert!((a.vel.x - -1.0).abs() < 1e-4);
        assert!((b.vel.x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_separating_pair_keeps_velocities() {
        let (mut a, mut b) = pair(-0.4, -1.0, 0.4, 1.0);
        let contact = circle_circle(a.pos, a.radius, b.pos, b.radius);
        assert!(contact.hit);

        resolve_balloon_pair(&mut a, &mut b, &contact, 1.0, 1.0, &impulse_only());

        assert_eq!(a.vel, Vec2::new(-1.0, 0.0));
        assert_eq!(b.vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_immovable_body_absorbs_nothing() {
        let (mut a, mut b) = pair(-0.4, 1.0, 0.4, 0.0);
        let contact = circle_circle(a.pos, a.radius, b.pos, b.radius);

        // b has degenerate mass: inv mass 0 keeps it pinned
        resolve_balloon_pair(&mut a, &mut b, &contact, 1.0, 0.0, &impulse_only());

        assert_eq!(b.vel, Vec2::ZERO);
        assert!((a.vel.x - -1.0).abs() < 1e-4, "full bounce off a wall");
    }

    #[test]
    fn test_soft_separation_splits_evenly() {
        let (mut a, mut b) = pair(-0.4, 0.0, 0.4, 0.0);
        let contact = circle_circle(a.pos, a.radius, b.pos, b.radius);
        let tuning = Tuning {
            soft_body_elasticity: 0.5,
            ..impulse_only()
        };

        resolve_balloon_pair(&mut a, &mut b, &contact, 1.0, 1.0, &tuning);

        // penetration 0.2, elasticity 0.5: each center moves 0.05 apart
        assert!((a.pos.x - -0.45).abs() < 1e-5);
        assert!((b.pos.x - 0.45).abs() < 1e-5);
    }

    #[test]
    fn test_friction_drags_each_body_at_full_strength() {
        let mut a = balloon_at(Vec2::new(-0.4, 0.0), Vec2::new(1.0, 1.0));
        let mut b = balloon_at(Vec2::new(0.4, 0.0), Vec2::new(-1.0, -1.0));
        let contact = circle_circle(a.pos, a.radius, b.pos, b.radius);
        let tuning = Tuning {
            balloon_collision_friction: 0.25,
            ..impulse_only()
        };

        resolve_balloon_pair(&mut a, &mut b, &contact, 1.0, 1.0, &tuning);

        // Post-impulse tangential slide is 2; each body sheds the full
        // 0.25 * 2 = 0.5 impulse, leaving vy at half strength
        assert!((a.vel.y - 0.5).abs() < 1e-5);
        assert!((b.vel.y - -0.5).abs() < 1e-5);
        assert!((a.vel.x - -1.0).abs() < 1e-5);
        assert!((b.vel.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_graze_spins_pair_in_opposite_directions() {
        let mut a = balloon_at(Vec2::new(-0.4, 0.0), Vec2::new(0.5, 2.0));
        let mut b = balloon_at(Vec2::new(0.4, 0.0), Vec2::new(-0.5, -2.0));
        let contact = circle_circle(a.pos, a.radius, b.pos, b.radius);
        let tuning = Tuning {
            balloon_torque_factor: 5.0,
            ..impulse_only()
        };

        resolve_balloon_pair(&mut a, &mut b, &contact, 1.0, 1.0, &tuning);

        assert!(a.angular_vel != 0.0);
        assert!((a.angular_vel + b.angular_vel).abs() < 1e-4, "spins cancel");
    }

    proptest! {
        /// Equal-mass elastic impulses conserve momentum along the normal
        #[test]
        fn prop_impulse_conserves_momentum(avx in -5.0f32..5.0, bvx in -5.0f32..5.0) {
            let (mut a, mut b) = pair(-0.4, avx, 0.4, bvx);
            let contact = circle_circle(a.pos, a.radius, b.pos, b.radius);
            let before = a.vel.x + b.vel.x;

            resolve_balloon_pair(&mut a, &mut b, &contact, 1.0, 1.0, &impulse_only());

            prop_assert!((a.vel.x + b.vel.x - before).abs() < 1e-3);
        }

        /// Resolution never leaves the pair approaching faster than before
        #[test]
        fn prop_resolution_reduces_approach(avx in 0.1f32..5.0, bvx in -5.0f32..-0.1) {
            let (mut a, mut b) = pair(-0.4, avx, 0.4, bvx);
            let contact = circle_circle(a.pos, a.radius, b.pos, b.radius);
            let approach_before = (b.vel - a.vel).dot(contact.normal);

            resolve_balloon_pair(&mut a, &mut b, &contact, 1.0, 1.0, &Tuning::default());

            let approach_after = (b.vel - a.vel).dot(contact.normal);
            prop_assert!(approach_after > approach_before);
        }
    }
}

//! Fixed timestep simulation tick
//!
//! Core loop that advances the world deterministically. The six phases run
//! in a fixed order every tick: harpoon integration, balloon integration,
//! balloon-balloon resolution, harpoon-balloon resolution, the destruction
//! sweep, and off-screen culling. Events come back in detection order.

use glam::Vec2;

use super::collision;
use super::noise;
use super::state::{BodyKind, World, WorldEvent};
use crate::consts::{SIM_DT, SPEED_EPS};
use crate::{cross, heading_deg};

/// Advance the world by one fixed timestep and collect the tick's events.
///
/// Bodies are visited in id order inside every phase, so two worlds built
/// identically stay bit-identical tick after tick.
pub fn tick(world: &mut World, dt: f32) -> Vec<WorldEvent> {
    let mut events = Vec::new();
    let tuning = world.tuning.clone();
    let time_secs = world.time_ticks as f32 * SIM_DT;
    let tick_index = world.time_ticks as u32;
    let wobble_channel = (world.seed % 997) as f32;

    // Harpoon integration: ballistic flight, facing the flight direction.
    // Anything at or below the ground line sticks and is swept this tick.
    for i in 0..world.harpoons.len() {
        let landing_x = {
            let h = &mut world.harpoons[i];
            h.prev_pos = h.pos;
            h.vel.y += tuning.gravity * dt;
            h.pos += h.vel * dt;
            if h.vel.length() > SPEED_EPS {
                h.rotation = heading_deg(h.vel);
            }
            h.pos.x
        };
        let ground_y = world.ground_height_at(landing_x);
        let h = &mut world.harpoons[i];
        if h.pos.y <= ground_y {
            h.pending_destroy = true;
        }
    }

    // Balloon integration: wobble and jitter perturb the drift, air
    // resistance bleeds it off, buoyancy pulls the climb rate back into
    // its band, then terrain contact and the upright spring.
    for i in 0..world.balloons.len() {
        let probe = {
            let b = &mut world.balloons[i];
            b.prev_pos = b.pos;

            let phase = time_secs * tuning.balloon_oscillation_speed + b.id as f32 * 0.1;
            let wobble = (noise::value_noise(phase, wobble_channel) - 0.5)
                * tuning.balloon_oscillation_amplitude;
            b.vel.x += wobble;

            if b.jitter > 0.0 {
                let swing = noise::hash_pair(b.id, tick_index) * 2.0 - 1.0;
                b.vel.x += swing * b.jitter * dt;
            }

            b.vel.x *= 1.0 - tuning.balloon_air_resistance * dt;
            b.pos += b.vel * dt;

            if b.vel.y < tuning.min_upward_velocity {
                b.vel.y =
                    (b.vel.y + tuning.float_recovery_rate * dt).min(tuning.min_upward_velocity);
            }
            if b.vel.y > tuning.max_float_velocity {
                b.vel.y = tuning.max_float_velocity;
            }
            b.pos
        };

        let ground_y = world.terrain_height_at(probe.x);
        let (normal, closest) = match world.terrain() {
            Some(t) => (t.normal_at(probe.x), Some(t.closest_point(probe))),
            None => (Vec2::Y, None),
        };

        let b = &mut world.balloons[i];
        if b.pos.y - b.radius <= ground_y {
            if b.behaviors.bounce {
                b.vel = collision::reflect_velocity(b.vel, normal);
            } else if b.behaviors.stop {
                b.vel = Vec2::ZERO;
            }
            b.pos.y = ground_y + b.radius;
        }

        // A balloon driven deep into the profile gets pushed back out
        if let Some(closest) = closest {
            let delta = b.pos - closest;
            if delta.length() < b.radius * 0.5 {
                let dir = delta.normalize_or(Vec2::Y);
                b.pos = closest + dir * b.radius;
                b.vel = collision::reflect_velocity(b.vel, dir) * 0.5;
            }
        }

        b.angular_vel *= 1.0 - tuning.rotation_drag * dt;
        b.angular_vel = b
            .angular_vel
            .clamp(-tuning.max_angular_speed, tuning.max_angular_speed);
        b.angular_vel += -b.rotation * tuning.rotation_recovery * dt;
        b.rotation += b.angular_vel * dt;
    }

    // Balloon-balloon contacts, each unordered pair once in id order
    for i in 0..world.balloons.len() {
        for j in (i + 1)..world.balloons.len() {
            let (pos_a, radius_a, mass_a) = {
                let b = &world.balloons[i];
                (b.pos, b.radius, b.mass)
            };
            let (pos_b, radius_b, mass_b) = {
                let b = &world.balloons[j];
                (b.pos, b.radius, b.mass)
            };
            let contact = collision::circle_circle(pos_a, radius_a, pos_b, radius_b);
            if !contact.hit {
                continue;
            }

            let inv_a = world.inv_mass(mass_a);
            let inv_b = world.inv_mass(mass_b);
            let (head, tail) = world.balloons.split_at_mut(j);
            collision::resolve_balloon_pair(
                &mut head[i],
                &mut tail[0],
                &contact,
                inv_a,
                inv_b,
                &tuning,
            );
        }
    }

    // Harpoon-balloon contacts. The memo makes each pairing fire once for
    // the life of the overlap: recorded on first contact, consulted forever
    // after, scrubbed when either side leaves the world.
    for hi in 0..world.harpoons.len() {
        if world.harpoons[hi].pending_destroy {
            continue;
        }
        for bi in 0..world.balloons.len() {
            if world.balloons[bi].pending_destroy {
                continue;
            }
            let (h_pos, h_radius, h_vel, h_id) = {
                let h = &world.harpoons[hi];
                (h.pos, h.radius, h.vel, h.id)
            };
            let (b_pos, b_radius, b_id) = {
                let b = &world.balloons[bi];
                (b.pos, b.radius, b.id)
            };
            let contact = collision::circle_circle(h_pos, h_radius, b_pos, b_radius);
            if !contact.hit {
                continue;
            }
            if world.harpoons[hi].struck.contains(&b_id) {
                continue;
            }
            world.harpoons[hi].struck.push(b_id);

            let direct =
                collision::is_direct_hit(h_vel, contact.normal, tuning.tangential_threshold);
            let balloon = &mut world.balloons[bi];

            if direct && balloon.behaviors.destroy {
                balloon.pending_destroy = true;
                let pos = balloon.pos;
                let visual = balloon.visual;
                world.score += 1;
                log::debug!("Harpoon {h_id} popped balloon {b_id}, score {}", world.score);
                events.push(WorldEvent::ScoreChanged { score: world.score });
                events.push(WorldEvent::BalloonPopped {
                    id: b_id,
                    pos,
                    visual,
                });
                events.push(WorldEvent::RespawnRequested);
            } else if direct && balloon.behaviors.stop {
                balloon.vel = Vec2::ZERO;
            } else if balloon.behaviors.push {
                balloon.vel += h_vel * tuning.rigid_impulse_strength;
                let spin = cross(h_vel, Vec2::Y).signum() * h_vel.length()
                    * tuning.balloon_torque_factor;
                balloon.angular_vel += spin;

                // Glancing contact must not stall the harpoon mid-air
                let harpoon = &mut world.harpoons[hi];
                let speed = harpoon.vel.length();
                if speed > SPEED_EPS && speed < tuning.harpoon_carry_speed_floor {
                    harpoon.vel *= tuning.harpoon_carry_speed_floor / speed;
                }
                events.push(WorldEvent::TangentialHit {
                    harpoon: h_id,
                    balloon: b_id,
                });
            }
        }
    }

    sweep_destroyed(world, &mut events);

    // Off-screen culling applies to balloons only; harpoons always come
    // back down to the ground line on their own.
    let vp = tuning.viewport;
    for b in &mut world.balloons {
        if b.pos.y > vp.top_y || b.pos.x < vp.min_x || b.pos.x > vp.max_x {
            b.pending_destroy = true;
        }
    }
    sweep_destroyed(world, &mut events);

    world.time_ticks += 1;
    events
}

/// Remove every body flagged for destruction, announcing each removal so
/// collaborators can release the visual, and scrub dead balloon ids out of
/// the surviving harpoons' contact memos.
fn sweep_destroyed(world: &mut World, events: &mut Vec<WorldEvent>) {
    let mut removed_balloons: Vec<u32> = Vec::new();

    world.harpoons.retain(|h| {
        if h.pending_destroy {
            events.push(WorldEvent::BodyRemoved {
                id: h.id,
                kind: BodyKind::Harpoon,
                visual: h.visual,
            });
            false
        } else {
            true
        }
    });
    world.balloons.retain(|b| {
        if b.pending_destroy {
            events.push(WorldEvent::BodyRemoved {
                id: b.id,
                kind: BodyKind::Balloon,
                visual: b.visual,
            });
            removed_balloons.push(b.id);
            false
        } else {
            true
        }
    });

    if !removed_balloons.is_empty() {
        for h in &mut world.harpoons {
            h.struck.retain(|id| !removed_balloons.contains(id));
        }
    }
}

impl World {
    /// Method form of [`tick`]
    pub fn tick(&mut self, dt: f32) -> Vec<WorldEvent> {
        tick(self, dt)
    }
}

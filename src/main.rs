//! Skypop entry point
//!
//! Native demo: builds a valley, wires a spawner and launcher to the physics
//! world, and runs a short scripted session, logging what happens.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("Session failed: {err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is wasm-clean; the demo session is native only
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use skypop::consts::SIM_DT;
    use skypop::sim::{
        tick, GenStrategy, LaunchConfig, Launcher, SpawnConfig, Spawner, TerrainConfig, World,
        WorldEvent,
    };
    use skypop::Tuning;

    log::info!("Skypop (native) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => Tuning::load_or_default(std::path::Path::new(&path)),
        None => Tuning::default(),
    };

    // Fixed seed keeps demo runs comparable
    let seed = 2024u64;
    let mut world = World::new(seed, tuning);
    world.regenerate_terrain(&TerrainConfig {
        seed,
        ..TerrainConfig::default()
    })?;

    let mut spawner = Spawner::new(SpawnConfig::default(), seed);
    let launcher = Launcher::new(launch_origin(&world), LaunchConfig::default());

    // Fire plan: tick to fire on, aim angle, trigger hold time
    let shots: [(u64, f32, f32); 4] = [
        (120, 60.0, 0.6),
        (300, 35.0, 1.2),
        (480, 80.0, 2.0),
        (660, 45.0, 0.9),
    ];

    let preview = launcher.preview(shots[0].1, launcher.config.charge(shots[0].2), world.tuning.gravity);
    if let Some(apex) = preview.iter().max_by(|a, b| a.y.total_cmp(&b.y)) {
        log::info!("First shot should peak near ({:.1}, {:.1})", apex.x, apex.y);
    }

    for _ in 0..900 {
        spawner.update(&mut world, SIM_DT);

        if let Some(&(_, angle, held)) = shots.iter().find(|(at, ..)| *at == world.time_ticks) {
            let force = launcher.config.charge(held);
            let id = launcher.fire(&mut world, angle, force)?;
            log::info!("Fired harpoon {id} at {angle} degrees, force {force:.1}");
        }

        for event in tick(&mut world, SIM_DT) {
            match event {
                WorldEvent::ScoreChanged { score } => log::info!("Score: {score}"),
                WorldEvent::BalloonPopped { id, pos, .. } => {
                    log::info!("Pop! balloon {id} at ({:.2}, {:.2})", pos.x, pos.y);
                }
                WorldEvent::TangentialHit { harpoon, balloon } => {
                    log::info!("Harpoon {harpoon} grazed balloon {balloon}");
                }
                WorldEvent::RespawnRequested | WorldEvent::BodyRemoved { .. } => {}
            }
        }

        // Halfway through, swap the valley for a noise ridge mid-session
        if world.time_ticks == 450 {
            let ridge = TerrainConfig {
                seed: seed + 1,
                strategy: GenStrategy::Ridged {
                    base_y: -4.0,
                    amplitude: 1.2,
                    frequency: 0.4,
                    octaves: 3,
                    pad_points: 4,
                    pad_y: -3.5,
                },
                ..TerrainConfig::default()
            };
            world.regenerate_terrain(&ridge)?;
        }
    }

    log::info!(
        "Session over: score {}, {} balloons aloft",
        world.score,
        world.balloons.len()
    );
    Ok(())
}

/// Launcher stands on the left shoulder, just above the ground line
#[cfg(not(target_arch = "wasm32"))]
fn launch_origin(world: &skypop::sim::World) -> glam::Vec2 {
    match world.terrain() {
        Some(t) => glam::Vec2::new(-9.0, t.surface_height_at(-9.0) + 0.5),
        None => glam::Vec2::new(-9.0, 0.5),
    }
}

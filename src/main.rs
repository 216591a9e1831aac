//! Arcade2D - headless arcade physics runner
//!
//! Loads a scene, simulates it for the configured duration and logs where
//! every named object ended up.

use std::process::ExitCode;

use arcade2d::config::AppConfig;
use arcade2d::systems::SimulationSystem;
use arcade2d_core::{ActiveScene, Scene};

fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let template = Scene::load(&config.simulation.scene)?;
    let mut scene = ActiveScene::from_template(&template, Some(config.physics.to_world_config()))?;
    log::info!(
        "Loaded scene '{}' with {} objects",
        scene.name,
        scene.world.object_count()
    );

    let frames = config.simulation.frame_count();
    let mut simulation =
        SimulationSystem::new(config.simulation.frame_rate).with_event_logging(config.debug.log_events);
    let summary = simulation.run(&mut scene, frames)?;

    log::info!(
        "Simulated {:.2}s: {} frames, {} steps, {} collisions, {} overlaps, {} world-bounds hits",
        simulation.elapsed(),
        summary.frames,
        summary.steps,
        summary.collisions,
        summary.overlaps,
        summary.world_bounds
    );
    for (_, object) in scene.world.iter() {
        if let Some(ref name) = object.name {
            let position = object.transform.position;
            log::info!("{}: ({:.2}, {:.2})", name, position.x, position.y);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let loaded = AppConfig::load();
    let level = loaded
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Initialize logging; RUST_LOG still wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .init();
    log::info!("Starting Arcade2D");

    let config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

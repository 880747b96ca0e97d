//! Cellframe Player
//!
//! Loads a saved project and plays one of its scenes headlessly, logging
//! every frame change.
//!
//! ```text
//! cellframe-player [--config player.json] [--project <id>] [--scene <index>]
//!                  [--loop[=true|false]] [--speed <0.25..4>] [--tick-ms <ms>]
//!                  [--max-loops <n>] [--data-dir <path>]
//! cellframe-player --help
//! ```

mod config;
mod scheduler;

use cellframe_core::model::{Project, Scene};
use cellframe_core::storage::{AutoSaveManager, FileStorage, Storage, StorageError};
use cellframe_core::{Playback, PlaybackStatus, TickOutcome, Timeline};
use clap::Parser;
use config::{ConfigError, PlayerArgs, PlayerConfig};
use log::{error, info, warn};
use scheduler::IntervalScheduler;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
enum PlayerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("no saved project to play")]
    NoProject,
    #[error("project has {count} scene(s), index {index} is out of range")]
    NoScene { index: usize, count: usize },
    #[error("scene \"{0}\" has no frames")]
    EmptyScene(String),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(PlayerArgs::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: PlayerArgs) -> Result<(), PlayerError> {
    let config = PlayerConfig::from_args(args)?;
    let storage = FileStorage::new(config.projects_dir())?;
    info!("Reading projects from {}", storage.base_path().display());

    let project = load_project(storage, config.project_id.as_deref())?;
    let scene = select_scene(&project, config.scene_index)?;
    info!(
        "Playing \"{}\" / \"{}\": {} frame(s) at {} fps",
        project.name,
        scene.name,
        scene.frames.len(),
        project.frame_rate
    );
    play(&config, project.frame_rate, scene);
    Ok(())
}

fn load_project(storage: FileStorage, project_id: Option<&str>) -> Result<Project, PlayerError> {
    match project_id {
        Some(id) => Ok(pollster::block_on(storage.load(id))?),
        None => {
            let mut autosave = AutoSaveManager::new(Arc::new(storage));
            pollster::block_on(autosave.load_last(Instant::now())).ok_or(PlayerError::NoProject)
        }
    }
}

fn select_scene(project: &Project, index: usize) -> Result<&Scene, PlayerError> {
    let scene = project.scenes.get(index).ok_or(PlayerError::NoScene {
        index,
        count: project.scenes.len(),
    })?;
    if scene.frames.is_empty() {
        return Err(PlayerError::EmptyScene(scene.name.clone()));
    }
    Ok(scene)
}

fn play(config: &PlayerConfig, frame_rate: u32, scene: &Scene) {
    let total = scene.frames.len();
    let holds: Vec<u32> = scene.frames.iter().map(|f| f.duration).collect();

    let mut playback = Playback::new(
        Timeline::new(total),
        IntervalScheduler::new(config.tick_interval()),
    );
    playback.set_frame_rate(frame_rate);
    playback.set_speed(config.speed);
    playback.set_looping(config.looping);
    playback.load_frames(total, holds);

    let mut last_status = playback.state().playback_status;
    playback.subscribe(move |state| {
        if state.playback_status != last_status {
            log::debug!("Playback status {:?} -> {:?}", last_status, state.playback_status);
            last_status = state.playback_status;
        }
    });

    let started = Instant::now();
    let mut passes = 0u32;
    playback.play(started);
    info!("Frame 1/{total}");

    while let Some(generation) = playback.scheduler().wait() {
        match playback.tick(generation, Instant::now()) {
            TickOutcome::Advanced(index) => info!("Frame {}/{total}", index + 1),
            TickOutcome::Wrapped(index) => {
                passes += 1;
                info!("Loop {passes} complete, frame {}/{total}", index + 1);
                if config.max_loops.is_some_and(|max| passes >= max) {
                    playback.stop();
                }
            }
            TickOutcome::Stopped => info!("Reached the last frame"),
            TickOutcome::Waiting | TickOutcome::Stale => {}
        }
    }

    if playback.state().playback_status != PlaybackStatus::Stopped {
        warn!("Scheduler ended while playback was still active");
    }
    info!("Played for {:.2}s", started.elapsed().as_secs_f64());
}

//! Player settings from an optional JSON file and command-line options.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value {value} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Cellframe Player - play a saved scene headlessly
#[derive(Debug, Default, Parser)]
#[command(name = "cellframe-player")]
#[command(version, about, long_about = None)]
pub struct PlayerArgs {
    /// JSON file with base settings; the options below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the `projects/` folder
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Project id to play (default: the last saved project)
    #[arg(long)]
    pub project: Option<String>,

    /// Zero-based scene index
    #[arg(long)]
    pub scene: Option<usize>,

    /// Loop the scene (`--loop`, `--loop=false`)
    #[arg(long = "loop", num_args = 0..=1, default_missing_value = "true")]
    pub looping: Option<bool>,

    /// Playback speed multiplier, 0.25 to 4
    #[arg(long, value_parser = parse_speed)]
    pub speed: Option<f64>,

    /// Scheduler wake-up interval in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: Option<u64>,

    /// Stop after this many passes through a looping scene
    #[arg(long)]
    pub max_loops: Option<u32>,
}

fn parse_speed(value: &str) -> Result<f64, String> {
    let speed: f64 = value.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if speed.is_finite() {
        Ok(speed)
    } else {
        Err("speed must be a finite number".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// Directory holding the `projects/` folder.
    pub data_dir: PathBuf,
    /// Project to play. The last saved project when absent.
    pub project_id: Option<String>,
    pub scene_index: usize,
    pub looping: bool,
    pub speed: f64,
    /// How often the scheduler wakes up.
    pub tick_ms: u64,
    /// Stop after this many passes through a looping scene.
    pub max_loops: Option<u32>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            project_id: None,
            scene_index: 0,
            looping: false,
            speed: 1.0,
            tick_ms: 16,
            max_loops: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cellframe")
}

impl PlayerConfig {
    /// Defaults, then the `--config` file if given, then the remaining
    /// command-line options.
    pub fn from_args(args: PlayerArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    fn apply(&mut self, args: PlayerArgs) {
        if let Some(data_dir) = args.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(project) = args.project {
            self.project_id = Some(project);
        }
        if let Some(scene) = args.scene {
            self.scene_index = scene;
        }
        if let Some(looping) = args.looping {
            self.looping = looping;
        }
        if let Some(speed) = args.speed {
            self.speed = speed;
        }
        if let Some(tick_ms) = args.tick_ms {
            self.tick_ms = tick_ms;
        }
        if args.max_loops.is_some() {
            self.max_loops = args.max_loops;
        }
    }

    /// Values from a config file skip the argument parsers, so check them here.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.speed.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "speed",
                value: self.speed.to_string(),
            });
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tickMs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use tempfile::TempDir;

    fn parse(list: &[&str]) -> Result<PlayerArgs, clap::Error> {
        PlayerArgs::try_parse_from(std::iter::once("cellframe-player").chain(list.iter().copied()))
    }

    fn config(list: &[&str]) -> PlayerConfig {
        PlayerConfig::from_args(parse(list).unwrap()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.tick_ms, 16);
        assert!(!config.looping);
        assert!(config.data_dir.ends_with("cellframe"));
        assert!(config.projects_dir().ends_with("cellframe/projects"));
    }

    #[test]
    fn test_args_override() {
        let config = config(&[
            "--project", "abc", "--scene", "2", "--loop", "true", "--speed", "1.5",
        ]);
        assert_eq!(config.project_id.as_deref(), Some("abc"));
        assert_eq!(config.scene_index, 2);
        assert!(config.looping);
        assert!((config.speed - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_equals_form_and_bare_loop() {
        let config = config(&["--speed=2", "--loop", "--max-loops=3"]);
        assert!((config.speed - 2.0).abs() < f64::EPSILON);
        assert!(config.looping);
        assert_eq!(config.max_loops, Some(3));

        let config = self::config(&["--loop=false"]);
        assert!(!config.looping);
    }

    #[test]
    fn test_file_then_args() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("player.json");
        std::fs::write(&path, r#"{"dataDir":"/tmp/frames","tickMs":40,"looping":true}"#).unwrap();

        let config = config(&["--config", path.to_str().unwrap(), "--tick-ms", "20"]);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/frames"));
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
        assert!(config.looping);
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse(&["--version"]).unwrap_err().kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_bad_input() {
        assert!(parse(&["--scene"]).is_err());
        assert!(parse(&["--scene", "two"]).is_err());
        assert!(parse(&["--tick-ms", "0"]).is_err());
        assert!(parse(&["--speed", "NaN"]).is_err());
        assert!(parse(&["--speed", "inf"]).is_err());
        assert_eq!(
            parse(&["--volume", "3"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert!(matches!(
            PlayerConfig::from_args(parse(&["--config", "/definitely/missing.json"]).unwrap()),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_file_values_checked() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("player.json");
        std::fs::write(&path, r#"{"tickMs":0}"#).unwrap();
        assert!(matches!(
            PlayerConfig::from_args(parse(&["--config", path.to_str().unwrap()]).unwrap()),
            Err(ConfigError::InvalidValue { key: "tickMs", .. })
        ));
    }
}

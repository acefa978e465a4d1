use std::path::Path;

use anyhow::{Context, Result};
use maze_escape_system_pursuit::Tuning;
use serde::Deserialize;

/// File consulted when no configuration path is passed on the command line.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "maze-escape.toml";

/// Settings read from `maze-escape.toml`; every section is optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct AppConfig {
    #[serde(default)]
    pub(crate) maze: MazeSection,
    #[serde(default)]
    pub(crate) agent: Tuning,
    #[serde(default)]
    pub(crate) spawning: SpawningSection,
    #[serde(default)]
    pub(crate) simulation: SimulationSection,
    #[serde(default)]
    pub(crate) logging: LoggingSection,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct MazeSection {
    #[serde(default = "default_maze_size")]
    pub(crate) size: u32,
    #[serde(default = "default_cell_length")]
    pub(crate) cell_length: f32,
    #[serde(default = "default_seed")]
    pub(crate) seed: u64,
}

fn default_maze_size() -> u32 {
    21
}

fn default_cell_length() -> f32 {
    4.0
}

fn default_seed() -> u64 {
    0x6d61_7a65
}

impl Default for MazeSection {
    fn default() -> Self {
        Self {
            size: default_maze_size(),
            cell_length: default_cell_length(),
            seed: default_seed(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SpawningSection {
    #[serde(default = "default_obstacle_probability")]
    pub(crate) obstacle_probability: f64,
}

fn default_obstacle_probability() -> f64 {
    0.15
}

impl Default for SpawningSection {
    fn default() -> Self {
        Self {
            obstacle_probability: default_obstacle_probability(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SimulationSection {
    /// Frames simulated per second.
    #[serde(default = "default_tick_rate")]
    pub(crate) tick_rate: u32,
    /// Session length after which the run stops without an outcome.
    #[serde(default = "default_time_limit")]
    pub(crate) time_limit_secs: f32,
    /// Speed of the scripted player walking toward the relic.
    #[serde(default = "default_autopilot_speed")]
    pub(crate) autopilot_speed: f32,
    /// Agent distance under which the scripted player fires the charm.
    #[serde(default = "default_charm_distance")]
    pub(crate) charm_distance: f32,
}

fn default_tick_rate() -> u32 {
    30
}

fn default_time_limit() -> f32 {
    180.0
}

fn default_autopilot_speed() -> f32 {
    4.0
}

fn default_charm_distance() -> f32 {
    6.0
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            time_limit_secs: default_time_limit(),
            autopilot_speed: default_autopilot_speed(),
            charm_distance: default_charm_distance(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub(crate) level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Loads the explicit path, or the default file when it exists.
    pub(crate) fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }
}

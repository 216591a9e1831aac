//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`ARCADE_SECTION__KEY`)

use arcade2d_math::{Rect, Vec2};
use arcade2d_physics::WorldConfig;
use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Physics world configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Headless simulation run configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`ARCADE_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // ARCADE_PHYSICS__GRAVITY_Y=300 -> physics.gravity_y = 300
        figment = figment.merge(Env::prefixed("ARCADE_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Physics configuration
///
/// Flat so every value can be overridden from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed steps per second
    pub fps: f32,
    pub fixed_step: bool,
    pub time_scale: f32,
    pub gravity_x: f32,
    /// Gravity (positive = downward)
    pub gravity_y: f32,
    pub bounds_x: f32,
    pub bounds_y: f32,
    pub bounds_width: f32,
    pub bounds_height: f32,
    pub overlap_bias: f32,
    pub tile_bias: f32,
    pub force_x: bool,
    pub use_tree: bool,
    pub max_entries: usize,
    /// Log per-step statistics
    pub debug: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            fps: world.fps,
            fixed_step: world.fixed_step,
            time_scale: world.time_scale,
            gravity_x: 0.0,
            gravity_y: 300.0,
            bounds_x: world.bounds.x,
            bounds_y: world.bounds.y,
            bounds_width: world.bounds.width,
            bounds_height: world.bounds.height,
            overlap_bias: world.overlap_bias,
            tile_bias: world.tile_bias,
            force_x: world.force_x,
            use_tree: world.use_tree,
            max_entries: world.max_entries,
            debug: world.debug,
        }
    }
}

impl PhysicsConfig {
    /// Convert to the physics world's configuration
    pub fn to_world_config(&self) -> WorldConfig {
        WorldConfig {
            fps: self.fps,
            fixed_step: self.fixed_step,
            time_scale: self.time_scale,
            gravity: Vec2::new(self.gravity_x, self.gravity_y),
            bounds: Rect::new(self.bounds_x, self.bounds_y, self.bounds_width, self.bounds_height),
            overlap_bias: self.overlap_bias,
            tile_bias: self.tile_bias,
            force_x: self.force_x,
            use_tree: self.use_tree,
            max_entries: self.max_entries,
            debug: self.debug,
            ..WorldConfig::default()
        }
    }
}

/// Headless simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Frames per second fed to the world
    pub frame_rate: f32,
    /// Simulated time in seconds
    pub duration: f32,
    /// Scene file to run
    pub scene: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            duration: 5.0,
            scene: "scenes/platformer.ron".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Number of frames in a run (at least one)
    pub fn frame_count(&self) -> u64 {
        ((self.duration * self.frame_rate).round() as u64).max(1)
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Log every physics event at debug level
    pub log_events: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_events: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.physics.gravity_y, 300.0);
        assert_eq!(config.simulation.frame_rate, 60.0);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("gravity_y"));
        assert!(toml.contains("frame_rate"));
    }

    #[test]
    fn test_to_world_config() {
        let physics = PhysicsConfig {
            gravity_x: 10.0,
            bounds_width: 1024.0,
            fps: 120.0,
            ..PhysicsConfig::default()
        };
        let world = physics.to_world_config();
        assert_eq!(world.gravity, Vec2::new(10.0, 300.0));
        assert_eq!(world.bounds.width, 1024.0);
        assert_eq!(world.fps, 120.0);
        assert!(world.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("[physics]\ngravity_y = 50.0\n").unwrap();
        assert_eq!(config.physics.gravity_y, 50.0);
        assert_eq!(config.physics.fps, 60.0);
        assert_eq!(config.simulation.duration, 5.0);
    }

    #[test]
    fn test_frame_count() {
        let sim = SimulationConfig {
            frame_rate: 30.0,
            duration: 2.0,
            ..SimulationConfig::default()
        };
        assert_eq!(sim.frame_count(), 60);

        let empty = SimulationConfig {
            duration: 0.0,
            ..SimulationConfig::default()
        };
        assert_eq!(empty.frame_count(), 1);
    }
}

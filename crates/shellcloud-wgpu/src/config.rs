//! Viewer configuration: TOML file plus command-line overrides.
//!
//! Every section has defaults, so a partial file (or none) works:
//!
//! ```toml
//! seed = 42
//!
//! [generation]
//! total_triangle_count = 50000
//! outer_radius = 40.0
//! wireframe = false
//!
//! [camera]
//! auto_rotate_speed = 1.5
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use shellcloud_core::GenerationParameters;

use crate::error::ConfigError;

/// Orbit camera settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance from the origin at startup
    pub distance: f32,
    /// Height above the equator at startup
    pub height: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub auto_rotate: bool,
    /// Orbits per minute at 1.0
    pub auto_rotate_speed: f32,
    /// Fraction of orbit velocity lost per 60 Hz frame
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 100.0,
            height: 1.0,
            fov_degrees: 75.0,
            near: 1.0,
            far: 1000.0,
            auto_rotate: true,
            auto_rotate_speed: 0.69,
            damping: 0.05,
        }
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Seed for the first cloud; entropy when absent
    pub seed: Option<u64>,
    pub generation: GenerationParameters,
    pub camera: CameraConfig,
}

impl ViewerConfig {
    /// Reject generation parameters the builder would refuse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation.validate()?;
        Ok(())
    }
}

/// Load a config file. Missing fields take their defaults.
pub fn load_from_path(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ViewerConfig = toml::from_str(&content)?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Command-line interface.
#[derive(Parser, Debug, Default)]
#[command(name = "shellcloud")]
#[command(version, about = "Layered triangle cloud in concentric shells")]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Total number of triangles
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Outer radius of the cloud
    #[arg(short, long)]
    pub radius: Option<f32>,

    /// Smallest triangle size
    #[arg(long)]
    pub size_min: Option<f32>,

    /// Largest triangle size
    #[arg(long)]
    pub size_max: Option<f32>,

    /// Number of shells
    #[arg(long)]
    pub shells: Option<u32>,

    /// Draw filled triangles instead of wireframe
    #[arg(long)]
    pub solid: bool,

    /// Random seed for reproducible clouds
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Start with auto-rotation off
    #[arg(long)]
    pub no_rotate: bool,
}

impl Cli {
    /// Overlay flags on top of `config`.
    pub fn apply(&self, mut config: ViewerConfig) -> ViewerConfig {
        let generation = &mut config.generation;
        if let Some(count) = self.count {
            generation.total_triangle_count = count;
        }
        if let Some(radius) = self.radius {
            generation.outer_radius = radius;
        }
        if let Some(size_min) = self.size_min {
            generation.size_min = size_min;
        }
        if let Some(size_max) = self.size_max {
            generation.size_max = size_max;
        }
        if let Some(shells) = self.shells {
            generation.shell_count = shells;
        }
        if self.solid {
            generation.wireframe = false;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_rotate {
            config.camera.auto_rotate = false;
        }
        config
    }

    /// Resolve the final configuration: file (if any), then flags, then
    /// validation.
    pub fn load(&self) -> Result<ViewerConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => load_from_path(path)?,
            None => ViewerConfig::default(),
        };
        let config = self.apply(base);
        config.validate()?;
        Ok(config)
    }
}

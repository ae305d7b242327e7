//! Configuration management for isobar.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::colormaps;
use crate::error::{IsobarError, Result};
use crate::interpolation;

/// Largest edge accepted for tiles and images unless configured otherwise
const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 4096;

/// Command-line arguments for isobar
#[derive(Parser, Debug)]
#[command(name = "isobar")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the NetCDF file to serve
    pub netcdf_file: PathBuf,

    /// Host address to bind to
    #[arg(short = 'H', long, env = "ISOBAR_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ISOBAR_PORT")]
    pub port: Option<u16>,

    /// Number of worker threads
    #[arg(short, long, env = "ISOBAR_WORKERS")]
    pub workers: Option<usize>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "ISOBAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ISOBAR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Color map used when a request does not name one
    #[arg(long, env = "ISOBAR_COLORMAP")]
    pub colormap: Option<String>,

    /// Path prefix the image routes are mounted under
    #[arg(long, env = "ISOBAR_ROUTE_PREFIX")]
    pub route_prefix: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads (None = number of CPU cores)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Data source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the NetCDF file
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

/// Rendering defaults shared by both image endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Color map used when the request omits `cmap`
    #[serde(default = "default_colormap")]
    pub default_colormap: String,

    /// Path prefix for the image routes
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,

    /// Default tile edge in pixels
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Lower bound of the fixed tile color scale
    #[serde(default = "default_tile_min_value")]
    pub tile_min_value: f32,

    /// Upper bound of the fixed tile color scale
    #[serde(default = "default_tile_max_value")]
    pub tile_max_value: f32,

    /// Largest accepted image width, height or tile size
    #[serde(default = "default_max_image_dimension")]
    pub max_image_dimension: u32,

    /// Default resampling method (nearest, bilinear)
    #[serde(default = "default_resampling")]
    pub resampling: String,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Data configuration
    #[serde(default)]
    pub data: DataConfig,

    /// Rendering configuration
    #[serde(default)]
    pub render: RenderConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, PathBuf)> {
        Self::from_args(Args::parse())
    }

    /// Build a configuration from already parsed arguments
    pub fn from_args(args: Args) -> Result<(Self, PathBuf)> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments and environment
        if let Some(host) = args.host {
            config.server.host = host;
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if args.workers.is_some() {
            config.server.workers = args.workers;
        }
        if let Some(level) = args.log_level {
            config.log_level = level;
        }
        if let Some(colormap) = args.colormap {
            config.render.default_colormap = colormap;
        }
        if let Some(prefix) = args.route_prefix {
            config.render.route_prefix = prefix;
        }

        // NetCDF file path from command line takes precedence
        config.data.file_path = Some(args.netcdf_file.clone());

        Ok((config, args.netcdf_file))
    }

    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        self.server.host = other.server.host;
        self.server.port = other.server.port;
        if other.server.workers.is_some() {
            self.server.workers = other.server.workers;
        }
        if other.data.file_path.is_some() {
            self.data.file_path = other.data.file_path;
        }
        self.render = other.render;
        self.log_level = other.log_level;
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            return Err(IsobarError::Config {
                message: "Server host cannot be empty".to_string(),
            });
        }

        // Port 0 only makes sense for tests, which build their own listener
        if self.server.port == 0 {
            return Err(IsobarError::Config {
                message: "Server port cannot be 0".to_string(),
            });
        }

        if self.server.workers == Some(0) {
            return Err(IsobarError::Config {
                message: "Worker count must be at least 1".to_string(),
            });
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(IsobarError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        if colormaps::get_colormap(&self.render.default_colormap).is_err() {
            return Err(IsobarError::Config {
                message: format!(
                    "Invalid default colormap: {}. Must be one of: {}",
                    self.render.default_colormap,
                    colormaps::available_colormaps().join(", ")
                ),
            });
        }

        if interpolation::get_interpolator(&self.render.resampling).is_err() {
            return Err(IsobarError::Config {
                message: format!(
                    "Invalid resampling method: {}. Must be one of: nearest, bilinear",
                    self.render.resampling
                ),
            });
        }

        if !self.render.route_prefix.starts_with('/') {
            return Err(IsobarError::Config {
                message: format!(
                    "Route prefix must start with '/': {}",
                    self.render.route_prefix
                ),
            });
        }

        if self.render.max_image_dimension == 0 {
            return Err(IsobarError::Config {
                message: "Maximum image dimension must be at least 1".to_string(),
            });
        }

        if self.render.tile_size == 0 || self.render.tile_size > self.render.max_image_dimension
        {
            return Err(IsobarError::Config {
                message: format!(
                    "Tile size must be between 1 and {}, got {}",
                    self.render.max_image_dimension, self.render.tile_size
                ),
            });
        }

        if !(self.render.tile_min_value < self.render.tile_max_value) {
            return Err(IsobarError::Config {
                message: format!(
                    "Tile value range is empty: min {} must be below max {}",
                    self.render.tile_min_value, self.render.tile_max_value
                ),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data: DataConfig::default(),
            render: RenderConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_colormap: default_colormap(),
            route_prefix: default_route_prefix(),
            tile_size: default_tile_size(),
            tile_min_value: default_tile_min_value(),
            tile_max_value: default_tile_max_value(),
            max_image_dimension: default_max_image_dimension(),
            resampling: default_resampling(),
        }
    }
}

// Default value functions for serde
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_colormap() -> String {
    "rainbow".to_string()
}

fn default_route_prefix() -> String {
    "/image".to_string()
}

fn default_tile_size() -> u32 {
    256
}

fn default_tile_min_value() -> f32 {
    0.0
}

fn default_tile_max_value() -> f32 {
    5.0
}

fn default_max_image_dimension() -> u32 {
    DEFAULT_MAX_IMAGE_DIMENSION
}

fn default_resampling() -> String {
    "bilinear".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

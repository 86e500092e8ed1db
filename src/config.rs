//! Configuration management for ggscope
//!
//! Handles loading and saving the tracer print toggles and the defaults
//! used when decoding video memory dumps.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::trace::TraceOptions;
use crate::vdp::DEFAULT_NT_ADDR;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Tracer output
    #[serde(default)]
    pub trace: TraceConfig,

    /// Image decoding
    #[serde(default)]
    pub video: VideoConfig,
}

/// Tracer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraceConfig {
    /// Print every instruction as it is fetched
    #[serde(default)]
    pub print_insts: bool,

    /// Print RAM reads and writes
    #[serde(default)]
    pub print_ram_access: bool,

    /// Print the mapper state after every bank switch
    #[serde(default)]
    pub print_mapper_changed: bool,
}

/// Image output format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Ppm,
    Png,
}

/// Video decoding configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoConfig {
    /// Nametable base address
    #[serde(default = "default_nametable_addr")]
    pub nametable_addr: u16,

    /// Format of written images
    #[serde(default)]
    pub image_format: ImageFormat,
}

fn default_nametable_addr() -> u16 {
    DEFAULT_NT_ADDR
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            nametable_addr: default_nametable_addr(),
            image_format: ImageFormat::default(),
        }
    }
}

impl From<&TraceConfig> for TraceOptions {
    fn from(cfg: &TraceConfig) -> Self {
        TraceOptions {
            print_insts: cfg.print_insts,
            print_ram_access: cfg.print_ram_access,
            print_mapper_changed: cfg.print_mapper_changed,
        }
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("ggscope");
            fs::create_dir_all(&dir).ok();
            dir.join("config.toml")
        } else {
            PathBuf::from("config.toml")
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => {
                        log::info!("Loaded configuration from: {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        log::error!("Failed to parse config file: {}", e);
                    }
                },
                Err(e) => {
                    log::error!("Failed to read config file: {}", e);
                }
            }
        }

        log::info!("Using default configuration");
        Self::default()
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        log::info!("Saved configuration to: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: Config = toml::from_str("[trace]\nprint_insts = true\n").unwrap();
        assert!(cfg.trace.print_insts);
        assert!(!cfg.trace.print_ram_access);
        assert_eq!(cfg.video.nametable_addr, 0x3800);
        assert_eq!(cfg.video.image_format, ImageFormat::Ppm);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.video.image_format = ImageFormat::Png;
        cfg.video.nametable_addr = 0x3000;
        cfg.trace.print_mapper_changed = true;
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(toml::from_str::<Config>(&text).unwrap(), cfg);
    }

    #[test]
    fn trace_options_follow_config() {
        let cfg = TraceConfig {
            print_insts: true,
            print_ram_access: false,
            print_mapper_changed: true,
        };
        let opts = TraceOptions::from(&cfg);
        assert!(opts.print_insts && opts.print_mapper_changed && !opts.print_ram_access);
    }

    #[test]
    fn saved_file_loads_back() {
        let path = std::env::temp_dir().join(format!("ggscope-config-{}.toml", std::process::id()));
        let mut cfg = Config::default();
        cfg.trace.print_ram_access = true;
        cfg.video.nametable_addr = 0x3000;
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path);
        fs::remove_file(&path).ok();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn unreadable_path_falls_back() {
        let cfg = Config::load_from(std::path::Path::new("/nonexistent/ggscope.toml"));
        assert_eq!(cfg, Config::default());
    }
}

//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$FIBSEQ_CONFIG` environment variable
//! 2. `~/.config/fibseq/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use fibseq_core::{CachePolicy, SeqError, SeqResult, Strategy, DEFAULT_CACHE_CAPACITY};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub cache: CacheConfig,
}

/// Which supplier backs the engine.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategy: Strategy,
}

/// Cache settings for the transparent strategy.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `lru` or `unbounded`.
    pub policy: String,
    /// Maximum cached terms under `lru`.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: "lru".into(),
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn cache_policy(&self) -> SeqResult<CachePolicy> {
        match self.policy.to_lowercase().as_str() {
            "unbounded" => Ok(CachePolicy::Unbounded),
            "lru" if self.capacity == 0 => Err(SeqError::Config(
                "cache capacity must be at least 1".into(),
            )),
            "lru" => Ok(CachePolicy::Lru {
                capacity: self.capacity,
            }),
            other => Err(SeqError::Config(format!("invalid cache policy: {other}"))),
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(p) if p.exists() => load_config_from(&p),
        _ => Ok(Config::default()),
    }
}

/// Parse a specific config file.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    // 1. Environment variable
    if let Ok(p) = std::env::var("FIBSEQ_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // 2. ~/.config/fibseq/config.toml
    dirs_home().map(|home| home.join(".config").join("fibseq").join("config.toml"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Describe the active config path.
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}

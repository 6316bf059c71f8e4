//! Configuration resolution
//!
//! CLI arguments give the baseline; an optional TOML file overrides them
//! field by field. Everything the core needs arrives as explicit value
//! objects, there is no ambient configuration lookup past startup.

use crate::matching::MatchingConfig;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI arguments that participate in config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub synthetic_profiles: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub db_dir: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,
    pub synthetic_profiles: Option<bool>,
    pub matching: Option<MatchingWeights>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct MatchingWeights {
    pub artist_weight: Option<f64>,
    pub genre_weight: Option<f64>,
    pub pattern_weight: Option<f64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub synthetic_profiles: bool,
    pub matching: MatchingConfig,
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

impl AppConfig {
    /// Resolves configuration from CLI arguments and an optional TOML file.
    /// File values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;
        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        let synthetic_profiles = file.synthetic_profiles.unwrap_or(cli.synthetic_profiles);

        let defaults = MatchingConfig::default();
        let weights = file.matching.unwrap_or_default();
        let matching = MatchingConfig {
            artist_weight: weights.artist_weight.unwrap_or(defaults.artist_weight),
            genre_weight: weights.genre_weight.unwrap_or(defaults.genre_weight),
            pattern_weight: weights.pattern_weight.unwrap_or(defaults.pattern_weight),
        };
        if matching.artist_weight < 0.0 || matching.genre_weight < 0.0 || matching.pattern_weight < 0.0 {
            bail!("Matching weights must be non-negative");
        }

        Ok(AppConfig {
            db_dir,
            port,
            logging_level,
            frontend_dir_path,
            synthetic_profiles,
            matching,
        })
    }

    pub fn users_db_path(&self) -> PathBuf {
        self.db_dir.join("users.db")
    }

    pub fn profiles_db_path(&self) -> PathBuf {
        self.db_dir.join("profiles.db")
    }

    pub fn matching_db_path(&self) -> PathBuf {
        self.db_dir.join("matching.db")
    }

    pub fn playlists_db_path(&self) -> PathBuf {
        self.db_dir.join("playlists.db")
    }

    pub fn chat_db_path(&self) -> PathBuf {
        self.db_dir.join("chat.db")
    }
}

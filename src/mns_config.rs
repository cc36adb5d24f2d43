// Difficulty presets and persisted user configuration
// Scores, theme and the last difficulty are stored together as TOML

use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,   // 8x8, 10 mines
    Medium, // 12x12, 25 mines
    Hard,   // 16x16, 50 mines
}

impl Serialize for Difficulty {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Difficulty, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty '{}' (expected easy, medium or hard)", s))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Board dimensions as (rows, cols, mines)
    pub fn params(&self) -> (usize, usize, usize) {
        match self {
            Difficulty::Easy => (8, 8, 10),
            Difficulty::Medium => (12, 12, 25),
            Difficulty::Hard => (16, 16, 50),
        }
    }

    /// Config file identifier, stable across versions
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn to_index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn from_index(i: usize) -> Difficulty {
        match i {
            0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

/// Display mode
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// One finished game in the score history
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub score: i64,
    pub date: String, // Date in ISO format (YYYY-MM-DD)
}

/// User configuration and score history
/// Persisted to disk as TOML
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub difficulty: Difficulty,
    pub theme: Theme,
    pub high_score: i64,
    // Newest first
    pub scores: Vec<ScoreEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: Difficulty::Easy,
            theme: Theme::Light,
            high_score: 0,
            scores: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("cannot decode config: {0}")]
    Decode(#[from] toml::de::Error),
}

/// Get the configuration file path
/// Uses the platform config directory (e.g. ~/.config/mnswpr/mnswpr.toml on Linux)
/// Falls back to the current directory if ProjectDirs is unavailable
pub fn config_path() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let name = exe.file_stem().and_then(|s| s.to_str())?.to_string();
    if let Some(proj) = ProjectDirs::from("com", "xhbl", &name) {
        let mut path = proj.config_dir().to_path_buf();
        path.push(format!("{}.toml", name));
        return Some(path);
    }
    let mut path = env::current_dir().ok()?;
    path.push(format!("{}.toml", name));
    Some(path)
}

pub fn load_config(path: &Path) -> Result<Config, StoreError> {
    let s = fs::read_to_string(path)?;
    Ok(toml::from_str::<Config>(&s)?)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<(), StoreError> {
    let s = toml::to_string(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, s)?;
    Ok(())
}

/// Load configuration from disk, or write and return defaults if not found.
/// A file that cannot be read or parsed is replaced by defaults.
pub fn load_or_create_config(path: &Path) -> Config {
    if path.exists() {
        match load_config(path) {
            Ok(cfg) => return cfg,
            Err(e) => log::warn!("ignoring config at {}: {}", path.display(), e),
        }
    }
    let cfg = Config::default();
    if let Err(e) = save_config(&cfg, path) {
        log::warn!("cannot write default config to {}: {}", path.display(), e);
    }
    cfg
}

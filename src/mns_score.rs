// Final score computation and the score/theme stores

use chrono::Local;
use std::path::PathBuf;

use crate::mns_config::{self, Config, Difficulty, ScoreEntry, StoreError, Theme};
use crate::mns_game::GameOver;

/// Number of finished games kept in the history
pub const HISTORY_LIMIT: usize = 10;

/// Bonus awarded for clearing the board, reduced by one per elapsed second
pub const WIN_BONUS: i64 = 1000;

/// Score reported for a finished game
pub fn finalize_score(running: u32, won: bool, elapsed_secs: u64) -> i64 {
    if won {
        running as i64 + WIN_BONUS - elapsed_secs as i64
    } else {
        running as i64
    }
}

/// Ranked history of finished games
pub trait ScoreStore {
    fn append(&mut self, score: i64) -> Result<(), StoreError>;
    /// Newest first, at most HISTORY_LIMIT entries
    fn history(&self) -> Vec<i64>;
    fn high_score(&self) -> i64;
}

pub trait ThemeStore {
    fn theme(&self) -> Theme;
    fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError>;
}

/// Hand a finished game to the score store
pub fn report_outcome<S: ScoreStore + ?Sized>(outcome: &GameOver, store: &mut S) -> Result<(), StoreError> {
    log::info!(
        "recording {} score {}",
        if outcome.won { "winning" } else { "losing" },
        outcome.final_score
    );
    store.append(outcome.final_score)
}

impl Config {
    /// Push a score to the front of the history and update the high score
    pub fn push_score(&mut self, score: i64, date: String) {
        self.scores.insert(0, ScoreEntry { score, date });
        self.scores.truncate(HISTORY_LIMIT);
        self.high_score = self.high_score.max(score);
    }
}

/// Config-backed store that writes the TOML file after every change.
/// Without a path it only keeps state in memory.
pub struct ConfigStore {
    cfg: Config,
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Open the store at the platform config location
    pub fn open() -> Self {
        match mns_config::config_path() {
            Some(path) => Self::open_at(path),
            None => {
                log::warn!("no config location available, scores will not persist");
                Self::in_memory(Config::default())
            }
        }
    }

    pub fn open_at(path: PathBuf) -> Self {
        let cfg = mns_config::load_or_create_config(&path);
        log::debug!("loaded config from {}", path.display());
        ConfigStore { cfg, path: Some(path) }
    }

    pub fn in_memory(cfg: Config) -> Self {
        ConfigStore { cfg, path: None }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.cfg.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), StoreError> {
        self.cfg.difficulty = difficulty;
        self.save()
    }

    /// Newest first, with the date each game was played
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.cfg.scores
    }

    fn save(&self) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => mns_config::save_config(&self.cfg, path),
            None => Ok(()),
        }
    }
}

impl ScoreStore for ConfigStore {
    fn append(&mut self, score: i64) -> Result<(), StoreError> {
        let date = Local::now().format("%Y-%m-%d").to_string();
        self.cfg.push_score(score, date);
        self.save()
    }

    fn history(&self) -> Vec<i64> {
        self.cfg.scores.iter().map(|e| e.score).collect()
    }

    fn high_score(&self) -> i64 {
        self.cfg.high_score
    }
}

impl ThemeStore for ConfigStore {
    fn theme(&self) -> Theme {
        self.cfg.theme
    }

    fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        self.cfg.theme = theme;
        self.save()
    }
}

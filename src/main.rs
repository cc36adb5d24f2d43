// Entry point for the Minesweeper TUI application
// Parses the command line, opens the config store and launches the UI

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::error::Error;
use std::path::PathBuf;

use mnswpr::mns_config::Difficulty;
use mnswpr::mns_log;
use mnswpr::mns_score::ConfigStore;
use mnswpr::mns_ui::run as run_ui;

#[derive(Parser, Debug)]
#[command(name = "mnswpr", about = "Terminal Minesweeper with score history", version)]
struct Args {
    /// Difficulty preset: easy, medium or hard (remembered for next time)
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Seed for reproducible boards
    #[arg(long)]
    seed: Option<u64>,
    /// Write log records to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        mns_log::init(path, args.verbose.log_level_filter())?;
    }

    // Load or create user configuration (difficulty, theme, scores)
    let mut store = ConfigStore::open();
    if let Some(difficulty) = args.difficulty {
        if let Err(e) = store.set_difficulty(difficulty) {
            log::warn!("failed to save difficulty: {}", e);
        }
    }

    run_ui(&mut store, args.seed)
}

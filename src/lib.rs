// Terminal Minesweeper with score history and light/dark themes
// The engine modules have no terminal dependencies; mns_ui renders them

pub mod mns_board;  // Minefield generation and adjacency counts
pub mod mns_config; // Difficulty presets and persisted configuration
pub mod mns_game;   // Game session state machine
pub mod mns_log;    // File-backed logger
pub mod mns_reveal; // Reveal and cascade
pub mod mns_score;  // Final score and score/theme stores
pub mod mns_theme;  // Light/dark palettes
pub mod mns_ui;     // Terminal UI rendering and event handling

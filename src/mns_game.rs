// Game session state machine
// Owns the board, visibility/flag grids, score and clock for one game

use rand::Rng;
use std::time::{Duration, Instant};

use crate::mns_board::{Board, Cell};
use crate::mns_config::Difficulty;
use crate::mns_reveal::{reveal, RevealOutcome};
use crate::mns_score::finalize_score;

/// Source of elapsed game time
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

/// Wall-clock timer started when the game is created
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch { start: Instant::now() }
    }
}

impl Clock for Stopwatch {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

/// Emitted once when the game reaches a terminal phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOver {
    pub won: bool,
    pub final_score: i64,
}

/// What a command changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Unchanged,
    Revealed { count: usize },
    Flagged { row: usize, col: usize, flagged: bool },
    Ended(GameOver),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellContent {
    Mine,
    Number(u8),
    Blank,
}

/// Per-cell display instruction for the render sink
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellView {
    pub revealed: bool,
    pub flagged: bool,
    pub content: CellContent,
}

pub struct GameSession<C: Clock = Stopwatch> {
    board: Board,
    visible: Vec<bool>,
    flagged: Vec<bool>,
    score: u32,
    phase: Phase,
    clock: C,
    final_elapsed: Option<Duration>, // Frozen clock reading once terminal
}

impl GameSession<Stopwatch> {
    /// Start a new game for a preset with a freshly generated board
    pub fn new<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Self {
        let (rows, cols, mines) = difficulty.params();
        let board = Board::generate(rows, cols, mines, rng);
        log::debug!("new {} game: {}x{} with {} mines", difficulty.name(), rows, cols, mines);
        GameSession::with_board(board, Stopwatch::start())
    }
}

impl<C: Clock> GameSession<C> {
    pub fn with_board(board: Board, clock: C) -> Self {
        let n = board.len();
        GameSession {
            board,
            visible: vec![false; n],
            flagged: vec![false; n],
            score: 0,
            phase: Phase::InProgress,
            clock,
            final_elapsed: None,
        }
    }

    /// Reveal a cell. Terminal games, revealed/flagged cells and
    /// out-of-range coordinates are ignored.
    pub fn activate(&mut self, row: usize, col: usize) -> GameEvent {
        if self.phase.is_terminal() || !self.board.in_bounds(row, col) {
            return GameEvent::Unchanged;
        }
        let i = self.board.index(row, col);
        if self.visible[i] || self.flagged[i] {
            return GameEvent::Unchanged;
        }

        match reveal(&self.board, &mut self.visible, &self.flagged, row, col) {
            RevealOutcome::HitMine => {
                log::debug!("mine hit at ({}, {})", row, col);
                GameEvent::Ended(self.finish(false))
            }
            RevealOutcome::Revealed(count) => {
                self.score += count as u32;
                if count > 1 {
                    log::debug!("cascade from ({}, {}) opened {} cells", row, col, count);
                }
                if self.all_safe_revealed() {
                    GameEvent::Ended(self.finish(true))
                } else {
                    GameEvent::Revealed { count }
                }
            }
        }
    }

    /// Flip the flag on a hidden cell
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> GameEvent {
        if self.phase.is_terminal() || !self.board.in_bounds(row, col) {
            return GameEvent::Unchanged;
        }
        let i = self.board.index(row, col);
        if self.visible[i] {
            return GameEvent::Unchanged;
        }
        self.flagged[i] = !self.flagged[i];
        GameEvent::Flagged { row, col, flagged: self.flagged[i] }
    }

    fn all_safe_revealed(&self) -> bool {
        self.board
            .cells()
            .iter()
            .zip(&self.visible)
            .all(|(cell, visible)| cell.is_mine() || *visible)
    }

    fn finish(&mut self, won: bool) -> GameOver {
        self.phase = if won { Phase::Won } else { Phase::Lost };
        self.visible.iter_mut().for_each(|v| *v = true);
        let elapsed = self.clock.elapsed();
        self.final_elapsed = Some(elapsed);
        let final_score = finalize_score(self.score, won, elapsed.as_secs());
        log::info!(
            "game {} after {}s, score {} (final {})",
            if won { "won" } else { "lost" },
            elapsed.as_secs(),
            self.score,
            final_score
        );
        GameOver { won, final_score }
    }

    pub fn cell_view(&self, row: usize, col: usize) -> Option<CellView> {
        let cell = self.board.get(row, col)?;
        let i = self.board.index(row, col);
        let content = match cell {
            Cell::Mine => CellContent::Mine,
            Cell::Clear(0) => CellContent::Blank,
            Cell::Clear(n) => CellContent::Number(n),
        };
        Some(CellView { revealed: self.visible[i], flagged: self.flagged[i], content })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Time since the game started, frozen once the game has ended
    pub fn elapsed(&self) -> Duration {
        self.final_elapsed.unwrap_or_else(|| self.clock.elapsed())
    }

    pub fn rows(&self) -> usize {
        self.board.rows()
    }

    pub fn cols(&self) -> usize {
        self.board.cols()
    }

    pub fn mine_count(&self) -> usize {
        self.board.mine_count()
    }

    pub fn flags_placed(&self) -> usize {
        self.flagged.iter().filter(|f| **f).count()
    }

    /// Mine counter display value; negative when over-flagged
    pub fn mines_left(&self) -> isize {
        self.board.mine_count() as isize - self.flags_placed() as isize
    }

    pub fn is_revealed(&self, row: usize, col: usize) -> bool {
        self.board.in_bounds(row, col) && self.visible[self.board.index(row, col)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(Duration);

    impl Clock for FixedClock {
        fn elapsed(&self) -> Duration {
            self.0
        }
    }

    fn session(rows: usize, cols: usize, mines: &[(usize, usize)], secs: u64) -> GameSession<FixedClock> {
        GameSession::with_board(Board::from_mines(rows, cols, mines), FixedClock(Duration::from_secs(secs)))
    }

    #[test]
    fn first_move_on_mine_loses_with_zero_score() {
        let mut game = session(3, 3, &[(1, 1)], 5);
        let event = game.activate(1, 1);
        assert_eq!(event, GameEvent::Ended(GameOver { won: false, final_score: 0 }));
        assert_eq!(game.phase(), Phase::Lost);
        for r in 0..3 {
            for c in 0..3 {
                assert!(game.is_revealed(r, c));
            }
        }
    }

    #[test]
    fn loss_keeps_running_score() {
        let mut game = session(1, 4, &[(0, 0), (0, 3)], 30);
        assert_eq!(game.activate(0, 1), GameEvent::Revealed { count: 1 });
        assert_eq!(game.activate(0, 3), GameEvent::Ended(GameOver { won: false, final_score: 1 }));
    }

    #[test]
    fn win_adds_bonus_minus_elapsed() {
        let mut game = session(1, 3, &[(0, 0)], 40);
        assert_eq!(game.activate(0, 1), GameEvent::Revealed { count: 1 });
        assert_eq!(game.activate(0, 2), GameEvent::Ended(GameOver { won: true, final_score: 2 + 1000 - 40 }));
        assert_eq!(game.phase(), Phase::Won);
        assert!(game.is_revealed(0, 0));
    }

    #[test]
    fn cascade_win_in_one_move() {
        let mut game = session(3, 3, &[(2, 2)], 0);
        assert_eq!(game.activate(0, 0), GameEvent::Ended(GameOver { won: true, final_score: 8 + 1000 }));
        assert_eq!(game.score(), 8);
    }

    #[test]
    fn flagged_cell_cannot_be_activated() {
        let mut game = session(2, 2, &[(0, 0)], 0);
        assert_eq!(game.toggle_flag(1, 1), GameEvent::Flagged { row: 1, col: 1, flagged: true });
        assert_eq!(game.activate(1, 1), GameEvent::Unchanged);
        assert!(!game.is_revealed(1, 1));
        assert_eq!(game.toggle_flag(1, 1), GameEvent::Flagged { row: 1, col: 1, flagged: false });
        assert_eq!(game.activate(1, 1), GameEvent::Revealed { count: 1 });
    }

    #[test]
    fn revealed_cell_cannot_be_flagged() {
        let mut game = session(2, 2, &[(0, 0)], 0);
        game.activate(1, 1);
        assert_eq!(game.toggle_flag(1, 1), GameEvent::Unchanged);
        assert_eq!(game.flags_placed(), 0);
    }

    #[test]
    fn terminal_game_ignores_commands() {
        let mut game = session(2, 2, &[(0, 0)], 0);
        game.activate(0, 0);
        assert_eq!(game.activate(1, 1), GameEvent::Unchanged);
        assert_eq!(game.toggle_flag(1, 1), GameEvent::Unchanged);
        assert_eq!(game.phase(), Phase::Lost);
    }

    #[test]
    fn unflagged_mines_do_not_block_win() {
        let mut game = session(1, 3, &[(0, 0)], 0);
        game.toggle_flag(0, 1);
        game.toggle_flag(0, 1);
        assert_eq!(game.activate(0, 1), GameEvent::Revealed { count: 1 });
        assert_eq!(game.phase(), Phase::InProgress);
        let event = game.activate(0, 2);
        assert!(matches!(event, GameEvent::Ended(GameOver { won: true, .. })));
    }

    #[test]
    fn flag_left_on_mine_does_not_block_win() {
        let mut game = session(2, 2, &[(0, 0)], 0);
        game.toggle_flag(0, 0);
        assert_eq!(game.activate(0, 1), GameEvent::Revealed { count: 1 });
        assert_eq!(game.activate(1, 0), GameEvent::Revealed { count: 1 });
        assert_eq!(game.activate(1, 1), GameEvent::Ended(GameOver { won: true, final_score: 3 + 1000 }));
        assert_eq!(game.phase(), Phase::Won);
        assert!(game.cell_view(0, 0).unwrap().flagged);
    }

    #[test]
    fn out_of_range_commands_are_ignored() {
        let mut game = session(2, 2, &[], 0);
        assert_eq!(game.activate(5, 5), GameEvent::Unchanged);
        assert_eq!(game.toggle_flag(0, 7), GameEvent::Unchanged);
        assert_eq!(game.cell_view(2, 0), None);
    }

    #[test]
    fn cell_view_reports_content() {
        let mut game = session(1, 3, &[(0, 0)], 0);
        game.toggle_flag(0, 2);
        let mine = game.cell_view(0, 0).unwrap();
        assert_eq!(mine.content, CellContent::Mine);
        assert!(!mine.revealed);
        assert_eq!(game.cell_view(0, 1).unwrap().content, CellContent::Number(1));
        let blank = game.cell_view(0, 2).unwrap();
        assert_eq!(blank.content, CellContent::Blank);
        assert!(blank.flagged);
        assert_eq!(game.mines_left(), 0);
    }

    #[test]
    fn elapsed_freezes_at_end() {
        let mut game = session(1, 2, &[(0, 0)], 12);
        game.activate(0, 1);
        assert_eq!(game.elapsed(), Duration::from_secs(12));
    }
}

// Terminal UI: renders the session and turns keys/mouse into game commands

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::io;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

use crate::mns_config::Difficulty;
use crate::mns_game::{CellContent, GameEvent, GameOver, GameSession, Phase};
use crate::mns_score::{report_outcome, ConfigStore, ScoreStore, ThemeStore, HISTORY_LIMIT};
use crate::mns_theme::Palette;

/// Delay between the disclosure frame and reporting the final score
const REPORT_DELAY: Duration = Duration::from_millis(100);

const MENU_ITEMS: [(&str, &str); 5] = [
    ("F1", "Help"),
    ("F2", "New"),
    ("F4", "Scores"),
    ("F5", "Difficulty"),
    ("F6", "Theme"),
];

const GLYPH_HIDDEN: &str = "■";
const GLYPH_MINE: &str = "☼";
const GLYPH_FLAG: &str = "⚑";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Modal {
    Help,
    Scores,
    Difficulty(usize), // highlighted preset index
    Result(GameOver),
}

struct UiState {
    cursor: (usize, usize), // (row, col)
    modal: Option<Modal>,
    pending_report: Option<(GameOver, Instant)>,
    board_rect: Option<Rect>,
    palette: Palette,
}

impl UiState {
    fn new(palette: Palette) -> Self {
        UiState {
            cursor: (0, 0),
            modal: None,
            pending_report: None,
            board_rect: None,
            palette,
        }
    }

    fn step_cursor(&mut self, game: &GameSession, dr: isize, dc: isize) {
        let r = (self.cursor.0 as isize + dr).clamp(0, game.rows() as isize - 1) as usize;
        let c = (self.cursor.1 as isize + dc).clamp(0, game.cols() as isize - 1) as usize;
        self.cursor = (r, c);
    }

    /// Map a terminal position to a board cell
    fn cell_at(&self, game: &GameSession, column: u16, row: u16) -> Option<(usize, usize)> {
        let rect = self.board_rect?;
        let inner = Rect::new(rect.x + 1, rect.y + 1, rect.width.saturating_sub(2), rect.height.saturating_sub(2));
        if column < inner.x || row < inner.y || column >= inner.x + inner.width || row >= inner.y + inner.height {
            return None;
        }
        let c = ((column - inner.x) / 2) as usize;
        let r = (row - inner.y) as usize;
        (r < game.rows() && c < game.cols()).then_some((r, c))
    }
}

pub fn run(store: &mut ConfigStore, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, store, &mut rng);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, store: &mut ConfigStore, rng: &mut StdRng) -> Result<(), Box<dyn Error>> {
    let mut game = GameSession::new(store.difficulty(), rng);
    let mut ui = UiState::new(Palette::for_theme(store.theme()));

    loop {
        terminal.draw(|f| draw(f, &game, store, &mut ui))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !handle_key(key, &mut game, store, &mut ui, rng) {
                        break;
                    }
                }
                Event::Mouse(me) => handle_mouse(me, &mut game, &mut ui),
                _ => {}
            }
        }

        poll_report(&mut ui, store);
    }

    flush_report(&mut ui, store);
    Ok(())
}

fn flush_report(ui: &mut UiState, store: &mut ConfigStore) {
    if let Some((outcome, _)) = ui.pending_report.take() {
        if let Err(e) = report_outcome(&outcome, store) {
            log::warn!("failed to save score: {}", e);
        }
    }
}

/// Report the finished game once the disclosed board has been on screen for
/// REPORT_DELAY. A dialog the player already opened stays up.
fn poll_report(ui: &mut UiState, store: &mut ConfigStore) {
    let Some((outcome, t0)) = ui.pending_report else { return };
    if t0.elapsed() < REPORT_DELAY {
        return;
    }
    flush_report(ui, store);
    if ui.modal.is_none() {
        ui.modal = Some(Modal::Result(outcome));
    }
}

fn new_game(game: &mut GameSession, store: &mut ConfigStore, ui: &mut UiState, rng: &mut StdRng) {
    flush_report(ui, store);
    *game = GameSession::new(store.difficulty(), rng);
    ui.cursor = (0, 0);
    ui.modal = None;
}

fn apply(event: GameEvent, ui: &mut UiState) {
    if let GameEvent::Ended(outcome) = event {
        ui.pending_report = Some((outcome, Instant::now()));
    }
}

/// Returns false when the player asked to exit
fn handle_key(key: KeyEvent, game: &mut GameSession, store: &mut ConfigStore, ui: &mut UiState, rng: &mut StdRng) -> bool {
    match ui.modal {
        Some(Modal::Difficulty(sel)) => {
            match key.code {
                KeyCode::Up => ui.modal = Some(Modal::Difficulty(sel.saturating_sub(1))),
                KeyCode::Down => ui.modal = Some(Modal::Difficulty((sel + 1).min(Difficulty::ALL.len() - 1))),
                KeyCode::Enter => {
                    let difficulty = Difficulty::from_index(sel);
                    if let Err(e) = store.set_difficulty(difficulty) {
                        log::warn!("failed to save difficulty: {}", e);
                    }
                    new_game(game, store, ui, rng);
                }
                _ => ui.modal = None,
            }
            return true;
        }
        Some(Modal::Result(_)) => {
            if key.code == KeyCode::Esc {
                return false;
            }
            new_game(game, store, ui, rng);
            return true;
        }
        Some(_) => {
            ui.modal = None;
            return true;
        }
        None => {}
    }

    match key.code {
        KeyCode::Esc => return false,
        KeyCode::F(1) => ui.modal = Some(Modal::Help),
        KeyCode::F(2) => new_game(game, store, ui, rng),
        KeyCode::F(4) => ui.modal = Some(Modal::Scores),
        KeyCode::F(5) => ui.modal = Some(Modal::Difficulty(store.difficulty().to_index())),
        KeyCode::F(6) => {
            let theme = store.theme().toggled();
            if let Err(e) = store.set_theme(theme) {
                log::warn!("failed to save theme: {}", e);
            }
            log::debug!("theme switched to {}", theme.name());
            ui.palette = Palette::for_theme(theme);
        }
        KeyCode::Left => ui.step_cursor(game, 0, -1),
        KeyCode::Right => ui.step_cursor(game, 0, 1),
        KeyCode::Up => ui.step_cursor(game, -1, 0),
        KeyCode::Down => ui.step_cursor(game, 1, 0),
        KeyCode::Char(' ') | KeyCode::Enter => {
            let (r, c) = ui.cursor;
            let event = game.activate(r, c);
            apply(event, ui);
        }
        KeyCode::Char('f') | KeyCode::Char('F') => {
            let (r, c) = ui.cursor;
            game.toggle_flag(r, c);
        }
        _ => {}
    }
    true
}

fn handle_mouse(me: MouseEvent, game: &mut GameSession, ui: &mut UiState) {
    if ui.modal.is_some() {
        return;
    }
    let Some((r, c)) = ui.cell_at(game, me.column, me.row) else {
        return;
    };
    match me.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            ui.cursor = (r, c);
            let event = game.activate(r, c);
            apply(event, ui);
        }
        MouseEventKind::Down(MouseButton::Right) => {
            ui.cursor = (r, c);
            game.toggle_flag(r, c);
        }
        MouseEventKind::Moved => ui.cursor = (r, c),
        _ => {}
    }
}

fn draw<B: Backend>(f: &mut Frame<B>, game: &GameSession, store: &ConfigStore, ui: &mut UiState) {
    let p = ui.palette;
    let size = f.size();
    let base = Style::default().bg(p.background).fg(p.text);
    f.render_widget(Block::default().style(base), size);

    let min_twidth = 64u16;
    let min_theight = 10u16 + game.rows() as u16;
    if size.width < min_twidth || size.height < min_theight {
        let warn_lines = vec![
            Spans::from(Span::raw("Terminal size too small.")),
            Spans::from(Span::raw(format!("Minimum required: {} x {}", min_twidth, min_theight))),
        ];
        let warn = Paragraph::new(Text::from(warn_lines))
            .block(Block::default().borders(Borders::ALL).title("Resize Terminal"))
            .style(base)
            .alignment(Alignment::Center);
        let area = center_rect(40u16.min(size.width), 4u16.min(size.height), size);
        f.render_widget(warn, area);
        ui.board_rect = None;
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(6), Constraint::Length(3)].as_ref())
        .split(size);

    // menu row
    let key_style = Style::default().fg(p.menu_key).add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::raw(" ")];
    for (i, (key, label)) in MENU_ITEMS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(key.to_string(), key_style));
        spans.push(Span::raw(format!(": {}", label)));
    }
    f.render_widget(Paragraph::new(Spans::from(spans)).block(Block::default().borders(Borders::ALL)).style(base), chunks[0]);

    // status row: score, time and mine counter on the left, Esc on the right
    let left_text = format!(
        " Score: {}   Time: {}s   Mines: {} ",
        game.score(),
        game.elapsed().as_secs(),
        game.mines_left()
    );
    let right_text = ": Exit ";
    let inner_w = chunks[2].width.saturating_sub(2) as usize;
    let used = left_text.as_str().width() + "Esc".width() + right_text.width();
    let status = Spans::from(vec![
        Span::raw(left_text),
        Span::raw(" ".repeat(inner_w.saturating_sub(used).max(1))),
        Span::styled("Esc", key_style),
        Span::raw(right_text),
    ]);
    f.render_widget(Paragraph::new(status).block(Block::default().borders(Borders::ALL)).style(base), chunks[2]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(24)].as_ref())
        .split(chunks[1]);

    draw_board(f, game, store, ui, middle[0]);
    draw_scores_panel(f, store, &p, middle[1]);

    match ui.modal {
        Some(Modal::Help) => draw_modal(f, &p, "Help", help_lines(), size),
        Some(Modal::Scores) => draw_modal(f, &p, "Scores", score_lines(store), size),
        Some(Modal::Difficulty(sel)) => draw_modal(f, &p, "Difficulty", difficulty_lines(sel, &p), size),
        Some(Modal::Result(outcome)) => draw_modal(f, &p, if outcome.won { "You win!" } else { "Game Over" }, result_lines(outcome, store), size),
        None => {}
    }
}

fn draw_board<B: Backend>(f: &mut Frame<B>, game: &GameSession, store: &ConfigStore, ui: &mut UiState, area: Rect) {
    let p = ui.palette;
    let board_area = center_rect((game.cols() * 2) as u16 + 3, game.rows() as u16 + 2, area);
    ui.board_rect = Some(board_area);

    let mut lines = Vec::with_capacity(game.rows());
    for r in 0..game.rows() {
        let mut spans = Vec::with_capacity(game.cols() + 1);
        for c in 0..game.cols() {
            let Some(view) = game.cell_view(r, c) else { continue };
            let mut style = Style::default().bg(p.board_bg).fg(p.hidden);
            let glyph = if view.revealed {
                style = style.bg(p.revealed_bg);
                match view.content {
                    CellContent::Mine => {
                        style = style.fg(p.mine);
                        GLYPH_MINE.to_string()
                    }
                    CellContent::Number(n) => {
                        style = style.fg(p.number(n)).add_modifier(Modifier::BOLD);
                        n.to_string()
                    }
                    CellContent::Blank => " ".to_string(),
                }
            } else if view.flagged {
                style = style.fg(p.flag);
                GLYPH_FLAG.to_string()
            } else {
                GLYPH_HIDDEN.to_string()
            };
            // a flag that sat on a mine stays visible after disclosure
            if view.revealed && view.flagged && view.content == CellContent::Mine {
                style = style.fg(p.flag);
            }
            if ui.cursor == (r, c) && game.phase() == Phase::InProgress {
                style = style.bg(p.cursor_bg);
            }
            spans.push(Span::styled(format!(" {}", glyph), style));
        }
        spans.push(Span::styled(" ", Style::default().bg(p.board_bg)));
        lines.push(Spans::from(spans));
    }

    let title = store.difficulty().label();
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title).title_alignment(Alignment::Center))
        .style(Style::default().bg(p.background).fg(p.text));
    f.render_widget(paragraph, board_area);
}

fn draw_scores_panel<B: Backend>(f: &mut Frame<B>, store: &ConfigStore, p: &Palette, area: Rect) {
    let mut lines = vec![
        Spans::from(vec![
            Span::raw(" High: "),
            Span::styled(store.high_score().to_string(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Spans::from(Span::raw("")),
        Spans::from(Span::raw(" Last scores:")),
    ];
    let history = store.history();
    if history.is_empty() {
        lines.push(Spans::from(Span::raw("   -")));
    }
    for (i, score) in history.iter().enumerate() {
        lines.push(Spans::from(Span::raw(format!(" {:>2}. {:>6}", i + 1, score))));
    }
    let panel = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Scores"))
        .style(Style::default().bg(p.background).fg(p.text));
    f.render_widget(panel, area);
}

fn draw_modal<B: Backend>(f: &mut Frame<B>, p: &Palette, title: &str, lines: Vec<Spans<'static>>, size: Rect) {
    let width = lines.iter().map(|l| l.width()).max().unwrap_or(0).max(title.width()) as u16 + 6;
    let height = lines.len() as u16 + 4;
    let rect = center_rect(width.min(size.width), height.min(size.height), size);
    f.render_widget(Clear, rect);
    let mut all = vec![Spans::from(Span::raw(""))];
    all.extend(lines);
    let modal = Paragraph::new(Text::from(all))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()).title_alignment(Alignment::Center))
        .style(Style::default().bg(p.background).fg(p.text))
        .alignment(Alignment::Center);
    f.render_widget(modal, rect);
}

fn help_lines() -> Vec<Spans<'static>> {
    vec![
        Spans::from(Span::raw("Mouse | Arrows       - move cursor")),
        Spans::from(Span::raw("L-Click | Space      - reveal     ")),
        Spans::from(Span::raw("R-Click | F          - toggle flag")),
        Spans::from(Span::raw("")),
        Spans::from(Span::raw("+1 per opened cell, +1000 on a win,")),
        Spans::from(Span::raw("minus one per second played.      ")),
    ]
}

fn score_lines(store: &ConfigStore) -> Vec<Spans<'static>> {
    let mut lines = vec![Spans::from(Span::raw(format!("High score: {}", store.high_score()))), Spans::from(Span::raw(""))];
    if store.entries().is_empty() {
        lines.push(Spans::from(Span::raw("No games played yet")));
    }
    for entry in store.entries().iter().take(HISTORY_LIMIT) {
        lines.push(Spans::from(Span::raw(format!("{:>6}  {}", entry.score, entry.date))));
    }
    lines
}

fn difficulty_lines(selected: usize, p: &Palette) -> Vec<Spans<'static>> {
    Difficulty::ALL
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let (rows, cols, mines) = d.params();
            let text = format!(" {:<7} {:>2}x{:<2} {:>2} mines ", d.label(), rows, cols, mines);
            let style = if i == selected {
                Style::default().bg(p.cursor_bg).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Spans::from(Span::styled(text, style))
        })
        .collect()
}

fn result_lines(outcome: GameOver, store: &ConfigStore) -> Vec<Spans<'static>> {
    let message = if outcome.won { "Board cleared!" } else { "You hit a mine." };
    let mut lines = vec![
        Spans::from(Span::raw(message)),
        Spans::from(Span::raw(format!("Score: {}", outcome.final_score))),
    ];
    if outcome.final_score > 0 && outcome.final_score == store.high_score() {
        lines.push(Spans::from(Span::styled("New high score!", Style::default().add_modifier(Modifier::BOLD))));
    }
    lines.push(Spans::from(Span::raw("")));
    lines.push(Spans::from(Span::raw("Esc to quit, any other key for a new game")));
    lines
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mns_board::Board;
    use crate::mns_game::Stopwatch;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn overdue(outcome: GameOver) -> Option<(GameOver, Instant)> {
        Some((outcome, Instant::now() - REPORT_DELAY * 2))
    }

    fn session() -> GameSession {
        GameSession::with_board(Board::from_mines(8, 8, &[(0, 0)]), Stopwatch::start())
    }

    #[test]
    fn cursor_stays_on_board() {
        let game = session();
        let mut ui = UiState::new(Palette::for_theme(Default::default()));
        ui.step_cursor(&game, -1, -1);
        assert_eq!(ui.cursor, (0, 0));
        for _ in 0..20 {
            ui.step_cursor(&game, 1, 1);
        }
        assert_eq!(ui.cursor, (7, 7));
    }

    #[test]
    fn mouse_position_maps_to_cell() {
        let game = session();
        let mut ui = UiState::new(Palette::for_theme(Default::default()));
        ui.board_rect = Some(Rect::new(10, 5, 19, 10));
        assert_eq!(ui.cell_at(&game, 11, 6), Some((0, 0)));
        assert_eq!(ui.cell_at(&game, 14, 8), Some((2, 1)));
        assert_eq!(ui.cell_at(&game, 10, 6), None);
        assert_eq!(ui.cell_at(&game, 11, 5), None);
    }

    #[test]
    fn ended_event_schedules_report() {
        let mut ui = UiState::new(Palette::for_theme(Default::default()));
        apply(GameEvent::Revealed { count: 3 }, &mut ui);
        assert!(ui.pending_report.is_none());
        let outcome = GameOver { won: false, final_score: 3 };
        apply(GameEvent::Ended(outcome), &mut ui);
        assert_eq!(ui.pending_report.map(|(o, _)| o), Some(outcome));
    }

    #[test]
    fn flush_report_appends_once() {
        let mut store = ConfigStore::in_memory(Default::default());
        let mut ui = UiState::new(Palette::for_theme(Default::default()));
        apply(GameEvent::Ended(GameOver { won: true, final_score: 1005 }), &mut ui);
        flush_report(&mut ui, &mut store);
        flush_report(&mut ui, &mut store);
        assert_eq!(store.history(), vec![1005]);
    }

    #[test]
    fn report_waits_for_delay() {
        let mut store = ConfigStore::in_memory(Default::default());
        let mut ui = UiState::new(Palette::for_theme(Default::default()));
        apply(GameEvent::Ended(GameOver { won: false, final_score: 4 }), &mut ui);
        poll_report(&mut ui, &mut store);
        assert!(store.history().is_empty());
        assert_eq!(ui.modal, None);

        ui.pending_report = overdue(GameOver { won: false, final_score: 4 });
        poll_report(&mut ui, &mut store);
        assert_eq!(store.history(), vec![4]);
        assert_eq!(ui.modal, Some(Modal::Result(GameOver { won: false, final_score: 4 })));
    }

    #[test]
    fn report_keeps_open_dialog() {
        let mut store = ConfigStore::in_memory(Default::default());
        let mut ui = UiState::new(Palette::for_theme(Default::default()));
        ui.modal = Some(Modal::Difficulty(1));
        ui.pending_report = overdue(GameOver { won: true, final_score: 1002 });
        poll_report(&mut ui, &mut store);
        assert_eq!(store.history(), vec![1002]);
        assert_eq!(ui.modal, Some(Modal::Difficulty(1)));
        assert!(ui.pending_report.is_none());
    }

    #[test]
    fn result_dialog_esc_exits_other_keys_restart() {
        let mut store = ConfigStore::in_memory(Default::default());
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = session();
        let mut ui = UiState::new(Palette::for_theme(Default::default()));
        let outcome = GameOver { won: false, final_score: 0 };

        ui.modal = Some(Modal::Result(outcome));
        assert!(!handle_key(key(KeyCode::Esc), &mut game, &mut store, &mut ui, &mut rng));

        game.activate(0, 0);
        assert_eq!(game.phase(), Phase::Lost);
        assert!(handle_key(key(KeyCode::Enter), &mut game, &mut store, &mut ui, &mut rng));
        assert_eq!(ui.modal, None);
        assert_eq!(game.phase(), Phase::InProgress);
    }
}

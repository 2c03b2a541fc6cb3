//! tetris3d - terminal front end
//!
//! Keyboard and mouse drive the engine; the mouse behaves like a touch
//! screen (click to rotate, drag to slide, drag down to soft drop, flick
//! down to hard drop).

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};
use tetris3d::gesture::{GestureMapper, PointerTracker};
use tetris3d::input::{Action, InputHandler};
use tetris3d::settings::Settings;
use tetris3d::{ui, Game, GameEvent};
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Mouse thresholds in terminal rows: a terminal row is far coarser than
/// a touch screen point
const SOFT_DROP_ROWS: f32 = 2.0;
const HARD_DROP_ROWS_PER_SEC: f32 = 30.0;

/// Get the tetris3d temp directory, creating it if needed
fn temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("tetris3d");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file; the terminal belongs to the UI
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tetris3d=debug")),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "tetris3d starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let mut settings = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    if let Ok(game) = &result {
        println!("\nThanks for playing!");
        println!("Final Score: {}", game.score());
        println!("Level: {} | Rows: {}", game.level(), game.rows_cleared());
    }

    result.map(|_| ())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &mut Settings,
) -> io::Result<Game> {
    let config = settings.gameplay.game_config();
    let mut game = match settings.gameplay.seed {
        Some(seed) => Game::with_seed(config, seed),
        None => Game::new(config),
    };
    let mut input = InputHandler::from_settings(settings);
    let mut pointer = PointerTracker::new(0.0);
    let mut gestures = GestureMapper::with_thresholds(1.0, SOFT_DROP_ROWS, HARD_DROP_ROWS_PER_SEC);
    let mut last_tick = Instant::now();

    loop {
        let snapshot = game.snapshot();
        terminal.draw(|frame| ui::render_game(frame, &snapshot, &settings.high_scores))?;

        if event::poll(FRAME_DURATION)? {
            let actions = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Release => input.key_up(key),
                Event::Key(key) => input.key_down(key),
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let board = ui::board_area(Rect::new(0, 0, size.width, size.height));
                    gestures.set_view_width(ui::pan_view_width(board));
                    handle_mouse(&mut pointer, &mut gestures, &game, mouse, board)
                }
                _ => Vec::new(),
            };
            if handle_actions(&mut game, &mut input, actions) {
                return Ok(game);
            }
        }

        let repeats = input.update();
        if handle_actions(&mut game, &mut input, repeats) {
            return Ok(game);
        }

        let now = Instant::now();
        game.tick(now.duration_since(last_tick));
        last_tick = now;

        for event in game.take_events() {
            if let GameEvent::GameOver { score } = event {
                save_high_score(score, settings);
            }
        }
    }
}

/// Apply input actions; returns true when the player quits
fn handle_actions(game: &mut Game, input: &mut InputHandler, actions: Vec<Action>) -> bool {
    for action in actions {
        match action {
            Action::Command(command) => game.apply_command(command),
            Action::NewGame => {
                input.clear();
                game.new_game();
            }
            Action::Quit => return true,
        }
    }
    false
}

/// Left-button mouse input, treated as touch gestures over the board
fn handle_mouse(
    pointer: &mut PointerTracker,
    gestures: &mut GestureMapper,
    game: &Game,
    mouse: MouseEvent,
    board: Rect,
) -> Vec<Action> {
    let (x, y) = (mouse.column as f32, mouse.row as f32);
    let now = Instant::now();
    let raw = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let inside = mouse.column >= board.x
                && mouse.column < board.x + board.width
                && mouse.row >= board.y
                && mouse.row < board.y + board.height;
            if inside {
                pointer.press(x, y, now);
            }
            Vec::new()
        }
        MouseEventKind::Drag(MouseButton::Left) => pointer.drag(x, y, now),
        MouseEventKind::Up(MouseButton::Left) => pointer.release(x, y, now),
        _ => Vec::new(),
    };

    let piece_x = game.falling_piece().map(|piece| piece.origin().x);
    raw.into_iter()
        .flat_map(|gesture| gestures.map(gesture, piece_x))
        .map(Action::Command)
        .collect()
}

fn save_high_score(score: u64, settings: &mut Settings) {
    match settings.record_score(score) {
        Some(rank) => {
            tracing::info!("High score {} at rank {}", score, rank + 1);
            if let Err(e) = settings.save() {
                tracing::warn!("Could not save high scores: {}", e);
            }
        }
        None => tracing::debug!("Score {} did not place", score),
    }
}

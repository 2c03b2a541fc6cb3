//! Core game state and logic
//!
//! `Game` owns the board and the falling piece. Callers enqueue commands
//! with `apply_command` and advance time with `tick`; all mutation happens
//! inside `tick`, in a fixed order.

use crate::bag::{RandomShapes, ShapeSource};
use crate::board::{Board, Cell};
use crate::collision::{self, find_rotation, is_blocked_on, Side};
use crate::piece::Piece;
use crate::score::{self, Score};
use crate::tetromino::ShapeKind;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, info};

/// A piece locking with its top row at or above this row ends the game
pub const LOCK_OUT_ROW: i32 = 19;

/// Pause between a lock and the next spawn
pub const DEFAULT_RESPAWN_DELAY: Duration = Duration::from_millis(300);

/// Soft drop speed, in NES frames per cell
pub const SOFT_DROP_FRAMES: u32 = 3;

/// Engine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Spawning,
    Falling,
    Locking,
    RowClear,
    GameOver,
}

/// Input commands the game can process
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    /// Slide toward the column containing `x` (board units)
    MoveTo { x: f32 },
    /// Quarter turn counter-clockwise
    Rotate,
    RotateClockwise,
    SoftDropStart,
    SoftDropStop,
    HardDrop,
}

impl Command {
    /// Position in the per-tick processing order
    fn stage(&self) -> u8 {
        match self {
            Command::Rotate | Command::RotateClockwise => 0,
            Command::MoveLeft | Command::MoveRight | Command::MoveTo { .. } => 1,
            Command::SoftDropStart | Command::SoftDropStop => 2,
            Command::HardDrop => 3,
        }
    }

    fn is_soft_drop(&self) -> bool {
        matches!(self, Command::SoftDropStart | Command::SoftDropStop)
    }
}

/// Notifications for read-only collaborators (HUD, sound, persistence)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    Spawned { kind: ShapeKind },
    Locked { kind: ShapeKind, cells: Vec<Cell> },
    RowsCleared { rows: usize, points: u64 },
    LevelUp { level: u32 },
    GameOver { score: u64 },
}

/// Tunable timings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub respawn_delay: Duration,
    pub soft_drop_interval: Duration,
    pub starting_level: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            respawn_delay: DEFAULT_RESPAWN_DELAY,
            soft_drop_interval: score::frames(SOFT_DROP_FRAMES),
            starting_level: 0,
        }
    }
}

/// Everything a renderer needs after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub occupied: Vec<(Cell, ShapeKind)>,
    pub falling: Vec<Cell>,
    pub falling_kind: Option<ShapeKind>,
    pub score: u64,
    pub level: u32,
    pub rows_this_level: u32,
    pub rows: u32,
    pub fall_interval_secs: f64,
    pub game_over: bool,
    pub phase: Phase,
}

/// The main game struct
pub struct Game {
    board: Board,
    /// Current falling piece
    piece: Option<Piece>,
    score: Score,
    phase: Phase,
    config: GameConfig,
    shapes: Box<dyn ShapeSource>,
    /// Commands waiting for the next tick
    pending: VecDeque<Command>,
    /// Time banked toward the next gravity step
    fall_timer: Duration,
    /// Time spent waiting to spawn
    spawn_timer: Duration,
    soft_drop: bool,
    events: Vec<GameEvent>,
}

impl Game {
    /// Create a game with an unpredictable piece sequence
    pub fn new(config: GameConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Create a game whose pieces follow `seed`
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_source(config, Box::new(RandomShapes::seeded(seed)))
    }

    pub fn with_source(config: GameConfig, shapes: Box<dyn ShapeSource>) -> Self {
        let mut game = Self {
            board: Board::new(),
            piece: None,
            score: Score::new(),
            phase: Phase::Spawning,
            config,
            shapes,
            pending: VecDeque::new(),
            fall_timer: Duration::ZERO,
            spawn_timer: Duration::ZERO,
            soft_drop: false,
            events: Vec::new(),
        };
        game.new_game();
        game
    }

    /// Clear the board and score, then spawn the first piece
    pub fn new_game(&mut self) {
        self.board.reset();
        self.score = Score::new();
        self.score.level = self.config.starting_level;
        self.piece = None;
        self.pending.clear();
        self.events.clear();
        self.fall_timer = Duration::ZERO;
        self.spawn_timer = Duration::ZERO;
        self.soft_drop = false;
        info!("New game at level {}", self.score.level);
        self.spawn();
    }

    /// Queue a command for the next tick
    pub fn apply_command(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    /// Advance the simulation by `elapsed`
    pub fn tick(&mut self, elapsed: Duration) {
        match self.phase {
            Phase::GameOver => self.pending.clear(),
            Phase::Spawning => {
                self.drain_while_spawning();
                self.spawn_timer = self.spawn_timer.saturating_add(elapsed);
                if self.spawn_timer >= self.config.respawn_delay {
                    self.spawn();
                }
            }
            Phase::Falling => self.step(elapsed),
            // Only held mid-tick
            Phase::Locking | Phase::RowClear => {}
        }
    }

    /// Without a piece only the soft drop state carries over
    fn drain_while_spawning(&mut self) {
        for command in self.pending.drain(..).filter(Command::is_soft_drop) {
            self.soft_drop = command == Command::SoftDropStart;
        }
    }

    fn step(&mut self, elapsed: Duration) {
        let mut commands: Vec<Command> = self.pending.drain(..).collect();
        commands.sort_by_key(Command::stage);

        let mut hard_drop = false;
        for command in commands {
            match command {
                Command::Rotate => self.rotate(1),
                Command::RotateClockwise => self.rotate(-1),
                Command::MoveLeft => self.shift(Side::Left),
                Command::MoveRight => self.shift(Side::Right),
                Command::MoveTo { x } => self.move_toward(x),
                Command::SoftDropStart => self.soft_drop = true,
                Command::SoftDropStop => self.soft_drop = false,
                Command::HardDrop => hard_drop = true,
            }
        }

        if hard_drop {
            self.hard_drop();
            return;
        }

        self.fall_timer = self.fall_timer.saturating_add(elapsed);
        while self.phase == Phase::Falling {
            let interval = self.current_interval();
            if self.fall_timer < interval {
                break;
            }
            self.fall_timer -= interval;
            self.gravity_step();
        }
    }

    /// True while soft drop is held and actually beats normal gravity
    fn soft_drop_forced(&self) -> bool {
        self.soft_drop && self.config.soft_drop_interval < self.score.fall_interval()
    }

    fn current_interval(&self) -> Duration {
        let interval = if self.soft_drop_forced() {
            self.config.soft_drop_interval
        } else {
            self.score.fall_interval()
        };
        interval.max(Duration::from_micros(1))
    }

    fn gravity_step(&mut self) {
        let forced = self.soft_drop_forced();
        let Some(piece) = self.piece.as_mut() else {
            return;
        };

        if !is_blocked_on(piece, &self.board, Side::Bottom) {
            piece.translate(0, -1);
            if forced {
                self.score.add_soft_drop(1);
            }
        } else {
            self.lock_piece();
        }
    }

    fn rotate(&mut self, delta: i32) {
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        if let Some(nudge) = find_rotation(piece, &self.board, delta) {
            piece.translate(nudge, 0);
            piece.rotate(delta);
        }
    }

    fn shift(&mut self, side: Side) {
        if let Some(piece) = self.piece.as_mut() {
            if !is_blocked_on(piece, &self.board, side) {
                piece.translate(side.step().0, 0);
            }
        }
    }

    /// Step one column at a time toward `x`, stopping at the first obstacle
    fn move_toward(&mut self, x: f32) {
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        let target = x.floor() as i32;
        while piece.pivot().col != target {
            let side = if target < piece.pivot().col {
                Side::Left
            } else {
                Side::Right
            };
            if is_blocked_on(piece, &self.board, side) {
                break;
            }
            piece.translate(side.step().0, 0);
        }
    }

    fn hard_drop(&mut self) {
        let Some(piece) = self.piece.as_mut() else {
            return;
        };
        let mut distance = 0;
        while !is_blocked_on(piece, &self.board, Side::Bottom) {
            piece.translate(0, -1);
            distance += 1;
        }
        self.score.add_hard_drop(distance);
        self.lock_piece();
    }

    /// Lock the current piece, clear rows and queue the next spawn
    fn lock_piece(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        self.phase = Phase::Locking;

        if let Err(err) = self.board.lock(&piece) {
            if cfg!(debug_assertions) {
                panic!("{:?} piece locked onto the stack: {}", piece.kind(), err);
            }
            error!("{:?} piece locked onto the stack: {}; starting over", piece.kind(), err);
            self.new_game();
            return;
        }

        let cells = piece.cells().to_vec();
        debug!("Locked {:?} at {:?}", piece.kind(), cells);
        self.events.push(GameEvent::Locked {
            kind: piece.kind(),
            cells,
        });

        self.phase = Phase::RowClear;
        let rows = self.board.clear_full_rows();
        if rows > 0 {
            let outcome = self.score.add_rows_cleared(rows);
            debug!("Cleared {} rows for {} points", rows, outcome.points);
            self.events.push(GameEvent::RowsCleared {
                rows,
                points: outcome.points,
            });
            if outcome.leveled_up {
                info!("Level up to {}", self.score.level);
                self.events.push(GameEvent::LevelUp {
                    level: self.score.level,
                });
            }
        }

        if piece.top_row() >= LOCK_OUT_ROW {
            self.game_over("lock out");
            return;
        }

        self.phase = Phase::Spawning;
        self.spawn_timer = Duration::ZERO;
        if self.config.respawn_delay.is_zero() {
            self.spawn();
        }
    }

    fn spawn(&mut self) {
        let kind = self.shapes.next_shape();
        let piece = Piece::spawn(kind);
        self.fall_timer = Duration::ZERO;
        self.spawn_timer = Duration::ZERO;

        if !collision::fits(&self.board, &piece.cells()) {
            self.game_over("block out");
            return;
        }

        debug!("Spawned {:?}", kind);
        self.events.push(GameEvent::Spawned { kind });
        self.piece = Some(piece);
        self.phase = Phase::Falling;
    }

    fn game_over(&mut self, reason: &str) {
        info!("Game over ({}) with {} points", reason, self.score.points);
        self.phase = Phase::GameOver;
        self.piece = None;
        self.pending.clear();
        self.soft_drop = false;
        self.events.push(GameEvent::GameOver {
            score: self.score.points,
        });
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for scenario setup
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn falling_piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    pub fn occupied_cells(&self) -> Vec<(Cell, ShapeKind)> {
        self.board.occupied_cells()
    }

    pub fn falling_piece_cells(&self) -> Vec<Cell> {
        self.piece
            .as_ref()
            .map(|piece| piece.cells().to_vec())
            .unwrap_or_default()
    }

    pub fn score(&self) -> u64 {
        self.score.points
    }

    pub fn level(&self) -> u32 {
        self.score.level
    }

    pub fn rows_cleared_this_level(&self) -> u32 {
        self.score.rows_this_level
    }

    pub fn rows_cleared(&self) -> u32 {
        self.score.rows
    }

    /// Normal gravity interval at the current level
    pub fn fall_interval(&self) -> Duration {
        self.score.fall_interval()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Events raised since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            occupied: self.occupied_cells(),
            falling: self.falling_piece_cells(),
            falling_kind: self.piece.as_ref().map(Piece::kind),
            score: self.score.points,
            level: self.score.level,
            rows_this_level: self.score.rows_this_level,
            rows: self.score.rows,
            fall_interval_secs: self.fall_interval().as_secs_f64(),
            game_over: self.is_game_over(),
            phase: self.phase,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

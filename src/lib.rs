//! Falling-block puzzle engine
//!
//! The simulation lives in `board`, `piece`, `collision`, `score` and
//! `game`; everything else is a thin collaborator around a `Game`'s
//! commands and snapshots.

pub mod bag;
pub mod board;
pub mod collision;
pub mod game;
pub mod gesture;
pub mod highscores;
pub mod input;
pub mod piece;
pub mod score;
pub mod settings;
pub mod tetromino;
pub mod ui;

pub use game::{Command, Game, GameConfig, GameEvent, Phase, Snapshot};

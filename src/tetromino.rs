//! Tetromino definitions and rotation geometry
//!
//! Every shape is four cells laid out around a pivot. Rotated layouts are not
//! tabulated: they are derived by turning the base offsets a quarter turn
//! counter-clockwise about the pivot, `(x, y) -> (-y, x)`, and snapping the
//! result back onto the integer grid.

use crate::board::Cell;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The 7 tetromino kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    I, // long bar
    J, // hook on the left
    L, // hook on the right
    O, // square
    S,
    T,
    Z,
}

impl ShapeKind {
    /// Get all kinds, in declaration order
    pub fn all() -> [ShapeKind; 7] {
        [
            ShapeKind::I,
            ShapeKind::J,
            ShapeKind::L,
            ShapeKind::O,
            ShapeKind::S,
            ShapeKind::T,
            ShapeKind::Z,
        ]
    }

    /// Draw a kind uniformly from `rng`
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> ShapeKind {
        let all = Self::all();
        all[rng.gen_range(0..all.len())]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::I => "I",
            ShapeKind::J => "J",
            ShapeKind::L => "L",
            ShapeKind::O => "O",
            ShapeKind::S => "S",
            ShapeKind::T => "T",
            ShapeKind::Z => "Z",
        }
    }

    /// Offsets at rotation 0, relative to the pivot cell.
    /// Row increases upward, col increases rightward.
    pub fn offsets(&self) -> [Cell; 4] {
        let xy: [(i32, i32); 4] = match self {
            ShapeKind::I => [(-1, 0), (0, 0), (1, 0), (2, 0)],
            ShapeKind::J => [(-1, 0), (0, 0), (1, 0), (-1, 1)],
            ShapeKind::L => [(-1, 0), (0, 0), (1, 0), (1, 1)],
            ShapeKind::O => [(0, 0), (1, 0), (0, 1), (1, 1)],
            // .SS
            // SS.
            ShapeKind::S => [(-1, 0), (0, 0), (0, 1), (1, 1)],
            ShapeKind::T => [(-1, 0), (0, 0), (1, 0), (0, 1)],
            // ZZ.
            // .ZZ
            ShapeKind::Z => [(0, 0), (1, 0), (-1, 1), (0, 1)],
        };
        xy.map(|(x, y)| Cell::new(y, x))
    }

    /// Rotation center as (x, y) in offset space.
    ///
    /// I and O turn about a grid corner so their rotations stay on whole
    /// cells; the rest turn about their origin block.
    fn pivot(&self) -> (f32, f32) {
        match self {
            ShapeKind::I => (0.5, -0.5),
            ShapeKind::O => (0.5, 0.5),
            _ => (0.0, 0.0),
        }
    }

    /// Offsets after turning the base layout to `rotation`
    pub fn rotated_offsets(&self, rotation: Rotation) -> [Cell; 4] {
        let (px, py) = self.pivot();
        let mut cells = self.offsets();
        for _ in 0..rotation.quarter_turns() {
            cells = cells.map(|cell| {
                let dx = cell.col as f32 - px;
                let dy = cell.row as f32 - py;
                Cell::new((py + dx).round() as i32, (px - dy).round() as i32)
            });
        }
        cells
    }
}

/// Rotation state, counter-clockwise from the spawn orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn quarter_turns(&self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Wraps modulo 4, so negative turns count clockwise
    pub fn from_quarter_turns(turns: i32) -> Rotation {
        match turns.rem_euclid(4) {
            0 => Rotation::Deg0,
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            _ => Rotation::Deg270,
        }
    }

    /// Turn by `delta` quarter turns (positive = counter-clockwise)
    pub fn turned(&self, delta: i32) -> Rotation {
        Self::from_quarter_turns(self.quarter_turns() as i32 + delta)
    }

    pub fn degrees(&self) -> u16 {
        self.quarter_turns() as u16 * 90
    }
}

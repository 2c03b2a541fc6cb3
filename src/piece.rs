//! The falling piece
//!
//! Position is kept in continuous board units so callers can aim at
//! fractional targets (a pan gesture, say). Cell `(row, col)` covers
//! `[col, col + 1) x [row, row + 1)`; every mutation snaps the origin back to
//! a cell center, so the stored coordinates always sit on `k + 0.5`.

use crate::board::Cell;
use crate::tetromino::{Rotation, ShapeKind};
use serde::Serialize;

/// Pivot cell every new piece appears at: top-center of the interior
pub const SPAWN_ROW: i32 = 19;
pub const SPAWN_COL: i32 = 5;

/// Continuous position of the pivot block's center
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Origin {
    pub x: f32,
    pub y: f32,
}

impl Origin {
    pub fn at_cell(cell: Cell) -> Self {
        Self {
            x: cell.col as f32 + 0.5,
            y: cell.row as f32 + 0.5,
        }
    }

    /// The cell containing this point
    pub fn cell(&self) -> Cell {
        Cell::new(self.y.floor() as i32, self.x.floor() as i32)
    }

    pub fn snapped(&self) -> Self {
        Self::at_cell(self.cell())
    }
}

/// An active falling piece
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    kind: ShapeKind,
    origin: Origin,
    rotation: Rotation,
}

impl Piece {
    /// Create a new piece at the spawn cell
    pub fn spawn(kind: ShapeKind) -> Self {
        Self::at(kind, Cell::new(SPAWN_ROW, SPAWN_COL), Rotation::Deg0)
    }

    pub fn at(kind: ShapeKind, pivot: Cell, rotation: Rotation) -> Self {
        Self {
            kind,
            origin: Origin::at_cell(pivot),
            rotation,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// The cell holding the pivot block
    pub fn pivot(&self) -> Cell {
        self.origin.cell()
    }

    /// Get the absolute cells of all 4 blocks
    pub fn cells(&self) -> [Cell; 4] {
        self.cells_after(0, 0, 0)
    }

    /// Cells the piece would cover after shifting by (dx, dy) and turning
    /// `rotation_delta` quarter turns
    pub fn cells_after(&self, dx: i32, dy: i32, rotation_delta: i32) -> [Cell; 4] {
        let pivot = self.pivot().offset(dy, dx);
        self.kind
            .rotated_offsets(self.rotation.turned(rotation_delta))
            .map(|offset| pivot + offset)
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.origin = Origin {
            x: self.origin.x + dx as f32,
            y: self.origin.y + dy as f32,
        }
        .snapped();
    }

    pub fn rotate(&mut self, delta: i32) {
        self.rotation = self.rotation.turned(delta);
        self.origin = self.origin.snapped();
    }

    pub fn top_row(&self) -> i32 {
        self.cells().iter().map(|cell| cell.row).max().unwrap_or(self.pivot().row)
    }

    pub fn bottom_row(&self) -> i32 {
        self.cells().iter().map(|cell| cell.row).min().unwrap_or(self.pivot().row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_centered(value: f32) -> bool {
        (value - value.floor() - 0.5).abs() < f32::EPSILON
    }

    #[test]
    fn test_spawn_position() {
        let piece = Piece::spawn(ShapeKind::O);
        assert_eq!(piece.pivot(), Cell::new(SPAWN_ROW, SPAWN_COL));
        assert_eq!(piece.origin(), Origin { x: 5.5, y: 19.5 });
        assert_eq!(piece.top_row(), 20);
        assert_eq!(piece.bottom_row(), 19);
    }

    #[test]
    fn test_cells_follow_translation() {
        let mut piece = Piece::spawn(ShapeKind::T);
        let before = piece.cells();
        piece.translate(-2, -3);
        let after = piece.cells();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.offset(-3, -2), *b);
        }
    }

    #[test]
    fn test_cells_after_does_not_move_piece() {
        let piece = Piece::spawn(ShapeKind::L);
        let preview = piece.cells_after(1, -1, 1);
        let mut moved = piece.clone();
        moved.translate(1, -1);
        moved.rotate(1);
        assert_eq!(preview, moved.cells());
        assert_eq!(piece.pivot(), Cell::new(SPAWN_ROW, SPAWN_COL));
    }

    #[test]
    fn test_origin_cell_contains_point() {
        let origin = Origin { x: 8.93, y: 3.01 };
        assert_eq!(origin.cell(), Cell::new(3, 8));
        let snapped = origin.snapped();
        assert!(is_centered(snapped.x));
        assert!(is_centered(snapped.y));
        assert_eq!(snapped.cell(), origin.cell());
    }

    #[test]
    fn test_origin_stays_centered_through_moves() {
        let mut piece = Piece::spawn(ShapeKind::Z);
        piece.translate(1, 0);
        piece.rotate(-1);
        piece.translate(0, -4);
        piece.translate(-4, 0);
        assert!(is_centered(piece.origin().x));
        assert!(is_centered(piece.origin().y));
        assert_eq!(piece.pivot(), Cell::new(15, 2));
    }
}

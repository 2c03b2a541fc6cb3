//! Game board representation
//!
//! The grid includes its own frame: row 0, the top row and both outer
//! columns are permanent wall squares, so every occupancy question is a
//! plain array lookup.

use crate::piece::Piece;
use crate::tetromino::ShapeKind;
use serde::Serialize;
use thiserror::Error;

/// Board dimensions, frame included
pub const ROWS: usize = 22;
pub const COLS: usize = 12;
/// Interior bounds (inclusive)
pub const FIRST_ROW: i32 = 1;
pub const LAST_ROW: i32 = ROWS as i32 - 2;
pub const FIRST_COL: i32 = 1;
pub const LAST_COL: i32 = COLS as i32 - 2;

/// A grid coordinate. Row 0 is the bottom, col 0 the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

impl std::ops::Add for Cell {
    type Output = Cell;

    fn add(self, rhs: Cell) -> Cell {
        self.offset(rhs.row, rhs.col)
    }
}

/// What sits in a grid square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Square {
    #[default]
    Empty,
    Wall,
    Block(ShapeKind),
}

impl Square {
    pub fn is_empty(&self) -> bool {
        matches!(self, Square::Empty)
    }

    pub fn is_occupied(&self) -> bool {
        !self.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    #[error("cell ({}, {}) is already occupied", .0.row, .0.col)]
    Occupied(Cell),
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is bottom, row increases upward
    squares: [[Square; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with its frame in place
    pub fn new() -> Self {
        let mut board = Self {
            squares: [[Square::Empty; COLS]; ROWS],
        };
        board.reset();
        board
    }

    /// Clear every interior square and rebuild the frame
    pub fn reset(&mut self) {
        for (row, squares) in self.squares.iter_mut().enumerate() {
            *squares = if row == 0 || row == ROWS - 1 {
                [Square::Wall; COLS]
            } else {
                Self::empty_row()
            };
        }
    }

    fn empty_row() -> [Square; COLS] {
        let mut row = [Square::Empty; COLS];
        row[0] = Square::Wall;
        row[COLS - 1] = Square::Wall;
        row
    }

    fn index(cell: Cell) -> Option<(usize, usize)> {
        let row = usize::try_from(cell.row).ok()?;
        let col = usize::try_from(cell.col).ok()?;
        (row < ROWS && col < COLS).then_some((row, col))
    }

    /// Get the square at a cell.
    /// Returns None if out of bounds
    pub fn get(&self, cell: Cell) -> Option<Square> {
        Self::index(cell).map(|(row, col)| self.squares[row][col])
    }

    /// Overwrite an interior square. The frame cannot be edited, so this
    /// returns false for frame or out-of-bounds cells.
    pub fn set(&mut self, cell: Cell, square: Square) -> bool {
        if !Self::is_interior(cell) || square == Square::Wall {
            return false;
        }
        match Self::index(cell) {
            Some((row, col)) => {
                self.squares[row][col] = square;
                true
            }
            None => false,
        }
    }

    pub fn is_interior(cell: Cell) -> bool {
        (FIRST_ROW..=LAST_ROW).contains(&cell.row) && (FIRST_COL..=LAST_COL).contains(&cell.col)
    }

    /// True for frame cells, locked blocks and anything off the grid
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.get(cell).is_none_or(|square| square.is_occupied())
    }

    /// Commit a piece's cells. Either all four land or none do.
    pub fn lock(&mut self, piece: &Piece) -> Result<(), LockError> {
        let cells = piece.cells();
        if let Some(&taken) = cells.iter().find(|&&cell| self.is_occupied(cell)) {
            return Err(LockError::Occupied(taken));
        }
        for cell in cells {
            self.set(cell, Square::Block(piece.kind()));
        }
        Ok(())
    }

    /// Check if an interior row is completely filled
    pub fn is_row_full(&self, row: i32) -> bool {
        (FIRST_COL..=LAST_COL).all(|col| self.is_occupied(Cell::new(row, col)))
    }

    /// Remove every full interior row at once and drop the rows above by
    /// the number of removed rows beneath them. Returns the count removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut write_row = FIRST_ROW as usize;

        for read_row in FIRST_ROW as usize..=LAST_ROW as usize {
            if self.is_row_full(read_row as i32) {
                cleared += 1;
                continue;
            }
            if write_row != read_row {
                self.squares[write_row] = self.squares[read_row];
            }
            write_row += 1;
        }

        for row in write_row..=LAST_ROW as usize {
            self.squares[row] = Self::empty_row();
        }

        cleared
    }

    /// Locked blocks with their shape tags, bottom row first
    pub fn occupied_cells(&self) -> Vec<(Cell, ShapeKind)> {
        let mut cells = Vec::new();
        for row in FIRST_ROW..=LAST_ROW {
            for col in FIRST_COL..=LAST_COL {
                let cell = Cell::new(row, col);
                if let Some(Square::Block(kind)) = self.get(cell) {
                    cells.push((cell, kind));
                }
            }
        }
        cells
    }

    /// Check if the interior holds no blocks
    pub fn is_empty(&self) -> bool {
        self.occupied_cells().is_empty()
    }
}

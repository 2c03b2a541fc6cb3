//! Scoring system following the classic NES rules
//!
//! Row clears pay `ROW_REMOVAL_POINTS[n - 1] * (level + 1)`, every ten rows
//! raise the level, and gravity speeds up along the NES frames-per-cell
//! table.

use serde::Serialize;
use std::time::Duration;

/// Points for clearing 1, 2, 3 or 4 rows at level 0
pub const ROW_REMOVAL_POINTS: [u64; 4] = [40, 100, 300, 1200];

/// Frames a piece waits per cell of descent, indexed by level (29 and up
/// share the last entry)
pub const FRAMES_PER_GRIDCELL: [u32; 30] = [
    48, 43, 38, 33, 28, 23, 18, 13, 8, 6, 5, 5, 5, 4, 4, 4, 3, 3, 3, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2,
    1,
];

/// NTSC NES frame rate
pub const FRAMES_PER_SECOND: f64 = 60.0988;

pub const ROWS_PER_LEVEL: u32 = 10;

/// Convert a frame count at NES speed into wall-clock time
pub fn frames(count: u32) -> Duration {
    Duration::from_secs_f64(count as f64 / FRAMES_PER_SECOND)
}

/// What a single row-clear event changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearOutcome {
    pub points: u64,
    pub leveled_up: bool,
}

/// Scoring calculation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level
    pub level: u32,
    /// Rows cleared since the last level up, always below `ROWS_PER_LEVEL`
    pub rows_this_level: u32,
    /// Total rows cleared
    pub rows: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points a clear of `rows` rows is worth at `level`
    pub fn row_clear_points(rows: usize, level: u32) -> u64 {
        match rows.checked_sub(1).and_then(|i| ROW_REMOVAL_POINTS.get(i)) {
            Some(&base) => base * (level as u64 + 1),
            None => 0,
        }
    }

    /// Score a row clear at the current level, then advance the level.
    ///
    /// The counter carries any rows past the boundary into the next level,
    /// and one clear event raises the level at most once.
    pub fn add_rows_cleared(&mut self, rows: usize) -> ClearOutcome {
        if rows == 0 {
            return ClearOutcome::default();
        }

        let points = Self::row_clear_points(rows, self.level);
        self.points += points;
        self.rows += rows as u32;

        let counted = self.rows_this_level + rows as u32;
        let leveled_up = counted >= ROWS_PER_LEVEL;
        if leveled_up {
            self.level += 1;
        }
        self.rows_this_level = counted % ROWS_PER_LEVEL;

        ClearOutcome { points, leveled_up }
    }

    /// Add score for soft drop (1 point per cell)
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += cells as u64;
    }

    /// Add score for hard drop (2 points per cell)
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += cells as u64 * 2;
    }

    /// Gravity interval at the current level
    pub fn fall_interval(&self) -> Duration {
        Self::fall_interval_for(self.level)
    }

    pub fn fall_interval_for(level: u32) -> Duration {
        let index = (level as usize).min(FRAMES_PER_GRIDCELL.len() - 1);
        frames(FRAMES_PER_GRIDCELL[index])
    }
}

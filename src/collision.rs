//! Placement legality
//!
//! Every question is answered by looking up the candidate cells on the
//! board grid; a pose is legal when none of its four cells is occupied.
//! Rotation adds a horizontal wall-kick search on top of that.

use crate::board::{Board, Cell};
use crate::piece::Piece;

/// A side of the falling piece, for contact queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Unit step (dx, dy) toward this side
    pub fn step(&self) -> (i32, i32) {
        match self {
            Side::Left => (-1, 0),
            Side::Right => (1, 0),
            Side::Top => (0, 1),
            Side::Bottom => (0, -1),
        }
    }
}

/// Check that none of `cells` is occupied
pub fn fits(board: &Board, cells: &[Cell]) -> bool {
    cells.iter().all(|&cell| !board.is_occupied(cell))
}

/// Whether the piece could stand shifted by (dx, dy) and turned
/// `rotation_delta` quarter turns, without any kick
pub fn can_place(piece: &Piece, board: &Board, dx: i32, dy: i32, rotation_delta: i32) -> bool {
    fits(board, &piece.cells_after(dx, dy, rotation_delta))
}

/// Whether a one-cell step toward `side` is blocked
pub fn is_blocked_on(piece: &Piece, board: &Board, side: Side) -> bool {
    let (dx, dy) = side.step();
    !can_place(piece, board, dx, dy, 0)
}

/// Find a legal way to turn the piece `rotation_delta` quarter turns.
///
/// Returns the horizontal nudge to apply along with the turn: 0 when the
/// rotation fits in place, otherwise the smallest kick that works, trying
/// right before left at each distance, out to the rotated piece's width.
/// A blocked rotation of a piece whose only contacts lie below its
/// vertical center is refused outright; sliding sideways cannot clear a
/// floor.
pub fn find_rotation(piece: &Piece, board: &Board, rotation_delta: i32) -> Option<i32> {
    let rotated = piece.cells_after(0, 0, rotation_delta);
    if fits(board, &rotated) {
        return Some(0);
    }
    if is_floor_wedge(piece, board) {
        return None;
    }

    let min_col = rotated.iter().map(|cell| cell.col).min()?;
    let max_col = rotated.iter().map(|cell| cell.col).max()?;
    let width = max_col - min_col + 1;

    (1..=width)
        .flat_map(|distance| [distance, -distance])
        .find(|&dx| can_place(piece, board, dx, 0, rotation_delta))
}

/// Occupied cells orthogonally next to the piece, walls and floor included
pub fn contacts(piece: &Piece, board: &Board) -> Vec<Cell> {
    let cells = piece.cells();
    let mut found: Vec<Cell> = Vec::new();
    for cell in cells {
        for side in [Side::Left, Side::Right, Side::Top, Side::Bottom] {
            let (dx, dy) = side.step();
            let neighbour = cell.offset(dy, dx);
            if !cells.contains(&neighbour)
                && !found.contains(&neighbour)
                && board.is_occupied(neighbour)
            {
                found.push(neighbour);
            }
        }
    }
    found
}

/// True when the piece touches something and every contact lies strictly
/// below the piece's vertical center
fn is_floor_wedge(piece: &Piece, board: &Board) -> bool {
    let center = (piece.bottom_row() + piece.top_row()) as f32 / 2.0;
    let contacts = contacts(piece, board);
    !contacts.is_empty() && contacts.iter().all(|cell| (cell.row as f32) < center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Square, COLS, FIRST_COL, FIRST_ROW, LAST_COL, LAST_ROW, ROWS};
    use crate::tetromino::{Rotation, ShapeKind};
    use proptest::prelude::*;

    fn block(board: &mut Board, row: i32, col: i32) {
        assert!(board.set(Cell::new(row, col), Square::Block(ShapeKind::O)));
    }

    /// Vertical I (rotation 90) whose column is `col`; cells span rows
    /// `pivot_row - 2 ..= pivot_row + 1`
    fn vertical_i(pivot_row: i32, col: i32) -> Piece {
        Piece::at(ShapeKind::I, Cell::new(pivot_row, col), Rotation::Deg90)
    }

    #[test]
    fn test_open_board_accepts_spawn() {
        let board = Board::new();
        for kind in ShapeKind::all() {
            assert!(can_place(&Piece::spawn(kind), &board, 0, 0, 0), "{kind:?}");
        }
    }

    #[test]
    fn test_sides_against_frame() {
        let board = Board::new();
        let piece = Piece::at(ShapeKind::O, Cell::new(FIRST_ROW, FIRST_COL), Rotation::Deg0);
        assert!(is_blocked_on(&piece, &board, Side::Left));
        assert!(is_blocked_on(&piece, &board, Side::Bottom));
        assert!(!is_blocked_on(&piece, &board, Side::Right));
        assert!(!is_blocked_on(&piece, &board, Side::Top));

        let piece = Piece::at(ShapeKind::O, Cell::new(LAST_ROW - 1, LAST_COL - 1), Rotation::Deg0);
        assert!(is_blocked_on(&piece, &board, Side::Right));
        assert!(is_blocked_on(&piece, &board, Side::Top));
    }

    #[test]
    fn test_sides_against_locked_blocks() {
        let mut board = Board::new();
        let piece = Piece::at(ShapeKind::T, Cell::new(5, 5), Rotation::Deg0);
        assert!(!is_blocked_on(&piece, &board, Side::Bottom));

        block(&mut board, 4, 6);
        assert!(is_blocked_on(&piece, &board, Side::Bottom));
        assert!(!is_blocked_on(&piece, &board, Side::Left));
    }

    #[test]
    fn test_rotation_in_open_space_needs_no_kick() {
        let board = Board::new();
        let piece = Piece::at(ShapeKind::T, Cell::new(10, 5), Rotation::Deg0);
        assert_eq!(find_rotation(&piece, &board, 1), Some(0));
        assert_eq!(find_rotation(&piece, &board, -1), Some(0));
    }

    #[test]
    fn test_vertical_i_at_left_wall_kicks_right() {
        let board = Board::new();
        let piece = vertical_i(10, FIRST_COL);
        // Flat again it would reach into the left wall
        assert!(!can_place(&piece, &board, 0, 0, 1));

        let nudge = find_rotation(&piece, &board, 1).unwrap();
        assert_eq!(nudge, 1);
        let mut turned = piece.clone();
        turned.translate(nudge, 0);
        turned.rotate(1);
        assert!(turned.cells().iter().all(|&cell| Board::is_interior(cell)));
        assert!(fits(&board, &turned.cells()));
    }

    #[test]
    fn test_vertical_i_at_right_wall_kicks_left() {
        let board = Board::new();
        let piece = vertical_i(10, LAST_COL);
        assert_eq!(find_rotation(&piece, &board, 1), Some(-2));
    }

    #[test]
    fn test_kick_takes_smallest_distance_right_first() {
        // Flat, the I would cover row 9 cols 4..=7
        let piece = vertical_i(10, 5);

        // Col 7 taken: +1 still hits it, -1 is clear
        let mut board = Board::new();
        block(&mut board, 9, 7);
        assert_eq!(find_rotation(&piece, &board, 1), Some(-1));

        // Col 4 taken: the first kick to the right clears it
        let mut board = Board::new();
        block(&mut board, 9, 4);
        assert_eq!(find_rotation(&piece, &board, 1), Some(1));
    }

    #[test]
    fn test_boxed_in_i_cannot_rotate() {
        let mut board = Board::new();
        // Fill the row the flat I would land in, except the I's own column
        for col in FIRST_COL..=LAST_COL {
            if col != 5 {
                block(&mut board, 9, col);
            }
        }
        let piece = vertical_i(10, 5);
        assert!(can_place(&piece, &board, 0, 0, 0));
        assert_eq!(find_rotation(&piece, &board, 1), None);
    }

    #[test]
    fn test_flat_i_on_floor_is_floor_wedged() {
        let board = Board::new();
        let piece = Piece::at(ShapeKind::I, Cell::new(FIRST_ROW, 5), Rotation::Deg0);
        assert!(!can_place(&piece, &board, 0, 0, 1));
        assert_eq!(find_rotation(&piece, &board, 1), None);
    }

    #[test]
    fn test_t_resting_on_blocks_is_floor_wedged() {
        let mut board = Board::new();
        for col in 3..=7 {
            block(&mut board, 4, col);
        }
        let piece = Piece::at(ShapeKind::T, Cell::new(5, 5), Rotation::Deg0);
        // Turning would push the stem into row 4; a kick cannot help
        assert_eq!(find_rotation(&piece, &board, 1), None);
        assert_eq!(find_rotation(&piece, &board, -1), None);
    }

    #[test]
    fn test_t_against_left_wall_kicks_right() {
        let board = Board::new();
        let piece = Piece::at(ShapeKind::T, Cell::new(10, FIRST_COL), Rotation::Deg270);
        assert!(!can_place(&piece, &board, 0, 0, 1));
        assert!(can_place(&piece, &board, 1, 0, 1));
        assert_eq!(find_rotation(&piece, &board, 1), Some(1));
    }

    #[test]
    fn test_contacts_list_touching_cells_once() {
        let board = Board::new();
        let piece = vertical_i(10, FIRST_COL);
        let contacts = contacts(&piece, &board);
        assert_eq!(contacts.len(), 4);
        assert!(contacts.iter().all(|cell| cell.col == 0));

        let piece = Piece::at(ShapeKind::T, Cell::new(10, 5), Rotation::Deg0);
        assert!(super::contacts(&piece, &board).is_empty());
    }

    #[test]
    fn test_every_kind_against_a_wall_rotates_in_mid_air() {
        let board = Board::new();
        for kind in ShapeKind::all() {
            for turns in 0..4 {
                for col in FIRST_COL - 2..=LAST_COL + 2 {
                    for row in [8, 10, 12] {
                        let rotation = Rotation::from_quarter_turns(turns);
                        let piece = Piece::at(kind, Cell::new(row, col), rotation);
                        if !can_place(&piece, &board, 0, 0, 0) {
                            continue;
                        }
                        for delta in [1, -1] {
                            let rotated = piece.cells_after(0, 0, delta);
                            let min_col = rotated.iter().map(|cell| cell.col).min().unwrap();
                            let max_col = rotated.iter().map(|cell| cell.col).max().unwrap();
                            let width = max_col - min_col + 1;
                            let reachable = (-width..=width)
                                .any(|dx| can_place(&piece, &board, dx, 0, delta));
                            if !reachable {
                                continue;
                            }

                            let case = format!("{kind:?} {turns} turns at ({row}, {col}) by {delta}");
                            let nudge = find_rotation(&piece, &board, delta);
                            let Some(nudge) = nudge else {
                                panic!("{case} was refused");
                            };
                            assert!(can_place(&piece, &board, nudge, 0, delta), "{case}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_every_kind_resting_on_floor_is_floor_wedged() {
        let board = Board::new();
        for kind in ShapeKind::all() {
            let lowest = kind.offsets().iter().map(|cell| cell.row).min().unwrap();
            for col in FIRST_COL..=LAST_COL {
                let piece = Piece::at(kind, Cell::new(FIRST_ROW - lowest, col), Rotation::Deg0);
                if !can_place(&piece, &board, 0, 0, 0) {
                    continue;
                }
                for delta in [1, -1] {
                    let reaches_floor = piece
                        .cells_after(0, 0, delta)
                        .iter()
                        .any(|cell| cell.row < FIRST_ROW);
                    if reaches_floor {
                        assert_eq!(find_rotation(&piece, &board, delta), None, "{kind:?} at {col}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_o_always_rotates_in_place() {
        let board = Board::new();
        let piece = Piece::at(ShapeKind::O, Cell::new(FIRST_ROW, FIRST_COL), Rotation::Deg0);
        assert_eq!(find_rotation(&piece, &board, 1), Some(0));
    }

    fn any_kind() -> impl Strategy<Value = ShapeKind> {
        prop::sample::select(ShapeKind::all().to_vec())
    }

    proptest! {
        #[test]
        fn prop_can_place_matches_grid(
            filled in prop::collection::vec(any::<bool>(), ROWS * COLS),
            kind in any_kind(),
            turns in 0..4i32,
            row in -2..ROWS as i32 + 2,
            col in -2..COLS as i32 + 2,
        ) {
            let mut board = Board::new();
            let occupied = |cell: Cell| {
                if !Board::is_interior(cell) {
                    return true;
                }
                filled[(cell.row as usize) * COLS + cell.col as usize]
            };
            for r in FIRST_ROW..=LAST_ROW {
                for c in FIRST_COL..=LAST_COL {
                    let cell = Cell::new(r, c);
                    if occupied(cell) {
                        block(&mut board, r, c);
                    }
                }
            }

            let piece = Piece::at(kind, Cell::new(row, col), Rotation::from_quarter_turns(turns));
            let expected = piece.cells().iter().all(|&cell| !occupied(cell));
            prop_assert_eq!(can_place(&piece, &board, 0, 0, 0), expected);
        }
    }
}

//! Move Codec (C2).
//!
//! A purely arithmetic bijection between legal moves and policy indices in
//! `[0, POLICY_SIZE)`, plus the position-aware helpers (`legal_mask`,
//! `all_legal_moves`) that tie the codec to a concrete board.

use crate::board::{Position, Side};
use strum_macros::EnumIter;

/// Size of the policy vector the evaluator produces (spec §3, §6).
pub const POLICY_SIZE: usize = 1176;

/// One of the four orthogonal directions a piece may slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// (row delta, col delta) for a single step in this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// The direction of travel from one square to another, if they lie on a
    /// common row or column (a straight orthogonal line).
    pub fn between(from_row: i8, from_col: i8, to_row: i8, to_col: i8) -> Option<Direction> {
        if from_row == to_row && from_col == to_col {
            return None;
        }
        if from_row == to_row {
            return Some(if to_col > from_col {
                Direction::Right
            } else {
                Direction::Left
            });
        }
        if from_col == to_col {
            return Some(if to_row > from_row {
                Direction::Down
            } else {
                Direction::Up
            });
        }
        None
    }

    fn from_code(code: u16) -> Direction {
        match code {
            0 => Direction::Up,
            1 => Direction::Down,
            2 => Direction::Left,
            _ => Direction::Right,
        }
    }
}

/// A move: a strict orthogonal slide from (from_row, from_col) to
/// (to_row, to_col). Coordinates are signed so `decode` can be total over
/// the whole policy index range, including indices whose arithmetic inverse
/// falls off the 7x7 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from_row: i8,
    pub from_col: i8,
    pub to_row: i8,
    pub to_col: i8,
}

impl Move {
    pub fn on_board(&self) -> bool {
        [self.from_row, self.from_col, self.to_row, self.to_col]
            .iter()
            .all(|&v| (0..7).contains(&v))
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{})->({},{})",
            self.from_row, self.from_col, self.to_row, self.to_col
        )
    }
}

/// Encode a move as `fromSquare*24 + direction*6 + (distance-1)`.
///
/// Defined for any straight-line, in-bounds-origin move; callers are
/// expected to only pass moves that are actual orthogonal slides (every
/// legal move satisfies this by construction).
pub fn encode(mv: Move) -> u16 {
    let direction = Direction::between(mv.from_row, mv.from_col, mv.to_row, mv.to_col)
        .expect("encode() requires a straight orthogonal move");
    let distance = ((mv.to_row - mv.from_row).abs() + (mv.to_col - mv.from_col).abs()) as u16;
    debug_assert!((1..=6).contains(&distance));
    let from_square = mv.from_row as u16 * 7 + mv.from_col as u16;
    from_square * 24 + (direction as u16) * 6 + (distance - 1)
}

/// Decode a policy index back into a move. Total over `[0, POLICY_SIZE)`;
/// the resulting move may land off-board for indices whose `fromSquare`
/// plus slide distance would run past an edge.
pub fn decode(index: u16) -> Move {
    debug_assert!((index as usize) < POLICY_SIZE);
    let from_square = index / 24;
    let remainder = index % 24;
    let direction_code = remainder / 6;
    let distance = (remainder % 6) + 1;
    let from_row = (from_square / 7) as i8;
    let from_col = (from_square % 7) as i8;
    let direction = Direction::from_code(direction_code);
    let (dr, dc) = direction.offset();
    Move {
        from_row,
        from_col,
        to_row: from_row + (dr as i8) * (distance as i8),
        to_col: from_col + (dc as i8) * (distance as i8),
    }
}

/// Every legal move for `side` in `pos`, paired with its policy index.
/// Enumeration order matches `Position::legal_moves`: pieces row-major,
/// directions {Up, Down, Left, Right}, distances ascending.
pub fn all_legal_moves(pos: &Position, side: Side) -> Vec<(Move, u16)> {
    pos.legal_moves(side)
        .into_iter()
        .map(|mv| (mv, encode(mv)))
        .collect()
}

/// A `[0.0, 1.0]` mask of length `POLICY_SIZE`, 1.0 at indices of legal
/// moves, 0.0 elsewhere.
pub fn legal_mask(pos: &Position, side: Side) -> Vec<f32> {
    let mut mask = vec![0.0f32; POLICY_SIZE];
    for (_, index) in all_legal_moves(pos, side) {
        mask[index as usize] = 1.0;
    }
    mask
}

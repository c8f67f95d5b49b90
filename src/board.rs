//! Board & Rules (C1).
//!
//! An immutable-by-convention 7x7 Brandubh position: legality, capture
//! resolution, and termination. `Position` is value-typed — `apply` returns
//! a new position rather than mutating in place; callers that want a scratch
//! buffer (the MCTS engine's working copy) just clone and reassign.

use crate::error::Error;
use crate::move_codec::{Direction, Move};
use strum::IntoEnumIterator;

pub const BOARD_SIZE: usize = 7;

/// One square's occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    Empty,
    Attacker,
    Defender,
    King,
}

/// The side to move. Defenders and the King play on the same side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }
}

/// Result of a termination check (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    NotOver,
    AttackerWins,
    DefenderWins,
}

/// A 7x7 Brandubh position plus side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    cells: [[Piece; BOARD_SIZE]; BOARD_SIZE],
    side_to_move: Side,
}

/// The four restricted corners; the King may stand on them, no one else may,
/// and they act as hostile squares for capture regardless of occupant.
pub const CORNERS: [(usize, usize); 4] = [
    (0, 0),
    (0, BOARD_SIZE - 1),
    (BOARD_SIZE - 1, 0),
    (BOARD_SIZE - 1, BOARD_SIZE - 1),
];

pub fn is_corner(row: usize, col: usize) -> bool {
    CORNERS.contains(&(row, col))
}

impl Piece {
    /// Side this piece belongs to, if any.
    fn side(self) -> Option<Side> {
        match self {
            Piece::Attacker => Some(Side::Attacker),
            Piece::Defender | Piece::King => Some(Side::Defender),
            Piece::Empty => None,
        }
    }

    fn is_friendly_to(self, side: Side) -> bool {
        self.side() == Some(side)
    }

    fn is_enemy_of(self, side: Side) -> bool {
        matches!(self.side(), Some(s) if s != side)
    }
}

impl Position {
    pub fn cell(&self, row: usize, col: usize) -> Piece {
        self.cells[row][col]
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// The standard Brandubh starting position (spec §6), attacker to move.
    pub fn initial() -> Position {
        let mut cells = [[Piece::Empty; BOARD_SIZE]; BOARD_SIZE];
        for &(r, c) in &[
            (0, 3),
            (1, 3),
            (3, 0),
            (3, 1),
            (3, 5),
            (3, 6),
            (5, 3),
            (6, 3),
        ] {
            cells[r][c] = Piece::Attacker;
        }
        for &(r, c) in &[(2, 3), (3, 2), (3, 4), (4, 3)] {
            cells[r][c] = Piece::Defender;
        }
        cells[3][3] = Piece::King;
        Position {
            cells,
            side_to_move: Side::Attacker,
        }
    }

    /// Construct a position from raw cells, validating the structural
    /// invariants this crate depends on.
    pub fn from_cells(
        cells: [[Piece; BOARD_SIZE]; BOARD_SIZE],
        side_to_move: Side,
    ) -> Result<Position, Error> {
        let pos = Position {
            cells,
            side_to_move,
        };
        pos.validate()?;
        Ok(pos)
    }

    fn validate(&self) -> Result<(), Error> {
        let mut kings = 0u32;
        let mut attackers = 0u32;
        let mut defenders = 0u32;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                match self.cells[row][col] {
                    Piece::King => kings += 1,
                    Piece::Attacker => attackers += 1,
                    Piece::Defender => defenders += 1,
                    Piece::Empty => {}
                }
                if is_corner(row, col) && !matches!(self.cells[row][col], Piece::Empty | Piece::King)
                {
                    return Err(Error::InvalidPosition(format!(
                        "non-King piece on restricted corner ({row},{col})"
                    )));
                }
            }
        }
        if kings > 1 {
            return Err(Error::InvalidPosition(format!(
                "position has {kings} kings, expected at most 1"
            )));
        }
        if attackers > 8 {
            return Err(Error::InvalidPosition(format!(
                "position has {attackers} attackers, expected at most 8"
            )));
        }
        if defenders > 4 {
            return Err(Error::InvalidPosition(format!(
                "position has {defenders} defenders, expected at most 4"
            )));
        }
        Ok(())
    }

    /// Every strict-orthogonal slide available to `side`'s pieces (spec
    /// §4.1). Iterates pieces in row-major order, then directions in
    /// {Up, Down, Left, Right}, then distances ascending — the tie-break
    /// order spec §4.2 requires of `all_legal_moves`.
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        let mut moves = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if !self.cells[row][col].is_friendly_to(side) {
                    continue;
                }
                for direction in Direction::iter() {
                    self.slides_from(row, col, direction, &mut moves);
                }
            }
        }
        moves
    }

    /// Push every legal destination along `direction` from (row, col),
    /// stopping at the first occupied square. Corners are only valid
    /// destinations for the King, but an empty corner does not block
    /// further sliding past it.
    fn slides_from(&self, row: usize, col: usize, direction: Direction, out: &mut Vec<Move>) {
        let is_king = matches!(self.cells[row][col], Piece::King);
        let (dr, dc) = direction.offset();
        let mut r = row as isize;
        let mut c = col as isize;
        for distance in 1..=6u8 {
            r += dr;
            c += dc;
            if r < 0 || c < 0 || r as usize >= BOARD_SIZE || c as usize >= BOARD_SIZE {
                break;
            }
            let (ru, cu) = (r as usize, c as usize);
            if !matches!(self.cells[ru][cu], Piece::Empty) {
                break;
            }
            if is_corner(ru, cu) && !is_king {
                continue;
            }
            out.push(Move {
                from_row: row as i8,
                from_col: col as i8,
                to_row: ru as i8,
                to_col: cu as i8,
            });
            let _ = distance;
        }
    }

    /// Structural legality check for a single move, without enumerating the
    /// full move list.
    pub fn is_legal_move(&self, side: Side, mv: Move) -> bool {
        let (fr, fc) = (mv.from_row as usize, mv.from_col as usize);
        if fr >= BOARD_SIZE || fc >= BOARD_SIZE {
            return false;
        }
        if !self.cells[fr][fc].is_friendly_to(side) {
            return false;
        }
        let Some(direction) = Direction::between(mv.from_row, mv.from_col, mv.to_row, mv.to_col)
        else {
            return false;
        };
        let mut candidates = Vec::new();
        self.slides_from(fr, fc, direction, &mut candidates);
        candidates.contains(&mv)
    }

    /// Apply `mv` for `side`, relocating the piece and resolving captures.
    /// Fails with `IllegalMove` if `mv` is not legal for `side` in `self`.
    pub fn apply(&self, side: Side, mv: Move) -> Result<Position, Error> {
        if !self.is_legal_move(side, mv) {
            return Err(Error::IllegalMove(mv));
        }
        let mut next = self.clone();
        let moving = next.cells[mv.from_row as usize][mv.from_col as usize];
        next.cells[mv.from_row as usize][mv.from_col as usize] = Piece::Empty;
        next.cells[mv.to_row as usize][mv.to_col as usize] = moving;
        next.resolve_captures(mv.to_row as usize, mv.to_col as usize, side);
        next.side_to_move = side.opponent();
        Ok(next)
    }

    /// Custodial capture: after a move to (row, col) by `side`, sandwich any
    /// orthogonally-adjacent enemy against a friendly piece or a corner.
    /// The King is captured by the same rule as any other piece.
    fn resolve_captures(&mut self, row: usize, col: usize, side: Side) {
        for direction in Direction::iter() {
            let (dr, dc) = direction.offset();
            let nr = row as isize + dr;
            let nc = col as isize + dc;
            if nr < 0 || nc < 0 || nr as usize >= BOARD_SIZE || nc as usize >= BOARD_SIZE {
                continue;
            }
            let (nru, ncu) = (nr as usize, nc as usize);
            if !self.cells[nru][ncu].is_enemy_of(side) {
                continue;
            }
            let fr = nr + dr;
            let fc = nc + dc;
            if fr < 0 || fc < 0 || fr as usize >= BOARD_SIZE || fc as usize >= BOARD_SIZE {
                continue;
            }
            let (fru, fcu) = (fr as usize, fc as usize);
            let beyond_is_friendly = self.cells[fru][fcu].is_friendly_to(side);
            let beyond_is_corner = is_corner(fru, fcu);
            if beyond_is_friendly || beyond_is_corner {
                self.cells[nru][ncu] = Piece::Empty;
            }
        }
    }

    /// Board-condition termination check (spec §4.1). Does not account for
    /// stalemate (no legal moves), which is the engine's responsibility
    /// since it requires enumerating moves.
    pub fn is_terminal(&self) -> Termination {
        let mut king_on_board = false;
        let mut king_on_corner = false;
        let mut attacker_count = 0u32;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                match self.cells[row][col] {
                    Piece::King => {
                        king_on_board = true;
                        if is_corner(row, col) {
                            king_on_corner = true;
                        }
                    }
                    Piece::Attacker => attacker_count += 1,
                    _ => {}
                }
            }
        }
        if king_on_corner {
            Termination::DefenderWins
        } else if !king_on_board {
            Termination::AttackerWins
        } else if attacker_count == 0 {
            // Spec §9 open question: preserved exactly as the termination
            // rule states it, not as the inverted "no pieces => that side
            // loses" convention one might expect. See DESIGN.md.
            Termination::AttackerWins
        } else {
            Termination::NotOver
        }
    }

    /// Total piece count, for invariant checks in tests (§8: "piece counts
    /// change only through captures; the mover's own piece count never
    /// decreases").
    pub fn piece_count(&self, side: Side) -> usize {
        let mut count = 0;
        for row in &self.cells {
            for piece in row {
                if piece.is_friendly_to(side) {
                    count += 1;
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_position_has_expected_piece_counts() {
        let pos = Position::initial();
        assert_eq!(pos.piece_count(Side::Attacker), 8);
        assert_eq!(pos.piece_count(Side::Defender), 5); // 4 defenders + king
        assert_eq!(pos.side_to_move(), Side::Attacker);
    }

    #[test]
    fn initial_position_legal_move_count_is_forty() {
        let pos = Position::initial();
        assert_eq!(pos.legal_moves(Side::Attacker).len(), 40);
    }

    #[test]
    fn non_king_cannot_land_on_corner() {
        // Clear a file so an attacker has a straight shot at a corner.
        let mut cells = [[Piece::Empty; BOARD_SIZE]; BOARD_SIZE];
        cells[3][0] = Piece::Attacker;
        let pos = Position::from_cells(cells, Side::Attacker).unwrap();
        let moves = pos.legal_moves(Side::Attacker);
        assert!(moves
            .iter()
            .all(|m| !is_corner(m.to_row as usize, m.to_col as usize)));
    }

    #[test]
    fn king_can_enter_corner_and_wins() {
        let mut cells = [[Piece::Empty; BOARD_SIZE]; BOARD_SIZE];
        cells[3][0] = Piece::King;
        let pos = Position::from_cells(cells, Side::Defender).unwrap();
        let mv = Move {
            from_row: 3,
            from_col: 0,
            to_row: 0,
            to_col: 0,
        };
        assert!(pos.is_legal_move(Side::Defender, mv));
        let next = pos.apply(Side::Defender, mv).unwrap();
        assert_eq!(next.is_terminal(), Termination::DefenderWins);
    }

    #[test]
    fn custodial_capture_removes_sandwiched_defender() {
        // Attacker slides down into (3,3), sandwiching the defender at (2,3)
        // between the mover's destination and the attacker already at (1,3).
        let mut cells = [[Piece::Empty; BOARD_SIZE]; BOARD_SIZE];
        cells[1][3] = Piece::Attacker;
        cells[2][3] = Piece::Defender;
        cells[4][3] = Piece::Attacker;
        let pos = Position::from_cells(cells, Side::Attacker).unwrap();
        let mv = Move {
            from_row: 4,
            from_col: 3,
            to_row: 3,
            to_col: 3,
        };
        let next = pos.apply(Side::Attacker, mv).unwrap();
        assert!(matches!(next.cell(2, 3), Piece::Empty));
        assert_eq!(next.piece_count(Side::Defender), 0);
    }

    #[test]
    fn king_captured_same_as_any_piece() {
        let mut cells = [[Piece::Empty; BOARD_SIZE]; BOARD_SIZE];
        cells[2][3] = Piece::Attacker;
        cells[3][3] = Piece::King;
        cells[5][3] = Piece::Attacker;
        let pos = Position::from_cells(cells, Side::Attacker).unwrap();
        let mv = Move {
            from_row: 5,
            from_col: 3,
            to_row: 4,
            to_col: 3,
        };
        let next = pos.apply(Side::Attacker, mv).unwrap();
        assert!(matches!(next.cell(3, 3), Piece::Empty));
        assert_eq!(next.is_terminal(), Termination::AttackerWins);
    }

    #[test]
    fn attacker_count_zero_is_attacker_win_per_spec() {
        let mut cells = [[Piece::Empty; BOARD_SIZE]; BOARD_SIZE];
        cells[3][3] = Piece::King;
        cells[3][4] = Piece::Defender;
        let pos = Position::from_cells(cells, Side::Defender).unwrap();
        assert_eq!(pos.is_terminal(), Termination::AttackerWins);
    }

    #[test]
    fn illegal_move_fails() {
        let pos = Position::initial();
        let mv = Move {
            from_row: 0,
            from_col: 0,
            to_row: 0,
            to_col: 1,
        };
        assert!(matches!(
            pos.apply(Side::Attacker, mv),
            Err(Error::IllegalMove(_))
        ));
    }

    #[test]
    fn corner_is_restricted_in_from_cells() {
        let mut cells = [[Piece::Empty; BOARD_SIZE]; BOARD_SIZE];
        cells[0][0] = Piece::Attacker;
        assert!(matches!(
            Position::from_cells(cells, Side::Attacker),
            Err(Error::InvalidPosition(_))
        ));
    }
}

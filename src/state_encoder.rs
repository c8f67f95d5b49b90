//! State Encoder (C3).
//!
//! Maps a position + side-to-move to the 4x7x7 float plane tensor the
//! evaluator consumes. The plane layout is part of the external ABI (spec
//! §6) and must never drift independently of a version bump there.

use crate::board::{Piece, Position, Side, BOARD_SIZE};

/// Total length of the encoded state tensor: 4 planes of 49 floats.
pub const STATE_SIZE: usize = 4 * BOARD_SIZE * BOARD_SIZE;

/// Encode `pos` from `side`'s perspective into the fixed plane layout
/// `[Attackers, Defenders, King, SideToMove]`.
pub fn encode_state(pos: &Position, side: Side) -> [f32; STATE_SIZE] {
    let mut planes = [0.0f32; STATE_SIZE];
    let plane_len = BOARD_SIZE * BOARD_SIZE;
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let idx = row * BOARD_SIZE + col;
            match pos.cell(row, col) {
                Piece::Attacker => planes[idx] = 1.0,
                Piece::Defender => planes[plane_len + idx] = 1.0,
                Piece::King => planes[2 * plane_len + idx] = 1.0,
                Piece::Empty => {}
            }
        }
    }
    let side_value = match side {
        Side::Attacker => 0.0,
        Side::Defender => 1.0,
    };
    for v in &mut planes[3 * plane_len..4 * plane_len] {
        *v = side_value;
    }
    planes
}

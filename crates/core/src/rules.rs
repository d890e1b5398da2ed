//! Simplified move legality
//!
//! Each predicate checks shape, path and occupancy only. Nothing here looks at
//! check, pins, castling rights, en passant or promotion: the trainer replays
//! lines that are already known to be legal and only needs to tell whether a
//! gesture could be the move it expects.

use crate::board::{Board, Color, PieceKind, Square};

/// Whether the piece standing on `from` may move to `to`.
///
/// Fails when `from` is empty, when the move goes nowhere, or when the
/// destination holds a piece of the mover's own color.
pub fn is_legal_move(board: &Board, from: Square, to: Square) -> bool {
    let Some(piece) = board.piece_at(from) else {
        return false;
    };
    if from == to {
        return false;
    }
    if let Some(target) = board.piece_at(to) {
        if target.color == piece.color {
            return false;
        }
    }

    match piece.kind {
        PieceKind::Pawn => pawn_can_move(board, from, to, piece.color),
        PieceKind::Knight => knight_can_move(from, to),
        PieceKind::Bishop => bishop_can_move(board, from, to),
        PieceKind::Rook => rook_can_move(board, from, to),
        PieceKind::Queen => queen_can_move(board, from, to),
        PieceKind::King => king_can_move(from, to),
    }
}

fn deltas(from: Square, to: Square) -> (i8, i8) {
    (to.row as i8 - from.row as i8, to.col as i8 - from.col as i8)
}

pub fn pawn_can_move(board: &Board, from: Square, to: Square, color: Color) -> bool {
    let (d_row, d_col) = deltas(from, to);
    let dir = color.pawn_direction();

    if d_col == 0 {
        if !board.is_empty(to) {
            return false;
        }
        if d_row == dir {
            return true;
        }
        if d_row == 2 * dir && from.row == color.pawn_start_row() {
            return from
                .offset(dir, 0)
                .map(|between| board.is_empty(between))
                .unwrap_or(false);
        }
        return false;
    }

    if d_col.abs() == 1 && d_row == dir {
        return matches!(board.piece_at(to), Some(target) if target.color != color);
    }

    false
}

pub fn knight_can_move(from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    matches!((d_row.abs(), d_col.abs()), (1, 2) | (2, 1))
}

pub fn bishop_can_move(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    d_row != 0 && d_row.abs() == d_col.abs() && path_is_clear(board, from, to)
}

pub fn rook_can_move(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    (d_row == 0) != (d_col == 0) && path_is_clear(board, from, to)
}

pub fn queen_can_move(board: &Board, from: Square, to: Square) -> bool {
    bishop_can_move(board, from, to) || rook_can_move(board, from, to)
}

pub fn king_can_move(from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    d_row.abs() <= 1 && d_col.abs() <= 1 && (d_row, d_col) != (0, 0)
}

/// True when every square strictly between `from` and `to` is empty.
/// Only meaningful for straight or diagonal lines.
pub fn path_is_clear(board: &Board, from: Square, to: Square) -> bool {
    let (d_row, d_col) = deltas(from, to);
    let step = (d_row.signum(), d_col.signum());

    let mut current = from;
    loop {
        current = match current.offset(step.0, step.1) {
            Some(next) => next,
            None => return false,
        };
        if current == to {
            return true;
        }
        if !board.is_empty(current) {
            return false;
        }
    }
}

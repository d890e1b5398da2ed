//! Algebraic notation codec
//!
//! Converts a two-click gesture into SAN-like text, resolves SAN text back to
//! a concrete move on a board, and applies moves. The notation produced for
//! clicks is deliberately simple: no disambiguation, check or mate suffixes.

use crate::board::{Board, Color, Piece, PieceKind, Square};
use crate::rules;

const KINGSIDE_CASTLE: &str = "O-O";
const QUEENSIDE_CASTLE: &str = "O-O-O";

/// A resolved move. Produced by [`algebraic_to_move`] and consumed right away
/// by [`apply_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub san: String,
}

impl Move {
    pub fn is_castle(&self) -> bool {
        self.piece.kind == PieceKind::King && self.from.col.abs_diff(self.to.col) == 2
    }
}

/// `(row, col)` to a square name such as `e4`.
pub fn square_name(row: u8, col: u8) -> String {
    Square::new(row, col).to_string()
}

/// Square name to `(row, col)`.
pub fn square_coordinates(name: &str) -> Option<(u8, u8)> {
    Square::parse(name).map(|sq| (sq.row, sq.col))
}

/// Drops check, mate and annotation marks (`+ # ! ?`).
pub fn strip_annotations(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '+' | '#' | '!' | '?'))
        .collect()
}

fn castle_notation(piece: Piece, from: Square, to: Square) -> Option<&'static str> {
    let home = piece.color.home_row();
    if piece.kind != PieceKind::King || from != Square::new(home, 4) || to.row != home {
        return None;
    }
    match to.col {
        6 => Some(KINGSIDE_CASTLE),
        2 => Some(QUEENSIDE_CASTLE),
        _ => None,
    }
}

/// Renders the move `from -> to` without checking that it is legal.
///
/// Returns `None` when `from` is empty.
pub fn move_to_algebraic(board: &Board, from: Square, to: Square) -> Option<String> {
    let piece = board.piece_at(from)?;

    if let Some(castle) = castle_notation(piece, from, to) {
        return Some(castle.to_string());
    }

    let capture = !board.is_empty(to);
    let san = match (piece.kind, capture) {
        (PieceKind::Pawn, true) => format!("{}x{}", from.file_char(), to),
        (PieceKind::Pawn, false) => to.to_string(),
        (kind, true) => format!("{}x{}", kind.letter(), to),
        (kind, false) => format!("{}{}", kind.letter(), to),
    };
    Some(san)
}

/// Converts a click gesture into notation, rejecting moves the piece on
/// `from` cannot make.
pub fn match_click(board: &Board, from: Square, to: Square) -> Option<String> {
    let piece = board.piece_at(from)?;
    if castle_notation(piece, from, to).is_none() && !rules::is_legal_move(board, from, to) {
        return None;
    }
    move_to_algebraic(board, from, to)
}

/// Resolves SAN text against `board` for the side to move.
///
/// Candidates are scanned row by row from rank 8, file a first; the first
/// piece that matches the disambiguation hints and can legally reach the
/// destination wins. Castling is trusted and not checked.
pub fn algebraic_to_move(text: &str, board: &Board, side: Color) -> Option<Move> {
    let san = text.trim();
    let clean = strip_annotations(san);
    let home = side.home_row();
    let king = Piece::new(PieceKind::King, side);

    let castle_col = match clean.as_str() {
        KINGSIDE_CASTLE => Some(6),
        QUEENSIDE_CASTLE => Some(2),
        _ => None,
    };
    if let Some(col) = castle_col {
        return Some(Move {
            from: Square::new(home, 4),
            to: Square::new(home, col),
            piece: king,
            captured: None,
            san: san.to_string(),
        });
    }

    if !clean.is_ascii() {
        return None;
    }

    let (kind, rest) = match clean.chars().next().and_then(PieceKind::from_letter) {
        Some(kind) if kind != PieceKind::Pawn => (kind, &clean[1..]),
        _ => (PieceKind::Pawn, clean.as_str()),
    };
    let body = rest.replacen('x', "", 1);
    if body.len() < 2 {
        return None;
    }

    let (hints, dest) = body.split_at(body.len() - 2);
    let to = Square::parse(dest)?;

    let mut hint_row = None;
    let mut hint_col = None;
    for c in hints.chars() {
        if let Some(col) = Square::file_to_col(c) {
            hint_col = Some(col);
        } else if let Some(row) = Square::rank_to_row(c) {
            hint_row = Some(row);
        } else {
            return None;
        }
    }

    let piece = Piece::new(kind, side);
    let from = board
        .pieces()
        .filter(|(square, candidate)| {
            *candidate == piece
                && hint_row.map_or(true, |row| square.row == row)
                && hint_col.map_or(true, |col| square.col == col)
        })
        .map(|(square, _)| square)
        .find(|square| rules::is_legal_move(board, *square, to))?;

    Some(Move {
        from,
        to,
        piece,
        captured: board.piece_at(to),
        san: san.to_string(),
    })
}

/// Returns a new board with `mv` played. Castling also moves the rook.
pub fn apply_move(board: &Board, mv: &Move) -> Board {
    let mut next = *board;
    next.set(mv.from, None);
    next.set(mv.to, Some(mv.piece));

    if mv.is_castle() {
        let row = mv.from.row;
        let (rook_from, rook_to) = if mv.to.col > mv.from.col { (7, 5) } else { (0, 3) };
        next.set(Square::new(row, rook_from), None);
        next.set(
            Square::new(row, rook_to),
            Some(Piece::new(PieceKind::Rook, mv.piece.color)),
        );
    }

    next
}

/// Resolves and plays an expected training move.
pub fn apply_expected_move(text: &str, board: &Board, side: Color) -> Option<Board> {
    algebraic_to_move(text, board, side).map(|mv| apply_move(board, &mv))
}

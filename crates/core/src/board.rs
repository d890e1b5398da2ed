//! 8x8 board model used by the trainer
//!
//! Row 0 is rank 8 (black's back rank) and column 0 is the a-file, so the
//! grid reads top-down the way the board is drawn for white.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn from_white(is_white: bool) -> Self {
        if is_white { Color::White } else { Color::Black }
    }

    /// Row holding this side's king and rooks at the start.
    pub fn home_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row delta of a forward pawn step.
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Upper-case notation letter. Pawns use `P` even though SAN omits it.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'P' => Some(PieceKind::Pawn),
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// FEN character: upper case for white, lower case for black.
    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.letter(),
            Color::Black => self.kind.letter().to_ascii_lowercase(),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Self> {
        let kind = PieceKind::from_letter(c.to_ascii_uppercase())?;
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some(Self { kind, color })
    }
}

/// A board coordinate as (row, col), both in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn file_char(self) -> char {
        (b'a' + self.col) as char
    }

    pub fn rank_char(self) -> char {
        (b'8' - self.row) as char
    }

    pub fn file_to_col(file: char) -> Option<u8> {
        match file {
            'a'..='h' => Some(file as u8 - b'a'),
            _ => None,
        }
    }

    pub fn rank_to_row(rank: char) -> Option<u8> {
        match rank {
            '1'..='8' => Some(b'8' - rank as u8),
            _ => None,
        }
    }

    /// Parses a two-character square such as `e4`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let col = Self::file_to_col(chars.next()?)?;
        let row = Self::rank_to_row(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self { row, col })
    }

    /// Offsets the square, returning `None` when it falls off the board.
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = self.row as i8 + d_row;
        let col = self.col as i8 + d_col;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Option<Piece>; 8]; 8],
}

impl Board {
    pub fn empty() -> Self {
        Self { cells: [[None; 8]; 8] }
    }

    /// The standard starting arrangement.
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for (col, kind) in BACK_RANK.iter().enumerate() {
            let col = col as u8;
            board.set(Square::new(0, col), Some(Piece::new(*kind, Color::Black)));
            board.set(Square::new(1, col), Some(Piece::new(PieceKind::Pawn, Color::Black)));
            board.set(Square::new(6, col), Some(Piece::new(PieceKind::Pawn, Color::White)));
            board.set(Square::new(7, col), Some(Piece::new(*kind, Color::White)));
        }
        board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.cells[square.row as usize][square.col as usize]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.cells[square.row as usize][square.col as usize] = piece;
    }

    /// Occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        (0..8u8).flat_map(move |row| {
            (0..8u8).filter_map(move |col| {
                let square = Square::new(row, col);
                self.piece_at(square).map(|piece| (square, piece))
            })
        })
    }

    /// Piece placement field of a FEN string, rank 8 first.
    pub fn to_fen_placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for (row, cells) in self.cells.iter().enumerate() {
            if row > 0 {
                out.push('/');
            }
            let mut gap = 0;
            for cell in cells {
                match cell {
                    Some(piece) => {
                        if gap > 0 {
                            out.push(char::from(b'0' + gap));
                            gap = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                out.push(char::from(b'0' + gap));
            }
        }
        out
    }

    /// Builds a board from a FEN piece placement. Anything after the first
    /// space is ignored, so a full FEN string is accepted too.
    pub fn from_fen_placement(fen: &str) -> Option<Self> {
        let placement = fen.split_whitespace().next()?;
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return None;
        }

        let mut board = Self::empty();
        for (row, text) in rows.iter().enumerate() {
            let mut col = 0u8;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as u8;
                } else {
                    if col >= 8 {
                        return None;
                    }
                    board.set(Square::new(row as u8, col), Some(Piece::from_fen_char(c)?));
                    col += 1;
                }
            }
            if col != 8 {
                return None;
            }
        }
        Some(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_board_layout() {
        let board = Board::initial();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(
            board.piece_at(Square::parse("e1").unwrap()),
            Some(Piece::new(PieceKind::King, Color::White))
        );
        assert_eq!(
            board.piece_at(Square::parse("d8").unwrap()),
            Some(Piece::new(PieceKind::Queen, Color::Black))
        );
        assert!(board.is_empty(Square::parse("e4").unwrap()));
    }

    #[test]
    fn test_square_names() {
        assert_eq!(Square::new(0, 0).to_string(), "a8");
        assert_eq!(Square::new(7, 7).to_string(), "h1");
        assert_eq!(Square::parse("e2"), Some(Square::new(6, 4)));
        assert_eq!(Square::parse("i2"), None);
        assert_eq!(Square::parse("e9"), None);
        assert_eq!(Square::parse("e22"), None);
    }

    #[test]
    fn test_fen_placement() {
        let board = Board::initial();
        assert_eq!(
            board.to_fen_placement(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
        let parsed = Board::from_fen_placement(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        );
        assert_eq!(parsed, Some(board));
        assert_eq!(Board::from_fen_placement("8/8/8"), None);
        assert_eq!(Board::from_fen_placement("9/8/8/8/8/8/8/8"), None);
    }

    #[test]
    fn test_offset_stays_on_board() {
        let corner = Square::new(0, 0);
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(1, 2), Some(Square::new(1, 2)));
    }
}

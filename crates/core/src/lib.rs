//! Opening Trainer Core Library
//!
//! Board model, move notation and legality, spaced-repetition scheduling and
//! the progress ledger behind the opening trainer.

pub mod board;
pub mod error;
pub mod notation;
pub mod progress;
pub mod review;
pub mod rules;
pub mod storage;
pub mod training;

pub use board::{Board, Color, Piece, PieceKind, Square};
pub use error::{Error, Result};
pub use notation::{algebraic_to_move, apply_expected_move, apply_move, match_click, move_to_algebraic, Move};
pub use progress::{ProgressLedger, SessionOutcome};
pub use review::{Quality, ReviewCard};
pub use rules::is_legal_move;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use training::{Difficulty, Opening, Repertoire, TrainingSession};

/// Standard repertoire over a SQLite file.
pub fn open_ledger<P: AsRef<std::path::Path>>(path: P) -> Result<ProgressLedger<SqliteStore>> {
    let store = SqliteStore::open(path)?;
    Ok(ProgressLedger::new(store, Repertoire::standard()))
}

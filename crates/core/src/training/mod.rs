// crates/core/src/training/mod.rs
//! Opening repertoire and live training sessions

pub mod openings;
pub mod session;

pub use openings::{Difficulty, Opening, Repertoire, Variation};
pub use session::{MoveAttempt, SessionTally, TrainingSession};

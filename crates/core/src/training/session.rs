//! A live training session over one opening's main line

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::openings::Opening;
use crate::board::{Board, Color, Square};
use crate::notation::{apply_expected_move, match_click, strip_annotations};

/// Outcome of one click gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveAttempt {
    pub move_number: u16,
    pub expected: String,
    /// Notation of the gesture, `None` when the clicked piece cannot move
    /// that way.
    pub played: Option<String>,
    pub correct: bool,
}

/// Move counters handed to the ledger when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTally {
    pub moves_played: u32,
    pub correct_moves: u32,
}

impl SessionTally {
    pub fn accuracy(&self) -> f64 {
        if self.moves_played == 0 {
            return 0.0;
        }
        self.correct_moves as f64 / self.moves_played as f64 * 100.0
    }
}

pub struct TrainingSession {
    opening: Opening,
    board: Board,
    move_index: usize,
    side_to_move: Color,
    tally: SessionTally,
    history: Vec<String>,
    started_at: DateTime<Utc>,
    /// Set once a finished line has been written to the ledger.
    recorded: bool,
}

impl TrainingSession {
    pub fn new(opening: Opening) -> Self {
        Self::new_at(opening, Utc::now())
    }

    pub fn new_at(opening: Opening, now: DateTime<Utc>) -> Self {
        Self {
            opening,
            board: Board::initial(),
            move_index: 0,
            side_to_move: Color::White,
            tally: SessionTally::default(),
            history: Vec::new(),
            started_at: now,
            recorded: false,
        }
    }

    pub fn opening(&self) -> &Opening {
        &self.opening
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn tally(&self) -> SessionTally {
        self.tally
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn expected_move(&self) -> Option<&str> {
        self.opening.main_line.get(self.move_index).map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.move_index >= self.opening.main_line.len()
    }

    /// (moves done, moves in the line)
    pub fn progress(&self) -> (usize, usize) {
        (self.move_index, self.opening.main_line.len())
    }

    /// Tally of a finished line that has not been recorded yet.
    pub fn unrecorded_completion(&self) -> Option<SessionTally> {
        (self.is_complete() && !self.recorded).then_some(self.tally)
    }

    pub fn mark_recorded(&mut self) {
        self.recorded = true;
    }

    pub fn hint(&self) -> Option<String> {
        self.expected_move().map(|mv| format!("Try {}", mv))
    }

    /// Checks a click gesture against the expected move and advances on a
    /// match. Returns `None` once the line is finished.
    ///
    /// Gestures the piece cannot make are reported as incorrect but are not
    /// counted in the tally.
    pub fn play_click(&mut self, from: Square, to: Square) -> Option<MoveAttempt> {
        let expected = self.expected_move()?.to_string();
        let move_number = (self.move_index / 2 + 1) as u16;

        let Some(played) = match_click(&self.board, from, to) else {
            return Some(MoveAttempt {
                move_number,
                expected,
                played: None,
                correct: false,
            });
        };

        let correct = strip_annotations(&played) == strip_annotations(&expected);
        self.tally.moves_played += 1;

        if correct {
            self.tally.correct_moves += 1;
            self.history.push(expected.clone());

            match apply_expected_move(&expected, &self.board, self.side_to_move) {
                Some(board) => {
                    self.board = board;
                    self.side_to_move = self.side_to_move.opposite();
                    self.move_index += 1;
                }
                None => {
                    tracing::warn!(
                        opening = %self.opening.id,
                        expected = %expected,
                        "expected move could not be resolved on the current board"
                    );
                }
            }
        }

        Some(MoveAttempt {
            move_number,
            expected,
            played: Some(played),
            correct,
        })
    }

    /// Restarts the line. Returns the abandoned tally when at least one move
    /// was played so the caller can record it as an incomplete session.
    pub fn reset(&mut self) -> Option<SessionTally> {
        let abandoned = (self.tally.moves_played > 0 && !self.is_complete()).then_some(self.tally);

        self.board = Board::initial();
        self.move_index = 0;
        self.side_to_move = Color::White;
        self.tally = SessionTally::default();
        self.history.clear();
        self.started_at = Utc::now();
        self.recorded = false;

        abandoned
    }
}

//! Persisted progress records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        0
    } else {
        ((part as f64 / whole as f64) * 100.0).round() as u32
    }
}

/// Colour band used when showing how well an opening is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryBand {
    /// >= 70%
    Strong,
    /// >= 40%
    Developing,
    Weak,
}

impl MasteryBand {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            p if p >= 70 => MasteryBand::Strong,
            p if p >= 40 => MasteryBand::Developing,
            _ => MasteryBand::Weak,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningProgress {
    pub opening_id: String,
    pub completed_count: u32,
    pub last_practiced: DateTime<Utc>,
    pub best_streak: u32,
    pub current_streak: u32,
    /// correct_moves / total_moves as a rounded percentage.
    pub average_accuracy: u32,
    pub total_moves: u32,
    pub correct_moves: u32,
}

impl OpeningProgress {
    pub fn new(opening_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            opening_id: opening_id.into(),
            completed_count: 0,
            last_practiced: now,
            best_streak: 0,
            current_streak: 0,
            average_accuracy: 0,
            total_moves: 0,
            correct_moves: 0,
        }
    }

    /// Folds one session into the record.
    pub fn record(&mut self, moves_played: u32, correct_moves: u32, completed: bool, now: DateTime<Utc>) {
        if completed {
            self.completed_count = self.completed_count.saturating_add(1);
            self.current_streak = self.current_streak.saturating_add(1);
        } else {
            self.current_streak = 0;
        }
        self.best_streak = self.best_streak.max(self.current_streak);
        self.total_moves = self.total_moves.saturating_add(moves_played);
        self.correct_moves = self.correct_moves.saturating_add(correct_moves);
        self.average_accuracy = percent(self.correct_moves, self.total_moves);
        self.last_practiced = now;
    }

    pub fn mastery_band(&self) -> MasteryBand {
        MasteryBand::from_percent(self.average_accuracy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_sessions: u32,
    #[serde(default)]
    pub total_moves_played: u32,
    #[serde(default)]
    pub correct_moves_total: u32,
    pub started_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    #[serde(default, rename = "totalXP")]
    pub total_xp: u64,
    #[serde(default)]
    pub total_completions: u32,
    #[serde(default)]
    pub unique_openings_completed: u32,
    #[serde(default)]
    pub perfect_runs: u32,
    /// Consecutive completed sessions across all openings.
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
}

impl UserStats {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            total_sessions: 0,
            total_moves_played: 0,
            correct_moves_total: 0,
            started_at: now,
            last_active: now,
            total_xp: 0,
            total_completions: 0,
            unique_openings_completed: 0,
            perfect_runs: 0,
            current_streak: 0,
            best_streak: 0,
        }
    }

    pub fn overall_accuracy(&self) -> u32 {
        percent(self.correct_moves_total, self.total_moves_played)
    }
}

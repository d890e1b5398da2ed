//! Spaced repetition scheduling (SM-2 style)
//!
//! One card per opening. A passing review grows the interval 1 -> 6 ->
//! interval * ease; a lapse sends the card back to a one-day interval.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const MAX_EASE_FACTOR: f64 = 2.5;
pub const INITIAL_EASE_FACTOR: f64 = 2.5;
pub const INITIAL_INTERVAL_DAYS: u32 = 1;
/// Longest gap between reviews, about a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// `now` plus `days`, saturating at the latest representable time.
fn days_after(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(days as i64))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Recall quality on the usual 0-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const PASS: Quality = Quality(3);

    pub fn new(value: u8) -> Option<Self> {
        (value <= 5).then_some(Self(value))
    }

    /// Maps session accuracy (0-100) to a quality score.
    pub fn from_accuracy(accuracy: f64) -> Self {
        let value = match accuracy {
            a if a >= 95.0 => 5,
            a if a >= 85.0 => 4,
            a if a >= 75.0 => 3,
            a if a >= 60.0 => 2,
            a if a >= 40.0 => 1,
            _ => 0,
        };
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self >= Self::PASS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    pub opening_id: String,
    pub ease_factor: f64,
    /// Days until the next review.
    pub interval: u32,
    /// Consecutive passing reviews.
    pub repetitions: u32,
    pub next_review: DateTime<Utc>,
    pub last_review: DateTime<Utc>,
}

impl ReviewCard {
    pub fn new(opening_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            opening_id: opening_id.into(),
            ease_factor: INITIAL_EASE_FACTOR,
            interval: INITIAL_INTERVAL_DAYS,
            repetitions: 0,
            next_review: days_after(now, INITIAL_INTERVAL_DAYS),
            last_review: now,
        }
    }

    /// Returns the card rescheduled after a review of the given quality.
    pub fn review(&self, quality: Quality, now: DateTime<Utc>) -> Self {
        if !quality.is_pass() {
            return Self {
                opening_id: self.opening_id.clone(),
                ease_factor: (self.ease_factor - 0.2).max(MIN_EASE_FACTOR),
                interval: INITIAL_INTERVAL_DAYS,
                repetitions: 0,
                next_review: days_after(now, INITIAL_INTERVAL_DAYS),
                last_review: now,
            };
        }

        let repetitions = self.repetitions.saturating_add(1);
        let interval = match repetitions {
            1 => 1,
            2 => 6,
            _ => ((self.interval as f64 * self.ease_factor).round() as u32).min(MAX_INTERVAL_DAYS),
        };

        let miss = (5 - quality.value()) as f64;
        let ease_factor = (self.ease_factor + (0.1 - miss * (0.08 + miss * 0.02)))
            .clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR);

        Self {
            opening_id: self.opening_id.clone(),
            ease_factor,
            interval,
            repetitions,
            next_review: days_after(now, interval),
            last_review: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_review
    }

    /// Whole days until the card is due, rounded up. Negative when overdue.
    pub fn days_until_review(&self, now: DateTime<Utc>) -> i64 {
        let millis = (self.next_review - now).num_milliseconds() as f64;
        (millis / 86_400_000.0).ceil() as i64
    }

    pub fn schedule_text(&self, now: DateTime<Utc>) -> String {
        match self.days_until_review(now) {
            d if d < 0 => "Overdue!".to_string(),
            0 => "Due today".to_string(),
            1 => "Due tomorrow".to_string(),
            d if d < 7 => format!("Due in {} days", d),
            d if d < 30 => format!("Due in {} weeks", (d as f64 / 7.0).round() as i64),
            d => format!("Due in {} months", (d as f64 / 30.0).round() as i64),
        }
    }
}

/// Cards due at `now`, in the order given.
pub fn due_cards<'a, I>(cards: I, now: DateTime<Utc>) -> Vec<&'a ReviewCard>
where
    I: IntoIterator<Item = &'a ReviewCard>,
{
    cards.into_iter().filter(|card| card.is_due(now)).collect()
}

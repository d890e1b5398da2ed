//! Typed access to the persisted progress records
//!
//! Each record lives under its own key as a JSON blob. Reads never fail: a
//! missing or unreadable blob is logged and treated as absent so callers fall
//! back to defaults. Writes propagate errors.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

use super::kv::KeyValueStore;
use super::models::{OpeningProgress, UserStats};
use crate::error::Result;
use crate::progress::{Achievement, DailyChallenge};
use crate::review::ReviewCard;

pub const OPENING_PROGRESS_KEY: &str = "opening-trainer.openings";
pub const USER_STATS_KEY: &str = "opening-trainer.stats";
pub const REVIEW_CARDS_KEY: &str = "opening-trainer.reviews";
pub const ACHIEVEMENTS_KEY: &str = "opening-trainer.achievements";
pub const DAILY_CHALLENGE_KEY: &str = "opening-trainer.daily-challenge";

const ALL_KEYS: [&str; 5] = [
    OPENING_PROGRESS_KEY,
    USER_STATS_KEY,
    REVIEW_CARDS_KEY,
    ACHIEVEMENTS_KEY,
    DAILY_CHALLENGE_KEY,
];

pub struct ProgressStore<S> {
    kv: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut S {
        &mut self.kv
    }

    pub fn into_inner(self) -> S {
        self.kv
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = match self.kv.read(key) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read record, using default");
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt record, using default");
                None
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.kv.write(key, &json)
    }

    pub fn all_opening_progress(&self) -> BTreeMap<String, OpeningProgress> {
        self.load(OPENING_PROGRESS_KEY).unwrap_or_default()
    }

    pub fn opening_progress(&self, opening_id: &str) -> Option<OpeningProgress> {
        self.all_opening_progress().remove(opening_id)
    }

    pub fn save_opening_progress(&mut self, progress: &OpeningProgress) -> Result<()> {
        let mut all = self.all_opening_progress();
        all.insert(progress.opening_id.clone(), progress.clone());
        self.save(OPENING_PROGRESS_KEY, &all)
    }

    pub fn user_stats(&self) -> Option<UserStats> {
        self.load(USER_STATS_KEY)
    }

    pub fn save_user_stats(&mut self, stats: &UserStats) -> Result<()> {
        self.save(USER_STATS_KEY, stats)
    }

    pub fn all_review_cards(&self) -> BTreeMap<String, ReviewCard> {
        self.load(REVIEW_CARDS_KEY).unwrap_or_default()
    }

    pub fn review_card(&self, opening_id: &str) -> Option<ReviewCard> {
        self.all_review_cards().remove(opening_id)
    }

    pub fn save_review_card(&mut self, card: &ReviewCard) -> Result<()> {
        let mut all = self.all_review_cards();
        all.insert(card.opening_id.clone(), card.clone());
        self.save(REVIEW_CARDS_KEY, &all)
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        self.load(ACHIEVEMENTS_KEY).unwrap_or_default()
    }

    pub fn save_achievements(&mut self, achievements: &[Achievement]) -> Result<()> {
        self.save(ACHIEVEMENTS_KEY, achievements)
    }

    pub fn daily_challenge(&self) -> Option<DailyChallenge> {
        self.load(DAILY_CHALLENGE_KEY)
    }

    pub fn save_daily_challenge(&mut self, challenge: &DailyChallenge) -> Result<()> {
        self.save(DAILY_CHALLENGE_KEY, challenge)
    }

    /// Removes every record this store owns.
    pub fn clear_all_records(&mut self) -> Result<()> {
        for key in ALL_KEYS {
            self.kv.clear(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::Utc;

    #[test]
    fn test_missing_records_fall_back() {
        let store = ProgressStore::new(MemoryStore::new());
        assert!(store.all_opening_progress().is_empty());
        assert!(store.user_stats().is_none());
        assert!(store.review_card("italian-game").is_none());
        assert!(store.achievements().is_empty());
        assert!(store.daily_challenge().is_none());
    }

    #[test]
    fn test_corrupt_records_fall_back() {
        let mut kv = MemoryStore::new();
        kv.write(OPENING_PROGRESS_KEY, "{not json").unwrap();
        kv.write(USER_STATS_KEY, "[1,2,3]").unwrap();
        let store = ProgressStore::new(kv);
        assert!(store.all_opening_progress().is_empty());
        assert!(store.user_stats().is_none());
    }

    #[test]
    fn test_records_are_keyed_by_opening() {
        let now = Utc::now();
        let mut store = ProgressStore::new(MemoryStore::new());
        store.save_opening_progress(&OpeningProgress::new("a", now)).unwrap();
        store.save_opening_progress(&OpeningProgress::new("b", now)).unwrap();
        store.save_review_card(&ReviewCard::new("a", now)).unwrap();

        assert_eq!(store.all_opening_progress().len(), 2);
        assert!(store.opening_progress("b").is_some());
        assert!(store.review_card("a").is_some());
        assert!(store.review_card("b").is_none());

        store.clear_all_records().unwrap();
        assert!(store.kv().is_empty());
    }
}

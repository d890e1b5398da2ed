//! Opening of the day

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::training::{Opening, Repertoire};

pub const DAILY_ATTEMPTS: u32 = 3;
pub const DAILY_XP_BONUS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub date: NaiveDate,
    pub opening_id: String,
    #[serde(alias = "attempts")]
    pub attempts_remaining: u32,
    pub completed: bool,
    pub xp_bonus: u32,
}

impl DailyChallenge {
    /// Today's challenge from the day-indexed rotation. `None` for an empty
    /// repertoire.
    pub fn for_date(date: NaiveDate, repertoire: &Repertoire) -> Option<Self> {
        let opening = repertoire.at(rotation_index(date, repertoire.len())?)?;
        Some(Self {
            date,
            opening_id: opening.id.clone(),
            attempts_remaining: DAILY_ATTEMPTS,
            completed: false,
            xp_bonus: DAILY_XP_BONUS,
        })
    }

    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.date == date
    }

    pub fn is_available(&self) -> bool {
        self.attempts_remaining > 0 && !self.completed
    }

    /// Spends one attempt; a no-op once none are left.
    pub fn use_attempt(&mut self) {
        self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
    }

    /// Marks the challenge done and returns the bonus, or 0 if it was
    /// already claimed.
    pub fn complete(&mut self) -> u32 {
        if self.completed {
            return 0;
        }
        self.completed = true;
        self.xp_bonus
    }

    pub fn challenge_opening<'a>(&self, repertoire: &'a Repertoire) -> Option<&'a Opening> {
        repertoire.get(&self.opening_id)
    }
}

fn rotation_index(date: NaiveDate, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let days = date.signed_duration_since(epoch).num_days();
    Some(days.rem_euclid(len as i64) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rotation_follows_days_since_epoch() {
        let repertoire = Repertoire::standard();
        // 1970-01-11 is day 10.
        let challenge = DailyChallenge::for_date(date(1970, 1, 11), &repertoire).unwrap();
        assert_eq!(challenge.opening_id, "italian-game");

        // 2024-01-01 is day 19723.
        let challenge = DailyChallenge::for_date(date(2024, 1, 1), &repertoire).unwrap();
        assert_eq!(challenge.opening_id, repertoire.at(3).unwrap().id);
        assert_eq!(challenge.attempts_remaining, 3);
        assert_eq!(challenge.xp_bonus, 100);
        assert!(challenge.is_available());

        let next = DailyChallenge::for_date(date(2024, 1, 2), &repertoire).unwrap();
        assert_eq!(next.opening_id, repertoire.at(4).unwrap().id);
    }

    #[test]
    fn test_same_day_is_deterministic() {
        let repertoire = Repertoire::standard();
        let a = DailyChallenge::for_date(date(2024, 6, 15), &repertoire).unwrap();
        let b = DailyChallenge::for_date(date(2024, 6, 15), &repertoire).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_attempts_and_completion() {
        let repertoire = Repertoire::standard();
        let mut challenge = DailyChallenge::for_date(date(2024, 6, 15), &repertoire).unwrap();
        for _ in 0..5 {
            challenge.use_attempt();
        }
        assert_eq!(challenge.attempts_remaining, 0);
        assert!(!challenge.is_available());

        assert_eq!(challenge.complete(), 100);
        assert_eq!(challenge.complete(), 0);
        assert!(challenge.completed);
    }

    #[test]
    fn test_empty_repertoire_has_no_challenge() {
        assert!(DailyChallenge::for_date(date(2024, 1, 1), &Repertoire::new(Vec::new())).is_none());
    }

    #[test]
    fn test_reads_stored_attempts_field() {
        let json = r#"{"date":"2024-01-01","openingId":"scotch-game","attempts":2,"completed":false,"xpBonus":100}"#;
        let challenge: DailyChallenge = serde_json::from_str(json).unwrap();
        assert_eq!(challenge.attempts_remaining, 2);
        assert!(challenge.challenge_opening(&Repertoire::standard()).is_some());
    }
}

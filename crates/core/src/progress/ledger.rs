//! Session recording over the persisted progress records

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::achievements::{catalog_status, evaluate, Achievement};
use super::daily::DailyChallenge;
use super::levels::{calculate_xp_reward, level_from_total_xp, LevelInfo};
use crate::error::{Error, Result};
use crate::review::{Quality, ReviewCard};
use crate::storage::{BackupData, ImportSummary, KeyValueStore, OpeningProgress, ProgressStore, UserStats};
use crate::training::Repertoire;

/// What recording a session earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    pub xp_earned: u32,
    /// Daily-challenge bonus, already included in the stored XP total.
    pub daily_bonus: u32,
    pub newly_unlocked: Vec<Achievement>,
    pub level_before: u32,
    pub level_after: u32,
}

impl SessionOutcome {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }

    pub fn total_xp(&self) -> u32 {
        self.xp_earned + self.daily_bonus
    }
}

/// Owns the progress store and the repertoire sessions are scored against.
pub struct ProgressLedger<S> {
    store: ProgressStore<S>,
    repertoire: Repertoire,
}

impl<S: KeyValueStore> ProgressLedger<S> {
    pub fn new(kv: S, repertoire: Repertoire) -> Self {
        Self {
            store: ProgressStore::new(kv),
            repertoire,
        }
    }

    pub fn repertoire(&self) -> &Repertoire {
        &self.repertoire
    }

    pub fn store(&self) -> &ProgressStore<S> {
        &self.store
    }

    pub fn record_session(
        &mut self,
        opening_id: &str,
        moves_played: u32,
        correct_moves: u32,
        completed: bool,
    ) -> Result<SessionOutcome> {
        self.record_session_at(opening_id, moves_played, correct_moves, completed, Utc::now())
    }

    /// Folds one finished or abandoned session into every record.
    ///
    /// The records are written one after another; a failed write leaves the
    /// earlier ones in place.
    pub fn record_session_at(
        &mut self,
        opening_id: &str,
        moves_played: u32,
        correct_moves: u32,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<SessionOutcome> {
        let difficulty = self
            .repertoire
            .get(opening_id)
            .map(|opening| opening.difficulty)
            .ok_or_else(|| Error::UnknownOpening(opening_id.to_string()))?;

        let accuracy = if moves_played == 0 {
            0.0
        } else {
            correct_moves as f64 / moves_played as f64 * 100.0
        };
        let is_perfect = moves_played > 0 && correct_moves == moves_played;
        let xp_earned = calculate_xp_reward(moves_played, correct_moves, completed, difficulty);

        let mut progress = self
            .store
            .opening_progress(opening_id)
            .unwrap_or_else(|| OpeningProgress::new(opening_id, now));
        progress.record(moves_played, correct_moves, completed, now);
        self.store.save_opening_progress(&progress)?;

        if completed {
            let card = self
                .store
                .review_card(opening_id)
                .unwrap_or_else(|| ReviewCard::new(opening_id, now));
            let quality = Quality::from_accuracy(accuracy);
            let card = card.review(quality, now);
            tracing::debug!(
                opening = opening_id,
                quality = quality.value(),
                interval = card.interval,
                next_review = %card.next_review,
                "rescheduled review card"
            );
            self.store.save_review_card(&card)?;
        }

        let daily_bonus = if completed {
            self.claim_daily_bonus(opening_id, now.date_naive())?
        } else {
            0
        };

        let unique_completed = self
            .store
            .all_opening_progress()
            .values()
            .filter(|p| p.completed_count > 0)
            .count() as u32;

        let previous = self.user_stats_at(now);
        let mut stats = previous.clone();
        stats.total_sessions = stats.total_sessions.saturating_add(1);
        stats.total_moves_played = stats.total_moves_played.saturating_add(moves_played);
        stats.correct_moves_total = stats.correct_moves_total.saturating_add(correct_moves);
        stats.total_xp = stats.total_xp.saturating_add((xp_earned + daily_bonus) as u64);
        stats.unique_openings_completed = unique_completed;
        stats.last_active = now;
        if completed {
            stats.total_completions = stats.total_completions.saturating_add(1);
            stats.current_streak = stats.current_streak.saturating_add(1);
            if is_perfect {
                stats.perfect_runs = stats.perfect_runs.saturating_add(1);
            }
        } else {
            stats.current_streak = 0;
        }
        stats.best_streak = stats.best_streak.max(stats.current_streak);
        self.store.save_user_stats(&stats)?;

        let mut achievements = self.store.achievements();
        let newly_unlocked = evaluate(&stats, &achievements, now);
        if !newly_unlocked.is_empty() {
            for achievement in &newly_unlocked {
                tracing::info!(id = %achievement.id, name = %achievement.name, "achievement unlocked");
            }
            achievements.extend(newly_unlocked.iter().cloned());
            self.store.save_achievements(&achievements)?;
        }

        let outcome = SessionOutcome {
            xp_earned,
            daily_bonus,
            newly_unlocked,
            level_before: level_from_total_xp(previous.total_xp).level,
            level_after: level_from_total_xp(stats.total_xp).level,
        };
        tracing::debug!(
            opening = opening_id,
            moves_played,
            correct_moves,
            completed,
            xp = outcome.total_xp(),
            "recorded session"
        );
        Ok(outcome)
    }

    fn claim_daily_bonus(&mut self, opening_id: &str, today: NaiveDate) -> Result<u32> {
        let Some(mut challenge) = self.daily_challenge(today)? else {
            return Ok(0);
        };
        if challenge.opening_id != opening_id || challenge.completed {
            return Ok(0);
        }
        let bonus = challenge.complete();
        self.store.save_daily_challenge(&challenge)?;
        tracing::info!(opening = opening_id, bonus, "daily challenge completed");
        Ok(bonus)
    }

    pub fn opening_progress(&self, opening_id: &str) -> Option<OpeningProgress> {
        self.store.opening_progress(opening_id)
    }

    pub fn all_opening_progress(&self) -> BTreeMap<String, OpeningProgress> {
        self.store.all_opening_progress()
    }

    pub fn user_stats(&self) -> UserStats {
        self.user_stats_at(Utc::now())
    }

    /// Stored stats, or a fresh record started at `now` if none exist yet.
    pub fn user_stats_at(&self, now: DateTime<Utc>) -> UserStats {
        self.store.user_stats().unwrap_or_else(|| UserStats::fresh(now))
    }

    pub fn level(&self) -> LevelInfo {
        level_from_total_xp(self.user_stats().total_xp)
    }

    pub fn review_card(&self, opening_id: &str) -> Option<ReviewCard> {
        self.store.review_card(opening_id)
    }

    /// Ids of openings whose review card is due at `now`.
    pub fn due_openings(&self, now: DateTime<Utc>) -> Vec<String> {
        self.store
            .all_review_cards()
            .into_values()
            .filter(|card| card.is_due(now))
            .map(|card| card.opening_id)
            .collect()
    }

    /// Unlocked achievements, in unlock order.
    pub fn achievements(&self) -> Vec<Achievement> {
        self.store.achievements()
    }

    /// The whole catalog with unlock times and progress towards the rest.
    pub fn achievement_status(&self, now: DateTime<Utc>) -> Vec<Achievement> {
        catalog_status(&self.user_stats_at(now), &self.store.achievements())
    }

    /// Today's challenge, generated and stored if the stored one is from
    /// another day or unreadable.
    pub fn daily_challenge(&mut self, today: NaiveDate) -> Result<Option<DailyChallenge>> {
        if let Some(challenge) = self.store.daily_challenge() {
            if challenge.is_for(today) {
                return Ok(Some(challenge));
            }
        }
        let Some(challenge) = DailyChallenge::for_date(today, &self.repertoire) else {
            return Ok(None);
        };
        self.store.save_daily_challenge(&challenge)?;
        tracing::debug!(date = %today, opening = %challenge.opening_id, "new daily challenge");
        Ok(Some(challenge))
    }

    pub fn use_daily_attempt(&mut self, today: NaiveDate) -> Result<Option<DailyChallenge>> {
        let Some(mut challenge) = self.daily_challenge(today)? else {
            return Ok(None);
        };
        if challenge.attempts_remaining > 0 {
            challenge.use_attempt();
            self.store.save_daily_challenge(&challenge)?;
        }
        Ok(Some(challenge))
    }

    pub fn export_backup(&self, now: DateTime<Utc>) -> BackupData {
        self.store.export_backup(now)
    }

    pub fn import_backup(&mut self, json: &str) -> Result<ImportSummary> {
        self.store.import_backup(json)
    }

    /// Clears progress, stats, review cards, achievements and the daily
    /// challenge.
    pub fn reset_all(&mut self) -> Result<()> {
        self.store.clear_all_records()?;
        tracing::info!("reset all progress");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    fn ledger() -> ProgressLedger<MemoryStore> {
        ProgressLedger::new(MemoryStore::new(), Repertoire::standard())
    }

    // 2024-01-01 rotates to index 3.
    const DAILY_OPENING: &str = "queens-gambit";

    #[test]
    fn test_completed_session_updates_every_record() {
        let mut ledger = ledger();
        let outcome = ledger
            .record_session_at("italian-game", 7, 7, true, now())
            .unwrap();

        assert_eq!(outcome.xp_earned, 100);
        assert_eq!(outcome.daily_bonus, 0);
        assert_eq!((outcome.level_before, outcome.level_after), (1, 2));
        assert!(outcome.leveled_up());
        let ids: Vec<&str> = outcome.newly_unlocked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["first-opening", "perfect-run"]);

        let progress = ledger.opening_progress("italian-game").unwrap();
        assert_eq!(progress.completed_count, 1);
        assert_eq!(progress.average_accuracy, 100);

        let card = ledger.review_card("italian-game").unwrap();
        assert_eq!(card.repetitions, 1);
        assert_eq!(card.next_review, now() + Duration::days(1));

        let stats = ledger.user_stats_at(now());
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.total_xp, 100);
        assert_eq!(stats.unique_openings_completed, 1);
        assert_eq!(stats.perfect_runs, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(ledger.achievements().len(), 2);
    }

    #[test]
    fn test_incomplete_session_skips_review_and_xp() {
        let mut ledger = ledger();
        ledger.record_session_at("french-defense", 4, 4, true, now()).unwrap();
        let outcome = ledger
            .record_session_at("french-defense", 3, 1, false, now())
            .unwrap();

        assert_eq!(outcome.xp_earned, 0);
        assert!(outcome.newly_unlocked.is_empty());
        assert_eq!(ledger.review_card("french-defense").unwrap().repetitions, 1);

        let stats = ledger.user_stats_at(now());
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 1);
        assert_eq!(stats.total_moves_played, 7);
        assert_eq!(stats.overall_accuracy(), 71);
    }

    #[test]
    fn test_unknown_opening_writes_nothing() {
        let mut ledger = ledger();
        let err = ledger.record_session_at("bongcloud", 1, 1, true, now()).unwrap_err();
        assert!(matches!(err, Error::UnknownOpening(id) if id == "bongcloud"));
        assert!(ledger.store().kv().is_empty());
    }

    #[test]
    fn test_daily_bonus_paid_once() {
        let mut ledger = ledger();
        let first = ledger
            .record_session_at(DAILY_OPENING, 10, 10, true, now())
            .unwrap();
        assert_eq!(first.xp_earned, 150);
        assert_eq!(first.daily_bonus, 100);
        assert_eq!(ledger.user_stats_at(now()).total_xp, 250);

        let second = ledger
            .record_session_at(DAILY_OPENING, 10, 10, true, now())
            .unwrap();
        assert_eq!(second.daily_bonus, 0);

        let challenge = ledger.daily_challenge(now().date_naive()).unwrap().unwrap();
        assert!(challenge.completed);
    }

    #[test]
    fn test_daily_challenge_stable_within_day() {
        let mut ledger = ledger();
        let today = now().date_naive();
        let first = ledger.daily_challenge(today).unwrap().unwrap();
        let second = ledger.daily_challenge(today).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.opening_id, DAILY_OPENING);

        let spent = ledger.use_daily_attempt(today).unwrap().unwrap();
        assert_eq!(spent.attempts_remaining, 2);
        assert_eq!(ledger.daily_challenge(today).unwrap().unwrap().attempts_remaining, 2);

        let tomorrow = ledger.daily_challenge(today.succ_opt().unwrap()).unwrap().unwrap();
        assert_eq!(tomorrow.attempts_remaining, 3);
        assert_ne!(tomorrow.opening_id, DAILY_OPENING);
    }

    #[test]
    fn test_due_openings_and_status() {
        let mut ledger = ledger();
        ledger.record_session_at("scotch-game", 6, 6, true, now()).unwrap();
        assert!(ledger.due_openings(now()).is_empty());
        assert_eq!(ledger.due_openings(now() + Duration::days(1)), vec!["scotch-game"]);

        let status = ledger.achievement_status(now());
        let first = status.iter().find(|a| a.id == "first-opening").unwrap();
        assert!(first.is_unlocked());
    }

    #[test]
    fn test_achievements_survive_streak_loss() {
        let mut ledger = ledger();
        for _ in 0..5 {
            ledger.record_session_at("ruy-lopez", 8, 8, true, now()).unwrap();
        }
        ledger.record_session_at("ruy-lopez", 2, 0, false, now()).unwrap();
        assert_eq!(ledger.user_stats_at(now()).current_streak, 0);
        assert!(ledger.achievements().iter().any(|a| a.id == "streak-5"));
    }

    #[test]
    fn test_repeated_perfect_completions_keep_recording() {
        let mut ledger = ledger();
        for _ in 0..30 {
            ledger.record_session_at("italian-game", 9, 9, true, now()).unwrap();
        }
        let card = ledger.review_card("italian-game").unwrap();
        assert_eq!(card.repetitions, 30);
        assert_eq!(card.interval, crate::review::MAX_INTERVAL_DAYS);
        assert_eq!(ledger.opening_progress("italian-game").unwrap().completed_count, 30);
        assert_eq!(ledger.user_stats_at(now()).total_completions, 30);
    }

    #[test]
    fn test_saturated_imported_stats_still_record() {
        let mut ledger = ledger();
        let mut data = ledger.export_backup(now());
        data.user_stats.total_xp = u64::MAX;
        data.user_stats.total_sessions = u32::MAX;
        data.user_stats.current_streak = u32::MAX;
        ledger.import_backup(&data.to_json_pretty().unwrap()).unwrap();

        let outcome = ledger.record_session_at("italian-game", 9, 9, true, now()).unwrap();
        assert!(!outcome.leveled_up());
        let stats = ledger.user_stats_at(now());
        assert_eq!(stats.total_xp, u64::MAX);
        assert_eq!(stats.total_sessions, u32::MAX);
        assert_eq!(ledger.achievement_status(now()).len(), crate::progress::CATALOG.len());
    }

    #[test]
    fn test_reset_and_backup_delegation() {
        let mut ledger = ledger();
        ledger.record_session_at("english-opening", 5, 5, true, now()).unwrap();
        let json = ledger.export_backup(now()).to_json_pretty().unwrap();

        ledger.reset_all().unwrap();
        assert!(ledger.store().kv().is_empty());
        assert!(ledger.opening_progress("english-opening").is_none());

        ledger.import_backup(&json).unwrap();
        assert_eq!(ledger.opening_progress("english-opening").unwrap().completed_count, 1);
        assert!(ledger.level().total_xp > 0);
    }
}

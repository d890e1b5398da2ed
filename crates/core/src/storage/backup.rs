//! Backup export and import

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::kv::KeyValueStore;
use super::models::{OpeningProgress, UserStats};
use super::store::{
    ProgressStore, ACHIEVEMENTS_KEY, OPENING_PROGRESS_KEY, REVIEW_CARDS_KEY, USER_STATS_KEY,
};
use crate::error::{Error, Result};
use crate::progress::Achievement;
use crate::review::ReviewCard;

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub opening_progress: BTreeMap<String, OpeningProgress>,
    pub user_stats: UserStats,
    pub review_cards: BTreeMap<String, ReviewCard>,
    pub achievements: Vec<Achievement>,
}

impl BackupData {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Counts of what an import restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub openings: usize,
    pub review_cards: usize,
    pub achievements: usize,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: Option<String>,
}

/// `chess-opening-trainer-backup-YYYY-MM-DD.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("chess-opening-trainer-backup-{}.json", date.format("%Y-%m-%d"))
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn export_backup(&self, now: DateTime<Utc>) -> BackupData {
        BackupData {
            version: BACKUP_VERSION.to_string(),
            exported_at: now,
            opening_progress: self.all_opening_progress(),
            user_stats: self.user_stats().unwrap_or_else(|| UserStats::fresh(now)),
            review_cards: self.all_review_cards(),
            achievements: self.achievements(),
        }
    }

    pub fn export_backup_file<P: AsRef<Path>>(&self, path: P, now: DateTime<Utc>) -> Result<()> {
        let json = self.export_backup(now).to_json_pretty()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Replaces the four progress records with the backup's contents.
    ///
    /// Nothing is written unless the whole payload parses and has the
    /// supported version. The records are then committed in one batch.
    pub fn import_backup(&mut self, json: &str) -> Result<ImportSummary> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        match probe.version.as_deref() {
            Some(BACKUP_VERSION) => {}
            other => {
                return Err(Error::UnsupportedBackupVersion(
                    other.unwrap_or("missing").to_string(),
                ))
            }
        }

        let data: BackupData = serde_json::from_str(json)?;
        let entries = [
            (OPENING_PROGRESS_KEY, serde_json::to_string(&data.opening_progress)?),
            (USER_STATS_KEY, serde_json::to_string(&data.user_stats)?),
            (REVIEW_CARDS_KEY, serde_json::to_string(&data.review_cards)?),
            (ACHIEVEMENTS_KEY, serde_json::to_string(&data.achievements)?),
        ];
        self.kv_mut().write_batch(&entries)?;

        let summary = ImportSummary {
            openings: data.opening_progress.len(),
            review_cards: data.review_cards.len(),
            achievements: data.achievements.len(),
        };
        tracing::info!(
            openings = summary.openings,
            review_cards = summary.review_cards,
            achievements = summary.achievements,
            exported_at = %data.exported_at,
            "imported backup"
        );
        Ok(summary)
    }

    pub fn import_backup_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ImportSummary> {
        let json = std::fs::read_to_string(path)?;
        self.import_backup(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SqliteStore};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn populated() -> ProgressStore<MemoryStore> {
        let now = fixed_now();
        let mut store = ProgressStore::new(MemoryStore::new());
        let mut progress = OpeningProgress::new("italian-game", now);
        progress.record(7, 7, true, now);
        store.save_opening_progress(&progress).unwrap();

        let mut stats = UserStats::fresh(now);
        stats.total_xp = 150;
        stats.total_completions = 1;
        store.save_user_stats(&stats).unwrap();

        store.save_review_card(&ReviewCard::new("italian-game", now)).unwrap();
        store
    }

    #[test]
    fn test_export_uses_camel_case_layout() {
        let json = populated().export_backup(fixed_now()).to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], "1.0");
        assert!(value["exportedAt"].is_string());
        assert_eq!(value["openingProgress"]["italian-game"]["completedCount"], 1);
        assert_eq!(value["userStats"]["totalXP"], 150);
        assert_eq!(value["reviewCards"]["italian-game"]["easeFactor"], 2.5);
        assert!(value["achievements"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_import_replaces_records() {
        let json = populated().export_backup(fixed_now()).to_json_pretty().unwrap();

        let mut target = ProgressStore::new(MemoryStore::new());
        target
            .save_opening_progress(&OpeningProgress::new("scotch-game", fixed_now()))
            .unwrap();
        let summary = target.import_backup(&json).unwrap();

        assert_eq!(summary.openings, 1);
        assert_eq!(summary.review_cards, 1);
        assert!(target.opening_progress("scotch-game").is_none());
        assert_eq!(target.opening_progress("italian-game").unwrap().completed_count, 1);
        assert_eq!(target.user_stats().unwrap().total_xp, 150);
    }

    #[test]
    fn test_wrong_version_writes_nothing() {
        let mut data = populated().export_backup(fixed_now());
        data.version = "2.0".to_string();
        let json = data.to_json_pretty().unwrap();

        let mut target = ProgressStore::new(MemoryStore::new());
        let err = target.import_backup(&json).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBackupVersion(v) if v == "2.0"));
        assert!(target.kv().is_empty());
    }

    #[test]
    fn test_malformed_payload_writes_nothing() {
        let mut target = ProgressStore::new(MemoryStore::new());
        assert!(matches!(target.import_backup("not json"), Err(Error::Json(_))));
        assert!(matches!(
            target.import_backup(r#"{"version":"1.0","userStats":{}}"#),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            target.import_backup(r#"{"exportedAt":"2024-01-01T00:00:00Z"}"#),
            Err(Error::UnsupportedBackupVersion(_))
        ));
        assert!(target.kv().is_empty());
    }

    #[test]
    fn test_file_round_trip_into_sqlite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(backup_file_name(fixed_now().date_naive()));
        populated().export_backup_file(&path, fixed_now()).unwrap();

        let mut target = ProgressStore::new(SqliteStore::open_in_memory().unwrap());
        target.import_backup_file(&path).unwrap();
        assert_eq!(target.review_card("italian-game").unwrap().repetitions, 0);
    }

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(backup_file_name(date), "chess-opening-trainer-backup-2024-01-05.json");
    }
}

//! Achievement catalog and unlock evaluation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::levels::level_from_total_xp;
use crate::storage::UserStats;

/// Stat an achievement is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    TotalCompletions,
    UniqueOpenings,
    PerfectRuns,
    /// Global streak of completed sessions.
    CurrentStreak,
    Level,
}

impl Criterion {
    pub fn value(self, stats: &UserStats) -> u32 {
        match self {
            Criterion::TotalCompletions => stats.total_completions,
            Criterion::UniqueOpenings => stats.unique_openings_completed,
            Criterion::PerfectRuns => stats.perfect_runs,
            Criterion::CurrentStreak => stats.current_streak,
            Criterion::Level => level_from_total_xp(stats.total_xp).level,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// `None` for entries no recorded stat measures; they stay locked.
    pub criterion: Option<Criterion>,
    pub target: u32,
}

impl AchievementDef {
    fn value(&self, stats: &UserStats) -> Option<u32> {
        self.criterion.map(|criterion| criterion.value(stats))
    }

    pub fn is_met(&self, stats: &UserStats) -> bool {
        self.value(stats).is_some_and(|value| value >= self.target)
    }

    /// Percentage towards the target, capped at 100.
    pub fn progress(&self, stats: &UserStats) -> u32 {
        let value = self.value(stats).unwrap_or(0).min(self.target);
        value * 100 / self.target.max(1)
    }

    fn to_achievement(self, progress: u32, unlocked_at: Option<DateTime<Utc>>) -> Achievement {
        Achievement {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: Some(self.icon.to_string()),
            unlocked_at,
            progress: Some(progress),
            target: Some(self.target),
        }
    }
}

pub const CATALOG: [AchievementDef; 10] = [
    AchievementDef {
        id: "first-opening",
        name: "First Steps",
        description: "Complete your first opening",
        icon: "🎯",
        criterion: Some(Criterion::TotalCompletions),
        target: 1,
    },
    AchievementDef {
        id: "five-openings",
        name: "Opening Explorer",
        description: "Complete 5 different openings",
        icon: "🗺️",
        criterion: Some(Criterion::UniqueOpenings),
        target: 5,
    },
    AchievementDef {
        id: "perfect-run",
        name: "Perfectionist",
        description: "Complete an opening with 100% accuracy",
        icon: "💎",
        criterion: Some(Criterion::PerfectRuns),
        target: 1,
    },
    AchievementDef {
        id: "streak-5",
        name: "On Fire",
        description: "Maintain a 5-session streak",
        icon: "🔥",
        criterion: Some(Criterion::CurrentStreak),
        target: 5,
    },
    AchievementDef {
        id: "streak-10",
        name: "Unstoppable",
        description: "Maintain a 10-session streak",
        icon: "⚡",
        criterion: Some(Criterion::CurrentStreak),
        target: 10,
    },
    AchievementDef {
        id: "advanced-master",
        name: "Grandmaster",
        description: "Complete all advanced openings",
        icon: "👑",
        criterion: None,
        target: 1,
    },
    AchievementDef {
        id: "speed-demon",
        name: "Speed Demon",
        description: "Complete an opening in under 2 minutes",
        icon: "🚀",
        criterion: None,
        target: 1,
    },
    AchievementDef {
        id: "level-5",
        name: "Apprentice",
        description: "Reach level 5",
        icon: "⭐",
        criterion: Some(Criterion::Level),
        target: 5,
    },
    AchievementDef {
        id: "level-10",
        name: "Expert",
        description: "Reach level 10",
        icon: "🌟",
        criterion: Some(Criterion::Level),
        target: 10,
    },
    AchievementDef {
        id: "level-20",
        name: "Master",
        description: "Reach level 20",
        icon: "✨",
        criterion: Some(Criterion::Level),
        target: 20,
    },
];

/// A persisted achievement. Unlocked once `unlocked_at` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, alias = "emoji", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
}

impl Achievement {
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }
}

fn unlocked_entry<'a>(unlocked: &'a [Achievement], id: &str) -> Option<&'a Achievement> {
    unlocked.iter().find(|a| a.id == id && a.is_unlocked())
}

/// Catalog entries crossed by `stats` that are not already unlocked.
///
/// Entries already unlocked are skipped, so a later drop in a stat never
/// takes an achievement away.
pub fn evaluate(stats: &UserStats, unlocked: &[Achievement], now: DateTime<Utc>) -> Vec<Achievement> {
    CATALOG
        .iter()
        .filter(|def| unlocked_entry(unlocked, def.id).is_none())
        .filter(|def| def.is_met(stats))
        .map(|def| def.to_achievement(100, Some(now)))
        .collect()
}

/// Every catalog entry with its unlock time or current progress.
pub fn catalog_status(stats: &UserStats, unlocked: &[Achievement]) -> Vec<Achievement> {
    CATALOG
        .iter()
        .map(|def| match unlocked_entry(unlocked, def.id) {
            Some(entry) => def.to_achievement(100, entry.unlocked_at),
            None => def.to_achievement(def.progress(stats), None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_fresh_stats_unlock_nothing() {
        let stats = UserStats::fresh(now());
        assert!(evaluate(&stats, &[], now()).is_empty());
    }

    #[test]
    fn test_thresholds_unlock() {
        let mut stats = UserStats::fresh(now());
        stats.total_completions = 1;
        stats.perfect_runs = 1;
        stats.current_streak = 5;
        stats.total_xp = 1_000;

        let ids: Vec<String> = evaluate(&stats, &[], now()).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["first-opening", "perfect-run", "streak-5", "level-5"]);
    }

    #[test]
    fn test_unlocks_are_permanent() {
        let mut stats = UserStats::fresh(now());
        stats.current_streak = 5;
        let unlocked = evaluate(&stats, &[], now());
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].unlocked_at, Some(now()));
        assert_eq!(unlocked[0].progress, Some(100));

        stats.current_streak = 0;
        assert!(evaluate(&stats, &unlocked, now()).is_empty());

        let status = catalog_status(&stats, &unlocked);
        let streak = status.iter().find(|a| a.id == "streak-5").unwrap();
        assert_eq!(streak.unlocked_at, Some(now()));

        stats.current_streak = 5;
        assert!(evaluate(&stats, &unlocked, now()).is_empty());
    }

    #[test]
    fn test_catalog_progress() {
        let mut stats = UserStats::fresh(now());
        stats.unique_openings_completed = 2;
        stats.current_streak = 3;

        let status = catalog_status(&stats, &[]);
        assert_eq!(status.len(), CATALOG.len());
        let explorer = status.iter().find(|a| a.id == "five-openings").unwrap();
        assert_eq!(explorer.progress, Some(40));
        assert!(!explorer.is_unlocked());
        let unstoppable = status.iter().find(|a| a.id == "streak-10").unwrap();
        assert_eq!(unstoppable.progress, Some(30));
        let level = status.iter().find(|a| a.id == "level-5").unwrap();
        assert_eq!(level.progress, Some(20));
    }

    #[test]
    fn test_unmeasured_entries_stay_locked() {
        let mut stats = UserStats::fresh(now());
        stats.total_completions = u32::MAX;
        stats.unique_openings_completed = u32::MAX;
        stats.perfect_runs = u32::MAX;
        stats.current_streak = u32::MAX;
        stats.total_xp = u64::MAX;

        let unlocked = evaluate(&stats, &[], now());
        assert_eq!(unlocked.len(), CATALOG.len() - 2);
        assert!(unlocked.iter().all(|a| a.id != "advanced-master" && a.id != "speed-demon"));

        let status = catalog_status(&stats, &unlocked);
        for id in ["advanced-master", "speed-demon"] {
            let entry = status.iter().find(|a| a.id == id).unwrap();
            assert!(!entry.is_unlocked());
            assert_eq!(entry.progress, Some(0));
            assert_eq!(entry.target, Some(1));
        }
    }

    #[test]
    fn test_reads_stored_emoji_field() {
        let json = r#"{"id":"first-opening","name":"First Steps","description":"d","emoji":"🎯","unlockedAt":"2024-01-01T00:00:00Z","progress":100,"target":1}"#;
        let achievement: Achievement = serde_json::from_str(json).unwrap();
        assert_eq!(achievement.icon.as_deref(), Some("🎯"));
        assert!(achievement.is_unlocked());
    }
}

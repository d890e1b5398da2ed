//! Progress tracking: XP and levels, achievements, the daily challenge and
//! the ledger that records sessions

pub mod achievements;
pub mod daily;
pub mod ledger;
pub mod levels;

pub use achievements::{catalog_status, evaluate, Achievement, AchievementDef, Criterion, CATALOG};
pub use daily::{DailyChallenge, DAILY_ATTEMPTS, DAILY_XP_BONUS};
pub use ledger::{ProgressLedger, SessionOutcome};
pub use levels::{calculate_xp_reward, level_from_total_xp, level_title, xp_required_for_level, LevelInfo};

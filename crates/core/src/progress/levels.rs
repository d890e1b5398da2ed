//! XP rewards and the level curve

use serde::Serialize;

use crate::training::Difficulty;

/// Base XP for completing a line.
pub const COMPLETION_XP: u32 = 50;

/// XP needed to clear level `level` (1-based).
pub fn xp_required_for_level(level: u32) -> u64 {
    (100.0 * 1.5f64.powi(level.saturating_sub(1) as i32)).floor() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: u32,
    /// XP earned inside the current level.
    #[serde(rename = "currentXP")]
    pub current_xp: u64,
    #[serde(rename = "xpForNextLevel")]
    pub xp_for_next_level: u64,
    #[serde(rename = "totalXP")]
    pub total_xp: u64,
}

pub fn level_from_total_xp(total_xp: u64) -> LevelInfo {
    let mut level = 1;
    let mut spent = 0u64;
    loop {
        let needed = xp_required_for_level(level);
        match spent.checked_add(needed) {
            Some(next) if next <= total_xp => {
                spent = next;
                level += 1;
            }
            _ => {
                return LevelInfo {
                    level,
                    current_xp: total_xp - spent,
                    xp_for_next_level: needed,
                    total_xp,
                };
            }
        }
    }
}

fn accuracy_bonus(accuracy: f64) -> u32 {
    match accuracy {
        a if a >= 0.95 => 50,
        a if a >= 0.85 => 30,
        a if a >= 0.75 => 15,
        _ => 0,
    }
}

/// XP for one session. Incomplete sessions earn nothing.
pub fn calculate_xp_reward(
    moves_played: u32,
    correct_moves: u32,
    completed: bool,
    difficulty: Difficulty,
) -> u32 {
    if !completed {
        return 0;
    }
    let accuracy = if moves_played == 0 {
        0.0
    } else {
        correct_moves as f64 / moves_played as f64
    };
    ((COMPLETION_XP + accuracy_bonus(accuracy)) as f64 * difficulty.xp_multiplier()).floor() as u32
}

pub fn level_title(level: u32) -> &'static str {
    match level {
        l if l < 5 => "Novice",
        l if l < 10 => "Apprentice",
        l if l < 15 => "Intermediate",
        l if l < 20 => "Advanced",
        l if l < 30 => "Expert",
        l if l < 50 => "Master",
        _ => "Grandmaster",
    }
}

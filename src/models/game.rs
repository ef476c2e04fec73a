use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::code::{Code, ParseCodeError};

/// Lifecycle state of a game. Stored as lowercase text; the database check
/// constraint on the column is a boundary check only, the closed enum is the
/// source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Won,
    Lost,
}

impl GameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Won => "won",
            GameStatus::Lost => "lost",
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Won | GameStatus::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Timer budget in seconds per difficulty.
static DIFFICULTY_TIMERS: Lazy<HashMap<Difficulty, i32>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(Difficulty::Easy, 180);
    map.insert(Difficulty::Medium, 120);
    map.insert(Difficulty::Hard, 90);
    map
});

impl Difficulty {
    pub const DEFAULT: Difficulty = Difficulty::Medium;

    /// Resolve user input, applying the default to anything unrecognized.
    pub fn parse_or_default(input: Option<&str>) -> Self {
        match input.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("easy") => Difficulty::Easy,
            Some("medium") => Difficulty::Medium,
            Some("hard") => Difficulty::Hard,
            _ => Self::DEFAULT,
        }
    }

    /// Total wall-clock budget for a game at this difficulty.
    pub fn timer_seconds(self) -> i32 {
        DIFFICULTY_TIMERS.get(&self).copied().unwrap_or(120)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A persisted game. One row per game; at most one `active` row per owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub id: i64,
    /// Session id of the owning player.
    pub owner: Uuid,
    pub player_username: Option<String>,
    pub secret_code: String,
    pub status: GameStatus,
    pub difficulty: Difficulty,
    pub max_guesses: i32,
    pub attempts_used: i32,
    /// Generated column: max_guesses - attempts_used.
    pub guesses_left: i32,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub timer_total_s: i32,
    /// Set only when the game is won.
    pub score: Option<i32>,
}

impl Game {
    /// Decode the stored secret. The column carries a `^[0-7]{4}$` check, so
    /// a failure here means the row is corrupt.
    pub fn secret(&self) -> Result<Code, ParseCodeError> {
        self.secret_code.parse()
    }

    /// Seconds left on the timer, floored at zero.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// One scored guess, appended to a game's history and never mutated after.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GuessRecord {
    pub id: i64,
    pub game_id: i64,
    pub digits: String,
    pub exact_count: i16,
    pub partial_count: i16,
    pub created_at: DateTime<Utc>,
}

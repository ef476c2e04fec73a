use chrono::{DateTime, Utc};

use super::scorer::{ScoreResult, Scorer};
use crate::models::{Code, Game, GameStatus};

/// Guess budget applied to new games unless configured otherwise.
pub const DEFAULT_MAX_GUESSES: i32 = 10;

/// Points awarded per unused guess when a game is won.
const WIN_BONUS_PER_GUESS: i64 = 5;

/// Outcome of submitting a guess against a game snapshot. Pure data; the
/// caller is responsible for persisting whatever the transition dictates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The game is already over; nothing changes.
    Ignored,
    /// The timer elapsed before this guess. The guess is not scored, no
    /// attempt is consumed, and the game moves to `lost`.
    TimedOut,
    /// The guess was scored and the game advanced.
    Scored(Settled),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub result: ScoreResult,
    /// Attempt count including this guess.
    pub attempts_used: i32,
    pub status: GameStatus,
    /// Present exactly when `status` is `Won`.
    pub final_score: Option<i32>,
}

/// Advance a game by one guess.
///
/// Transition order is load-bearing: terminal check, then timer, then
/// scoring with the win check ahead of the budget check so a correct guess
/// on the final attempt still wins.
pub fn apply_guess(game: &Game, secret: &Code, guess: &Code, now: DateTime<Utc>) -> Transition {
    if game.status.is_terminal() {
        return Transition::Ignored;
    }
    if now >= game.expires_at {
        return Transition::TimedOut;
    }

    let result = Scorer::score(secret, guess);
    let attempts_used = game.attempts_used + 1;

    let (status, final_score) = if result.is_win() {
        (GameStatus::Won, Some(final_score(game, attempts_used, now)))
    } else if attempts_used >= game.max_guesses {
        (GameStatus::Lost, None)
    } else {
        (GameStatus::Active, None)
    };

    Transition::Scored(Settled {
        result,
        attempts_used,
        status,
        final_score,
    })
}

/// Winning score: seconds left on the clock plus a bonus per unused guess,
/// both floored at zero.
fn final_score(game: &Game, attempts_used: i32, now: DateTime<Utc>) -> i32 {
    let remaining_seconds = (game.expires_at - now).num_seconds().max(0);
    let remaining_guesses = i64::from((game.max_guesses - attempts_used).max(0));
    (remaining_seconds + WIN_BONUS_PER_GUESS * remaining_guesses) as i32
}

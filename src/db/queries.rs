use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Result, Transaction};
use uuid::Uuid;

use crate::{
    game::scorer::ScoreResult,
    models::{Code, Difficulty, Game, GameStatus, GuessRecord},
};

/// Parameters for a freshly created game row.
pub struct NewGame {
    pub owner: Uuid,
    pub player_username: Option<String>,
    pub secret: Code,
    pub difficulty: Difficulty,
    pub max_guesses: i32,
    pub timer_total_s: i32,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Create a game for a session. Any prior active game for the same owner is
/// superseded (marked lost) in the same transaction, preserving the
/// one-active-game-per-owner invariant.
pub async fn create_game(pool: &PgPool, new: &NewGame) -> Result<Game> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE games SET status = $1 WHERE owner = $2 AND status = $3")
        .bind(GameStatus::Lost)
        .bind(new.owner)
        .bind(GameStatus::Active)
        .execute(&mut *tx)
        .await?;

    let game = sqlx::query_as::<_, Game>(
        r#"
        INSERT INTO games (
            owner, player_username, secret_code, status, difficulty,
            max_guesses, attempts_used, started_at, expires_at, timer_total_s
        )
        VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(new.owner)
    .bind(new.player_username.as_deref())
    .bind(new.secret.to_string())
    .bind(GameStatus::Active)
    .bind(new.difficulty)
    .bind(new.max_guesses)
    .bind(new.started_at)
    .bind(new.expires_at)
    .bind(new.timer_total_s)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(game)
}

/// Most recent game for a session, regardless of status. Drives the home view.
pub async fn find_latest_game(pool: &PgPool, owner: Uuid) -> Result<Option<Game>> {
    sqlx::query_as::<_, Game>(
        "SELECT * FROM games WHERE owner = $1 ORDER BY started_at DESC, id DESC LIMIT 1",
    )
    .bind(owner)
    .fetch_optional(pool)
    .await
}

/// Lock the session's active game for the duration of a guess transaction.
pub async fn lock_active_game(
    tx: &mut Transaction<'_, Postgres>,
    owner: Uuid,
) -> Result<Option<Game>> {
    sqlx::query_as::<_, Game>(
        r#"
        SELECT * FROM games
        WHERE owner = $1 AND status = $2
        ORDER BY started_at DESC, id DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(owner)
    .bind(GameStatus::Active)
    .fetch_optional(&mut **tx)
    .await
}

/// Guess history for a game, oldest first.
pub async fn list_guesses(pool: &PgPool, game_id: i64) -> Result<Vec<GuessRecord>> {
    sqlx::query_as::<_, GuessRecord>("SELECT * FROM guesses WHERE game_id = $1 ORDER BY id")
        .bind(game_id)
        .fetch_all(pool)
        .await
}

/// Append a scored guess to the game's history.
pub async fn record_guess(
    tx: &mut Transaction<'_, Postgres>,
    game_id: i64,
    guess: &Code,
    score: &ScoreResult,
) -> Result<GuessRecord> {
    sqlx::query_as::<_, GuessRecord>(
        r#"
        INSERT INTO guesses (game_id, digits, exact_count, partial_count)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(game_id)
    .bind(guess.to_string())
    .bind(i16::from(score.exact))
    .bind(i16::from(score.partial))
    .fetch_one(&mut **tx)
    .await
}

/// Persist the game-side outcome of a scored guess. Runs in the same
/// transaction as `record_guess` so attempts and history can never diverge.
pub async fn settle_guess(
    tx: &mut Transaction<'_, Postgres>,
    game_id: i64,
    attempts_used: i32,
    status: GameStatus,
    score: Option<i32>,
) -> Result<()> {
    sqlx::query("UPDATE games SET attempts_used = $1, status = $2, score = $3 WHERE id = $4")
        .bind(attempts_used)
        .bind(status)
        .bind(score)
        .bind(game_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Timer-expiry transition: the game is lost without consuming an attempt.
pub async fn mark_lost(tx: &mut Transaction<'_, Postgres>, game_id: i64) -> Result<()> {
    sqlx::query("UPDATE games SET status = $1 WHERE id = $2")
        .bind(GameStatus::Lost)
        .bind(game_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

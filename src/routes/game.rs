use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::queries,
    error::GameError,
    game::lifecycle::{self, Transition},
    models::{Code, Difficulty},
    session, views, AppState,
};

/// Notice codes carried across redirects as a query parameter. The closed
/// set keeps arbitrary user text out of the rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    InvalidGuess,
    NoActiveGame,
    TimedOut,
}

impl Notice {
    fn code(self) -> &'static str {
        match self {
            Notice::InvalidGuess => "invalid-guess",
            Notice::NoActiveGame => "no-game",
            Notice::TimedOut => "timeout",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "invalid-guess" => Some(Notice::InvalidGuess),
            "no-game" => Some(Notice::NoActiveGame),
            "timeout" => Some(Notice::TimedOut),
            _ => None,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Notice::InvalidGuess => "Guesses must be exactly 4 digits between 0 and 7.",
            Notice::NoActiveGame => "No game in progress. Start a new one below.",
            Notice::TimedOut => "Time ran out. That one goes down as a loss.",
        }
    }

    fn redirect(self) -> Redirect {
        Redirect::to(&format!("/?notice={}", self.code()))
    }
}

#[derive(Debug, Deserialize)]
pub struct HomeParams {
    notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GuessForm {
    guess: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewGameForm {
    difficulty: Option<String>,
    player_username: Option<String>,
}

/// Render the current game state for the requesting session.
pub async fn home(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HomeParams>,
    headers: HeaderMap,
) -> Result<Response, GameError> {
    let secret_key = &state.config.security.session_secret;
    let (owner, fresh_token) = match session::owner_from_headers(&headers, secret_key) {
        Some(owner) => (owner, None),
        None => {
            let owner = Uuid::new_v4();
            let token = session::mint_token(owner, secret_key)?;
            (owner, Some(token))
        }
    };

    let game = queries::find_latest_game(&state.db, owner).await?;
    let history = match &game {
        Some(g) => queries::list_guesses(&state.db, g.id).await?,
        None => Vec::new(),
    };

    let notice = params
        .notice
        .as_deref()
        .and_then(Notice::from_code)
        .map(Notice::message);
    let ctx = views::HomeContext::assemble(game.as_ref(), &history, notice, Utc::now());
    let page = Html(views::render_home(&ctx));

    Ok(match fresh_token {
        Some(token) => {
            ([(header::SET_COOKIE, session::session_cookie(&token))], page).into_response()
        }
        None => page.into_response(),
    })
}

/// Advance the session's active game by one guess, then redirect home.
pub async fn submit_guess(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<GuessForm>,
) -> Result<Response, GameError> {
    let owner = session::owner_from_headers(&headers, &state.config.security.session_secret);

    match try_submit_guess(&state, owner, &form).await {
        Ok(response) => Ok(response),
        // Recoverable input problems surface as a message, no state touched
        Err(GameError::InvalidGuess(_)) => Ok(Notice::InvalidGuess.redirect().into_response()),
        Err(GameError::NoActiveGame) => Ok(Notice::NoActiveGame.redirect().into_response()),
        Err(e) => Err(e),
    }
}

async fn try_submit_guess(
    state: &AppState,
    owner: Option<Uuid>,
    form: &GuessForm,
) -> Result<Response, GameError> {
    let owner = owner.ok_or(GameError::NoActiveGame)?;

    // Reject malformed input before touching any state; a bad guess never
    // consumes an attempt.
    let guess: Code = form.guess.as_deref().unwrap_or("").trim().parse()?;

    let mut tx = state.db.begin().await?;
    let game = queries::lock_active_game(&mut tx, owner)
        .await?
        .ok_or(GameError::NoActiveGame)?;
    let secret = game.secret().map_err(GameError::CorruptSecret)?;

    match lifecycle::apply_guess(&game, &secret, &guess, Utc::now()) {
        // Unreachable through the active-game lock, but the state machine
        // answers for itself either way.
        Transition::Ignored => Ok(Redirect::to("/").into_response()),
        Transition::TimedOut => {
            queries::mark_lost(&mut tx, game.id).await?;
            tx.commit().await?;
            tracing::info!(game_id = game.id, "game timed out");
            Ok(Notice::TimedOut.redirect().into_response())
        }
        Transition::Scored(settled) => {
            queries::record_guess(&mut tx, game.id, &guess, &settled.result).await?;
            queries::settle_guess(
                &mut tx,
                game.id,
                settled.attempts_used,
                settled.status,
                settled.final_score,
            )
            .await?;
            tx.commit().await?;
            tracing::debug!(
                game_id = game.id,
                exact = settled.result.exact,
                partial = settled.result.partial,
                status = settled.status.as_str(),
                "guess scored"
            );
            Ok(Redirect::to("/").into_response())
        }
    }
}

/// Start a fresh game, superseding any game already in progress.
pub async fn new_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<NewGameForm>,
) -> Result<Response, GameError> {
    let secret_key = &state.config.security.session_secret;
    let (owner, fresh_token) = match session::owner_from_headers(&headers, secret_key) {
        Some(owner) => (owner, None),
        None => {
            let owner = Uuid::new_v4();
            let token = session::mint_token(owner, secret_key)?;
            (owner, Some(token))
        }
    };

    let difficulty = Difficulty::parse_or_default(form.difficulty.as_deref());
    let secret = state.secrets.generate().await;

    let now = Utc::now();
    let timer_total_s = difficulty.timer_seconds();
    let new = queries::NewGame {
        owner,
        player_username: form
            .player_username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| name.chars().take(80).collect()),
        secret,
        difficulty,
        max_guesses: state.config.game.max_guesses,
        timer_total_s,
        started_at: now,
        expires_at: now + Duration::seconds(i64::from(timer_total_s)),
    };
    let game = queries::create_game(&state.db, &new).await?;

    tracing::info!(
        game_id = game.id,
        difficulty = difficulty.as_str(),
        "new game started"
    );

    let redirect = Redirect::to("/");
    Ok(match fresh_token {
        Some(token) => {
            ([(header::SET_COOKIE, session::session_cookie(&token))], redirect).into_response()
        }
        None => redirect.into_response(),
    })
}

use chrono::{DateTime, Utc};

use crate::models::{Difficulty, Game, GameStatus, GuessRecord};

/// Read-only, per-request view of the persisted state. Assembled once from
/// the database rows and handed to the renderer; nothing here mutates game
/// state.
pub struct HomeContext {
    pub notice: Option<&'static str>,
    pub game: Option<GameView>,
}

pub struct GameView {
    pub status: GameStatus,
    pub difficulty: Difficulty,
    pub player_username: Option<String>,
    /// Revealed only once the game is over.
    pub secret_code: Option<String>,
    pub max_guesses: i32,
    pub attempts_used: i32,
    pub guesses_left: i32,
    pub remaining_seconds: i64,
    pub score: Option<i32>,
    pub history: Vec<HistoryRow>,
}

pub struct HistoryRow {
    pub digits: String,
    pub exact: i16,
    pub partial: i16,
}

impl HomeContext {
    pub fn assemble(
        game: Option<&Game>,
        history: &[GuessRecord],
        notice: Option<&'static str>,
        now: DateTime<Utc>,
    ) -> Self {
        let game = game.map(|g| GameView {
            status: g.status,
            difficulty: g.difficulty,
            player_username: g.player_username.clone(),
            secret_code: g.status.is_terminal().then(|| g.secret_code.clone()),
            max_guesses: g.max_guesses,
            attempts_used: g.attempts_used,
            guesses_left: g.guesses_left.max(0),
            remaining_seconds: g.remaining_seconds(now),
            score: g.score,
            history: history
                .iter()
                .map(|h| HistoryRow {
                    digits: h.digits.clone(),
                    exact: h.exact_count,
                    partial: h.partial_count,
                })
                .collect(),
        });
        Self { notice, game }
    }
}

/// Render the home page. Plain string assembly; the stylesheet is served
/// from the static directory.
pub fn render_home(ctx: &HomeContext) -> String {
    let mut page = String::with_capacity(4096);

    page.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>Mastermind</title>\n\
         <link rel=\"stylesheet\" href=\"/style.css\">\n\
         </head>\n<body>\n<main>\n",
    );
    page.push_str("<h1>Mastermind</h1>\n");
    page.push_str(
        "<p class=\"rules\">Crack the 4-digit code. Digits run from 0 to 7 and may repeat. \
         Each guess tells you how many digits are in the right place and how many are \
         correct but misplaced.</p>\n",
    );

    if let Some(notice) = ctx.notice {
        page.push_str("<p class=\"notice\">");
        page.push_str(notice);
        page.push_str("</p>\n");
    }

    match &ctx.game {
        Some(game) => render_game(&mut page, game),
        None => page.push_str("<p>No game yet. Start one below.</p>\n"),
    }

    render_new_game_form(&mut page);

    page.push_str("</main>\n</body>\n</html>\n");
    page
}

fn render_game(page: &mut String, game: &GameView) {
    if let Some(name) = &game.player_username {
        page.push_str("<p class=\"player\">Playing as ");
        page.push_str(&escape_html(name));
        page.push_str("</p>\n");
    }

    match game.status {
        GameStatus::Active => {
            page.push_str(&format!(
                "<p class=\"status\">Difficulty: {} &middot; {} of {} guesses left &middot; {} seconds remaining</p>\n",
                game.difficulty.as_str(),
                game.guesses_left,
                game.max_guesses,
                game.remaining_seconds,
            ));
            if game.remaining_seconds == 0 {
                page.push_str("<p class=\"status\">Time is up. Your next guess ends the game.</p>\n");
            }
            page.push_str(
                "<form method=\"post\" action=\"/guess\" class=\"guess-form\">\n\
                 <input name=\"guess\" maxlength=\"4\" pattern=\"[0-7]{4}\" \
                 placeholder=\"e.g. 0123\" autofocus required>\n\
                 <button type=\"submit\">Guess</button>\n\
                 </form>\n",
            );
        }
        GameStatus::Won => {
            page.push_str("<p class=\"result won\">You cracked the code!");
            if let Some(score) = game.score {
                page.push_str(&format!(" Final score: {}.", score));
            }
            page.push_str("</p>\n");
        }
        GameStatus::Lost => {
            page.push_str("<p class=\"result lost\">Game over.</p>\n");
        }
    }

    if let Some(secret) = &game.secret_code {
        page.push_str(&format!(
            "<p class=\"secret\">The code was <strong>{}</strong>.</p>\n",
            escape_html(secret)
        ));
    }

    if !game.history.is_empty() {
        page.push_str(
            "<table class=\"history\">\n<tr><th>#</th><th>Guess</th>\
             <th>Exact</th><th>Number only</th></tr>\n",
        );
        for (i, row) in game.history.iter().enumerate() {
            page.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                i + 1,
                escape_html(&row.digits),
                row.exact,
                row.partial,
            ));
        }
        page.push_str("</table>\n");
    }
}

fn render_new_game_form(page: &mut String) {
    page.push_str(
        "<form method=\"post\" action=\"/new\" class=\"new-game-form\">\n\
         <select name=\"difficulty\">\n\
         <option value=\"easy\">Easy (180s)</option>\n\
         <option value=\"medium\" selected>Medium (120s)</option>\n\
         <option value=\"hard\">Hard (90s)</option>\n\
         </select>\n\
         <input name=\"player_username\" maxlength=\"80\" placeholder=\"Name (optional)\">\n\
         <button type=\"submit\">New game</button>\n\
         </form>\n",
    );
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Game, GameStatus, GuessRecord};
    use chrono::Duration;
    use uuid::Uuid;

    fn sample_game(status: GameStatus, now: DateTime<Utc>) -> Game {
        Game {
            id: 7,
            owner: Uuid::new_v4(),
            player_username: Some("Robin".into()),
            secret_code: "0123".into(),
            status,
            difficulty: Difficulty::Easy,
            max_guesses: 10,
            attempts_used: 1,
            guesses_left: 9,
            started_at: now,
            expires_at: now + Duration::seconds(180),
            timer_total_s: 180,
            score: None,
        }
    }

    fn sample_history() -> Vec<GuessRecord> {
        vec![GuessRecord {
            id: 1,
            game_id: 7,
            digits: "4321".into(),
            exact_count: 0,
            partial_count: 3,
            created_at: Utc::now(),
        }]
    }

    #[test]
    fn test_render_without_game_offers_new_game() {
        let ctx = HomeContext::assemble(None, &[], None, Utc::now());
        let html = render_home(&ctx);
        assert!(html.contains("No game yet"));
        assert!(html.contains("action=\"/new\""));
        assert!(!html.contains("action=\"/guess\""));
    }

    #[test]
    fn test_render_active_game_shows_guess_form_and_history() {
        let now = Utc::now();
        let game = sample_game(GameStatus::Active, now);
        let ctx = HomeContext::assemble(Some(&game), &sample_history(), None, now);
        let html = render_home(&ctx);
        assert!(html.contains("action=\"/guess\""));
        assert!(html.contains("9 of 10 guesses left"));
        assert!(html.contains("180 seconds remaining"));
        assert!(html.contains("<td>4321</td>"));
        // Secret never leaks while the game is live
        assert!(!html.contains("The code was"));
    }

    #[test]
    fn test_render_won_game_shows_score_and_secret() {
        let now = Utc::now();
        let mut game = sample_game(GameStatus::Won, now);
        game.score = Some(145);
        let ctx = HomeContext::assemble(Some(&game), &sample_history(), None, now);
        let html = render_home(&ctx);
        assert!(html.contains("You cracked the code"));
        assert!(html.contains("Final score: 145"));
        assert!(html.contains("The code was <strong>0123</strong>"));
        assert!(!html.contains("action=\"/guess\""));
    }

    #[test]
    fn test_render_lost_game_reveals_secret() {
        let now = Utc::now();
        let game = sample_game(GameStatus::Lost, now);
        let ctx = HomeContext::assemble(Some(&game), &[], None, now);
        let html = render_home(&ctx);
        assert!(html.contains("Game over"));
        assert!(html.contains("The code was <strong>0123</strong>"));
    }

    #[test]
    fn test_render_notice() {
        let ctx = HomeContext::assemble(None, &[], Some("Guesses must be 4 digits."), Utc::now());
        let html = render_home(&ctx);
        assert!(html.contains("class=\"notice\""));
        assert!(html.contains("Guesses must be 4 digits."));
    }

    #[test]
    fn test_player_name_is_escaped() {
        let now = Utc::now();
        let mut game = sample_game(GameStatus::Active, now);
        game.player_username = Some("<script>alert(1)</script>".into());
        let ctx = HomeContext::assemble(Some(&game), &[], None, now);
        let html = render_home(&ctx);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_assemble_floors_expired_timer_at_zero() {
        let now = Utc::now();
        let mut game = sample_game(GameStatus::Active, now);
        game.expires_at = now - Duration::seconds(5);
        let ctx = HomeContext::assemble(Some(&game), &[], None, now);
        assert_eq!(ctx.game.as_ref().unwrap().remaining_seconds, 0);
    }
}

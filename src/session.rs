use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cookie that carries the signed session token.
pub const SESSION_COOKIE: &str = "mastermind_session";

/// Sessions outlive any single game by a wide margin.
const SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Claims {
    sub: String, // Session ID
    exp: usize,  // Expiration time
}

/// Mint a signed token for a session id.
pub fn mint_token(owner: Uuid, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(SESSION_TTL_DAYS))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: owner.to_string(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

/// Validate a token and recover the session id. Any failure (bad signature,
/// expired, malformed id) reads as "no session".
pub fn verify_token(token: &str, secret: &str) -> Option<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .ok()?;

    data.claims.sub.parse().ok()
}

/// Pull the session id out of the request's Cookie header, if present and valid.
pub fn owner_from_headers(headers: &HeaderMap, secret: &str) -> Option<Uuid> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').map(str::trim).find_map(|pair| {
        let token = pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('=')?;
        verify_token(token, secret)
    })
}

/// Set-Cookie value for a freshly minted token.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL_DAYS * 24 * 60 * 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_mint_and_verify_round_trip() {
        let owner = Uuid::new_v4();
        let token = mint_token(owner, SECRET).unwrap();
        assert_eq!(verify_token(&token, SECRET), Some(owner));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = mint_token(Uuid::new_v4(), SECRET).unwrap();
        assert_eq!(verify_token(&token, "other-secret"), None);
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let mut token = mint_token(Uuid::new_v4(), SECRET).unwrap();
        token.push('x');
        assert_eq!(verify_token(&token, SECRET), None);
    }

    #[test]
    fn test_owner_from_headers_finds_session_cookie() {
        let owner = Uuid::new_v4();
        let token = mint_token(owner, SECRET).unwrap();

        let mut headers = HeaderMap::new();
        let value = format!("theme=dark; {}={}; lang=en", SESSION_COOKIE, token);
        headers.insert(header::COOKIE, HeaderValue::from_str(&value).unwrap());

        assert_eq!(owner_from_headers(&headers, SECRET), Some(owner));
    }

    #[test]
    fn test_owner_from_headers_without_cookie() {
        let headers = HeaderMap::new();
        assert_eq!(owner_from_headers(&headers, SECRET), None);
    }

    #[test]
    fn test_owner_from_headers_ignores_invalid_token() {
        let mut headers = HeaderMap::new();
        let value = format!("{}=not-a-real-token", SESSION_COOKIE);
        headers.insert(header::COOKIE, HeaderValue::from_str(&value).unwrap());

        assert_eq!(owner_from_headers(&headers, SECRET), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok");
        assert!(cookie.starts_with("mastermind_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("SameSite=Lax"));
    }
}

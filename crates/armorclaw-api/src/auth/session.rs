//! Session token verification.
//!
//! Tokens are HS256 JWTs issued by the sign-in layer; `sub` is the stable account id.
//! They arrive as `Authorization: Bearer <jwt>` or in the `session` cookie.

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|t| !t.is_empty())
}

/// Session token from the bearer header, falling back to the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| cookie_token(headers))
}

pub fn verify_session_token(
    token: &str,
    secret: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "an-hs256-secret-of-at-least-32-chars";

    fn token(sub: &str, exp_offset: i64, secret: &str) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            iat: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_bearer_preferred_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; session=xyz"));
        assert_eq!(session_token(&headers), Some("abc"));

        headers.remove(header::AUTHORIZATION);
        assert_eq!(session_token(&headers), Some("xyz"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sessionid=1"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_verify_valid_expired_and_forged() {
        let claims = verify_session_token(&token("gh-42", 3600, SECRET), SECRET).unwrap();
        assert_eq!(claims.sub, "gh-42");

        assert!(verify_session_token(&token("gh-42", -3600, SECRET), SECRET).is_err());
        assert!(verify_session_token(
            &token("gh-42", 3600, "another-secret-of-at-least-32-chars!"),
            SECRET
        )
        .is_err());
    }
}

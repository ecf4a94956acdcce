//! Request identity extractors.

use armorclaw_core::{models::Identity, AppError};
use axum::extract::{ConnectInfo, FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::net::SocketAddr;

use super::session::{session_token, verify_session_token};
use crate::error::HttpAppError;
use crate::state::SecurityConfig;
use crate::utils::ip_extraction::extract_client_ip;

/// Caller identity: the account behind a valid session token, otherwise anonymous by IP.
///
/// A token that is present but fails verification is treated as absent.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

impl<S> FromRequestParts<S> for Caller
where
    SecurityConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let security = SecurityConfig::from_ref(state);

        if let Some(token) = session_token(&parts.headers) {
            match verify_session_token(token, &security.jwt_secret) {
                Ok(claims) => {
                    return Ok(Caller(Identity::Authenticated {
                        user_id: claims.sub,
                    }))
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Session token rejected, continuing as anonymous");
                }
            }
        }

        let socket_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let ip = extract_client_ip(
            &parts.headers,
            socket_addr.as_ref(),
            security.trusted_proxy_count,
        );

        Ok(Caller(Identity::Anonymous { ip }))
    }
}

/// Caller that must be signed in; anonymous requests get 401.
#[derive(Debug, Clone)]
pub struct SignedIn(pub Identity);

impl<S> FromRequestParts<S> for SignedIn
where
    SecurityConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Caller(identity) = Caller::from_request_parts(parts, state).await?;
        if identity.is_authenticated() {
            Ok(SignedIn(identity))
        } else {
            Err(HttpAppError(AppError::Unauthorized(
                "Sign in required".to_string(),
            )))
        }
    }
}

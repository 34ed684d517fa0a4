use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use exhibits_auth::{AuthMode, Credential, Hs256TokenVerifier, TokenVerifier};

use crate::app::errors::json_error;
use crate::context::CredentialContext;

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

#[derive(Clone)]
pub struct AuthState {
    pub mode: AuthMode,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AuthState {
    /// HS256 verification with the secret shared with the login service.
    pub fn new(mode: AuthMode, jwt_secret: &str) -> Self {
        Self {
            mode,
            verifier: Arc::new(Hs256TokenVerifier::new(jwt_secret)),
        }
    }
}

/// Attach a [`CredentialContext`] built from `x-access-token`.
///
/// In claims mode the token is verified here and only its subject travels on;
/// in legacy mode the raw token is passed through for lookup.
pub async fn credential_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_access_token(req.headers()).ok_or_else(unauthenticated)?;

    let credential = match state.mode {
        AuthMode::Claims => {
            let claims = state.verifier.verify(token, Utc::now()).map_err(|e| {
                debug!(error = %e, "access token rejected");
                unauthenticated()
            })?;
            Credential::subject(claims.sub)
        }
        AuthMode::Legacy => Credential::legacy_token(token),
    };

    req.extensions_mut().insert(CredentialContext::new(credential));

    Ok(next.run(req).await)
}

fn extract_access_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers.get(ACCESS_TOKEN_HEADER)?.to_str().ok()?.trim();
    if token.is_empty() { None } else { Some(token) }
}

fn unauthenticated() -> Response {
    json_error(
        StatusCode::UNAUTHORIZED,
        "unauthenticated",
        "a valid x-access-token is required",
    )
}

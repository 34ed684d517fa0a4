use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::warn;

use exhibits_auth::{AuthzError, Decision};

pub fn authz_error_to_response(err: &AuthzError) -> axum::response::Response {
    match err {
        AuthzError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "credential does not resolve to an active user",
        ),
        AuthzError::NoRequiredActions => json_error(
            StatusCode::BAD_REQUEST,
            "no_required_actions",
            "at least one permission is required",
        ),
        AuthzError::MalformedRequest(msg) => json_error(StatusCode::BAD_REQUEST, "malformed_request", msg.clone()),
        AuthzError::Lookup(_) | AuthzError::Timeout(_) => {
            warn!(error = %err, "authorization lookup failed; denying");
            forbidden(None)
        }
    }
}

/// 403 with `allowed: false`, plus the decision when there is one.
pub fn forbidden(decision: Option<&Decision>) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        axum::Json(json!({
            "error": "forbidden",
            "message": "not permitted",
            "allowed": false,
            "decision": decision,
        })),
    )
        .into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

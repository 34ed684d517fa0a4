use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::dto::{CheckRequest, CheckResponse};
use crate::app::{SharedEngine, errors};
use crate::authz;
use crate::context::CredentialContext;

/// POST /api/v1/authorization/check - may the caller perform these actions?
pub async fn check(
    Extension(engine): Extension<SharedEngine>,
    Extension(ctx): Extension<CredentialContext>,
    body: Result<Json<CheckRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()),
    };

    let request = match body.into_request(ctx.into_credential()) {
        Ok(request) => request,
        Err(resp) => return resp,
    };

    match authz::require(&*engine, &request).await {
        Ok(decision) => (
            StatusCode::OK,
            Json(CheckResponse {
                allowed: true,
                decision,
            }),
        )
            .into_response(),
        Err(resp) => resp,
    }
}

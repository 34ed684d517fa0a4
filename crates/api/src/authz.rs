//! API-side authorization guard.
//!
//! Handlers call [`require`] before touching a protected record; the engine's
//! outcome is mapped to a status code here so every route answers the same way.

use axum::response::Response;

use exhibits_auth::{AuthorizationEngine, AuthorizationRequest, Decision, IdentityStore, OwnershipStore};

use crate::app::errors;

/// Evaluate `request`; a granted decision or the response to send instead.
///
/// 401 when the credential does not resolve, 400 for malformed requests, 403
/// for denials and for lookup failures.
pub async fn require<I, O>(
    engine: &AuthorizationEngine<I, O>,
    request: &AuthorizationRequest,
) -> Result<Decision, Response>
where
    I: IdentityStore,
    O: OwnershipStore,
{
    match engine.evaluate(request).await {
        Ok(decision) if decision.is_granted() => Ok(decision),
        Ok(decision) => Err(errors::forbidden(Some(&decision))),
        Err(e) => Err(errors::authz_error_to_response(&e)),
    }
}

use std::str::FromStr;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use exhibits_auth::{AuthorizationRequest, Credential, Decision};
use exhibits_core::{RecordId, RecordType};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /api/v1/authorization/check`.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub permissions: Vec<String>,
    pub record_type: Option<String>,
    pub parent_id: Option<String>,
    pub child_id: Option<String>,
    /// Admin scope: any single held permission suffices.
    #[serde(default)]
    pub users: bool,
}

impl CheckRequest {
    /// Validate identifiers and build the engine request.
    pub fn into_request(self, credential: Credential) -> Result<AuthorizationRequest, axum::response::Response> {
        let record_type = self.record_type.as_deref().map(parse_record_type).transpose()?;
        let parent_id = self.parent_id.as_deref().map(parse_record_id).transpose()?;
        let child_id = self.child_id.as_deref().map(parse_record_id).transpose()?;

        Ok(AuthorizationRequest {
            credential,
            required_actions: self.permissions.into_iter().map(Into::into).collect(),
            record_type,
            parent_id,
            child_id,
            admin_scope: self.users,
        })
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
    pub decision: Decision,
}

pub fn parse_record_type(s: &str) -> Result<RecordType, axum::response::Response> {
    RecordType::from_str(s).map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_record_type",
            "record_type must be one of: exhibit, item, heading, grid, grid_item, timeline, timeline_item",
        )
    })
}

pub fn parse_record_id(s: &str) -> Result<RecordId, axum::response::Response> {
    RecordId::from_str(s)
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_uuid", format!("invalid uuid: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exhibits_auth::known;

    fn body(json: serde_json::Value) -> CheckRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn builds_engine_request() {
        let parent = RecordId::new();
        let request = body(serde_json::json!({
            "permissions": ["Add_Item", "delete_item"],
            "record_type": "grid_item",
            "parent_id": parent.to_string(),
            "child_id": null,
            "users": true,
        }))
        .into_request(Credential::subject("curator"))
        .unwrap();

        assert_eq!(request.required_actions, vec![known::ADD_ITEM, known::DELETE_ITEM]);
        assert_eq!(request.record_type, Some(RecordType::GridItem));
        assert_eq!(request.parent_id, Some(parent));
        assert_eq!(request.child_id, None);
        assert!(request.admin_scope);
    }

    #[test]
    fn rejects_unknown_record_type_and_bad_uuids() {
        let bad_type = body(serde_json::json!({ "permissions": ["add_item"], "record_type": "media" }));
        let resp = bad_type.into_request(Credential::subject("curator")).unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bad_id = body(serde_json::json!({ "permissions": ["add_item"], "parent_id": "not-a-uuid" }));
        let resp = bad_id.into_request(Credential::subject("curator")).unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn admin_scope_defaults_off() {
        let request = body(serde_json::json!({ "permissions": [] }))
            .into_request(Credential::subject("curator"))
            .unwrap();
        assert!(!request.admin_scope);
        assert!(request.record_type.is_none());
    }
}

//! Read-only storage contracts the engine depends on.
//!
//! Implementations live in `exhibits-infra` (Postgres and in-memory). Every
//! method is a single read; "not found" is `Ok(None)` or an empty list, never
//! an error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use exhibits_core::{RecordId, RecordType, UserId};

use crate::{AuthzError, PermissionEntry, RoleGrant};

/// Storage failure. Collapsed into a denial by the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} returned an unreadable row: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    pub fn decode(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            operation,
            message: message.into(),
        }
    }
}

/// The parts of a user row the credential resolver needs.
///
/// `id` is the raw stored value; it is normalized into a [`UserId`] by the
/// resolver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub is_active: bool,
}

/// Users, their role grants and the permission catalog.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    /// Legacy lookup by the token stored on the user row (exact match).
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// `(role, permission)` pairs conferred by the user's active role.
    async fn role_grants(&self, user_id: UserId) -> Result<Vec<RoleGrant>, StoreError>;

    async fn permission_catalog(&self) -> Result<Vec<PermissionEntry>, StoreError>;
}

/// Stored `owner` values of ownable records.
///
/// Owners are returned raw (`0`/negative included) so the resolver can treat
/// malformed values as a resolution failure.
#[async_trait::async_trait]
pub trait OwnershipStore: Send + Sync {
    async fn exhibit_owner(&self, exhibit_id: RecordId) -> Result<Option<i64>, StoreError>;

    /// Owner of a child record, looked up within its parent exhibit.
    ///
    /// `RecordType::Exhibit` is not a child type and always yields `None`.
    async fn record_owner(
        &self,
        record_type: RecordType,
        exhibit_id: RecordId,
        record_id: RecordId,
    ) -> Result<Option<i64>, StoreError>;
}

#[async_trait::async_trait]
impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        (**self).find_user_by_token(token).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        (**self).find_user_by_username(username).await
    }

    async fn role_grants(&self, user_id: UserId) -> Result<Vec<RoleGrant>, StoreError> {
        (**self).role_grants(user_id).await
    }

    async fn permission_catalog(&self) -> Result<Vec<PermissionEntry>, StoreError> {
        (**self).permission_catalog().await
    }
}

#[async_trait::async_trait]
impl<S> OwnershipStore for Arc<S>
where
    S: OwnershipStore + ?Sized,
{
    async fn exhibit_owner(&self, exhibit_id: RecordId) -> Result<Option<i64>, StoreError> {
        (**self).exhibit_owner(exhibit_id).await
    }

    async fn record_owner(
        &self,
        record_type: RecordType,
        exhibit_id: RecordId,
        record_id: RecordId,
    ) -> Result<Option<i64>, StoreError> {
        (**self).record_owner(record_type, exhibit_id, record_id).await
    }
}

/// Run one store lookup under a deadline.
pub(crate) async fn bounded<T, F>(
    limit: Duration,
    operation: &'static str,
    lookup: F,
) -> Result<T, AuthzError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, lookup).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AuthzError::Lookup(e)),
        Err(_) => Err(AuthzError::Timeout(operation)),
    }
}

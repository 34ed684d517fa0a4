use std::time::Duration;

use tracing::debug;

use exhibits_core::UserId;

use crate::claims::is_well_formed;
use crate::store::{IdentityStore, UserRecord, bounded};
use crate::{AuthzError, Credential, PermissionCatalog, Principal, RoleGrant};

/// Resolves credentials to users and users to their grants.
///
/// Pure lookup: no caching, no writes.
pub struct CredentialResolver<S> {
    store: S,
    lookup_timeout: Duration,
}

impl<S> CredentialResolver<S>
where
    S: IdentityStore,
{
    pub fn new(store: S, lookup_timeout: Duration) -> Self {
        Self {
            store,
            lookup_timeout,
        }
    }

    /// Resolve a credential to an active user.
    ///
    /// Blank or structurally malformed credentials are rejected before any
    /// lookup. Subjects are matched exactly as claimed. Unknown and inactive users are `Unauthenticated`; only store
    /// failures surface as other errors.
    pub async fn resolve(&self, credential: &Credential) -> Result<Principal, AuthzError> {
        let record = match credential {
            Credential::Subject(username) => {
                if username.trim().is_empty() {
                    return Err(AuthzError::Unauthenticated);
                }
                bounded(
                    self.lookup_timeout,
                    "find_user_by_username",
                    self.store.find_user_by_username(username),
                )
                .await?
            }
            Credential::LegacyToken(token) => {
                if !is_well_formed(token) {
                    debug!("legacy token failed structural check");
                    return Err(AuthzError::Unauthenticated);
                }
                bounded(
                    self.lookup_timeout,
                    "find_user_by_token",
                    self.store.find_user_by_token(token),
                )
                .await?
            }
        };

        match record {
            Some(UserRecord {
                id,
                is_active: true,
            }) => UserId::from_raw(id)
                .map(Principal::new)
                .ok_or(AuthzError::Unauthenticated),
            Some(_) => {
                debug!(kind = credential.kind(), "credential matched an inactive user");
                Err(AuthzError::Unauthenticated)
            }
            None => Err(AuthzError::Unauthenticated),
        }
    }

    pub async fn grants(&self, principal: &Principal) -> Result<Vec<RoleGrant>, AuthzError> {
        bounded(
            self.lookup_timeout,
            "role_grants",
            self.store.role_grants(principal.user_id),
        )
        .await
    }

    pub async fn catalog(&self) -> Result<PermissionCatalog, AuthzError> {
        let entries = bounded(
            self.lookup_timeout,
            "permission_catalog",
            self.store.permission_catalog(),
        )
        .await?;
        Ok(PermissionCatalog::from_entries(entries))
    }
}

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use exhibits_core::{RecordId, RecordType, UserId};

use crate::credentials::CredentialResolver;
use crate::ownership::OwnershipResolver;
use crate::store::{IdentityStore, OwnershipStore, StoreError};
use crate::{Credential, Permission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("no required actions supplied")]
    NoRequiredActions,

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("lookup failed: {0}")]
    Lookup(#[from] StoreError),

    #[error("lookup timed out: {0}")]
    Timeout(&'static str),
}

impl AuthzError {
    /// Errors that come from the store rather than from the caller.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthzError::Lookup(_) | AuthzError::Timeout(_))
    }
}

/// One protected operation, as described by the route that performs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub credential: Credential,
    pub required_actions: Vec<Permission>,
    /// `None` when the caller could not name a supported record type; ownership
    /// then never resolves.
    pub record_type: Option<RecordType>,
    pub parent_id: Option<RecordId>,
    pub child_id: Option<RecordId>,
    /// Any single matched permission is enough when set.
    pub admin_scope: bool,
}

impl AuthorizationRequest {
    pub fn new<I, P>(credential: Credential, required_actions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self {
            credential,
            required_actions: required_actions.into_iter().map(Into::into).collect(),
            record_type: None,
            parent_id: None,
            child_id: None,
            admin_scope: false,
        }
    }

    pub fn on(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    pub fn in_exhibit(mut self, exhibit_id: RecordId) -> Self {
        self.parent_id = Some(exhibit_id);
        self
    }

    pub fn record(mut self, record_id: RecordId) -> Self {
        self.child_id = Some(record_id);
        self
    }

    pub fn admin_scope(mut self, admin_scope: bool) -> Self {
        self.admin_scope = admin_scope;
        self
    }

    /// Distinct normalized actions, or why there are none usable.
    fn required(&self) -> Result<BTreeSet<Permission>, AuthzError> {
        if self.required_actions.is_empty() {
            return Err(AuthzError::NoRequiredActions);
        }
        if self.required_actions.iter().any(Permission::is_blank) {
            return Err(AuthzError::MalformedRequest("blank action name".into()));
        }
        Ok(self.required_actions.iter().cloned().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantReason {
    FullMatch,
    AdminScope,
    Ownership,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    NoMatchingPermission,
    NotOwner,
}

/// Outcome of an authorization check for an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    Granted {
        user_id: UserId,
        reason: GrantReason,
        matched: Vec<Permission>,
    },
    Denied {
        user_id: UserId,
        kind: DenialKind,
        matched: Vec<Permission>,
    },
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted { .. })
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Decision::Granted { user_id, .. } | Decision::Denied { user_id, .. } => *user_id,
        }
    }

    pub fn matched(&self) -> &[Permission] {
        match self {
            Decision::Granted { matched, .. } | Decision::Denied { matched, .. } => matched,
        }
    }
}

/// Decides whether a caller may perform an operation on a record.
///
/// Built once at startup and shared; holds no per-call state.
pub struct AuthorizationEngine<I, O> {
    credentials: CredentialResolver<I>,
    ownership: OwnershipResolver<O>,
}

impl<I, O> AuthorizationEngine<I, O>
where
    I: IdentityStore,
    O: OwnershipStore,
{
    pub fn new(credentials: CredentialResolver<I>, ownership: OwnershipResolver<O>) -> Self {
        Self {
            credentials,
            ownership,
        }
    }

    /// Convenience constructor using the same lookup deadline for both resolvers.
    pub fn with_stores(identity: I, ownership: O, lookup_timeout: Duration) -> Self {
        Self::new(
            CredentialResolver::new(identity, lookup_timeout),
            OwnershipResolver::new(ownership, lookup_timeout),
        )
    }

    /// Boolean boundary: `true` only for a granted decision.
    ///
    /// Every error, including store failures and timeouts, is a denial.
    pub async fn check_permission(&self, request: &AuthorizationRequest) -> bool {
        match self.evaluate(request).await {
            Ok(decision) => decision.is_granted(),
            Err(e) if e.is_transient() => {
                warn!(error = %e, "authorization failed closed");
                false
            }
            Err(e) => {
                debug!(error = %e, "authorization rejected");
                false
            }
        }
    }

    /// Full evaluation, keeping denials distinct from failures.
    #[instrument(
        name = "authz.evaluate",
        skip_all,
        fields(
            record_type = ?request.record_type,
            admin_scope = request.admin_scope,
            credential = request.credential.kind(),
        )
    )]
    pub async fn evaluate(&self, request: &AuthorizationRequest) -> Result<Decision, AuthzError> {
        let required = request.required()?;

        let principal = self.credentials.resolve(&request.credential).await?;
        let user_id = principal.user_id;

        let (grants, catalog) = tokio::join!(
            self.credentials.grants(&principal),
            self.credentials.catalog(),
        );
        let held = catalog?.names_for(&grants?);

        let matched: Vec<Permission> = required
            .iter()
            .filter(|p| held.contains(*p))
            .cloned()
            .collect();

        let decision = if matched.is_empty() {
            Decision::Denied {
                user_id,
                kind: DenialKind::NoMatchingPermission,
                matched,
            }
        } else if request.admin_scope {
            Decision::Granted {
                user_id,
                reason: GrantReason::AdminScope,
                matched,
            }
        } else if matched.len() == required.len() {
            Decision::Granted {
                user_id,
                reason: GrantReason::FullMatch,
                matched,
            }
        } else {
            let owner = match request.record_type {
                Some(record_type) => {
                    self.ownership
                        .try_resolve_owner(user_id, request.parent_id, request.child_id, record_type)
                        .await?
                }
                None => None,
            };

            if owner == Some(user_id) {
                Decision::Granted {
                    user_id,
                    reason: GrantReason::Ownership,
                    matched,
                }
            } else {
                Decision::Denied {
                    user_id,
                    kind: DenialKind::NotOwner,
                    matched,
                }
            }
        };

        debug!(%user_id, granted = decision.is_granted(), "authorization decided");
        Ok(decision)
    }
}

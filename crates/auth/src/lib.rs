//! `exhibits-auth`: authorization and ownership resolution for exhibit records.
//!
//! The engine reads from storage through the traits in [`store`] and knows
//! nothing about HTTP. Callers build an [`AuthorizationRequest`] per protected
//! operation and either branch on [`AuthorizationEngine::check_permission`] or
//! inspect the full [`Decision`].

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod ownership;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod store;

#[cfg(test)]
mod test_support;

pub use authorize::{AuthorizationEngine, AuthorizationRequest, AuthzError, Decision, DenialKind, GrantReason};
pub use claims::{AccessClaims, AuthMode, Hs256TokenVerifier, TokenValidationError, TokenVerifier, validate_claims};
pub use credentials::CredentialResolver;
pub use ownership::{OwnershipResolver, resolve_precedence};
pub use permissions::{Permission, PermissionCatalog, PermissionEntry, known};
pub use principal::{Credential, Principal};
pub use roles::RoleGrant;
pub use store::{IdentityStore, OwnershipStore, StoreError, UserRecord};

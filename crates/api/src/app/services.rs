use std::sync::Arc;
use std::time::Duration;

use exhibits_auth::{AuthorizationEngine, IdentityStore, OwnershipStore};

/// The engine as shared by every handler, independent of the storage backend.
pub type SharedEngine = Arc<AuthorizationEngine<Arc<dyn IdentityStore>, Arc<dyn OwnershipStore>>>;

/// Build the engine once at startup.
pub fn build_engine(
    identity: Arc<dyn IdentityStore>,
    ownership: Arc<dyn OwnershipStore>,
    lookup_timeout: Duration,
) -> SharedEngine {
    Arc::new(AuthorizationEngine::with_stores(identity, ownership, lookup_timeout))
}

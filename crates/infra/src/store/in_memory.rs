use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use exhibits_auth::{IdentityStore, OwnershipStore, PermissionEntry, RoleGrant, StoreError, UserRecord};
use exhibits_core::{PermissionId, RecordId, RecordType, RoleId, UserId};

#[derive(Debug, Clone)]
struct StoredUser {
    username: String,
    token: Option<String>,
    is_active: bool,
}

#[derive(Debug, Clone, Copy)]
struct StoredRecord {
    exhibit_id: RecordId,
    owner: i64,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<i64, StoredUser>,
    // One active role per user.
    user_roles: HashMap<i64, i64>,
    role_permissions: HashMap<i64, Vec<i64>>,
    permissions: Vec<PermissionEntry>,
    exhibits: HashMap<RecordId, i64>,
    records: HashMap<(RecordType, RecordId), StoredRecord>,
}

/// In-memory identity and ownership store.
///
/// Intended for tests/dev. Seeding methods take `&self` and chain.
#[derive(Debug, Default)]
pub struct InMemoryAuthStore {
    state: RwLock<State>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, f: impl FnOnce(&mut State)) -> &Self {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
        self
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::backend(operation, "in-memory store lock poisoned"))
    }

    pub fn add_user(&self, id: i64, username: &str, is_active: bool) -> &Self {
        self.write(|s| {
            s.users.insert(
                id,
                StoredUser {
                    username: username.to_string(),
                    token: None,
                    is_active,
                },
            );
        })
    }

    /// Store a session token on the user row, replacing any previous one.
    pub fn set_token(&self, user_id: i64, token: &str) -> &Self {
        self.write(|s| {
            if let Some(user) = s.users.get_mut(&user_id) {
                user.token = Some(token.to_string());
            }
        })
    }

    pub fn set_active(&self, user_id: i64, is_active: bool) -> &Self {
        self.write(|s| {
            if let Some(user) = s.users.get_mut(&user_id) {
                user.is_active = is_active;
            }
        })
    }

    pub fn add_permission(&self, id: i64, name: &str) -> &Self {
        self.write(|s| {
            s.permissions.retain(|p| p.id.get() != id);
            s.permissions.push(PermissionEntry::new(id, name));
        })
    }

    /// Define a role as the set of permission ids it confers.
    pub fn add_role(&self, role_id: i64, permission_ids: &[i64]) -> &Self {
        self.write(|s| {
            s.role_permissions.insert(role_id, permission_ids.to_vec());
        })
    }

    /// Make `role_id` the user's active role.
    pub fn assign_role(&self, user_id: i64, role_id: i64) -> &Self {
        self.write(|s| {
            s.user_roles.insert(user_id, role_id);
        })
    }

    pub fn add_exhibit(&self, exhibit_id: RecordId, owner: i64) -> &Self {
        self.write(|s| {
            s.exhibits.insert(exhibit_id, owner);
        })
    }

    pub fn add_record(&self, record_type: RecordType, exhibit_id: RecordId, record_id: RecordId, owner: i64) -> &Self {
        self.write(|s| {
            s.records
                .insert((record_type, record_id), StoredRecord { exhibit_id, owner });
        })
    }

    fn user_record(id: i64, user: &StoredUser) -> UserRecord {
        UserRecord {
            id,
            is_active: user.is_active,
        }
    }
}

#[async_trait::async_trait]
impl IdentityStore for InMemoryAuthStore {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        let state = self.read("find_user_by_token")?;
        Ok(state
            .users
            .iter()
            .find(|(_, u)| u.token.as_deref() == Some(token))
            .map(|(id, u)| Self::user_record(*id, u)))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let state = self.read("find_user_by_username")?;
        Ok(state
            .users
            .iter()
            .find(|(_, u)| u.username == username)
            .map(|(id, u)| Self::user_record(*id, u)))
    }

    async fn role_grants(&self, user_id: UserId) -> Result<Vec<RoleGrant>, StoreError> {
        let state = self.read("role_grants")?;
        let Some(role_id) = state.user_roles.get(&user_id.get()).copied() else {
            return Ok(vec![]);
        };

        Ok(state
            .role_permissions
            .get(&role_id)
            .map(|ids| {
                ids.iter()
                    .map(|id| RoleGrant::new(RoleId::new(role_id), PermissionId::new(*id)))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn permission_catalog(&self) -> Result<Vec<PermissionEntry>, StoreError> {
        Ok(self.read("permission_catalog")?.permissions.clone())
    }
}

#[async_trait::async_trait]
impl OwnershipStore for InMemoryAuthStore {
    async fn exhibit_owner(&self, exhibit_id: RecordId) -> Result<Option<i64>, StoreError> {
        Ok(self.read("exhibit_owner")?.exhibits.get(&exhibit_id).copied())
    }

    async fn record_owner(
        &self,
        record_type: RecordType,
        exhibit_id: RecordId,
        record_id: RecordId,
    ) -> Result<Option<i64>, StoreError> {
        if !record_type.is_child() {
            return Ok(None);
        }

        let state = self.read("record_owner")?;
        Ok(state
            .records
            .get(&(record_type, record_id))
            .filter(|r| r.exhibit_id == exhibit_id)
            .map(|r| r.owner))
    }
}

//! Fixture store shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use jsonwebtoken::{EncodingKey, Header};

use exhibits_core::{PermissionId, RecordId, RecordType, RoleId, UserId};

use crate::claims::AccessClaims;
use crate::store::{IdentityStore, OwnershipStore, StoreError, UserRecord};
use crate::{PermissionEntry, RoleGrant};

/// A structurally valid token for legacy-mode fixtures.
pub(crate) fn token_for(username: &str) -> String {
    let claims = AccessClaims {
        sub: username.to_string(),
        iat: 1_700_000_000,
        exp: 1_700_003_600,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"fixture"),
    )
    .unwrap()
}

struct FixtureUser {
    id: i64,
    username: String,
    token: Option<String>,
    active: bool,
}

#[derive(Default)]
pub(crate) struct FixtureStore {
    users: Vec<FixtureUser>,
    grants: HashMap<i64, Vec<RoleGrant>>,
    catalog: Vec<PermissionEntry>,
    exhibits: HashMap<RecordId, i64>,
    records: HashMap<(RecordType, RecordId), (RecordId, i64)>,
    fail_identity: bool,
    fail_ownership: bool,
    ownership_delay: Option<Duration>,
    permissions_delay: Option<Duration>,
    pub identity_calls: AtomicUsize,
    pub ownership_calls: AtomicUsize,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: i64, username: &str, active: bool) -> Self {
        self.users.push(FixtureUser {
            id,
            username: username.to_string(),
            token: None,
            active,
        });
        self
    }

    pub fn with_token(mut self, id: i64, token: &str) -> Self {
        for u in self.users.iter_mut().filter(|u| u.id == id) {
            u.token = Some(token.to_string());
        }
        self
    }

    /// Register catalog entries with ids `1..=n` in order.
    pub fn with_catalog(mut self, names: &[&str]) -> Self {
        let start = self.catalog.len() as i64;
        for (i, name) in names.iter().enumerate() {
            self.catalog.push(PermissionEntry::new(start + i as i64 + 1, *name));
        }
        self
    }

    /// Give `user_id` a role granting the named catalog permissions.
    pub fn with_role(mut self, user_id: i64, role_id: i64, names: &[&str]) -> Self {
        let grants = self.grants.entry(user_id).or_default();
        for name in names {
            let entry = self
                .catalog
                .iter()
                .find(|e| e.name == *name)
                .unwrap_or_else(|| panic!("{name} is not in the fixture catalog"));
            grants.push(RoleGrant::new(RoleId::new(role_id), entry.id));
        }
        self
    }

    pub fn with_dangling_grant(mut self, user_id: i64, role_id: i64, permission_id: i64) -> Self {
        self.grants
            .entry(user_id)
            .or_default()
            .push(RoleGrant::new(RoleId::new(role_id), PermissionId::new(permission_id)));
        self
    }

    pub fn with_exhibit(mut self, exhibit_id: RecordId, owner: i64) -> Self {
        self.exhibits.insert(exhibit_id, owner);
        self
    }

    pub fn with_record(
        mut self,
        record_type: RecordType,
        exhibit_id: RecordId,
        record_id: RecordId,
        owner: i64,
    ) -> Self {
        self.records.insert((record_type, record_id), (exhibit_id, owner));
        self
    }

    pub fn failing_identity(mut self) -> Self {
        self.fail_identity = true;
        self
    }

    pub fn failing_ownership(mut self) -> Self {
        self.fail_ownership = true;
        self
    }

    pub fn slow_ownership(mut self, delay: Duration) -> Self {
        self.ownership_delay = Some(delay);
        self
    }

    /// Delay `role_grants` and `permission_catalog`; user lookups stay fast.
    pub fn slow_permissions(mut self, delay: Duration) -> Self {
        self.permissions_delay = Some(delay);
        self
    }

    async fn permissions_call(&self, operation: &'static str) -> Result<(), StoreError> {
        self.identity_call(operation)?;
        if let Some(delay) = self.permissions_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn identity_call(&self, operation: &'static str) -> Result<(), StoreError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_identity {
            return Err(StoreError::backend(operation, "fixture failure"));
        }
        Ok(())
    }

    async fn ownership_call(&self, operation: &'static str) -> Result<(), StoreError> {
        self.ownership_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.ownership_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_ownership {
            return Err(StoreError::backend(operation, "fixture failure"));
        }
        Ok(())
    }

    fn user_record(user: &FixtureUser) -> UserRecord {
        UserRecord {
            id: user.id,
            is_active: user.active,
        }
    }
}

#[async_trait::async_trait]
impl IdentityStore for FixtureStore {
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        self.identity_call("find_user_by_token")?;
        Ok(self
            .users
            .iter()
            .find(|u| u.token.as_deref() == Some(token))
            .map(Self::user_record))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.identity_call("find_user_by_username")?;
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(Self::user_record))
    }

    async fn role_grants(&self, user_id: UserId) -> Result<Vec<RoleGrant>, StoreError> {
        self.permissions_call("role_grants").await?;
        Ok(self.grants.get(&user_id.get()).cloned().unwrap_or_default())
    }

    async fn permission_catalog(&self) -> Result<Vec<PermissionEntry>, StoreError> {
        self.permissions_call("permission_catalog").await?;
        Ok(self.catalog.clone())
    }
}

#[async_trait::async_trait]
impl OwnershipStore for FixtureStore {
    async fn exhibit_owner(&self, exhibit_id: RecordId) -> Result<Option<i64>, StoreError> {
        self.ownership_call("exhibit_owner").await?;
        Ok(self.exhibits.get(&exhibit_id).copied())
    }

    async fn record_owner(
        &self,
        record_type: RecordType,
        exhibit_id: RecordId,
        record_id: RecordId,
    ) -> Result<Option<i64>, StoreError> {
        self.ownership_call("record_owner").await?;
        Ok(self
            .records
            .get(&(record_type, record_id))
            .filter(|(parent, _)| *parent == exhibit_id)
            .map(|(_, owner)| *owner))
    }
}

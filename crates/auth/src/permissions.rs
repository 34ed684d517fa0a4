use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use exhibits_core::PermissionId;

use crate::RoleGrant;

/// Permission name (e.g. `add_item`).
///
/// Names are compared case-insensitively: construction trims surrounding
/// whitespace and lower-cases, so `" Add_Item "` and `add_item` are the same
/// permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Cow::Owned(name.as_ref().trim().to_lowercase()))
    }

    /// Build a permission from a name that is already normalized.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Permission {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.0.into_owned()
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Permissions shipped with the default catalog.
pub mod known {
    use super::Permission;

    pub const ADD_EXHIBIT: Permission = Permission::from_static("add_exhibit");
    pub const UPDATE_EXHIBIT: Permission = Permission::from_static("update_exhibit");
    pub const UPDATE_ANY_EXHIBIT: Permission = Permission::from_static("update_any_exhibit");
    pub const DELETE_EXHIBIT: Permission = Permission::from_static("delete_exhibit");
    pub const DELETE_ANY_EXHIBIT: Permission = Permission::from_static("delete_any_exhibit");
    pub const PUBLISH_EXHIBIT: Permission = Permission::from_static("publish_exhibit");

    pub const ADD_ITEM: Permission = Permission::from_static("add_item");
    pub const ADD_ITEM_TO_ANY_EXHIBIT: Permission = Permission::from_static("add_item_to_any_exhibit");
    pub const UPDATE_ITEM: Permission = Permission::from_static("update_item");
    pub const UPDATE_ANY_ITEM: Permission = Permission::from_static("update_any_item");
    pub const DELETE_ITEM: Permission = Permission::from_static("delete_item");
    pub const DELETE_ANY_ITEM: Permission = Permission::from_static("delete_any_item");
    pub const PUBLISH_ITEM: Permission = Permission::from_static("publish_item");

    pub const ADD_USERS: Permission = Permission::from_static("add_users");
    pub const UPDATE_USERS: Permission = Permission::from_static("update_users");
    pub const DELETE_USERS: Permission = Permission::from_static("delete_users");

    pub const ALL: &[Permission] = &[
        ADD_EXHIBIT,
        UPDATE_EXHIBIT,
        UPDATE_ANY_EXHIBIT,
        DELETE_EXHIBIT,
        DELETE_ANY_EXHIBIT,
        PUBLISH_EXHIBIT,
        ADD_ITEM,
        ADD_ITEM_TO_ANY_EXHIBIT,
        UPDATE_ITEM,
        UPDATE_ANY_ITEM,
        DELETE_ITEM,
        DELETE_ANY_ITEM,
        PUBLISH_ITEM,
        ADD_USERS,
        UPDATE_USERS,
        DELETE_USERS,
    ];
}

/// One row of the permission catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub id: PermissionId,
    pub name: String,
}

impl PermissionEntry {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: PermissionId::new(id),
            name: name.into(),
        }
    }
}

/// The universe of permissions the system recognizes, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    by_id: HashMap<PermissionId, Permission>,
}

impl PermissionCatalog {
    /// Build the catalog from stored rows. Rows with a blank name are skipped.
    pub fn from_entries(entries: impl IntoIterator<Item = PermissionEntry>) -> Self {
        let by_id = entries
            .into_iter()
            .map(|e| (e.id, Permission::new(e.name)))
            .filter(|(_, p)| !p.is_blank())
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: PermissionId) -> Option<&Permission> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Names conferred by a set of role grants.
    ///
    /// Grants whose permission id is not in the catalog confer nothing.
    pub fn names_for<'a>(&self, grants: impl IntoIterator<Item = &'a RoleGrant>) -> HashSet<Permission> {
        grants
            .into_iter()
            .filter_map(|g| self.get(g.permission_id))
            .cloned()
            .collect()
    }
}

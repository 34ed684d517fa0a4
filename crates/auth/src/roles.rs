use serde::{Deserialize, Serialize};

use exhibits_core::{PermissionId, RoleId};

/// A single `(role, permission)` pair conferred on a user through their role.
///
/// Grants are read straight from the role-permission join and are not checked
/// against the catalog here; see [`crate::PermissionCatalog::names_for`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleGrant {
    pub role_id: RoleId,
    pub permission_id: PermissionId,
}

impl RoleGrant {
    pub fn new(role_id: RoleId, permission_id: PermissionId) -> Self {
        Self {
            role_id,
            permission_id,
        }
    }
}

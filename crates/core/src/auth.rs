//! Admin identity and authorization predicates.
//!
//! These are pure functions of the signed-in user; the admin service calls
//! them from its route guards.

use serde::{Deserialize, Serialize};

use crate::types::{Email, TenantId, UserId, UserRole};

/// The signed-in admin user, as kept in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    /// Tenants a `tenant_owner` may manage. Ignored for global roles.
    #[serde(default)]
    pub tenant_ids: Vec<TenantId>,
}

impl CurrentUser {
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.role.is_global()
    }
}

/// Whether the user may enter the admin console at all.
///
/// Global roles always can; a tenant owner needs at least one tenant.
#[must_use]
pub fn can_access_admin(user: &CurrentUser) -> bool {
    user.is_global() || !user.tenant_ids.is_empty()
}

/// Whether the user may read and modify `tenant_id` and its products.
#[must_use]
pub fn can_manage_tenant(user: &CurrentUser, tenant_id: TenantId) -> bool {
    user.is_global() || user.tenant_ids.contains(&tenant_id)
}

/// Whether the user may see system-wide data (all owners, stats) and
/// create tenants.
#[must_use]
pub const fn can_manage_system(user: &CurrentUser) -> bool {
    user.is_global()
}

//! Authorization policy.
//!
//! Every guarded action is answered by one of two predicates:
//! - [`allowed`]: owner-or-permission, used by update and delete
//! - [`require`]: permission only, used by block and admin actions

use std::collections::HashSet;

use thiserror::Error;

use crate::db::{DbPool, Permission, PermissionRepository, User, UserRepository};
use crate::Result;

/// Reasons a hard permission check fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// No authenticated user.
    #[error("login required")]
    NotAuthenticated,

    /// The account is deactivated.
    #[error("account is disabled")]
    AccountInactive,

    /// The user lacks a permission.
    #[error("missing permission: {0}")]
    MissingPermission(Permission),
}

/// An authenticated user together with their effective permissions.
#[derive(Debug, Clone)]
pub struct Principal {
    /// The user row.
    pub user: User,
    permissions: HashSet<Permission>,
}

impl Principal {
    /// Build a principal from a user and its effective permissions.
    pub fn new(user: User, permissions: HashSet<Permission>) -> Self {
        Self { user, permissions }
    }

    /// Load a user and resolve their permissions. `None` if the user is gone.
    pub async fn load(pool: &DbPool, user_id: i64) -> Result<Option<Self>> {
        let Some(user) = UserRepository::new(pool).get_by_id(user_id).await? else {
            return Ok(None);
        };
        let permissions = PermissionRepository::new(pool).effective_for(&user).await?;
        Ok(Some(Self::new(user, permissions)))
    }

    /// User ID.
    pub fn id(&self) -> i64 {
        self.user.id
    }

    /// Whether the user holds a permission. Inactive users hold none.
    pub fn has_perm(&self, permission: Permission) -> bool {
        self.user.is_active && self.permissions.contains(&permission)
    }

    /// Whether the user owns an entity with the given owner column.
    pub fn owns(&self, owner_id: Option<i64>) -> bool {
        owner_id == Some(self.user.id)
    }
}

/// Owner-or-permission check.
///
/// True iff there is an active user and they either hold `permission` or
/// are the entity's owner. Ownerless entities fall back to the permission.
pub fn allowed(
    principal: Option<&Principal>,
    owner_id: Option<i64>,
    permission: Permission,
) -> bool {
    match principal {
        Some(p) if p.user.is_active => p.has_perm(permission) || p.owns(owner_id),
        _ => false,
    }
}

/// Hard permission check.
pub fn require(
    principal: Option<&Principal>,
    permission: Permission,
) -> std::result::Result<(), PolicyError> {
    let principal = principal.ok_or(PolicyError::NotAuthenticated)?;
    if !principal.user.is_active {
        return Err(PolicyError::AccountInactive);
    }
    if !principal.has_perm(permission) {
        return Err(PolicyError::MissingPermission(permission));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Role;

    fn principal(id: i64, role: Role, grants: &[Permission]) -> Principal {
        let user = User {
            id,
            username: format!("user{id}"),
            password: String::new(),
            email: None,
            role,
            is_active: true,
            created_at: "2024-01-01 00:00:00".to_string(),
            last_login: None,
        };
        let mut permissions: HashSet<Permission> = grants.iter().copied().collect();
        permissions.extend(Permission::implied_by(role).iter().copied());
        Principal::new(user, permissions)
    }

    #[test]
    fn test_anonymous_never_allowed() {
        assert!(!allowed(None, Some(1), Permission::DeleteMailing));
        assert!(!allowed(None, None, Permission::DeleteMailing));
    }

    #[test]
    fn test_owner_allowed_without_permission() {
        let owner = principal(1, Role::User, &[]);
        assert!(allowed(Some(&owner), Some(1), Permission::DeleteMailing));
    }

    #[test]
    fn test_stranger_denied_without_permission() {
        let stranger = principal(2, Role::User, &[]);
        assert!(!allowed(Some(&stranger), Some(1), Permission::DeleteMailing));
        assert!(!allowed(Some(&stranger), None, Permission::DeleteMailing));
    }

    #[test]
    fn test_permission_overrides_ownership() {
        let moderator = principal(3, Role::User, &[Permission::DeleteMailing]);
        assert!(allowed(Some(&moderator), Some(1), Permission::DeleteMailing));
        assert!(allowed(Some(&moderator), None, Permission::DeleteMailing));
        assert!(!allowed(Some(&moderator), Some(1), Permission::DeleteMessage));
    }

    #[test]
    fn test_inactive_owner_denied() {
        let mut owner = principal(1, Role::Admin, &[]);
        owner.user.is_active = false;
        assert!(!allowed(Some(&owner), Some(1), Permission::DeleteMailing));
        assert_eq!(
            require(Some(&owner), Permission::DisableMailings),
            Err(PolicyError::AccountInactive)
        );
    }

    #[test]
    fn test_require() {
        assert_eq!(
            require(None, Permission::DisableMailings),
            Err(PolicyError::NotAuthenticated)
        );

        let user = principal(1, Role::User, &[]);
        assert_eq!(
            require(Some(&user), Permission::DisableMailings),
            Err(PolicyError::MissingPermission(Permission::DisableMailings))
        );

        let manager = principal(2, Role::Manager, &[]);
        assert!(require(Some(&manager), Permission::DisableMailings).is_ok());
    }
}

//! Named permissions and per-user grants.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::user::{Role, User};
use super::DbPool;
use crate::Result;

/// A named permission that can be granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Delete any mailing.
    DeleteMailing,
    /// Edit any mailing.
    ChangeMailing,
    /// Delete any message.
    DeleteMessage,
    /// Edit any message.
    ChangeMessage,
    /// Delete any recipient.
    DeleteRecipient,
    /// Edit any recipient.
    ChangeRecipient,
    /// Block and unblock mailings.
    DisableMailings,
    /// See every mailing.
    ViewAllMailings,
    /// See every recipient.
    ViewAllRecipients,
}

impl Permission {
    /// Every known permission.
    pub const ALL: [Permission; 9] = [
        Permission::DeleteMailing,
        Permission::ChangeMailing,
        Permission::DeleteMessage,
        Permission::ChangeMessage,
        Permission::DeleteRecipient,
        Permission::ChangeRecipient,
        Permission::DisableMailings,
        Permission::ViewAllMailings,
        Permission::ViewAllRecipients,
    ];

    /// Codename stored in the database.
    pub fn codename(&self) -> &'static str {
        match self {
            Permission::DeleteMailing => "delete_mailing",
            Permission::ChangeMailing => "change_mailing",
            Permission::DeleteMessage => "delete_message",
            Permission::ChangeMessage => "change_message",
            Permission::DeleteRecipient => "delete_recipient",
            Permission::ChangeRecipient => "change_recipient",
            Permission::DisableMailings => "can_disable_mailings",
            Permission::ViewAllMailings => "can_view_all_mailings",
            Permission::ViewAllRecipients => "can_view_all_recipients",
        }
    }

    /// Permissions a role carries without explicit grants.
    pub fn implied_by(role: Role) -> &'static [Permission] {
        match role {
            Role::User => &[],
            Role::Manager => &[
                Permission::DisableMailings,
                Permission::ViewAllMailings,
                Permission::ViewAllRecipients,
            ],
            Role::Admin => &Permission::ALL,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codename())
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.codename() == s)
            .ok_or_else(|| format!("unknown permission: {s}"))
    }
}

/// Repository for permission grants.
pub struct PermissionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PermissionRepository<'a> {
    /// Create a new PermissionRepository.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Grant a permission. Granting twice is a no-op.
    pub async fn grant(&self, user_id: i64, permission: Permission) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_permissions (user_id, codename) VALUES (?, ?)
             ON CONFLICT(user_id, codename) DO NOTHING",
        )
        .bind(user_id)
        .bind(permission.codename())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Revoke a permission. Returns false if it was not granted.
    pub async fn revoke(&self, user_id: i64, permission: Permission) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_permissions WHERE user_id = ? AND codename = ?")
            .bind(user_id)
            .bind(permission.codename())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Explicit grants of a user. Unknown codenames are skipped.
    pub async fn list_granted(&self, user_id: i64) -> Result<Vec<Permission>> {
        let codenames: Vec<String> = sqlx::query_scalar(
            "SELECT codename FROM user_permissions WHERE user_id = ? ORDER BY codename",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(codenames.iter().filter_map(|c| c.parse().ok()).collect())
    }

    /// Effective permissions: explicit grants plus those implied by the role.
    pub async fn effective_for(&self, user: &User) -> Result<HashSet<Permission>> {
        let mut permissions: HashSet<Permission> =
            self.list_granted(user.id).await?.into_iter().collect();
        permissions.extend(Permission::implied_by(user.role).iter().copied());
        Ok(permissions)
    }
}

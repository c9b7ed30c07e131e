use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Roles supplied by the external identity provider in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Admin,
    SuperAdmin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "CUSTOMER"),
            Role::Admin => write!(f, "ADMIN"),
            Role::SuperAdmin => write!(f, "SUPER_ADMIN"),
        }
    }
}

/// Role sets permitted per operation boundary.
pub const CUSTOMER_ONLY: &[Role] = &[Role::Customer];
pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::SuperAdmin];
pub const SUPER_ADMIN_ONLY: &[Role] = &[Role::SuperAdmin];

/// Verified caller identity, built by the auth middleware from token claims
/// plus connection metadata (the latter only feeds the audit trail).
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub display_name: String,
    pub role: Role,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuthContext {
    /// Single authorization predicate every service operation starts with.
    pub fn require(&self, allowed: &[Role]) -> AppResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role {} is not permitted for this operation",
                self.role
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            user_id: 1,
            display_name: "Test".to_string(),
            role,
            ip_address: None,
            user_agent: None,
        }
    }

    #[test]
    fn test_customer_cannot_use_admin_operations() {
        assert!(ctx(Role::Customer).require(ADMIN_ROLES).is_err());
        assert!(ctx(Role::Admin).require(ADMIN_ROLES).is_ok());
        assert!(ctx(Role::SuperAdmin).require(ADMIN_ROLES).is_ok());
    }

    #[test]
    fn test_admin_cannot_use_customer_or_super_admin_operations() {
        assert!(ctx(Role::Admin).require(CUSTOMER_ONLY).is_err());
        assert!(ctx(Role::Admin).require(SUPER_ADMIN_ONLY).is_err());
        assert!(ctx(Role::SuperAdmin).require(SUPER_ADMIN_ONLY).is_ok());
    }
}

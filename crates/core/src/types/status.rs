//! Role and status enums.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a [`Role`] or [`BlogStatus`] from a string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct StatusParseError {
    kind: &'static str,
    value: String,
}

/// Principal role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "principal_role", rename_all = "kebab-case")
)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Full access, including principal management.
    SuperAdmin,
    /// Full access to catalog, blog, analytics and settings.
    Admin,
    /// Reserved for store staff; no admin route access.
    Manager,
    /// A regular account.
    #[default]
    User,
}

/// Roles allowed on admin-only routes.
pub const ADMIN_ROLES: [Role; 2] = [Role::Admin, Role::SuperAdmin];

impl Role {
    /// Whether this role may use admin-only routes.
    #[must_use]
    pub fn is_admin(self) -> bool {
        ADMIN_ROLES.contains(&self)
    }

    /// Whether this role may manage other principals.
    #[must_use]
    pub const fn is_super_admin(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// The wire name of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super-admin",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "user" => Ok(Self::User),
            _ => Err(StatusParseError {
                kind: "role",
                value: s.to_owned(),
            }),
        }
    }
}

/// Publication status of a blog post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "blog_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
}

impl std::fmt::Display for BlogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for BlogStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            _ => Err(StatusParseError {
                kind: "blog status",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super-admin\""
        );
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_admin_roles() {
        assert!(Role::SuperAdmin.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Manager.is_admin());
        assert!(!Role::User.is_admin());
        assert!(!Role::Admin.is_super_admin());
    }

    #[test]
    fn test_blog_status_round_trips_through_str() {
        for status in [BlogStatus::Draft, BlogStatus::Published] {
            assert_eq!(status.to_string().parse::<BlogStatus>().unwrap(), status);
        }
        assert_eq!(BlogStatus::default(), BlogStatus::Draft);
    }
}

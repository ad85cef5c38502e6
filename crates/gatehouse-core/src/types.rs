use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Workforce role, ordered by privilege.
///
/// The privilege order is total: every role's permission set is a superset
/// of the role below it. `Ord` follows that order, so
/// `Role::Admin > Role::Employee` holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    DepartmentManager,
    DivisionManager,
    Admin,
}

impl Role {
    /// All roles in ascending privilege order.
    pub const ASCENDING: [Self; 4] = [
        Self::Employee,
        Self::DepartmentManager,
        Self::DivisionManager,
        Self::Admin,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::DepartmentManager => "department_manager",
            Self::DivisionManager => "division_manager",
            Self::Admin => "admin",
        }
    }

    /// Parse a wire-format role name.
    ///
    /// ## Errors
    ///
    /// Returns `UnknownRole` for any name outside the catalog. This is the
    /// boundary where an untyped role string can enter the system.
    pub fn parse(name: &str) -> Result<Self, CoreError> {
        match name {
            "employee" => Ok(Self::Employee),
            "department_manager" => Ok(Self::DepartmentManager),
            "division_manager" => Ok(Self::DivisionManager),
            "admin" => Ok(Self::Admin),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }

    /// Position in the privilege order, starting at 0 for `Employee`.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Employee => 0,
            Self::DepartmentManager => 1,
            Self::DivisionManager => 2,
            Self::Admin => 3,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identifier of a top-level division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DivisionId(pub i64);

impl std::fmt::Display for DivisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a department within a division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(pub i64);

impl std::fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated user record as the server sends it.
///
/// Identity fields (`id`, `role`, `division_id`, `department_id`) are fixed
/// for the lifetime of a session; only the profile fields (`full_name`,
/// `email`, `avatar_url`) may be patched without re-authenticating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub division_id: Option<DivisionId>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

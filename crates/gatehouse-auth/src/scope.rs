//! Organizational scope resolution and containment.
//!
//! A scope is the subtree of the division/department hierarchy a user may
//! act on. Resolution is strict: a manager record missing its assignment is
//! an error, never a silent widening to "all" — an absent id must not grant
//! absent limits.

use gatehouse_core::error::{CoreError, CoreResult};
use gatehouse_core::types::{DepartmentId, DivisionId, Role, User};

/// A subtree of the org hierarchy.
///
/// `department` set implies `division` set (a department always belongs to
/// exactly one division); `{None, None}` is the unrestricted admin scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrgScope {
    division: Option<DivisionId>,
    department: Option<DepartmentId>,
}

impl OrgScope {
    /// The unrestricted scope: every division, every department.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            division: None,
            department: None,
        }
    }

    /// A whole division, all departments included.
    #[must_use]
    pub const fn division(division: DivisionId) -> Self {
        Self {
            division: Some(division),
            department: None,
        }
    }

    /// A single department within its owning division.
    #[must_use]
    pub const fn department(division: DivisionId, department: DepartmentId) -> Self {
        Self {
            division: Some(division),
            department: Some(department),
        }
    }

    #[must_use]
    pub const fn division_id(&self) -> Option<DivisionId> {
        self.division
    }

    #[must_use]
    pub const fn department_id(&self) -> Option<DepartmentId> {
        self.department
    }

    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.division.is_none() && self.department.is_none()
    }

    /// Whether `target` lies within this scope.
    ///
    /// The unrestricted scope contains everything. Otherwise the division
    /// must match, and when the target names a department it must match
    /// unless this scope is division-wide. A target naming a department
    /// without its division is malformed and never contained; a target
    /// addressing "all divisions" is broader than any restricted scope.
    #[must_use]
    pub fn contains(&self, target: &Self) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        if target.department.is_some() && target.division.is_none() {
            return false;
        }

        match (self.division, target.division) {
            (Some(own), Some(requested)) if own == requested => {}
            _ => return false,
        }

        match (self.department, target.department) {
            (None, _) => true,
            (Some(own), Some(requested)) => own == requested,
            (Some(_), None) => false,
        }
    }
}

impl std::fmt::Display for OrgScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.division, self.department) {
            (None, _) => f.write_str("all"),
            (Some(division), None) => write!(f, "division:{division}"),
            (Some(division), Some(department)) => {
                write!(f, "division:{division}/department:{department}")
            }
        }
    }
}

/// A user's resolved visibility.
///
/// The employee self-scope flag rides alongside the org scope rather than
/// being merged into it: an employee's management scope is their department
/// subtree for containment checks, but their personal-data reads are
/// additionally restricted to their own records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub scope: OrgScope,
    pub own_records_only: bool,
}

/// ## Summary
/// Resolves the visibility scope for a user record.
///
/// ## Errors
/// Returns `IncompleteAssignment` when a non-admin record is missing the
/// division (or, for department-level roles, the department) it must be
/// assigned to.
pub fn visibility_for(user: &User) -> CoreResult<Visibility> {
    match user.role {
        Role::Admin => Ok(Visibility {
            scope: OrgScope::all(),
            own_records_only: false,
        }),
        Role::DivisionManager => {
            let division = require_division(user)?;
            Ok(Visibility {
                scope: OrgScope::division(division),
                own_records_only: false,
            })
        }
        Role::DepartmentManager => {
            let (division, department) = require_department(user)?;
            Ok(Visibility {
                scope: OrgScope::department(division, department),
                own_records_only: false,
            })
        }
        Role::Employee => {
            let (division, department) = require_department(user)?;
            Ok(Visibility {
                scope: OrgScope::department(division, department),
                own_records_only: true,
            })
        }
    }
}

fn require_division(user: &User) -> CoreResult<DivisionId> {
    user.division_id.ok_or(CoreError::IncompleteAssignment {
        role: user.role,
        missing: "division",
    })
}

fn require_department(user: &User) -> CoreResult<(DivisionId, DepartmentId)> {
    let division = require_division(user)?;
    let department = user.department_id.ok_or(CoreError::IncompleteAssignment {
        role: user.role,
        missing: "department",
    })?;
    Ok((division, department))
}

//! Role → permission mapping, layered by privilege order.
//!
//! Each role declares only its incremental slice of the catalog; cumulative
//! sets are folded once, in ascending privilege order, so every role's set
//! is a superset of the role below it by construction. Adding a role means
//! declaring its increment — nothing is listed twice.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use gatehouse_core::error::CoreError;
use gatehouse_core::types::Role;

use crate::permission::Permission;

/// Permissions introduced at a role, not including inherited ones.
const fn incremental(role: Role) -> &'static [Permission] {
    match role {
        Role::Employee => &[
            Permission::ViewOwnShifts,
            Permission::ViewOwnAttendance,
            Permission::RequestLeave,
            Permission::RequestShiftSwap,
            Permission::ViewOwnProfile,
            Permission::UpdateOwnProfile,
        ],
        Role::DepartmentManager => &[
            Permission::ViewDepartmentShifts,
            Permission::ViewDepartmentAttendance,
            Permission::ApproveDepartmentRequests,
            Permission::GenerateDepartmentSchedule,
            Permission::ManageDepartmentEmployees,
            Permission::SendDepartmentNotifications,
        ],
        Role::DivisionManager => &[
            Permission::ViewDivisionShifts,
            Permission::ViewDivisionAttendance,
            Permission::ApproveDivisionRequests,
            Permission::GenerateDivisionSchedule,
            Permission::ManageDivisionEmployees,
            Permission::ManageDivisionDepartments,
            Permission::SendDivisionNotifications,
        ],
        Role::Admin => &[
            Permission::ManageAllDivisions,
            Permission::ManageAllDepartments,
            Permission::ManageAllEmployees,
            Permission::ManageAllSchedules,
            Permission::SendSystemNotifications,
            Permission::ViewAllReports,
            Permission::ManageSystemSettings,
        ],
    }
}

static CUMULATIVE: LazyLock<HashMap<Role, HashSet<Permission>>> = LazyLock::new(|| {
    let mut sets = HashMap::new();
    let mut accumulated: HashSet<Permission> = HashSet::new();

    for role in Role::ASCENDING {
        accumulated.extend(incremental(role).iter().copied());
        sets.insert(role, accumulated.clone());
    }

    sets
});

/// The full permission set held by a role, inherited permissions included.
#[must_use]
pub fn permissions_for(role: Role) -> &'static HashSet<Permission> {
    CUMULATIVE
        .get(&role)
        .unwrap_or_else(|| unreachable!("catalog covers every role"))
}

/// Whether a role holds a permission.
#[must_use]
pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions_for(role).contains(&permission)
}

/// String-boundary variant of [`permissions_for`].
///
/// ## Errors
///
/// Returns `UnknownRole` when the name is not in the role catalog — the
/// wire is the only place an untyped role name can come from.
pub fn permissions_for_name(name: &str) -> Result<&'static HashSet<Permission>, CoreError> {
    let role = Role::parse(name)?;
    Ok(permissions_for(role))
}

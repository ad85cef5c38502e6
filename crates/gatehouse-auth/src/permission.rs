//! The closed set of atomic capabilities the product checks.
//!
//! A permission names an action independent of any particular division or
//! department; whether a concrete target is reachable is the scope
//! containment question answered in [`crate::scope`].

use serde::{Deserialize, Serialize};

use gatehouse_core::types::Role;

/// An atomic capability, keyed by its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Employee capabilities
    ViewOwnShifts,
    ViewOwnAttendance,
    RequestLeave,
    RequestShiftSwap,
    ViewOwnProfile,
    UpdateOwnProfile,

    // Department manager capabilities
    ViewDepartmentShifts,
    ViewDepartmentAttendance,
    ApproveDepartmentRequests,
    GenerateDepartmentSchedule,
    ManageDepartmentEmployees,
    SendDepartmentNotifications,

    // Division manager capabilities
    ViewDivisionShifts,
    ViewDivisionAttendance,
    ApproveDivisionRequests,
    GenerateDivisionSchedule,
    ManageDivisionEmployees,
    ManageDivisionDepartments,
    SendDivisionNotifications,

    // Admin capabilities
    ManageAllDivisions,
    ManageAllDepartments,
    ManageAllEmployees,
    ManageAllSchedules,
    SendSystemNotifications,
    ViewAllReports,
    ManageSystemSettings,
}

impl Permission {
    /// Every permission in the catalog, grouped by minimum role.
    pub const ALL: [Self; 26] = [
        Self::ViewOwnShifts,
        Self::ViewOwnAttendance,
        Self::RequestLeave,
        Self::RequestShiftSwap,
        Self::ViewOwnProfile,
        Self::UpdateOwnProfile,
        Self::ViewDepartmentShifts,
        Self::ViewDepartmentAttendance,
        Self::ApproveDepartmentRequests,
        Self::GenerateDepartmentSchedule,
        Self::ManageDepartmentEmployees,
        Self::SendDepartmentNotifications,
        Self::ViewDivisionShifts,
        Self::ViewDivisionAttendance,
        Self::ApproveDivisionRequests,
        Self::GenerateDivisionSchedule,
        Self::ManageDivisionEmployees,
        Self::ManageDivisionDepartments,
        Self::SendDivisionNotifications,
        Self::ManageAllDivisions,
        Self::ManageAllDepartments,
        Self::ManageAllEmployees,
        Self::ManageAllSchedules,
        Self::SendSystemNotifications,
        Self::ViewAllReports,
        Self::ManageSystemSettings,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewOwnShifts => "view_own_shifts",
            Self::ViewOwnAttendance => "view_own_attendance",
            Self::RequestLeave => "request_leave",
            Self::RequestShiftSwap => "request_shift_swap",
            Self::ViewOwnProfile => "view_own_profile",
            Self::UpdateOwnProfile => "update_own_profile",
            Self::ViewDepartmentShifts => "view_department_shifts",
            Self::ViewDepartmentAttendance => "view_department_attendance",
            Self::ApproveDepartmentRequests => "approve_department_requests",
            Self::GenerateDepartmentSchedule => "generate_department_schedule",
            Self::ManageDepartmentEmployees => "manage_department_employees",
            Self::SendDepartmentNotifications => "send_department_notifications",
            Self::ViewDivisionShifts => "view_division_shifts",
            Self::ViewDivisionAttendance => "view_division_attendance",
            Self::ApproveDivisionRequests => "approve_division_requests",
            Self::GenerateDivisionSchedule => "generate_division_schedule",
            Self::ManageDivisionEmployees => "manage_division_employees",
            Self::ManageDivisionDepartments => "manage_division_departments",
            Self::SendDivisionNotifications => "send_division_notifications",
            Self::ManageAllDivisions => "manage_all_divisions",
            Self::ManageAllDepartments => "manage_all_departments",
            Self::ManageAllEmployees => "manage_all_employees",
            Self::ManageAllSchedules => "manage_all_schedules",
            Self::SendSystemNotifications => "send_system_notifications",
            Self::ViewAllReports => "view_all_reports",
            Self::ManageSystemSettings => "manage_system_settings",
        }
    }

    /// The least privileged role that holds this permission.
    #[must_use]
    pub const fn minimum_role(self) -> Role {
        match self {
            Self::ViewOwnShifts
            | Self::ViewOwnAttendance
            | Self::RequestLeave
            | Self::RequestShiftSwap
            | Self::ViewOwnProfile
            | Self::UpdateOwnProfile => Role::Employee,

            Self::ViewDepartmentShifts
            | Self::ViewDepartmentAttendance
            | Self::ApproveDepartmentRequests
            | Self::GenerateDepartmentSchedule
            | Self::ManageDepartmentEmployees
            | Self::SendDepartmentNotifications => Role::DepartmentManager,

            Self::ViewDivisionShifts
            | Self::ViewDivisionAttendance
            | Self::ApproveDivisionRequests
            | Self::GenerateDivisionSchedule
            | Self::ManageDivisionEmployees
            | Self::ManageDivisionDepartments
            | Self::SendDivisionNotifications => Role::DivisionManager,

            Self::ManageAllDivisions
            | Self::ManageAllDepartments
            | Self::ManageAllEmployees
            | Self::ManageAllSchedules
            | Self::SendSystemNotifications
            | Self::ViewAllReports
            | Self::ManageSystemSettings => Role::Admin,
        }
    }

    /// Parse a wire-format permission name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

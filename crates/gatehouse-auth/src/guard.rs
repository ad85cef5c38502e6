//! The access-guard decision function.
//!
//! Every conditional render of a privileged action goes through
//! [`can_access`]; nothing in the product compares role strings directly.
//! The function is total, synchronous, and side-effect-free — it is called
//! on every render path, so it must never panic, block, or touch I/O.

use gatehouse_core::error::{CoreError, CoreResult};
use gatehouse_core::types::User;

use crate::catalog;
use crate::permission::Permission;
use crate::scope::{self, OrgScope};

/// Why access was denied.
///
/// `PermissionDenied` and `OutOfScope` are distinct so the UI can choose
/// the right message; neither carries organizational ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No authenticated user.
    Unauthenticated,
    /// The role does not hold the permission at all.
    PermissionDenied,
    /// The role holds the permission, but the target is outside the
    /// assigned scope (or the scope could not be resolved — fail closed).
    OutOfScope,
}

/// Result of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied(DenyReason),
}

impl AccessDecision {
    /// Returns `true` if access is allowed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Convert to a `Result` for call sites that want `?`.
    ///
    /// ## Errors
    ///
    /// - `SessionExpired` when no user is authenticated.
    /// - `PermissionDenied` when the role lacks the permission.
    /// - `OutOfScope` when the target lies outside the assigned scope.
    pub fn require(self) -> CoreResult<()> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(DenyReason::Unauthenticated) => Err(CoreError::SessionExpired),
            Self::Denied(DenyReason::PermissionDenied) => Err(CoreError::PermissionDenied),
            Self::Denied(DenyReason::OutOfScope) => Err(CoreError::OutOfScope),
        }
    }
}

/// ## Summary
/// Decides whether `user` may exercise `permission`, optionally against a
/// concrete organizational `target`.
///
/// The check fails closed at every step: no user denies as
/// `Unauthenticated`; a role without the permission denies as
/// `PermissionDenied`; a target outside the user's resolved scope — or a
/// user whose scope cannot be resolved at all — denies as `OutOfScope`.
#[must_use]
pub fn can_access(
    user: Option<&User>,
    permission: Permission,
    target: Option<&OrgScope>,
) -> AccessDecision {
    let Some(user) = user else {
        return AccessDecision::Denied(DenyReason::Unauthenticated);
    };

    if !catalog::has_permission(user.role, permission) {
        tracing::trace!(
            user_id = user.id,
            role = %user.role,
            permission = %permission,
            "Permission not in role catalog"
        );
        return AccessDecision::Denied(DenyReason::PermissionDenied);
    }

    if let Some(target) = target {
        let Ok(visibility) = scope::visibility_for(user) else {
            tracing::trace!(
                user_id = user.id,
                role = %user.role,
                "Scope unresolvable, failing closed"
            );
            return AccessDecision::Denied(DenyReason::OutOfScope);
        };

        if !visibility.scope.contains(target) {
            tracing::trace!(
                user_id = user.id,
                role = %user.role,
                permission = %permission,
                "Target outside assigned scope"
            );
            return AccessDecision::Denied(DenyReason::OutOfScope);
        }
    }

    AccessDecision::Allowed
}

use thiserror::Error;

use crate::types::Role;

/// Core error taxonomy shared by every crate in the workspace.
///
/// Session-ending failures (`SessionExpired`) funnel callers into the one
/// code path that clears persisted state; access-control denials
/// (`PermissionDenied`, `OutOfScope`) deliberately carry no organizational
/// ids in their messages.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("session expired")]
    SessionExpired,

    #[error("permission denied")]
    PermissionDenied,

    #[error("target is outside the assigned organizational scope")]
    OutOfScope,

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("incomplete assignment: {role} has no {missing}")]
    IncompleteAssignment { role: Role, missing: &'static str },

    #[error("request timed out")]
    NetworkTimeout,

    #[error("malformed server response: {0}")]
    MalformedServerResponse(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server returned HTTP {status}")]
    Api { status: u16 },

    #[error("session storage error: {0}")]
    Storage(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

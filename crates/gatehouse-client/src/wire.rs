//! Serde DTOs for the auth endpoints.
//!
//! Responses tolerate unknown fields; error bodies follow the backend's
//! `{"detail": ...}` convention and are parsed best-effort.

use serde::{Deserialize, Serialize};

use gatehouse_core::types::User;

/// `POST /auth/login` response payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
    /// Advisory access-token TTL in seconds, when the server sends one.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// `POST /auth/refresh` request payload.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// `POST /auth/refresh` response payload. The old refresh token is
/// invalidated server-side, so both values must be adopted together.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

/// `GET /notifications/count` response payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct NotificationCounts {
    pub total: u64,
    pub unread: u64,
    pub read: u64,
}

/// Best-effort shape of an error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

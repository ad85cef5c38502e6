//! The session value type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatehouse_core::types::User;

use crate::wire::LoginResponse;

/// One authenticated session: the token pair plus the user it belongs to.
///
/// Created on successful login, rotated on refresh, destroyed on logout or
/// unrecoverable refresh failure. `expires_at` is advisory only — the
/// client never parses token claims and treats the server's 401 as the
/// sole expiry signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Builds a session from a login response, stamping the advisory
    /// expiry when the server supplied a TTL.
    #[must_use]
    pub fn from_login(response: LoginResponse, now: DateTime<Utc>) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| now + chrono::Duration::seconds(secs));
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            user: response.user,
            expires_at,
        }
    }

    /// Replaces the token pair after a refresh rotation.
    pub fn rotate_tokens(&mut self, access_token: String, refresh_token: String) {
        self.access_token = access_token;
        self.refresh_token = refresh_token;
    }

    /// True when both tokens are present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty()
    }
}

/// A patch to the session user's profile fields.
///
/// Only `full_name`, `email`, and `avatar_url` can change this way; role
/// and organizational assignment are fixed for the session's lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl ProfilePatch {
    /// Applies the patch to a user record, leaving identity fields alone.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(full_name) = &self.full_name {
            user.full_name.clone_from(full_name);
        }
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(avatar_url) = &self.avatar_url {
            user.avatar_url = Some(avatar_url.clone());
        }
    }
}

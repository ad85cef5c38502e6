//! Persisted session document.
//!
//! One JSON file holds the access token, refresh token, and user record —
//! the three values the product keeps across restarts. Writes go through a
//! temp file and an atomic rename, so a crashed writer never leaves a torn
//! document and concurrent writers converge last-write-wins (acceptable for
//! this store and documented as such).

use std::fs;
use std::path::{Path, PathBuf};

use gatehouse_core::error::{CoreError, CoreResult};

use crate::session::Session;

/// File-backed store for the current session.
///
/// The store is the only component that touches the persistence path;
/// everything else reads tokens through `AuthGateway` accessors.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ## Summary
    /// Persists the session, creating parent directories as needed.
    ///
    /// ## Errors
    /// Returns `Storage` if serialization or any filesystem step fails.
    pub fn save(&self, session: &Session) -> CoreResult<()> {
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| CoreError::Storage(e.to_string()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|e| CoreError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| CoreError::Storage(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }

    /// ## Summary
    /// Loads the persisted session, or `None` when there is none.
    ///
    /// Missing file, malformed JSON, and incomplete documents (an absent or
    /// empty token) all load as `None` — boot code never has to handle a
    /// storage error, only "session or no session".
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Session file unreadable");
                return None;
            }
        };

        let session: Session = match serde_json::from_slice(&bytes) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Persisted session malformed");
                return None;
            }
        };

        if !session.is_complete() {
            tracing::warn!(path = %self.path.display(), "Persisted session missing a token");
            return None;
        }

        Some(session)
    }

    /// Removes the persisted session. Absence is not an error; any other
    /// filesystem failure is logged and swallowed so the logout path can
    /// never be blocked by storage.
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Session cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to clear session");
            }
        }
    }
}

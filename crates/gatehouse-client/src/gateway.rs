//! Login / refresh / logout state machine.
//!
//! The gateway owns the current [`Session`] and is the only component that
//! reads or writes it; everything else goes through accessors, never the
//! persistence layer, so nothing can observe a half-rotated session.
//!
//! Refresh is lazy: it runs only when a request comes back 401, never on a
//! timer. When several requests observe a 401 at once, exactly one refresh
//! call is issued — the rest wait on the gate and then reuse the rotated
//! token. This is a liveness requirement, not an optimization: the server
//! invalidates the old refresh token on every rotation, so racing refreshes
//! would revoke each other and force spurious logouts.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use reqwest::StatusCode;

use gatehouse_core::config::Settings;
use gatehouse_core::constants::{LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH};
use gatehouse_core::error::{CoreError, CoreResult};
use gatehouse_core::types::User;

use crate::http;
use crate::session::{ProfilePatch, Session};
use crate::store::SessionStore;
use crate::wire::{LoginResponse, RefreshRequest, RefreshResponse};

/// Phase of the authentication state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated,
    Refreshing,
}

struct StateCell {
    phase: AuthState,
    session: Option<Session>,
    /// Bumped on every session install, rotation, and teardown. Callers
    /// snapshot it with the token; a changed generation means someone else
    /// already rotated and the snapshot is stale.
    generation: u64,
}

/// The authenticated-session gateway.
pub struct AuthGateway {
    http: reqwest::Client,
    base_url: String,
    store: SessionStore,
    cell: Mutex<StateCell>,
    /// Serializes refresh round-trips. Concurrent 401 handlers queue here;
    /// all but the first observe a bumped generation and skip the network.
    refresh_gate: tokio::sync::Mutex<()>,
    /// Route that was interrupted by a forced logout, preserved so the
    /// login screen can send the user back where they were headed.
    pending_route: Mutex<Option<String>>,
}

impl AuthGateway {
    #[must_use]
    pub fn new(settings: &Settings, http: reqwest::Client, store: SessionStore) -> Self {
        Self {
            http,
            base_url: settings.api.base_url.clone(),
            store,
            cell: Mutex::new(StateCell {
                phase: AuthState::Anonymous,
                session: None,
                generation: 0,
            }),
            refresh_gate: tokio::sync::Mutex::new(()),
            pending_route: Mutex::new(None),
        }
    }

    /// ## Summary
    /// Adopts the persisted session, if any, without touching the network.
    ///
    /// Callers validate the adopted session once against the profile
    /// endpoint (`ApiClient::validate_session`); a stale session fails
    /// there through the ordinary 401 → refresh path.
    pub fn resume(&self) -> Option<User> {
        let session = self.store.load()?;
        let user = session.user.clone();

        let mut cell = self.lock_cell();
        cell.session = Some(session);
        cell.phase = AuthState::Authenticated;
        cell.generation += 1;
        drop(cell);

        tracing::info!(user_id = user.id, role = %user.role, "Resumed persisted session");
        Some(user)
    }

    /// ## Summary
    /// Authenticates against `POST /auth/login` with form-encoded
    /// credentials and installs the returned session.
    ///
    /// Never panics and never leaks transport errors in any shape outside
    /// the taxonomy — the login form handles every failure uniformly.
    ///
    /// ## Errors
    /// - `InvalidCredentials` when the server rejects the credentials (or
    ///   the account is inactive — indistinguishable by design).
    /// - `NetworkTimeout` / `Transport` when the server is unreachable.
    /// - `MalformedServerResponse` when the success body does not decode.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> CoreResult<User> {
        self.set_phase(AuthState::Authenticating);

        match self.request_login(username, password).await {
            Ok(response) => {
                let session = Session::from_login(response, Utc::now());
                let user = session.user.clone();
                self.install_session(session);
                tracing::info!(user_id = user.id, role = %user.role, "Login successful");
                Ok(user)
            }
            Err(e) => {
                self.set_phase(AuthState::Anonymous);
                tracing::debug!(error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// ## Summary
    /// Ends the session: best-effort server-side invalidation, then an
    /// unconditional local teardown. The local part cannot fail and does
    /// not depend on the network call's outcome.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) {
        let token = self.lock_cell().session.as_ref().map(|s| s.access_token.clone());

        if let Some(token) = token {
            let url = http::join_endpoint(&self.base_url, LOGOUT_PATH);
            match self.http.post(url).bearer_auth(&token).send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::debug!(status = %response.status(), "Server-side logout rejected");
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "Server-side logout unreachable"),
            }
        }

        self.end_session(None);
    }

    /// ## Summary
    /// The 401-driven refresh path. `seen_generation` is the generation the
    /// caller snapshotted with the token that was just rejected.
    ///
    /// Exactly one caller performs the rotation; everyone queued behind the
    /// gate observes the bumped generation and returns the already-rotated
    /// token without issuing a second refresh call.
    ///
    /// ## Errors
    /// Returns `SessionExpired` when there is no session or the refresh is
    /// rejected; the session is already torn down when that error surfaces.
    pub async fn refresh_after_unauthorized(&self, seen_generation: u64) -> CoreResult<String> {
        let _gate = self.refresh_gate.lock().await;

        // A caller that lost the race finds the rotation already done.
        let refresh_token = {
            let mut cell = self.lock_cell();
            let Some(session) = cell.session.as_ref() else {
                return Err(CoreError::SessionExpired);
            };
            if cell.generation != seen_generation {
                tracing::debug!("Token already rotated by a concurrent caller");
                return Ok(session.access_token.clone());
            }
            let token = session.refresh_token.clone();
            cell.phase = AuthState::Refreshing;
            token
        };

        tracing::debug!("Refreshing access token");
        match self.request_refresh(&refresh_token).await {
            Ok(rotated) => {
                let access = rotated.access_token.clone();
                let mut cell = self.lock_cell();
                let Some(session) = cell.session.as_mut() else {
                    // Logged out while the refresh was in flight; the
                    // rotated pair is discarded.
                    return Err(CoreError::SessionExpired);
                };
                session.rotate_tokens(rotated.access_token, rotated.refresh_token);
                if let Err(e) = self.store.save(session) {
                    tracing::warn!(error = %e, "Failed to persist rotated session");
                }
                cell.generation += 1;
                cell.phase = AuthState::Authenticated;
                drop(cell);

                tracing::info!("Access token rotated");
                Ok(access)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh failed, ending session");
                self.end_session(None);
                Err(CoreError::SessionExpired)
            }
        }
    }

    /// ## Summary
    /// Applies a profile patch to the session user and re-persists.
    /// Role and organizational assignment are untouched by construction.
    ///
    /// ## Errors
    /// Returns `SessionExpired` when anonymous, `Storage` when the updated
    /// session cannot be persisted.
    pub fn apply_profile_patch(&self, patch: &ProfilePatch) -> CoreResult<User> {
        let mut cell = self.lock_cell();
        let Some(session) = cell.session.as_mut() else {
            return Err(CoreError::SessionExpired);
        };

        patch.apply_to(&mut session.user);
        self.store.save(session)?;
        Ok(session.user.clone())
    }

    /// Replaces the session user with the server's authoritative record
    /// (the boot-time `GET /users/me` validation) and re-persists.
    ///
    /// ## Errors
    /// Returns `SessionExpired` when anonymous.
    pub fn adopt_user(&self, user: User) -> CoreResult<()> {
        let mut cell = self.lock_cell();
        let Some(session) = cell.session.as_mut() else {
            return Err(CoreError::SessionExpired);
        };

        session.user = user;
        if let Err(e) = self.store.save(session) {
            tracing::warn!(error = %e, "Failed to persist refreshed user record");
        }
        Ok(())
    }

    /// Tears down the session locally: one code path for logout, refresh
    /// failure, and replay rejection.
    pub(crate) fn end_session(&self, interrupted_route: Option<&str>) {
        {
            let mut cell = self.lock_cell();
            cell.session = None;
            cell.phase = AuthState::Anonymous;
            cell.generation += 1;
        }
        self.store.clear();

        if let Some(route) = interrupted_route {
            self.record_pending_route(route);
        }

        tracing::info!("Session ended");
    }

    pub(crate) fn record_pending_route(&self, route: &str) {
        *self.lock_pending() = Some(route.to_string());
    }

    /// Takes the route interrupted by the last forced logout, if any.
    #[must_use]
    pub fn take_pending_route(&self) -> Option<String> {
        self.lock_pending().take()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.lock_cell().phase
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock_cell().session.is_some()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.lock_cell().session.as_ref().map(|s| s.user.clone())
    }

    /// Current access token with its generation, for the interceptor's
    /// snapshot-then-compare refresh protocol.
    #[must_use]
    pub fn bearer_token(&self) -> Option<(String, u64)> {
        let cell = self.lock_cell();
        cell.session
            .as_ref()
            .map(|s| (s.access_token.clone(), cell.generation))
    }

    fn install_session(&self, session: Session) {
        let mut cell = self.lock_cell();
        if let Err(e) = self.store.save(&session) {
            // A broken disk must not lock the user out of a session the
            // server just granted; the session simply won't survive a
            // restart.
            tracing::warn!(error = %e, "Failed to persist session");
        }
        cell.session = Some(session);
        cell.phase = AuthState::Authenticated;
        cell.generation += 1;
    }

    fn set_phase(&self, phase: AuthState) {
        self.lock_cell().phase = phase;
    }

    fn lock_cell(&self) -> MutexGuard<'_, StateCell> {
        match self.cell.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<String>> {
        match self.pending_route.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn request_login(&self, username: &str, password: &str) -> CoreResult<LoginResponse> {
        let url = http::join_endpoint(&self.base_url, LOGIN_PATH);
        let response = self
            .http
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(http::map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<LoginResponse>()
                .await
                .map_err(|e| CoreError::MalformedServerResponse(e.to_string()));
        }

        // 401 is a credential rejection; 400 is an inactive account. The
        // login form renders both as the same message, and distinguishing
        // them would leak account state.
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            return Err(CoreError::InvalidCredentials);
        }

        Err(CoreError::Api {
            status: status.as_u16(),
        })
    }

    async fn request_refresh(&self, refresh_token: &str) -> CoreResult<RefreshResponse> {
        let url = http::join_endpoint(&self.base_url, REFRESH_PATH);
        let response = self
            .http
            .post(url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(http::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                status: status.as_u16(),
            });
        }

        response
            .json::<RefreshResponse>()
            .await
            .map_err(|e| CoreError::MalformedServerResponse(e.to_string()))
    }
}

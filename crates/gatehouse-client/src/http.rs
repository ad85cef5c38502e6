//! Bearer-attaching request interceptor.
//!
//! Every data call the product makes goes through [`ApiClient`]: it
//! attaches the current access token, and on a 401 runs the gateway's
//! refresh path and replays the original request exactly once. A second
//! 401 — the replay rejected, or the refresh itself failed — ends the
//! session and surfaces `SessionExpired`. Non-401 failures pass through
//! unmodified, with no retry.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use gatehouse_core::config::Settings;
use gatehouse_core::constants::CURRENT_USER_PATH;
use gatehouse_core::error::{CoreError, CoreResult};
use gatehouse_core::types::User;

use crate::gateway::AuthGateway;

/// ## Summary
/// Builds the process-wide HTTP client with the configured per-request
/// timeout, so no outbound call can hang the UI.
///
/// ## Errors
/// Returns `Transport` if the TLS backend cannot be initialized.
pub fn build_http_client(settings: &Settings) -> CoreResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.api.timeout_secs))
        .build()
        .map_err(|e| CoreError::Transport(e.to_string()))
}

/// Maps a transport-level failure into the taxonomy, keeping timeouts
/// distinct so the UI can say "slow network" rather than "broken".
pub(crate) fn map_transport_error(error: reqwest::Error) -> CoreError {
    if error.is_timeout() {
        CoreError::NetworkTimeout
    } else {
        CoreError::Transport(error.to_string())
    }
}

/// Joins a route path onto the configured base URL. The base already
/// carries the API version prefix, so this is plain concatenation.
pub(crate) fn join_endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// The authenticated API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    gateway: Arc<AuthGateway>,
}

impl ApiClient {
    #[must_use]
    pub fn new(settings: &Settings, http: reqwest::Client, gateway: Arc<AuthGateway>) -> Self {
        Self {
            http,
            base_url: settings.api.base_url.clone(),
            gateway,
        }
    }

    /// ## Summary
    /// Authenticated GET returning a decoded JSON body.
    ///
    /// ## Errors
    /// `SessionExpired` when unauthenticated or the session could not be
    /// kept alive; `Api` for non-401 HTTP failures; `NetworkTimeout` /
    /// `Transport` for transport failures; `MalformedServerResponse` when
    /// the body does not decode.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> CoreResult<T> {
        let response = self.execute(Method::GET, path, None).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::MalformedServerResponse(e.to_string()))
    }

    /// ## Summary
    /// Authenticated POST with a JSON body, returning a decoded JSON body.
    ///
    /// ## Errors
    /// As [`Self::get_json`], plus `MalformedServerResponse` if the request
    /// body itself cannot be serialized.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> CoreResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| CoreError::MalformedServerResponse(e.to_string()))?;
        let response = self.execute(Method::POST, path, Some(body)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::MalformedServerResponse(e.to_string()))
    }

    /// ## Summary
    /// Boot-time check that a resumed session is still honored by the
    /// server, via `GET /users/me`.
    ///
    /// A definitive rejection ends the session and yields `Ok(None)`; an
    /// unreachable server keeps the persisted session (the next 401 will
    /// settle it) and yields the stored user.
    ///
    /// ## Errors
    /// Currently never fails; the signature leaves room for callers that
    /// want to distinguish validation failures later.
    pub async fn validate_session(&self) -> CoreResult<Option<User>> {
        if !self.gateway.is_authenticated() {
            return Ok(None);
        }

        match self.get_json::<User>(CURRENT_USER_PATH).await {
            Ok(user) => {
                if self.gateway.adopt_user(user.clone()).is_err() {
                    // Logged out between the fetch and the adoption.
                    return Ok(None);
                }
                tracing::debug!(user_id = user.id, "Persisted session validated");
                Ok(Some(user))
            }
            Err(CoreError::SessionExpired) => Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "Validation unreachable, keeping persisted session");
                Ok(self.gateway.current_user())
            }
        }
    }

    /// The interceptor core: send, refresh-and-replay once on 401.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> CoreResult<reqwest::Response> {
        let Some((token, generation)) = self.gateway.bearer_token() else {
            return Err(CoreError::SessionExpired);
        };

        let response = self.send_once(&method, path, body.as_ref(), &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::passthrough(path, response);
        }

        tracing::debug!(path, "Request rejected with 401, entering refresh path");
        let rotated = match self.gateway.refresh_after_unauthorized(generation).await {
            Ok(token) => token,
            Err(e) => {
                self.gateway.record_pending_route(path);
                return Err(e);
            }
        };

        let replay = self.send_once(&method, path, body.as_ref(), &rotated).await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "Replay rejected after refresh, forcing logout");
            self.gateway.end_session(Some(path));
            return Err(CoreError::SessionExpired);
        }

        Self::passthrough(path, replay)
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: &str,
    ) -> CoreResult<reqwest::Response> {
        let url = join_endpoint(&self.base_url, path);
        let mut request = self.http.request(method.clone(), url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(map_transport_error)
    }

    /// Non-401 outcomes pass through: success yields the response, any
    /// other status surfaces as `Api` without retry.
    fn passthrough(path: &str, response: reqwest::Response) -> CoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            tracing::debug!(path, status = %status, "Request failed, passing through");
            Err(CoreError::Api {
                status: status.as_u16(),
            })
        }
    }
}

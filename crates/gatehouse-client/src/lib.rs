//! Session lifecycle and API plumbing for the Gatehouse workforce client.
//!
//! ## Module Organization
//!
//! - `gateway`: login / refresh / logout state machine (`AuthGateway`)
//! - `http`: bearer-attaching request interceptor with retry-on-401
//! - `poll`: cancellable notification-count poll
//! - `session`: the session value type and profile patches
//! - `store`: persisted session document (`SessionStore`)
//! - `wire`: serde DTOs for the auth endpoints

pub mod gateway;
pub mod http;
pub mod poll;
pub mod session;
pub mod store;
pub mod wire;

use std::sync::Arc;

use gatehouse_core::config::Settings;
use gatehouse_core::error::CoreResult;

pub use gateway::{AuthGateway, AuthState};
pub use http::ApiClient;
pub use poll::NotificationPoll;
pub use session::{ProfilePatch, Session};
pub use store::SessionStore;

/// The process-wide client context.
///
/// Constructed explicitly once at application start and passed by reference
/// to consumers — there is no global session singleton, and teardown is the
/// explicit [`AuthGateway::logout`] call rather than an implicit drop of
/// module state.
#[derive(Clone)]
pub struct AppContext {
    pub gateway: Arc<AuthGateway>,
    pub api: ApiClient,
}

impl AppContext {
    /// ## Summary
    /// Builds the shared HTTP client, session store, gateway, and request
    /// interceptor from loaded settings.
    ///
    /// ## Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn init(settings: &Settings) -> CoreResult<Self> {
        let client = http::build_http_client(settings)?;
        let store = SessionStore::new(&settings.storage.session_file);
        let gateway = Arc::new(AuthGateway::new(settings, client.clone(), store));
        let api = ApiClient::new(settings, client, Arc::clone(&gateway));

        tracing::info!(base_url = %settings.api.base_url, "Gatehouse client context initialized");

        Ok(Self { gateway, api })
    }
}

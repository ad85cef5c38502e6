//! Test helpers for integration tests.
//!
//! Provides a stub workforce API (`StubServer`) served by `tiny_http` on an
//! ephemeral port. The stub implements the auth endpoints with a mutable
//! token state and per-endpoint hit counters, so tests can assert on exact
//! call counts (one refresh for five concurrent 401s, zero refreshes for a
//! pass-through error, and so on).

use std::io::Read;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use serde_json::json;
use tiny_http::{Header, Response, Server};

use gatehouse_test::component::config::{ApiConfig, LoggingConfig, Settings, StorageConfig};
use gatehouse_test::component::{ApiClient, AppContext, AuthGateway, SessionStore};

pub use tracing;

/// Per-endpoint hit counters.
#[derive(Default)]
pub struct Counters {
    pub login: AtomicUsize,
    pub refresh: AtomicUsize,
    pub logout: AtomicUsize,
    pub me: AtomicUsize,
    pub protected: AtomicUsize,
    pub notifications: AtomicUsize,
}

impl Counters {
    pub fn refresh_calls(&self) -> usize {
        self.refresh.load(Ordering::SeqCst)
    }
}

/// Knobs for the stub's behavior, fixed at spawn time.
pub struct StubBehavior {
    /// Refresh endpoint rejects every request with 401.
    pub refresh_fails: bool,
    /// Status returned by the logout endpoint.
    pub logout_status: u16,
    /// Protected endpoint rejects every request with 401 regardless of token.
    pub protected_always_unauthorized: bool,
    /// Forced status for the protected endpoint (overrides token checks).
    pub protected_status_override: Option<u16>,
    /// Sleep before answering anything (timeout tests).
    pub respond_delay: Option<Duration>,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            refresh_fails: false,
            logout_status: 200,
            protected_always_unauthorized: false,
            protected_status_override: None,
            respond_delay: None,
        }
    }
}

struct TokenState {
    access: String,
    refresh: String,
    serial: u32,
    current_user: serde_json::Value,
}

/// A stub workforce API on an ephemeral port.
pub struct StubServer {
    server: Arc<Server>,
    pub base_url: String,
    pub counters: Arc<Counters>,
    tokens: Arc<Mutex<TokenState>>,
    handle: Option<thread::JoinHandle<()>>,
}

pub fn admin_user_json() -> serde_json::Value {
    json!({
        "id": 1,
        "username": "admin",
        "email": "admin@factory.example",
        "full_name": "Admin User",
        "employee_id": null,
        "role": "admin",
        "division_id": null,
        "department_id": null,
        "avatar_url": null,
        "is_active": true
    })
}

pub fn division_manager_user_json() -> serde_json::Value {
    json!({
        "id": 5,
        "username": "vmgr",
        "email": "vmgr@factory.example",
        "full_name": "V. Manager",
        "employee_id": "EMP0005",
        "role": "division_manager",
        "division_id": 3,
        "department_id": null,
        "avatar_url": null,
        "is_active": true
    })
}

impl StubServer {
    pub fn spawn(behavior: StubBehavior) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind stub server"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("stub server has an ip address");
        let base_url = format!("http://{addr}/api/v1");

        let counters = Arc::new(Counters::default());
        let tokens = Arc::new(Mutex::new(TokenState {
            access: "access-0".to_string(),
            refresh: "refresh-0".to_string(),
            serial: 0,
            current_user: admin_user_json(),
        }));

        let handle = {
            let server = Arc::clone(&server);
            let counters = Arc::clone(&counters);
            let tokens = Arc::clone(&tokens);
            thread::spawn(move || {
                while let Ok(request) = server.recv() {
                    handle_request(request, &behavior, &counters, &tokens);
                }
            })
        };

        Self {
            server,
            base_url,
            counters,
            tokens,
            handle: Some(handle),
        }
    }

    /// The access token the server currently honors.
    pub fn current_access_token(&self) -> String {
        lock(&self.tokens).access.clone()
    }

    pub fn current_refresh_token(&self) -> String {
        lock(&self.tokens).refresh.clone()
    }

    /// Invalidates the issued access token server-side, as a real token
    /// expiry would. The refresh token stays valid, so the next 401 can be
    /// recovered through the refresh path.
    pub fn expire_access_token(&self) {
        let mut tokens = lock(&self.tokens);
        tokens.access = format!("{}-expired", tokens.access);
    }

    /// Seeds the user record returned by login and `/users/me`.
    pub fn set_current_user(&self, user: serde_json::Value) {
        lock(&self.tokens).current_user = user;
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _joined = handle.join();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn json_response(status: u16, body: &serde_json::Value) -> Response<std::io::Cursor<Vec<u8>>> {
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("static header is valid");
    Response::from_string(body.to_string())
        .with_status_code(status)
        .with_header(header)
}

fn bearer_token(request: &tiny_http::Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .and_then(|h| {
            h.value
                .as_str()
                .strip_prefix("Bearer ")
                .map(ToString::to_string)
        })
}

fn form_field(body: &str, name: &str) -> Option<String> {
    body.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

fn handle_request(
    mut request: tiny_http::Request,
    behavior: &StubBehavior,
    counters: &Counters,
    tokens: &Mutex<TokenState>,
) {
    if let Some(delay) = behavior.respond_delay {
        thread::sleep(delay);
    }

    let mut body = String::new();
    let _bytes_read = request.as_reader().read_to_string(&mut body);

    let url = request.url().to_string();
    let authorization = bearer_token(&request);

    let (status, payload) = match url.as_str() {
        "/api/v1/auth/login" => {
            counters.login.fetch_add(1, Ordering::SeqCst);
            respond_login(&body, tokens)
        }
        "/api/v1/auth/refresh" => {
            counters.refresh.fetch_add(1, Ordering::SeqCst);
            respond_refresh(behavior, &body, tokens)
        }
        "/api/v1/auth/logout" => {
            counters.logout.fetch_add(1, Ordering::SeqCst);
            (behavior.logout_status, json!({"message": "logged out"}))
        }
        "/api/v1/users/me" => {
            counters.me.fetch_add(1, Ordering::SeqCst);
            respond_authorized(authorization.as_deref(), tokens, |state| {
                state.current_user.clone()
            })
        }
        "/api/v1/protected" => {
            counters.protected.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = behavior.protected_status_override {
                (status, json!({"detail": "forced status"}))
            } else if behavior.protected_always_unauthorized {
                (401, json!({"detail": "Invalid or expired token"}))
            } else {
                respond_authorized(authorization.as_deref(), tokens, |_| json!({"ok": true}))
            }
        }
        "/api/v1/notifications/count" => {
            let hits = counters.notifications.fetch_add(1, Ordering::SeqCst) + 1;
            respond_authorized(authorization.as_deref(), tokens, |_| {
                let unread = hits as u64;
                json!({"total": unread + 4, "unread": unread, "read": 4})
            })
        }
        _ => (404, json!({"detail": "Not found"})),
    };

    let _responded = request.respond(json_response(status, &payload));
}

fn respond_login(body: &str, tokens: &Mutex<TokenState>) -> (u16, serde_json::Value) {
    let username = form_field(body, "username").unwrap_or_default();
    let password = form_field(body, "password").unwrap_or_default();

    let user = match (username.as_str(), password.as_str()) {
        ("admin", "1234") => admin_user_json(),
        ("vmgr", "1234") => division_manager_user_json(),
        _ => {
            return (401, json!({"detail": "Incorrect username or password"}));
        }
    };

    let mut state = lock(tokens);
    state.current_user = user.clone();
    let payload = json!({
        "access_token": state.access,
        "refresh_token": state.refresh,
        "token_type": "bearer",
        "user": user
    });
    (200, payload)
}

fn respond_refresh(
    behavior: &StubBehavior,
    body: &str,
    tokens: &Mutex<TokenState>,
) -> (u16, serde_json::Value) {
    if behavior.refresh_fails {
        return (401, json!({"detail": "Invalid refresh token"}));
    }

    let presented = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("refresh_token").and_then(|t| t.as_str()).map(ToString::to_string));

    let mut state = lock(tokens);
    if presented.as_deref() != Some(state.refresh.as_str()) {
        return (401, json!({"detail": "Invalid refresh token"}));
    }

    // Rotation: the old refresh token is invalidated server-side.
    state.serial += 1;
    state.access = format!("access-{}", state.serial);
    state.refresh = format!("refresh-{}", state.serial);

    let payload = json!({
        "access_token": state.access,
        "refresh_token": state.refresh,
        "token_type": "bearer"
    });
    (200, payload)
}

fn respond_authorized(
    authorization: Option<&str>,
    tokens: &Mutex<TokenState>,
    body: impl FnOnce(&TokenState) -> serde_json::Value,
) -> (u16, serde_json::Value) {
    let state = lock(tokens);
    match authorization {
        Some(token) if token == state.access => (200, body(&state)),
        _ => (401, json!({"detail": "Invalid or expired token"})),
    }
}

/// Settings pointing the client at a stub server, with an isolated session
/// file per test.
pub fn test_settings(base_url: &str, dir: &tempfile::TempDir) -> Settings {
    Settings {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        },
        storage: StorageConfig {
            session_file: dir
                .path()
                .join("session.json")
                .to_string_lossy()
                .into_owned(),
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

pub struct TestClient {
    pub context: AppContext,
    pub settings: Settings,
}

impl TestClient {
    pub fn new(stub: &StubServer, dir: &tempfile::TempDir) -> Self {
        let settings = test_settings(&stub.base_url, dir);
        let context = AppContext::init(&settings).expect("context init");
        Self { context, settings }
    }

    pub fn gateway(&self) -> &AuthGateway {
        &self.context.gateway
    }

    pub fn api(&self) -> &ApiClient {
        &self.context.api
    }

    pub fn store(&self) -> SessionStore {
        SessionStore::new(&self.settings.storage.session_file)
    }
}

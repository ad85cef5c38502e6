/// Route components for the workforce API, shared across crates.
///
/// Paths are relative to the configured base URL, which already carries the
/// API version prefix (e.g. `https://host/api/v1`).
pub const AUTH_ROUTE_COMPONENT: &str = "auth";
pub const AUTH_ROUTE_PREFIX: &str = const_str::concat!("/", AUTH_ROUTE_COMPONENT);

pub const LOGIN_PATH: &str = const_str::concat!(AUTH_ROUTE_PREFIX, "/login");
pub const REFRESH_PATH: &str = const_str::concat!(AUTH_ROUTE_PREFIX, "/refresh");
pub const LOGOUT_PATH: &str = const_str::concat!(AUTH_ROUTE_PREFIX, "/logout");

pub const USERS_ROUTE_COMPONENT: &str = "users";
pub const CURRENT_USER_PATH: &str = const_str::concat!("/", USERS_ROUTE_COMPONENT, "/me");

pub const NOTIFICATIONS_ROUTE_COMPONENT: &str = "notifications";
pub const NOTIFICATION_COUNT_PATH: &str =
    const_str::concat!("/", NOTIFICATIONS_ROUTE_COMPONENT, "/count");

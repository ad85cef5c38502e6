//! Token refresh: the single-flight rule and the forced-logout funnels.

use std::sync::atomic::Ordering;

use gatehouse_client::gateway::AuthState;
use gatehouse_core::error::CoreError;

use super::helpers::*;

/// ## Summary
/// Five requests observing the same expired token trigger exactly one call
/// to the refresh endpoint; the other four reuse the rotated token.
#[test_log::test(tokio::test)]
async fn concurrent_401s_issue_exactly_one_refresh() {
    let stub = StubServer::spawn(StubBehavior::default());
    let dir = tempfile::tempdir().expect("tempdir");
    let client = TestClient::new(&stub, &dir);

    client
        .gateway()
        .login("admin", "1234")
        .await
        .expect("login succeeds");

    stub.expire_access_token();

    let requests = (0..5).map(|_| {
        let api = client.api().clone();
        async move { api.get_json::<serde_json::Value>("/protected").await }
    });

    let results = futures::future::join_all(requests).await;

    for result in results {
        let body = result.expect("request recovers through refresh");
        assert_eq!(body["ok"], serde_json::Value::Bool(true));
    }

    assert_eq!(
        stub.counters.refresh_calls(),
        1,
        "exactly one refresh call for five concurrent 401s"
    );
}

/// ## Summary
/// Mid-session expiry is invisible to the user: the next call 401s, the
/// interceptor refreshes, and the original request is replayed once.
#[test_log::test(tokio::test)]
async fn expired_token_recovers_without_reauthentication() {
    let stub = StubServer::spawn(StubBehavior::default());
    let dir = tempfile::tempdir().expect("tempdir");
    let client = TestClient::new(&stub, &dir);

    client
        .gateway()
        .login("admin", "1234")
        .await
        .expect("login succeeds");

    stub.expire_access_token();

    let body: serde_json::Value = client
        .api()
        .get_json("/protected")
        .await
        .expect("request recovers");
    assert_eq!(body["ok"], serde_json::Value::Bool(true));

    assert_eq!(stub.counters.refresh_calls(), 1);
    assert_eq!(
        stub.counters.login.load(Ordering::SeqCst),
        1,
        "the user never re-enters credentials"
    );

    // The rotated pair replaced the stale one in the store.
    let persisted = client.store().load().expect("session persisted");
    assert_eq!(persisted.access_token, stub.current_access_token());
    assert_eq!(persisted.refresh_token, stub.current_refresh_token());
}

/// ## Summary
/// When the refresh itself is rejected, the session ends through the one
/// teardown path: store cleared, state anonymous, route preserved for the
/// post-login redirect.
#[test_log::test(tokio::test)]
async fn refresh_failure_forces_logout() {
    let stub = StubServer::spawn(StubBehavior {
        refresh_fails: true,
        ..StubBehavior::default()
    });
    let dir = tempfile::tempdir().expect("tempdir");
    let client = TestClient::new(&stub, &dir);

    client
        .gateway()
        .login("admin", "1234")
        .await
        .expect("login succeeds");

    stub.expire_access_token();

    let err = client
        .api()
        .get_json::<serde_json::Value>("/protected")
        .await
        .expect_err("session cannot be kept alive");

    assert!(matches!(err, CoreError::SessionExpired));
    assert_eq!(client.gateway().state(), AuthState::Anonymous);
    assert!(client.store().load().is_none());
    assert_eq!(
        client.gateway().take_pending_route().as_deref(),
        Some("/protected")
    );
}

/// ## Summary
/// A second 401 after a successful refresh means the session is not coming
/// back; the interceptor does not retry again.
#[test_log::test(tokio::test)]
async fn replay_rejection_forces_logout() {
    let stub = StubServer::spawn(StubBehavior {
        protected_always_unauthorized: true,
        ..StubBehavior::default()
    });
    let dir = tempfile::tempdir().expect("tempdir");
    let client = TestClient::new(&stub, &dir);

    client
        .gateway()
        .login("admin", "1234")
        .await
        .expect("login succeeds");

    let err = client
        .api()
        .get_json::<serde_json::Value>("/protected")
        .await
        .expect_err("replay is rejected");

    assert!(matches!(err, CoreError::SessionExpired));
    assert_eq!(stub.counters.refresh_calls(), 1, "refresh ran exactly once");
    assert_eq!(
        stub.counters.protected.load(Ordering::SeqCst),
        2,
        "original request plus exactly one replay"
    );
    assert!(client.store().load().is_none());
    assert_eq!(
        client.gateway().take_pending_route().as_deref(),
        Some("/protected")
    );
}

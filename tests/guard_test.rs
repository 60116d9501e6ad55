use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use sporlauth::{
    Error, Result,
    error::AuthError,
    management::TokenGuard,
    spotify::auth::TokenRefresher,
    types::{AuthToken, TokenResponse},
};

fn token(access: &str, expires_in: u64) -> AuthToken {
    AuthToken::from_response(
        TokenResponse {
            access_token: access.to_string(),
            token_type: "Bearer".to_string(),
            expires_in,
            scope: Some("user-read-email".to_string()),
            refresh_token: Some("refresh".to_string()),
        },
        Utc::now(),
    )
}

fn expired(access: &str) -> AuthToken {
    let mut t = token(access, 3600);
    t.expires_at = Utc::now() - chrono::Duration::seconds(1);
    t
}

/// Counts refreshes and hands out `fresh-<n>` tokens after a short delay.
#[derive(Default)]
struct CountingRefresher {
    calls: AtomicUsize,
    failures_left: AtomicUsize,
}

impl CountingRefresher {
    fn failing(times: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(times),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for CountingRefresher {
    async fn refresh(&self, current: &AuthToken) -> Result<AuthToken> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(20)).await;

        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            return Err(Error::Auth(AuthError {
                error: "invalid_grant".to_string(),
                description: Some("Refresh token revoked".to_string()),
            }));
        }

        let mut next = token(&format!("fresh-{n}"), 3600);
        next.refresh_token = current.refresh_token.clone();
        Ok(next)
    }
}

#[tokio::test]
async fn test_valid_token_is_returned_without_refresh() {
    let refresher = Arc::new(CountingRefresher::default());
    let guard = TokenGuard::new(token("current", 3600), refresher.clone());

    assert_eq!(guard.ensure_fresh().await.unwrap(), "current");
    assert_eq!(refresher.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let refresher = Arc::new(CountingRefresher::default());
    let guard = Arc::new(TokenGuard::new(expired("stale"), refresher.clone()));

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let guard = Arc::clone(&guard);
            tokio::spawn(async move { guard.ensure_fresh().await })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), "fresh-1");
    }
    assert_eq!(refresher.calls(), 1);
}

#[tokio::test]
async fn test_token_at_expiry_instant_is_refreshed() {
    let refresher = Arc::new(CountingRefresher::default());
    let mut at_boundary = token("boundary", 3600);
    at_boundary.expires_at = Utc::now();
    let guard = TokenGuard::new(at_boundary, refresher.clone());

    assert_eq!(guard.ensure_fresh().await.unwrap(), "fresh-1");
    assert_eq!(refresher.calls(), 1);
}

#[tokio::test]
async fn test_failed_refresh_keeps_token_and_next_call_retries() {
    let refresher = Arc::new(CountingRefresher::failing(1));
    let guard = TokenGuard::new(expired("stale"), refresher.clone());

    let err = guard.ensure_fresh().await.unwrap_err();
    assert_eq!(err.auth_error().unwrap().error, "invalid_grant");
    assert_eq!(guard.token().await.access_token, "stale");

    assert_eq!(guard.ensure_fresh().await.unwrap(), "fresh-2");
    assert_eq!(refresher.calls(), 2);
}

#[tokio::test]
async fn test_refreshed_token_keeps_expiry_consistent() {
    let refresher = Arc::new(CountingRefresher::default());
    let guard = TokenGuard::new(expired("stale"), refresher);

    guard.ensure_fresh().await.unwrap();
    let snapshot = guard.token().await;

    assert_eq!(snapshot.access_token, "fresh-1");
    assert!(!snapshot.is_expired());
    assert_eq!(snapshot.refresh_token, "refresh");
}

#[tokio::test]
async fn test_force_refresh_replaces_valid_token() {
    let refresher = Arc::new(CountingRefresher::default());
    let guard = TokenGuard::new(token("current", 3600), refresher.clone());

    guard.force_refresh().await.unwrap();

    assert_eq!(guard.token().await.access_token, "fresh-1");
    assert_eq!(refresher.calls(), 1);
}

#[tokio::test]
async fn test_fixed_token_is_never_refreshed() {
    let guard = TokenGuard::fixed("static-token");

    assert_eq!(guard.ensure_fresh().await.unwrap(), "static-token");
    assert!(matches!(
        guard.force_refresh().await,
        Err(Error::RefreshUnavailable)
    ));
}

#[tokio::test]
async fn test_expired_token_without_refresher_is_an_error() {
    let guard = TokenGuard::without_refresh(expired("stale"));

    assert!(matches!(
        guard.ensure_fresh().await,
        Err(Error::RefreshUnavailable)
    ));
}

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    error::{Error, Result},
    spotify::auth::TokenRefresher,
    types::AuthToken,
};

/// Holds the current token and refreshes it when it expires.
///
/// Every authenticated request goes through [`TokenGuard::ensure_fresh`].
/// The expiry check and the refresh happen under one lock, so when many
/// callers find the token expired at once only the first one refreshes;
/// the others wait on the lock and then see the new token. The lock is held
/// across the network call, which serializes callers for the duration of a
/// refresh. Refreshes happen about once an hour, so that is acceptable.
///
/// A failed refresh leaves the stored token untouched and the error goes to
/// the caller that triggered it. The next caller retries.
pub struct TokenGuard {
    token: Mutex<AuthToken>,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl TokenGuard {
    pub fn new(token: AuthToken, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            token: Mutex::new(token),
            refresher: Some(refresher),
        }
    }

    /// A guard around a static access token that is never refreshed.
    pub fn fixed(access_token: impl Into<String>) -> Self {
        Self::without_refresh(AuthToken::fixed(access_token))
    }

    /// A guard that reports [`Error::RefreshUnavailable`] once `token` expires.
    pub fn without_refresh(token: AuthToken) -> Self {
        Self {
            token: Mutex::new(token),
            refresher: None,
        }
    }

    /// Makes sure the stored token is usable and returns its access token.
    ///
    /// A token whose expiry instant equals the current time is already
    /// expired.
    pub async fn ensure_fresh(&self) -> Result<String> {
        let mut token = self.token.lock().await;

        if token.is_expired_at(Utc::now()) {
            tracing::debug!(expired_at = %token.expires_at, "access token expired, refreshing");
            self.refresh_locked(&mut token).await?;
        }

        Ok(token.access_token.clone())
    }

    /// Refreshes regardless of the expiry instant.
    pub async fn force_refresh(&self) -> Result<()> {
        let mut token = self.token.lock().await;
        self.refresh_locked(&mut token).await
    }

    /// Copy of the stored token. Access token and expiry always come from
    /// the same refresh.
    pub async fn token(&self) -> AuthToken {
        self.token.lock().await.clone()
    }

    async fn refresh_locked(&self, token: &mut AuthToken) -> Result<()> {
        let refresher = self.refresher.as_ref().ok_or(Error::RefreshUnavailable)?;

        match refresher.refresh(token).await {
            Ok(refreshed) => {
                *token = refreshed;
                tracing::info!(expires_at = %token.expires_at, "access token refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "access token refresh failed");
                Err(e)
            }
        }
    }
}

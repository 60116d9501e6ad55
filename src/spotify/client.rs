use std::sync::Arc;

use crate::{
    config::{BASE_URL_API, Endpoints},
    error::Result,
    management::TokenGuard,
    scopes::Scopes,
    spotify::{auth::TokenRefresher, flow::AuthorizationFlow, transport::AuthenticatedTransport},
    types::{AuthToken, Credentials},
};

/// Authorized access to the Spotify Web API.
///
/// Cloning is cheap; clones share one [`TokenGuard`], so a refresh done by
/// one of them is seen by all.
#[derive(Clone)]
pub struct Client {
    guard: Arc<TokenGuard>,
    transport: AuthenticatedTransport,
}

impl Client {
    /// Runs the interactive flow with the default browser and Spotify
    /// endpoints.
    pub async fn authorize(credentials: Credentials, scopes: Scopes) -> Result<Self> {
        AuthorizationFlow::new(credentials, scopes).run().await
    }

    /// Runs the interactive flow with credentials and endpoints taken from
    /// the environment.
    pub async fn from_env(scopes: Scopes) -> Result<Self> {
        let credentials = Credentials::from_env()?;
        AuthorizationFlow::new(credentials, scopes)
            .endpoints(Endpoints::from_env())
            .run()
            .await
    }

    /// Wraps a token obtained elsewhere. `refresher` renews it on expiry.
    pub fn from_token(
        token: AuthToken,
        refresher: Arc<dyn TokenRefresher>,
        api_base: &str,
    ) -> Result<Self> {
        Self::from_guard(Arc::new(TokenGuard::new(token, refresher)), api_base)
    }

    /// Client for a static access token. It is never refreshed, so calls
    /// fail with the Web API's 401 once the token is no longer accepted.
    pub fn with_token(access_token: impl Into<String>) -> Result<Self> {
        Self::from_guard(Arc::new(TokenGuard::fixed(access_token)), BASE_URL_API)
    }

    pub fn from_guard(guard: Arc<TokenGuard>, api_base: &str) -> Result<Self> {
        let transport = AuthenticatedTransport::new(api_base, Arc::clone(&guard))?;
        Ok(Self { guard, transport })
    }

    pub fn transport(&self) -> &AuthenticatedTransport {
        &self.transport
    }

    pub async fn token(&self) -> AuthToken {
        self.guard.token().await
    }

    /// Refreshes the access token now, whether or not it has expired.
    pub async fn refresh_tokens(&self) -> Result<()> {
        self.guard.force_refresh().await
    }
}

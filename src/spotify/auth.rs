use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};

use crate::{
    error::{AuthError, Error, Result},
    types::{AuthToken, Credentials, TokenResponse},
};

/// Bound on every request sent to the accounts service or the Web API.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Obtains a new token that supersedes `current`.
///
/// This is the seam [`crate::management::TokenGuard`] refreshes through.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, current: &AuthToken) -> Result<AuthToken>;
}

/// Trades authorization codes and refresh tokens for access tokens at the
/// accounts service token endpoint.
///
/// Both grants are form-encoded `POST` requests. A non-success status is
/// decoded as an OAuth error object and returned as [`Error::Auth`].
pub struct TokenExchanger {
    credentials: Credentials,
    token_url: String,
    client: Client,
}

impl TokenExchanger {
    pub fn new(credentials: Credentials, token_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_HTTP_TIMEOUT).build()?;
        Ok(Self::with_client(credentials, token_url, client))
    }

    pub fn with_client(
        credentials: Credentials,
        token_url: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            client,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    pub fn redirect_url(&self) -> &str {
        &self.credentials.redirect_url
    }

    /// Exchanges the code delivered to the redirect URL for a token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<AuthToken> {
        tracing::debug!(token_url = %self.token_url, "exchanging authorization code");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_url.as_str()),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await?;

        let token = read_token_response(response).await?;
        Ok(AuthToken::from_response(token, Utc::now()))
    }

    /// Exchanges the refresh token of `current` for a new access token.
    ///
    /// The client authenticates with HTTP Basic. If the response carries no
    /// new refresh token the current one is kept.
    pub async fn refresh_token(&self, current: &AuthToken) -> Result<AuthToken> {
        if !current.can_refresh() {
            return Err(Error::RefreshUnavailable);
        }

        tracing::debug!(token_url = %self.token_url, "refreshing access token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let token = read_token_response(response).await?;
        Ok(current.refreshed(token, Utc::now()))
    }
}

#[async_trait]
impl TokenRefresher for TokenExchanger {
    async fn refresh(&self, current: &AuthToken) -> Result<AuthToken> {
        self.refresh_token(current).await
    }
}

async fn read_token_response(response: Response) -> Result<TokenResponse> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }

    match serde_json::from_str::<AuthError>(&body) {
        Ok(auth_error) => {
            tracing::debug!(status = %status, error = %auth_error.error, "token endpoint rejected grant");
            Err(Error::Auth(auth_error))
        }
        Err(_) => Err(Error::TokenEndpoint {
            status: status.as_u16(),
            body,
        }),
    }
}

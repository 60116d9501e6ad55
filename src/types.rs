use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Client identity registered with the Spotify accounts service.
///
/// Owned by the component that performs token exchange and refresh; nothing
/// else needs the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

/// Access/refresh token pair with the absolute instant the access token
/// stops being valid.
///
/// `expires_at` is computed from the local clock when the token is received,
/// so it always belongs to the `access_token` stored next to it.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// Builds a token from a token endpoint response received at `received_at`.
    pub fn from_response(response: TokenResponse, received_at: DateTime<Utc>) -> Self {
        Self {
            expires_at: expiry_from(received_at, response.expires_in),
            access_token: response.access_token,
            refresh_token: response.refresh_token.unwrap_or_default(),
            token_type: response.token_type,
            expires_in: response.expires_in,
            scope: response.scope.unwrap_or_default(),
        }
    }

    /// Builds the token that supersedes `self` after a refresh.
    ///
    /// Providers are not required to rotate refresh tokens, so the current
    /// refresh token (and scope) is kept when the response leaves it out.
    pub fn refreshed(&self, response: TokenResponse, received_at: DateTime<Utc>) -> Self {
        Self {
            expires_at: expiry_from(received_at, response.expires_in),
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .unwrap_or_else(|| self.refresh_token.clone()),
            token_type: response.token_type,
            expires_in: response.expires_in,
            scope: response.scope.unwrap_or_else(|| self.scope.clone()),
        }
    }

    /// A token without refresh capability that never expires.
    pub fn fixed(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: String::new(),
            token_type: "Bearer".to_string(),
            expires_in: 0,
            scope: String::new(),
            expires_at: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// A token is expired from its expiry instant onwards, inclusive.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

fn expiry_from(received_at: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    let secs = i64::try_from(expires_in).unwrap_or(i64::MAX);
    Duration::try_seconds(secs)
        .and_then(|lifetime| received_at.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Successful body of `POST /api/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// What the authorize redirect delivered to the callback listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    /// The user approved; `code` is exchanged for tokens.
    Code { code: String, state: Option<String> },
    /// The user declined or the provider refused the request.
    Denied {
        error: String,
        description: Option<String>,
        state: Option<String>,
    },
}

impl CallbackResult {
    pub fn state(&self) -> Option<&str> {
        match self {
            CallbackResult::Code { state, .. } | CallbackResult::Denied { state, .. } => {
                state.as_deref()
            }
        }
    }
}

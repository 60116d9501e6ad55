//! Error types for the authorization flow and the authenticated transport.
//!
//! Three domains are kept apart:
//!
//! - [`AuthError`] - the accounts service rejected a code or refresh exchange.
//!   The provider's `error` and `error_description` are carried verbatim.
//! - Application and transport failures - state generation, URL parsing,
//!   listener bind, browser launch, JSON decoding and network errors each get
//!   their own [`Error`] variant.
//! - [`ApiError`] - a non-2xx answer from a Web API resource endpoint. Only the
//!   collaborator layer produces it, through [`crate::spotify::transport::read_json`].
//!
//! Errors raised while running the interactive flow are wrapped in
//! [`Error::Flow`] so the caller can tell which stage failed.

use std::{fmt, net::SocketAddr, time::Duration};

use serde::Deserialize;

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// OAuth error object returned by the token endpoint or the authorize redirect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{error} - {}", .description.as_deref().unwrap_or("no description"))]
pub struct AuthError {
    pub error: String,
    #[serde(rename = "error_description", default)]
    pub description: Option<String>,
}

/// Regular error object returned by Web API resource endpoints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status} - {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

#[derive(Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Deserialize)]
pub(crate) struct ApiErrorBody {
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

impl From<ApiErrorEnvelope> for ApiError {
    fn from(envelope: ApiErrorEnvelope) -> Self {
        ApiError {
            status: envelope.error.status,
            message: envelope.error.message,
        }
    }
}

/// Failure to hand a URL to the user's browser.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error(transparent)]
    Spawn(#[from] std::io::Error),
}

/// The step of the interactive authorization flow that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    State,
    Url,
    Listener,
    Browser,
    Callback,
    Exchange,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStage::State => "state generation",
            FlowStage::Url => "authorization url",
            FlowStage::Listener => "callback listener",
            FlowStage::Browser => "browser launch",
            FlowStage::Callback => "authorization callback",
            FlowStage::Exchange => "token exchange",
        };
        f.write_str(name)
    }
}

/// Unified error type for sporlauth.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("failed to generate state: {0}")]
    StateGeneration(#[source] rand::rand_core::OsError),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to bind callback listener on {addr}: {source}")]
    ListenerBind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("callback listener failed: {0}")]
    Listener(#[source] std::io::Error),

    #[error("callback listener stopped before an authorization code was delivered")]
    CallbackAborted,

    #[error("no authorization callback received within {0:?}")]
    CallbackTimeout(Duration),

    #[error("state returned by the callback does not match the state that was sent")]
    StateMismatch,

    #[error("failed to open browser: {0}")]
    Browser(#[from] BrowserError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid request header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("{0} not found in environment variables")]
    MissingConfig(&'static str),

    #[error("access token expired and no refresh credentials are available")]
    RefreshUnavailable,

    #[error("{stage} failed: {source}")]
    Flow { stage: FlowStage, source: Box<Error> },
}

impl Error {
    pub(crate) fn at(stage: FlowStage) -> impl FnOnce(Error) -> Error {
        move |source| Error::Flow {
            stage,
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through [`Error::Flow`] wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Flow { source, .. } => source.root(),
            other => other,
        }
    }

    /// The flow stage that produced this error, if it came from the flow.
    pub fn stage(&self) -> Option<FlowStage> {
        match self {
            Error::Flow { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The provider's OAuth error, if this is an authentication error.
    pub fn auth_error(&self) -> Option<&AuthError> {
        match self.root() {
            Error::Auth(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self.root(), Error::Transport(_))
    }
}

//! Authenticated HTTP transport for Web API calls.
//!
//! Every request first passes through [`TokenGuard::ensure_fresh`], then goes
//! out with an `Authorization: Bearer` header and a bounded timeout. Network
//! failures come back as [`Error::Transport`]. Nothing is retried here; only
//! the caller knows whether its operation is idempotent.
//!
//! Caller headers replace same-named defaults, so a `Content-Type` passed in
//! wins over the one implied by the [`Body`]. `Authorization` is the
//! exception: the guarded token is always sent and a caller value is dropped.

use std::sync::Arc;

use reqwest::{
    Client, Method, Response,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{ApiError, ApiErrorEnvelope, Error, Result},
    management::TokenGuard,
    spotify::auth::DEFAULT_HTTP_TIMEOUT,
};

/// Extra request headers as name/value pairs.
pub type Headers<'a> = &'a [(&'a str, &'a str)];
/// Query parameters as name/value pairs.
pub type Query<'a> = &'a [(&'a str, &'a str)];

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Empty,
    /// Serialized JSON, sent as `application/json`.
    Json(Vec<u8>),
    /// Fields sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Raw bytes. The content type comes from the caller's headers.
    Bytes(Vec<u8>),
}

impl Body {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Body::Json(serde_json::to_vec(value)?))
    }

    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Body::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Body::Bytes(data.into())
    }
}

#[derive(Clone)]
pub struct AuthenticatedTransport {
    client: Client,
    base_url: String,
    guard: Arc<TokenGuard>,
}

impl AuthenticatedTransport {
    pub fn new(base_url: impl Into<String>, guard: Arc<TokenGuard>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_HTTP_TIMEOUT).build()?;
        Ok(Self::with_client(base_url, guard, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        guard: Arc<TokenGuard>,
        client: Client,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            guard,
        }
    }

    pub fn guard(&self) -> &Arc<TokenGuard> {
        &self.guard
    }

    pub async fn get(
        &self,
        endpoint: &str,
        headers: Headers<'_>,
        query: Query<'_>,
    ) -> Result<Response> {
        self.send(Method::GET, endpoint, headers, query, Body::Empty)
            .await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        headers: Headers<'_>,
        query: Query<'_>,
        body: Body,
    ) -> Result<Response> {
        self.send(Method::POST, endpoint, headers, query, body).await
    }

    pub async fn put(
        &self,
        endpoint: &str,
        headers: Headers<'_>,
        query: Query<'_>,
        body: Body,
    ) -> Result<Response> {
        self.send(Method::PUT, endpoint, headers, query, body).await
    }

    pub async fn delete(
        &self,
        endpoint: &str,
        headers: Headers<'_>,
        query: Query<'_>,
        body: Body,
    ) -> Result<Response> {
        self.send(Method::DELETE, endpoint, headers, query, body)
            .await
    }

    /// Absolute URL for `endpoint`, with or without its leading slash.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        headers: Headers<'_>,
        query: Query<'_>,
        body: Body,
    ) -> Result<Response> {
        let caller_headers = header_map(headers)?;
        let access_token = self.guard.ensure_fresh().await?;

        let url = self.url(endpoint);
        tracing::debug!(method = %method, url = %url, "sending api request");

        let mut request = self.client.request(method, &url);

        if !query.is_empty() {
            request = request.query(query);
        }
        request = match body {
            Body::Empty => request,
            Body::Json(payload) => request
                .header(CONTENT_TYPE, "application/json")
                .body(payload),
            Body::Form(fields) => request.form(&fields),
            Body::Bytes(payload) => request.body(payload),
        };

        Ok(request
            .headers(caller_headers)
            .bearer_auth(access_token)
            .send()
            .await?)
    }
}

/// One value per header name, the last pair winning. `Authorization` is
/// dropped.
fn header_map(headers: Headers<'_>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());

    for (key, value) in headers {
        let invalid = |reason: String| Error::InvalidHeader {
            name: key.to_string(),
            reason,
        };
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        if name == AUTHORIZATION {
            tracing::debug!("ignoring caller authorization header");
            continue;
        }
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.insert(name, value);
    }

    Ok(map)
}

/// Decodes a 2xx JSON body into `T`.
///
/// Non-2xx responses are decoded as the Web API's regular error object and
/// returned as [`Error::Api`]. A body that is not such an object keeps the
/// status with the raw text as message.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }

    let api_error = match serde_json::from_str::<ApiErrorEnvelope>(&body) {
        Ok(envelope) => ApiError::from(envelope),
        Err(_) => ApiError {
            status: status.as_u16(),
            message: body,
        },
    };
    Err(Error::Api(api_error))
}

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
use url::Url;

use crate::{
    error::{Error, Result},
    scopes::Scopes,
};

/// Bytes of entropy in the anti-CSRF state sent with each authorization.
pub const STATE_LENGTH: usize = 16;

/// Source of the single-use `state` value for one authorization attempt.
pub trait StateGenerator: Send + Sync {
    fn generate(&self, length: usize) -> Result<String>;
}

/// Draws state from the operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsStateGenerator;

impl StateGenerator for OsStateGenerator {
    fn generate(&self, length: usize) -> Result<String> {
        generate_state(length)
    }
}

/// Generates a URL-safe random state carrying `length` bytes of entropy.
///
/// The bytes come from the OS random source and are base64url encoded
/// without padding, so the returned string is longer than `length`.
pub fn generate_state(length: usize) -> Result<String> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(Error::StateGeneration)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Builds the consent page URL for the authorization code grant.
///
/// The client secret never appears here; it is only sent to the token
/// endpoint.
pub fn build_authorization_url(
    authorize_url: &str,
    client_id: &str,
    redirect_url: &str,
    scopes: &Scopes,
    state: &str,
) -> Result<Url> {
    let mut url = Url::parse(authorize_url)?;

    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", redirect_url)
        .append_pair("scope", &scopes.to_param())
        .append_pair("state", state);

    Ok(url)
}

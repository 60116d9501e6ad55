//! Configuration management for sporlauth.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in Spotify defaults for the service URLs
//!
//! Client id, client secret and redirect URL have no default. Their absence
//! is a fatal startup error.

use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use url::Url;

use crate::{
    error::{Error, Result},
    types::Credentials,
};

pub const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
pub const ENV_REDIRECT_URL: &str = "SPOTIFY_REDIRECT_URL";
pub const ENV_ACCOUNTS_URL: &str = "SPOTIFY_ACCOUNTS_URL";
pub const ENV_API_URL: &str = "SPOTIFY_API_URL";

pub const BASE_URL_ACCOUNTS: &str = "https://accounts.spotify.com";
pub const BASE_URL_API: &str = "https://api.spotify.com";
pub const ENDPOINT_AUTHORIZE: &str = "/authorize";
pub const ENDPOINT_TOKEN: &str = "/api/token";

pub const DEFAULT_CALLBACK_PORT: u16 = 8080;

/// Loads environment variables from `sporlauth/.env` in the local data
/// directory.
///
/// The directory layout follows the platform:
/// - Linux: `~/.local/share/sporlauth/.env`
/// - macOS: `~/Library/Application Support/sporlauth/.env`
/// - Windows: `%LOCALAPPDATA%/sporlauth/.env`
///
/// A missing file is fine, credentials may come from the process
/// environment instead. A file that exists but cannot be parsed is an error.
pub fn load_env() -> std::result::Result<(), String> {
    let path = env_file_path();
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no .env file, using process environment");
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "loaded .env file");
    Ok(())
}

pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporlauth/.env");
    path
}

impl Credentials {
    /// Reads `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` and
    /// `SPOTIFY_REDIRECT_URL` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Credentials::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(Error::MissingConfig(key))
        };

        Ok(Credentials {
            client_id: required(ENV_CLIENT_ID)?,
            client_secret: required(ENV_CLIENT_SECRET)?,
            redirect_url: required(ENV_REDIRECT_URL)?,
        })
    }
}

/// Where the accounts service and the Web API live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub api_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(BASE_URL_ACCOUNTS, BASE_URL_API)
    }
}

impl Endpoints {
    pub fn new(accounts_base: &str, api_base: &str) -> Self {
        let accounts_base = accounts_base.trim_end_matches('/');
        Self {
            authorize_url: format!("{accounts_base}{ENDPOINT_AUTHORIZE}"),
            token_url: format!("{accounts_base}{ENDPOINT_TOKEN}"),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Spotify defaults, overridden by `SPOTIFY_ACCOUNTS_URL` and
    /// `SPOTIFY_API_URL` when set.
    pub fn from_env() -> Self {
        let accounts = env::var(ENV_ACCOUNTS_URL).unwrap_or_else(|_| BASE_URL_ACCOUNTS.into());
        let api = env::var(ENV_API_URL).unwrap_or_else(|_| BASE_URL_API.into());
        Self::new(&accounts, &api)
    }
}

/// Local address and path the callback listener serves, derived from the
/// registered redirect URL.
///
/// `localhost` binds the IPv4 loopback; a URL without a port uses
/// [`DEFAULT_CALLBACK_PORT`].
pub fn callback_target(redirect_url: &str) -> Result<(SocketAddr, String)> {
    let url = Url::parse(redirect_url)?;

    let ip = match url.host() {
        Some(url::Host::Ipv4(ip)) => IpAddr::V4(ip),
        Some(url::Host::Ipv6(ip)) => IpAddr::V6(ip),
        _ => IpAddr::V4(Ipv4Addr::LOCALHOST),
    };
    let port = url.port().unwrap_or(DEFAULT_CALLBACK_PORT);

    let path = match url.path() {
        "" => "/".to_string(),
        p => p.to_string(),
    };

    Ok((SocketAddr::new(ip, port), path))
}

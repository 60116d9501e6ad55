//! # Spotify Integration Module
//!
//! Authorization and authenticated transport for the Spotify Web API. Every
//! resource call in an application built on sporlauth goes through the
//! pieces defined here.
//!
//! ## Architecture
//!
//! ```text
//! Resource services (albums, playlists, ...)
//!          ↓
//! AuthenticatedTransport  ── bearer header, timeout
//!          ↓
//! TokenGuard              ── expiry check, single refresh under a lock
//!          ↓
//! TokenExchanger          ── POST /api/token (authorization_code | refresh_token)
//! ```
//!
//! The initial token comes from the interactive [`flow`]:
//!
//! ```text
//! StateGenerator + AuthorizationUrlBuilder → consent URL
//! CallbackListener (background) ← browser redirect ← user approves
//! code → TokenExchanger → TokenGuard → Client
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - token endpoint grants and the [`auth::TokenRefresher`] seam
//! - [`flow`] - the interactive authorization code flow
//! - [`client`] - [`client::Client`], the handle applications keep
//! - [`transport`] - GET/POST/PUT/DELETE with a fresh bearer token
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sporlauth::{scopes::{self, Scopes}, spotify::{client::Client, transport}};
//!
//! let client = Client::from_env(Scopes::new([scopes::USER_READ_EMAIL])).await?;
//! let response = client.transport().get("/v1/me", &[], &[]).await?;
//! let me: serde_json::Value = transport::read_json(response).await?;
//! ```
//!
//! ## Error Types
//!
//! Everything returns [`crate::Result`]. Provider rejections are
//! [`crate::Error::Auth`], network failures [`crate::Error::Transport`],
//! and flow failures are wrapped in [`crate::Error::Flow`] with the stage.
//!
//! ## Thread Safety
//!
//! [`client::Client`] and [`transport::AuthenticatedTransport`] are `Clone`
//! and may be used from many tasks at once. The token behind them is the only
//! shared mutable state.

pub mod auth;
pub mod client;
pub mod flow;
pub mod transport;

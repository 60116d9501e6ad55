//! # API Module
//!
//! HTTP handlers served by the local callback listener. The listener exposes a
//! single route, the redirect target registered with Spotify, handled by
//! [`callback`].
//!
//! ## Endpoints
//!
//! - [`callback`] - receives the authorize redirect (`?code=...&state=...` or
//!   `?error=...`), hands the result to the waiting flow exactly once and
//!   tells the browser it can close the window. Any later request gets a 404.
//!
//! ## Related Modules
//!
//! - [`crate::server`] - binds the listener and drives its shutdown
//! - [`crate::spotify::flow`] - consumes the delivered [`crate::types::CallbackResult`]

mod callback;

pub use callback::{CallbackSlot, callback};

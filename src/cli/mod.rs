//! # CLI Module
//!
//! Command implementations for the `sporlauth` binary. Each command runs the
//! interactive authorization flow where it needs a token, reports progress
//! with the crate's colored output macros, and exits with a clear message on
//! failure.
//!
//! ## Commands
//!
//! - [`auth`] - authorizes and shows the granted token's type, scope and expiry
//! - [`me`] - authorizes and prints the current user's profile from `GET /v1/me`
//! - [`scopes`] - lists every scope the accounts service knows about
//!
//! ## Browser Handling
//!
//! By default the consent page opens in the system browser. With
//! `--no-browser` the URL is printed instead through [`PrintUrl`], for
//! headless machines or when the user wants to pick the browser.

mod auth;
mod profile;
mod scopes;

pub use auth::{AuthOptions, PrintUrl, auth, authorize};
pub use profile::me;
pub use scopes::scopes;

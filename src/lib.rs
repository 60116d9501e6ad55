//! Spotify Authorization Library
//!
//! This library runs the interactive OAuth2 authorization code flow against
//! the Spotify accounts service and provides an HTTP transport that keeps its
//! access token fresh for every Web API call.
//!
//! # Modules
//!
//! - `api` - HTTP handler for the local callback listener
//! - `browser` - Opening the consent page in the user's browser
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types
//! - `management` - Token lifetime management
//! - `scopes` - Spotify authorization scopes
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Token exchange, authorization flow and authenticated transport
//! - `types` - Data structures and type definitions
//! - `utils` - State generation and authorization URL building
//!
//! # Example
//!
//! ```
//! use sporlauth::{config, scopes::Scopes, spotify::client::Client};
//!
//! #[tokio::main]
//! async fn main() -> sporlauth::Result<()> {
//!     config::load_env().ok();
//!     let client = Client::from_env(Scopes::all()).await?;
//!     let response = client.transport().get("/v1/me", &[], &[]).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod scopes;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Starting authentication process...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors in the binary; library code returns errors instead.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser, open the URL manually");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

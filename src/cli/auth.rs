use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use crate::{
    browser::BrowserLauncher,
    config::Endpoints,
    error,
    error::BrowserError,
    info,
    scopes::Scopes,
    spotify::{client::Client, flow::AuthorizationFlow},
    success,
    types::Credentials,
};

#[derive(Debug, Clone)]
pub struct AuthOptions {
    pub scopes: Scopes,
    pub timeout: Option<Duration>,
    pub no_browser: bool,
}

/// Shows the consent URL on stdout instead of launching a browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintUrl;

impl BrowserLauncher for PrintUrl {
    fn open(&self, url: &str) -> Result<(), BrowserError> {
        info!("Open the following URL in your browser to authorize:\n{}", url);
        Ok(())
    }
}

/// Runs the authorization flow with credentials from the environment.
/// Ctrl-C aborts the wait and releases the callback port.
pub async fn authorize(opts: &AuthOptions) -> Client {
    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => error!("{}. Add it to {}", e, crate::config::env_file_path().display()),
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut flow = AuthorizationFlow::new(credentials, opts.scopes.clone())
        .endpoints(Endpoints::from_env())
        .cancel_token(cancel);
    if let Some(timeout) = opts.timeout {
        flow = flow.timeout(timeout);
    }

    let result = if opts.no_browser {
        flow.browser(PrintUrl).run().await
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_message("Waiting for authorization in the browser...");
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        let result = flow.run().await;
        pb.finish_and_clear();
        result
    };

    match result {
        Ok(client) => client,
        Err(e) => error!("Authorization failed: {}", e),
    }
}

pub async fn auth(opts: AuthOptions) {
    let client = authorize(&opts).await;
    let token = client.token().await;

    success!("Authentication successful!");
    info!("Token type: {}", token.token_type);
    info!(
        "Scope: {}",
        if token.scope.is_empty() {
            "(none)"
        } else {
            token.scope.as_str()
        }
    );
    info!(
        "Access token expires at {}",
        token.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
    );
}

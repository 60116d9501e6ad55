//! Interactive authorization code flow.
//!
//! 1. Generate a single-use anti-CSRF state
//! 2. Build the consent page URL
//! 3. Start the callback listener on the redirect URL's address
//! 4. Open the consent page in the browser
//! 5. Wait for the redirect, shut the listener down, compare the state
//! 6. Exchange the code for a token pair
//!
//! Nothing is retried. Any failure is returned as [`Error::Flow`] naming the
//! stage, and the listener is shut down on every path out of [`AuthorizationFlow::run`].

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{
    browser::{BrowserLauncher, SystemBrowser},
    config::Endpoints,
    error::{AuthError, Error, FlowStage, Result},
    scopes::Scopes,
    server::{CallbackHandle, CallbackListener},
    spotify::{auth::TokenExchanger, client::Client},
    types::{CallbackResult, Credentials},
    utils::{self, OsStateGenerator, STATE_LENGTH, StateGenerator},
};

pub struct AuthorizationFlow {
    credentials: Credentials,
    scopes: Scopes,
    endpoints: Endpoints,
    state_generator: Box<dyn StateGenerator>,
    browser: Box<dyn BrowserLauncher>,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl AuthorizationFlow {
    pub fn new(credentials: Credentials, scopes: Scopes) -> Self {
        Self {
            credentials,
            scopes,
            endpoints: Endpoints::default(),
            state_generator: Box::new(OsStateGenerator),
            browser: Box::new(SystemBrowser::new()),
            timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn state_generator(mut self, generator: impl StateGenerator + 'static) -> Self {
        self.state_generator = Box::new(generator);
        self
    }

    pub fn browser(mut self, browser: impl BrowserLauncher + 'static) -> Self {
        self.browser = Box::new(browser);
        self
    }

    /// Gives up waiting for the redirect after `timeout`. Without it the flow
    /// waits until the user completes the consent page or the flow is
    /// cancelled.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cancelling `token` stops the listener and aborts the wait.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn run(self) -> Result<Client> {
        let state = self
            .state_generator
            .generate(STATE_LENGTH)
            .map_err(Error::at(FlowStage::State))?;

        let url = utils::build_authorization_url(
            &self.endpoints.authorize_url,
            &self.credentials.client_id,
            &self.credentials.redirect_url,
            &self.scopes,
            &state,
        )
        .map_err(Error::at(FlowStage::Url))?;

        let exchanger =
            TokenExchanger::new(self.credentials.clone(), self.endpoints.token_url.clone())
                .map_err(Error::at(FlowStage::Exchange))?;

        let mut handle = CallbackListener::for_redirect_url(&self.credentials.redirect_url)
            .map_err(Error::at(FlowStage::Listener))?
            .start(self.cancel.child_token())
            .await
            .map_err(Error::at(FlowStage::Listener))?;

        let received = self.await_callback(&mut handle, url.as_str()).await;

        if let Err(e) = handle.shutdown().await {
            tracing::warn!(error = %e, "callback listener did not shut down cleanly");
        }

        let code = received.and_then(|result| accept_callback(result, &state))?;

        tracing::info!("authorization code received, exchanging for tokens");
        let token = exchanger
            .exchange_code(&code)
            .await
            .map_err(Error::at(FlowStage::Exchange))?;

        tracing::info!(expires_at = %token.expires_at, "authorization completed");
        Client::from_token(token, Arc::new(exchanger), &self.endpoints.api_base)
    }

    async fn await_callback(
        &self,
        handle: &mut CallbackHandle,
        url: &str,
    ) -> Result<CallbackResult> {
        self.browser
            .open(url)
            .map_err(|e| Error::at(FlowStage::Browser)(Error::Browser(e)))?;

        tracing::info!(addr = %handle.local_addr(), "waiting for authorization callback");

        let received = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, handle.wait()).await {
                Ok(received) => received,
                Err(_) => Err(Error::CallbackTimeout(limit)),
            },
            None => handle.wait().await,
        };

        received.map_err(Error::at(FlowStage::Callback))
    }
}

/// Checks the state exactly once and turns the callback into a code.
fn accept_callback(result: CallbackResult, expected_state: &str) -> Result<String> {
    if result.state() != Some(expected_state) {
        return Err(Error::at(FlowStage::Callback)(Error::StateMismatch));
    }

    match result {
        CallbackResult::Code { code, .. } => Ok(code),
        CallbackResult::Denied {
            error, description, ..
        } => Err(Error::at(FlowStage::Callback)(Error::Auth(AuthError {
            error,
            description,
        }))),
    }
}

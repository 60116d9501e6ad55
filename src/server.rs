//! Short-lived local HTTP server that receives the authorize redirect.
//!
//! The listener moves through
//! `NotStarted -> Listening -> Delivered -> ShuttingDown -> Stopped`.
//! Whichever comes first, a delivered callback or cancellation of the token
//! passed to [`CallbackListener::start`], triggers a graceful shutdown: no new
//! connections are accepted and in-flight responses are still written.

use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::{
    net::TcpListener,
    sync::{oneshot, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    api::{self, CallbackSlot},
    config,
    error::{Error, Result},
    types::CallbackResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    NotStarted,
    Listening,
    Delivered,
    ShuttingDown,
    Stopped,
}

pub struct CallbackListener {
    addr: SocketAddr,
    path: String,
    state: watch::Sender<ListenerState>,
}

impl CallbackListener {
    pub fn new(addr: SocketAddr, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        let (state, _) = watch::channel(ListenerState::NotStarted);
        Self { addr, path, state }
    }

    /// Listener for the address and path of a registered redirect URL.
    pub fn for_redirect_url(redirect_url: &str) -> Result<Self> {
        let (addr, path) = config::callback_target(redirect_url)?;
        Ok(Self::new(addr, path))
    }

    pub fn state(&self) -> ListenerState {
        *self.state.borrow()
    }

    /// Binds the port and starts serving in a background task.
    ///
    /// A bind failure (e.g. the port is taken by another flow) is returned
    /// right away as [`Error::ListenerBind`].
    pub async fn start(self, cancel: CancellationToken) -> Result<CallbackHandle> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| Error::ListenerBind {
                addr: self.addr,
                source,
            })?;
        let local_addr = listener.local_addr().map_err(Error::Listener)?;

        let (sender, receiver) = oneshot::channel();
        let states = self.state.subscribe();
        self.state.send_replace(ListenerState::Listening);
        let slot = Arc::new(CallbackSlot::new(sender, self.state));

        let app = Router::new().route(
            &self.path,
            get(api::callback).layer(Extension(Arc::clone(&slot))),
        );

        tracing::info!(addr = %local_addr, path = %self.path, "callback listener started");

        let shutdown = {
            let slot = Arc::clone(&slot);
            let cancel = cancel.clone();
            async move {
                tokio::select! {
                    _ = cancel.cancelled() => tracing::debug!("callback listener cancelled"),
                    _ = slot.delivered.notified() => tracing::debug!("callback delivered"),
                }
                slot.state.send_replace(ListenerState::ShuttingDown);
            }
        };

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await;
            slot.state.send_replace(ListenerState::Stopped);
            tracing::debug!("callback listener stopped");
            served.map_err(Error::Listener)
        });

        Ok(CallbackHandle {
            local_addr,
            receiver: Some(receiver),
            states,
            task,
            cancel,
        })
    }
}

/// A running callback listener.
pub struct CallbackHandle {
    local_addr: SocketAddr,
    receiver: Option<oneshot::Receiver<CallbackResult>>,
    states: watch::Receiver<ListenerState>,
    task: JoinHandle<Result<()>>,
    cancel: CancellationToken,
}

impl CallbackHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ListenerState {
        *self.states.borrow()
    }

    /// Waits for the single callback.
    ///
    /// Returns [`Error::CallbackAborted`] if the listener is cancelled first
    /// or the result was already taken.
    pub async fn wait(&mut self) -> Result<CallbackResult> {
        let Some(receiver) = self.receiver.as_mut() else {
            return Err(Error::CallbackAborted);
        };

        let result = tokio::select! {
            received = receiver => received.map_err(|_| Error::CallbackAborted),
            _ = self.cancel.cancelled() => Err(Error::CallbackAborted),
        };
        self.receiver = None;
        result
    }

    /// Requests shutdown without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Shuts the listener down and waits until the port is released.
    pub async fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        match self.task.await {
            Ok(served) => served,
            Err(join) => Err(Error::Listener(std::io::Error::other(join))),
        }
    }
}

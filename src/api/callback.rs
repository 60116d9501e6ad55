use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tokio::sync::{Notify, oneshot, watch};

use crate::{server::ListenerState, types::CallbackResult};

const CODE_RECEIVED_HTML: &str =
    "<h2>Authorization received.</h2><p>Okay! You can close this window now.</p>";
const DENIED_HTML: &str =
    "<h2>Authorization was not granted.</h2><p>You can close this window now.</p>";
const ALREADY_HANDLED_HTML: &str = "<h4>This authorization request was already handled.</h4>";
const MISSING_CODE_HTML: &str = "<h4>Missing authorization code.</h4>";

/// Single-use handoff between the callback handler and the waiting flow.
pub struct CallbackSlot {
    sender: Mutex<Option<oneshot::Sender<CallbackResult>>>,
    pub(crate) state: watch::Sender<ListenerState>,
    pub(crate) delivered: Notify,
}

impl CallbackSlot {
    pub(crate) fn new(
        sender: oneshot::Sender<CallbackResult>,
        state: watch::Sender<ListenerState>,
    ) -> Self {
        Self {
            sender: Mutex::new(Some(sender)),
            state,
            delivered: Notify::new(),
        }
    }

    fn take_sender(&self) -> Option<oneshot::Sender<CallbackResult>> {
        match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(slot): Extension<Arc<CallbackSlot>>,
) -> Response {
    let Some(result) = callback_result(&params) else {
        return (StatusCode::BAD_REQUEST, Html(MISSING_CODE_HTML)).into_response();
    };

    let Some(sender) = slot.take_sender() else {
        tracing::warn!("ignoring authorization callback after the first delivery");
        return (StatusCode::NOT_FOUND, Html(ALREADY_HANDLED_HTML)).into_response();
    };

    let page = match &result {
        CallbackResult::Code { .. } => CODE_RECEIVED_HTML,
        CallbackResult::Denied { error, .. } => {
            tracing::info!(error = %error, "authorization callback carried an error");
            DENIED_HTML
        }
    };

    if sender.send(result).is_err() {
        tracing::debug!("nobody is waiting for the authorization callback anymore");
    }
    slot.state.send_replace(ListenerState::Delivered);
    slot.delivered.notify_one();

    Html(page).into_response()
}

/// `None` when the request carries neither `code` nor `error`.
fn callback_result(params: &HashMap<String, String>) -> Option<CallbackResult> {
    let state = params.get("state").cloned();

    if let Some(error) = params.get("error") {
        return Some(CallbackResult::Denied {
            error: error.clone(),
            description: params.get("error_description").cloned(),
            state,
        });
    }

    params
        .get("code")
        .filter(|code| !code.is_empty())
        .map(|code| CallbackResult::Code {
            code: code.clone(),
            state,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn code_with_state() {
        let result = callback_result(&params(&[("code", "abc123"), ("state", "xyz")]));
        assert_eq!(
            result,
            Some(CallbackResult::Code {
                code: "abc123".into(),
                state: Some("xyz".into())
            })
        );
    }

    #[test]
    fn error_wins_over_code() {
        let result = callback_result(&params(&[
            ("error", "access_denied"),
            ("code", "ignored"),
            ("state", "xyz"),
        ]));
        assert!(matches!(
            result,
            Some(CallbackResult::Denied { ref error, .. }) if error == "access_denied"
        ));
    }

    #[test]
    fn empty_request_is_not_a_callback() {
        assert_eq!(callback_result(&params(&[])), None);
        assert_eq!(callback_result(&params(&[("code", "")])), None);
    }
}

use crate::{types::SignError, Correlator, SignedResult};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use trust_protocol::TrustError;

/// An inbound URL-open event forwarded by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackEvent {
    pub url: String,
}

impl CallbackEvent {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Settles the pending request named by the callback. Returns false when the
/// event was dropped: unparseable, or no request with that id is pending
/// (already settled, evicted, or never issued here).
pub fn handle_callback<O>(correlator: &mut Correlator<O>, event: &CallbackEvent) -> bool {
    let result = match correlator.codec.parse_url(&event.url) {
        Ok(result) => result,
        Err(e) => {
            warn!("dropping unparseable callback {}: {}", event.url, e);
            return false;
        }
    };

    let pending = match correlator.pending.remove(&result.id) {
        Some(pending) => pending,
        None => {
            debug!("no pending request for callback id {:?}", result.id);
            return false;
        }
    };

    if let Some(command) = result.command {
        if command != pending.command {
            warn!(
                "callback for {} named {} but request was {}",
                result.id, command, pending.command
            );
        }
    }

    let outcome = if result.is_success() {
        info!("request {} signed", result.id);
        Ok(SignedResult::new(result.result))
    } else {
        let code = result
            .error_code()
            .unwrap_or_else(|| TrustError::Unknown.code());
        info!("request {} rejected by wallet with code {}", result.id, code);
        Err(SignError::Rejected { code })
    };

    if pending.sender.send(outcome).is_err() {
        debug!("caller for request {} is no longer waiting", result.id);
    }
    true
}

use crate::command::TrustCommand;
use crate::error::{ParseError, TrustError};
use crate::payload::SignPayload;
use serde::{Deserialize, Serialize};

pub const TRUST_SCHEME: &str = "trust://";

/// What the wallet handed back on a callback URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackResult {
    pub id: String,
    pub result: String,
    /// Raw `error` value; `"0"` when the wallet sent none.
    pub error: String,
    /// Command named by the callback path, when recognised.
    pub command: Option<TrustCommand>,
}

impl CallbackResult {
    /// The error as a number. `None` when the wallet sent something
    /// non-numeric.
    pub fn error_code(&self) -> Option<i64> {
        self.error.trim().parse().ok()
    }

    pub fn is_success(&self) -> bool {
        self.error_code() == Some(TrustError::None.code())
    }
}

/// Builds outbound wallet URLs and parses the callback URLs coming back.
#[derive(Debug, Clone)]
pub struct Codec {
    scheme: String,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(TRUST_SCHEME)
    }
}

impl Codec {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn build_url(&self, payload: &SignPayload) -> String {
        format!(
            "{}{}?{}",
            self.scheme,
            payload.command().identifier(),
            payload.to_query()
        )
    }

    /// Parses `<scheme><command>?id=..&result=..&error=..`.
    ///
    /// Missing fields fall back to an empty id, an empty result and the
    /// `none` error code. Only undecodable percent-escapes fail.
    pub fn parse_url(&self, url: &str) -> Result<CallbackResult, ParseError> {
        let url = url.split('#').next().unwrap_or_default();
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, query),
            None => (url, ""),
        };

        let command = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(TrustCommand::from_identifier);

        let mut id = None;
        let mut result = None;
        let mut error = None;

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match decode(key)?.as_str() {
                "id" => &mut id,
                "result" => &mut result,
                "error" => &mut error,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(decode(value)?);
            }
        }

        Ok(CallbackResult {
            id: id.unwrap_or_default(),
            result: result.unwrap_or_default(),
            error: error.unwrap_or_else(|| TrustError::None.code().to_string()),
            command,
        })
    }
}

fn decode(component: &str) -> Result<String, ParseError> {
    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ParseError::InvalidEncoding(component.to_string()))
}

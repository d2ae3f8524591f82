use crate::traits::OpenError;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use trust_protocol::{TrustError, TRUST_SCHEME};

/// What happens to outstanding requests when the correlator is cleaned up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupPolicy {
    /// Drop the entries; their awaitables never settle.
    #[default]
    Abandon,
    /// Settle every awaitable with `SignError::Abandoned`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelatorConfig {
    /// Scheme the wallet calls back on, e.g. `myapp://`. Applied to payloads
    /// that do not carry their own.
    pub callback_scheme: Option<String>,
    pub outbound_scheme: String,
    /// Refuse to launch when the wallet scheme cannot be opened.
    pub check_installed: bool,
    pub cleanup_policy: CleanupPolicy,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            callback_scheme: None,
            outbound_scheme: TRUST_SCHEME.to_string(),
            check_installed: false,
            cleanup_policy: CleanupPolicy::default(),
        }
    }
}

impl CorrelatorConfig {
    pub fn with_callback_scheme(scheme: impl Into<String>) -> Self {
        Self {
            callback_scheme: Some(scheme.into()),
            ..Self::default()
        }
    }
}

/// The signed value returned by the wallet, as it appeared on the callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedResult(String);

impl SignedResult {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The wallet base64-encodes signatures and signed transactions.
    pub fn to_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        general_purpose::STANDARD.decode(&self.0)
    }

    pub fn to_hex(&self) -> Result<String, base64::DecodeError> {
        Ok(hex::encode(self.to_bytes()?))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error("wallet rejected request ({code}): {}", describe(.code))]
    Rejected { code: i64 },
    #[error("a request with id {0} is already pending")]
    DuplicateId(String),
    #[error("{}", TrustError::NotInstalled)]
    NotInstalled,
    #[error(transparent)]
    Launch(#[from] OpenError),
    #[error("request was abandoned by cleanup")]
    Abandoned,
    #[error("correlator service has stopped")]
    Closed,
}

fn describe(code: &i64) -> &'static str {
    TrustError::describe(*code)
}

impl SignError {
    /// Catalog code for rejections and for a missing wallet.
    pub fn code(&self) -> Option<i64> {
        match self {
            SignError::Rejected { code } => Some(*code),
            SignError::NotInstalled => Some(TrustError::NotInstalled.code()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_result_decodes_to_hex() {
        let result = SignedResult::new(
            "XkKQfY3KAYXgQdBhEUaegGhQagNYxIT8XCcr3CJnzNJPNYKlh0LP9vemwXTV+qD3ZFExEzjptmpAajp4q8f9Yxs=",
        );
        assert_eq!(
            result.to_hex().unwrap(),
            "5e42907d8dca0185e041d06111469e8068506a0358c484fc5c272bdc2267ccd24f3582a58742cff6f7a6c174d5faa0f76451311338e9b66a406a3a78abc7fd631b"
        );
        assert_eq!(result.to_bytes().unwrap().len(), 65);
    }

    #[test]
    fn signed_result_rejects_non_base64() {
        assert!(SignedResult::new("not base64!").to_bytes().is_err());
    }

    #[test]
    fn rejection_carries_code_and_message() {
        let err = SignError::Rejected { code: 1 };
        assert_eq!(err.code(), Some(1));
        assert_eq!(err.to_string(), "wallet rejected request (1): User cancelled");
        assert_eq!(SignError::DuplicateId("a".into()).code(), None);
    }

    #[test]
    fn not_installed_uses_catalog_code() {
        let err = SignError::NotInstalled;
        assert_eq!(err.code(), Some(TrustError::NotInstalled.code()));
        assert_eq!(err.to_string(), "Trust wallet is not installed");
    }

    #[test]
    fn config_defaults() {
        let config = CorrelatorConfig::default();
        assert_eq!(config.outbound_scheme, "trust://");
        assert_eq!(config.cleanup_policy, CleanupPolicy::Abandon);
        assert!(!config.check_installed);
        assert_eq!(
            CorrelatorConfig::with_callback_scheme("app://").callback_scheme.as_deref(),
            Some("app://")
        );
    }
}

use thiserror::Error;

/// Error codes reported by the wallet in the `error` field of a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum TrustError {
    Unknown = -1,
    None = 0,
    Cancelled = 1,
    InvalidRequest = 2,
    WatchOnly = 3,
    /// Raised locally when the wallet scheme cannot be opened; the wallet
    /// never reports it.
    NotInstalled = 4,
}

impl TrustError {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(TrustError::Unknown),
            0 => Some(TrustError::None),
            1 => Some(TrustError::Cancelled),
            2 => Some(TrustError::InvalidRequest),
            3 => Some(TrustError::WatchOnly),
            4 => Some(TrustError::NotInstalled),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            TrustError::Unknown => "Unknown error",
            TrustError::None => "No error",
            TrustError::Cancelled => "User cancelled",
            TrustError::InvalidRequest => "Signing request is invalid",
            TrustError::WatchOnly => "Watch only wallet cannot sign",
            TrustError::NotInstalled => "Trust wallet is not installed",
        }
    }

    /// Message for a raw code, or an empty string when the code is not one
    /// the wallet defines.
    pub fn describe(code: i64) -> &'static str {
        Self::from_code(code).map(Self::message).unwrap_or("")
    }
}

impl std::fmt::Display for TrustError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("query component is not valid utf-8 once decoded: {0}")]
    InvalidEncoding(String),
}

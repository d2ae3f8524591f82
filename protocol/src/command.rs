use serde::{Deserialize, Serialize};

const SIGN_MESSAGE: &str = "sign-message";
const SIGN_PERSONAL_MESSAGE: &str = "sign-personal-message";
const SIGN_TRANSACTION: &str = "sign-transaction";

/// The signing operations the wallet understands.
///
/// The identifier is used both as the host of the outbound `trust://` URL and
/// as the path segment of the callback URL the wallet opens when it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrustCommand {
    SignMessage,
    SignPersonalMessage,
    SignTransaction,
}

impl TrustCommand {
    pub fn identifier(self) -> &'static str {
        match self {
            TrustCommand::SignMessage => SIGN_MESSAGE,
            TrustCommand::SignPersonalMessage => SIGN_PERSONAL_MESSAGE,
            TrustCommand::SignTransaction => SIGN_TRANSACTION,
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            SIGN_MESSAGE => Some(TrustCommand::SignMessage),
            SIGN_PERSONAL_MESSAGE => Some(TrustCommand::SignPersonalMessage),
            SIGN_TRANSACTION => Some(TrustCommand::SignTransaction),
            _ => None,
        }
    }

    pub fn is_message(self) -> bool {
        match self {
            TrustCommand::SignMessage | TrustCommand::SignPersonalMessage => true,
            TrustCommand::SignTransaction => false,
        }
    }

    /// Prefix for request ids generated for this command.
    pub fn id_prefix(self) -> &'static str {
        match self {
            TrustCommand::SignMessage | TrustCommand::SignPersonalMessage => "msg",
            TrustCommand::SignTransaction => "tx",
        }
    }

    /// Builds `<scheme><identifier>?id=<id>`, the URL the wallet calls back on.
    pub fn callback_url(self, scheme: &str, id: &str) -> String {
        format!("{}{}?id={}", scheme, self.identifier(), id)
    }
}

impl std::fmt::Display for TrustCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.identifier())
    }
}

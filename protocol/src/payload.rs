use crate::command::TrustCommand;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GAS_PRICE: &str = "21";
pub const DEFAULT_GAS_LIMIT: &str = "21000";

/// A request to sign an arbitrary message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    id: Option<String>,
    message: Vec<u8>,
    address: Option<String>,
    callback_scheme: Option<String>,
    /// Always one of the message commands.
    kind: TrustCommand,
}

impl MessagePayload {
    pub fn new(message: impl Into<Vec<u8>>) -> Self {
        Self {
            id: None,
            message: message.into(),
            address: None,
            callback_scheme: None,
            kind: TrustCommand::SignMessage,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_callback_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.callback_scheme = Some(scheme.into());
        self
    }

    /// Marks the request as a personal message (`sign-personal-message`).
    pub fn personal(mut self) -> Self {
        self.kind = TrustCommand::SignPersonalMessage;
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn callback_scheme(&self) -> Option<&str> {
        self.callback_scheme.as_deref()
    }

    pub fn command(&self) -> TrustCommand {
        self.kind
    }

    /// `message=<base64>[&address=..][&callback=..]`
    pub fn to_query(&self) -> String {
        let encoded = general_purpose::STANDARD.encode(&self.message);
        let mut params = vec![format!("message={}", urlencoding::encode(&encoded))];

        if let Some(address) = &self.address {
            params.push(format!("address={}", address));
        }
        if let Some(callback) = callback_param(self.command(), &self.callback_scheme, &self.id) {
            params.push(callback);
        }

        params.join("&")
    }
}

/// A request to sign a transaction. Gas and nonce defaults are fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPayload {
    id: Option<String>,
    to: String,
    amount: String,
    data: Option<String>,
    gas_price: String,
    gas_limit: String,
    nonce: u64,
    callback_scheme: Option<String>,
}

impl TransactionPayload {
    pub fn new(to: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            id: None,
            to: to.into(),
            amount: amount.into(),
            data: None,
            gas_price: DEFAULT_GAS_PRICE.to_string(),
            gas_limit: DEFAULT_GAS_LIMIT.to_string(),
            nonce: 0,
            callback_scheme: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_gas_price(mut self, gas_price: impl Into<String>) -> Self {
        self.gas_price = gas_price.into();
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: impl Into<String>) -> Self {
        self.gas_limit = gas_limit.into();
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn with_callback_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.callback_scheme = Some(scheme.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    pub fn gas_price(&self) -> &str {
        &self.gas_price
    }

    pub fn gas_limit(&self) -> &str {
        &self.gas_limit
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn callback_scheme(&self) -> Option<&str> {
        self.callback_scheme.as_deref()
    }

    pub fn command(&self) -> TrustCommand {
        TrustCommand::SignTransaction
    }

    /// `to=..&amount=..&gasPrice=..&gasLimit=..[&data=..]&nonce=..[&callback=..]`
    pub fn to_query(&self) -> String {
        let mut params = vec![
            format!("to={}", self.to),
            format!("amount={}", self.amount),
            format!("gasPrice={}", self.gas_price),
            format!("gasLimit={}", self.gas_limit),
        ];

        if let Some(data) = &self.data {
            params.push(format!("data={}", data));
        }
        params.push(format!("nonce={}", self.nonce));
        if let Some(callback) = callback_param(self.command(), &self.callback_scheme, &self.id) {
            params.push(callback);
        }

        params.join("&")
    }
}

/// Either kind of signing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignPayload {
    Message(MessagePayload),
    Transaction(TransactionPayload),
}

impl SignPayload {
    pub fn command(&self) -> TrustCommand {
        match self {
            SignPayload::Message(p) => p.command(),
            SignPayload::Transaction(p) => p.command(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            SignPayload::Message(p) => p.id(),
            SignPayload::Transaction(p) => p.id(),
        }
    }

    pub fn callback_scheme(&self) -> Option<&str> {
        match self {
            SignPayload::Message(p) => p.callback_scheme(),
            SignPayload::Transaction(p) => p.callback_scheme(),
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        match self {
            SignPayload::Message(p) => SignPayload::Message(p.with_id(id)),
            SignPayload::Transaction(p) => SignPayload::Transaction(p.with_id(id)),
        }
    }

    pub fn with_callback_scheme(self, scheme: impl Into<String>) -> Self {
        match self {
            SignPayload::Message(p) => SignPayload::Message(p.with_callback_scheme(scheme)),
            SignPayload::Transaction(p) => SignPayload::Transaction(p.with_callback_scheme(scheme)),
        }
    }

    pub fn to_query(&self) -> String {
        match self {
            SignPayload::Message(p) => p.to_query(),
            SignPayload::Transaction(p) => p.to_query(),
        }
    }
}

impl From<MessagePayload> for SignPayload {
    fn from(payload: MessagePayload) -> Self {
        SignPayload::Message(payload)
    }
}

impl From<TransactionPayload> for SignPayload {
    fn from(payload: TransactionPayload) -> Self {
        SignPayload::Transaction(payload)
    }
}

fn callback_param(
    command: TrustCommand,
    scheme: &Option<String>,
    id: &Option<String>,
) -> Option<String> {
    scheme.as_ref().map(|scheme| {
        let url = command.callback_url(scheme, id.as_deref().unwrap_or_default());
        format!("callback={}", urlencoding::encode(&url))
    })
}

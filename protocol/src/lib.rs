//! Wire format for talking to the Trust wallet through URL schemes: command
//! identifiers, request payloads, outbound URL construction, callback parsing
//! and the wallet's error codes.

pub mod codec;
pub mod command;
pub mod error;
pub mod payload;

pub use codec::{CallbackResult, Codec, TRUST_SCHEME};
pub use command::TrustCommand;
pub use error::{ParseError, TrustError};
pub use payload::{MessagePayload, SignPayload, TransactionPayload};

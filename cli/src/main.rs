use async_trait::async_trait;
use clap::{Parser, Subcommand};
use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use trust_link::{
    CallbackEvent, Correlator, CorrelatorConfig, OpenError, SignedResult, UrlOpener,
};
use trust_protocol::{Codec, MessagePayload, SignPayload, TransactionPayload, TrustError};

#[derive(Parser)]
#[command(name = "trust-cli", about = "Build and parse Trust wallet sign request URLs")]
struct Cli {
    /// Scheme used to reach the wallet
    #[arg(long, global = true, default_value = trust_protocol::TRUST_SCHEME)]
    scheme: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the URL for a message signing request
    Message {
        #[command(flatten)]
        message: MessageArgs,
    },
    /// Print the URL for a transaction signing request
    Transaction {
        #[command(flatten)]
        transaction: TransactionArgs,
    },
    /// Parse a callback URL and print it as JSON
    Parse { url: String },
    /// Describe a wallet error code
    Error {
        #[arg(allow_negative_numbers = true)]
        code: i64,
    },
    /// Issue a message request, then read callback URLs from stdin until it settles
    Sign {
        /// Scheme the wallet should call back on
        #[arg(long)]
        callback_scheme: String,
        #[command(flatten)]
        message: MessageArgs,
    },
}

#[derive(clap::Args)]
struct MessageArgs {
    message: String,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    callback: Option<String>,
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    personal: bool,
}

impl MessageArgs {
    fn into_payload(self) -> MessagePayload {
        let mut payload = MessagePayload::new(self.message);
        if let Some(address) = self.address {
            payload = payload.with_address(address);
        }
        if let Some(callback) = self.callback {
            payload = payload.with_callback_scheme(callback);
        }
        if let Some(id) = self.id {
            payload = payload.with_id(id);
        }
        if self.personal {
            payload = payload.personal();
        }
        payload
    }
}

#[derive(clap::Args)]
struct TransactionArgs {
    to: String,
    amount: String,
    #[arg(long)]
    data: Option<String>,
    #[arg(long)]
    gas_price: Option<String>,
    #[arg(long)]
    gas_limit: Option<String>,
    #[arg(long)]
    nonce: Option<u64>,
    #[arg(long)]
    callback: Option<String>,
    #[arg(long)]
    id: Option<String>,
}

impl TransactionArgs {
    fn into_payload(self) -> TransactionPayload {
        let mut payload = TransactionPayload::new(self.to, self.amount);
        if let Some(data) = self.data {
            payload = payload.with_data(data);
        }
        if let Some(gas_price) = self.gas_price {
            payload = payload.with_gas_price(gas_price);
        }
        if let Some(gas_limit) = self.gas_limit {
            payload = payload.with_gas_limit(gas_limit);
        }
        if let Some(nonce) = self.nonce {
            payload = payload.with_nonce(nonce);
        }
        if let Some(callback) = self.callback {
            payload = payload.with_callback_scheme(callback);
        }
        if let Some(id) = self.id {
            payload = payload.with_id(id);
        }
        payload
    }
}

/// Stands in for the platform: "opening" a URL prints it for the user to
/// paste into the wallet.
struct PrintOpener;

#[async_trait]
impl UrlOpener for PrintOpener {
    async fn open_url(&self, url: &str) -> Result<(), OpenError> {
        println!("{}", url);
        Ok(())
    }

    async fn can_open_url(&self, _url: &str) -> bool {
        true
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let codec = Codec::new(cli.scheme.clone());

    match cli.command {
        Command::Message { message } => {
            let payload = SignPayload::from(message.into_payload());
            println!("{}", codec.build_url(&payload));
        }
        Command::Transaction { transaction } => {
            let payload = SignPayload::from(transaction.into_payload());
            println!("{}", codec.build_url(&payload));
        }
        Command::Parse { url } => {
            let result = codec.parse_url(&url)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if let Some(code) = result.error_code().filter(|code| *code != 0) {
                println!("error: {}", describe(code));
            }
        }
        Command::Error { code } => println!("{}", describe(code)),
        Command::Sign {
            callback_scheme,
            message,
        } => {
            sign(cli.scheme, callback_scheme, message.into_payload()).await?;
            // stdin is read on a blocking thread that would hold the runtime open
            std::process::exit(0);
        }
    }

    Ok(())
}

fn describe(code: i64) -> String {
    match TrustError::describe(code) {
        "" => format!("unrecognised error code {}", code),
        message => message.to_string(),
    }
}

async fn sign(
    scheme: String,
    callback_scheme: String,
    payload: MessagePayload,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = CorrelatorConfig {
        outbound_scheme: scheme,
        ..CorrelatorConfig::with_callback_scheme(callback_scheme)
    };
    let mut correlator = Correlator::new(PrintOpener, config);

    let result = await_callback(&mut correlator, payload, BufReader::new(tokio::io::stdin())).await?;
    info!("wallet returned {}", result.as_str());
    match result.to_hex() {
        Ok(hex) => println!("{}", hex),
        Err(_) => println!("{}", result.as_str()),
    }
    Ok(())
}

/// Issues the request, then feeds callback URLs from `input` (one per line)
/// to the correlator until the request settles.
async fn await_callback<O, R>(
    correlator: &mut Correlator<O>,
    payload: MessagePayload,
    input: R,
) -> Result<SignedResult, Box<dyn std::error::Error>>
where
    O: UrlOpener,
    R: AsyncBufRead + Unpin,
{
    // registered before the first line is read, so no callback can miss it
    let mut pending = correlator.sign(payload.into()).await?;
    let mut lines = input.lines();

    loop {
        tokio::select! {
            outcome = &mut pending => return Ok(outcome?),
            line = lines.next_line() => match line? {
                Some(line) => {
                    let url = line.trim();
                    if url.is_empty() {
                        continue;
                    }
                    debug!("forwarding callback {}", url);
                    correlator.handle_callback(&CallbackEvent::new(url));
                }
                None => return Err("input closed before the wallet answered".into()),
            },
        }
    }
}

pub use event::CallbackEvent;
use futures::FutureExt;
use log::{debug, error, info};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use trust_protocol::{Codec, MessagePayload, SignPayload, TransactionPayload, TrustCommand};

pub use traits::{OpenError, UrlOpener};
pub use types::{CleanupPolicy, CorrelatorConfig, SignError, SignedResult};

pub mod event;
pub mod traits;
pub mod types;

type Outcome = Result<SignedResult, SignError>;

struct PendingRequest {
    command: TrustCommand,
    sender: oneshot::Sender<Outcome>,
}

/// Matches wallet callbacks to the sign requests that caused them.
pub struct Correlator<O> {
    opener: O,
    config: CorrelatorConfig,
    codec: Codec,
    pending: HashMap<String, PendingRequest>,
    sequence: u64,
}

impl<O> Correlator<O> {
    pub fn new(opener: O, config: CorrelatorConfig) -> Self {
        let codec = Codec::new(config.outbound_scheme.clone());
        Correlator {
            opener,
            config,
            codec,
            pending: HashMap::default(),
            sequence: 0,
        }
    }

    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn handle_callback(&mut self, event: &CallbackEvent) -> bool {
        event::handle_callback(self, event)
    }

    /// Forgets one pending request, e.g. after the caller gave up waiting on
    /// it. Its awaitable never settles.
    pub fn evict(&mut self, id: &str) -> bool {
        let removed = self.pending.remove(id).is_some();
        if removed {
            debug!("evicted pending request {}", id);
        }
        removed
    }

    /// Drops every pending request according to the configured policy and
    /// returns how many there were.
    pub fn cleanup(&mut self) -> usize {
        let count = self.pending.len();
        match self.config.cleanup_policy {
            CleanupPolicy::Abandon => self.pending.clear(),
            CleanupPolicy::Reject => {
                for (_, pending) in self.pending.drain() {
                    let _ = pending.sender.send(Err(SignError::Abandoned));
                }
            }
        }
        info!("cleaned up {} pending requests", count);
        count
    }

    fn next_id(&mut self, command: TrustCommand) -> String {
        self.sequence += 1;
        format!(
            "{}_{}_{}",
            command.id_prefix(),
            chrono::Utc::now().timestamp_millis(),
            self.sequence
        )
    }
}

impl<O> Correlator<O>
where
    O: UrlOpener,
{
    pub async fn sign_message(&mut self, payload: MessagePayload) -> Result<PendingSign, SignError> {
        self.sign(payload.into()).await
    }

    pub async fn sign_personal_message(
        &mut self,
        payload: MessagePayload,
    ) -> Result<PendingSign, SignError> {
        self.sign(payload.personal().into()).await
    }

    pub async fn sign_transaction(
        &mut self,
        payload: TransactionPayload,
    ) -> Result<PendingSign, SignError> {
        self.sign(payload.into()).await
    }

    /// Launches the wallet for `payload`. The returned future settles once the
    /// matching callback is handled.
    pub async fn sign(&mut self, payload: SignPayload) -> Result<PendingSign, SignError> {
        if self.config.check_installed && !self.installed().await {
            return Err(SignError::NotInstalled);
        }

        let command = payload.command();
        let id = match payload.id().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => self.next_id(command),
        };
        if self.pending.contains_key(&id) {
            return Err(SignError::DuplicateId(id));
        }

        let mut payload = payload.with_id(id.clone());
        if payload.callback_scheme().is_none() {
            if let Some(scheme) = &self.config.callback_scheme {
                payload = payload.with_callback_scheme(scheme.clone());
            }
        }
        let url = self.codec.build_url(&payload);

        // registered before launching so a fast callback cannot miss it
        let (sender, receiver) = oneshot::channel();
        self.pending
            .insert(id.clone(), PendingRequest { command, sender });
        debug!("opening {} for request {}", url, id);

        if let Err(e) = self.opener.open_url(&url).await {
            error!("failed to launch wallet for request {}: {}", id, e);
            self.pending.remove(&id);
            return Err(e.into());
        }

        Ok(PendingSign {
            id,
            receiver: Some(receiver),
        })
    }

    pub async fn installed(&self) -> bool {
        self.opener.can_open_url(self.codec.scheme()).await
    }
}

impl<O> Correlator<O>
where
    O: UrlOpener + Send + Sync + 'static,
{
    /// Moves the correlator onto its own task, fed by `events` (inbound URL
    /// opens) and by the returned handler.
    pub fn run(mut self, mut events: UnboundedReceiver<CallbackEvent>) -> Handler {
        let (tx, mut rx) = mpsc::unbounded_channel::<Request>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = events.recv() => {
                        self.handle_callback(&event);
                    },
                    request = rx.recv() => match request {
                        Some(request) => self.handle_request(request).await,
                        None => {
                            debug!("all handlers dropped, stopping correlator");
                            break;
                        }
                    },
                }
            }
        });

        Handler::new(tx)
    }

    async fn handle_request(&mut self, request: Request) {
        // a dropped reply just means the caller stopped waiting
        match request {
            Request::Sign { payload, reply } => {
                let _ = reply.send(self.sign(payload).await);
            }
            Request::Installed { reply } => {
                let _ = reply.send(self.installed().await);
            }
            Request::Evict { id, reply } => {
                let _ = reply.send(self.evict(&id));
            }
            Request::Cleanup { reply } => {
                let _ = reply.send(self.cleanup());
            }
        }
    }
}

/// Awaitable for one outstanding request.
///
/// If the correlator drops the request without settling it (eviction,
/// abandoning cleanup, or the correlator itself going away) this future stays
/// pending forever.
#[derive(Debug)]
pub struct PendingSign {
    id: String,
    // `None` once the sender is gone; a closed receiver must not be polled again
    receiver: Option<oneshot::Receiver<Outcome>>,
}

impl PendingSign {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Future for PendingSign {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let receiver = match self.receiver.as_mut() {
            Some(receiver) => receiver,
            None => return Poll::Pending,
        };
        match receiver.poll_unpin(cx) {
            Poll::Ready(Ok(outcome)) => {
                self.receiver = None;
                Poll::Ready(outcome)
            }
            Poll::Ready(Err(_)) => {
                self.receiver = None;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[derive(Debug)]
enum Request {
    Sign {
        payload: SignPayload,
        reply: oneshot::Sender<Result<PendingSign, SignError>>,
    },
    Installed {
        reply: oneshot::Sender<bool>,
    },
    Evict {
        id: String,
        reply: oneshot::Sender<bool>,
    },
    Cleanup {
        reply: oneshot::Sender<usize>,
    },
}

/// Cloneable access to a correlator running on its own task.
#[derive(Debug, Clone)]
pub struct Handler {
    tx: UnboundedSender<Request>,
}

impl Handler {
    fn new(tx: UnboundedSender<Request>) -> Self {
        Self { tx }
    }

    pub async fn sign_message(&self, payload: MessagePayload) -> Result<PendingSign, SignError> {
        self.sign(payload.into()).await
    }

    pub async fn sign_personal_message(
        &self,
        payload: MessagePayload,
    ) -> Result<PendingSign, SignError> {
        self.sign(payload.personal().into()).await
    }

    pub async fn sign_transaction(
        &self,
        payload: TransactionPayload,
    ) -> Result<PendingSign, SignError> {
        self.sign(payload.into()).await
    }

    /// Resolves once the wallet has been launched. The request is registered
    /// by then, so callbacks forwarded afterwards always find it; the
    /// returned future carries the id to `evict` it by.
    pub async fn sign(&self, payload: SignPayload) -> Result<PendingSign, SignError> {
        self.call(|reply| Request::Sign { payload, reply }).await?
    }

    pub async fn installed(&self) -> Result<bool, SignError> {
        self.call(|reply| Request::Installed { reply }).await
    }

    pub async fn evict(&self, id: impl Into<String>) -> Result<bool, SignError> {
        let id = id.into();
        self.call(|reply| Request::Evict { id, reply }).await
    }

    pub async fn cleanup(&self) -> Result<usize, SignError> {
        self.call(|reply| Request::Cleanup { reply }).await
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, SignError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(request(reply))
            .map_err(|_| SignError::Closed)?;
        rx.await.map_err(|_| SignError::Closed)
    }
}

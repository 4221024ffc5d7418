//! Streaming subscription sessions.
//!
//! A [`SubscriptionSession`] owns one long-lived bidirectional Subscribe
//! stream. A dedicated task reads frames and dispatches parsed updates to the
//! caller's sink in arrival order; transient transport failures are retried
//! with exponential backoff, everything else terminates the session.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tonic::Request;
use tonic::transport::Channel;
use tracing::{debug, error, info, warn};

use crate::config::{Credentials, RetryConfig};
use crate::error::{GnmiError, Result};
use crate::generated::gnmi::g_nmi_client::GNmiClient;
use crate::generated::gnmi::{Poll, SubscribeRequest, SubscribeResponse, subscribe_request};
use crate::value::{UpdateEvent, events_from_notification};

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Inbound frames from one Subscribe stream.
pub(crate) type FrameStream =
    Pin<Box<dyn tokio_stream::Stream<Item = std::result::Result<SubscribeResponse, tonic::Status>> + Send>>;

/// Source of Subscribe streams. Abstracted so the session state machine can
/// be driven by scripted frames in tests.
pub(crate) trait SubscribeTransport: Send + 'static {
    /// Open a new stream, sending `initial` as the first request frame.
    /// Returns the outbound request sender (for Poll frames) and the inbound
    /// frame stream.
    fn open(
        &mut self,
        initial: SubscribeRequest,
    ) -> BoxFuture<'_, Result<(mpsc::Sender<SubscribeRequest>, FrameStream)>>;
}

/// Real transport: one gRPC Subscribe call per connection attempt.
pub(crate) struct GrpcTransport {
    client: GNmiClient<Channel>,
    credentials: Option<Credentials>,
}

impl GrpcTransport {
    pub(crate) fn new(client: GNmiClient<Channel>, credentials: Option<Credentials>) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

impl SubscribeTransport for GrpcTransport {
    fn open(
        &mut self,
        initial: SubscribeRequest,
    ) -> BoxFuture<'_, Result<(mpsc::Sender<SubscribeRequest>, FrameStream)>> {
        Box::pin(async move {
            let (tx, rx) = mpsc::channel::<SubscribeRequest>(16);
            tx.send(initial)
                .await
                .map_err(|_| GnmiError::SessionClosed)?;

            let mut request = Request::new(tokio_stream::wrappers::ReceiverStream::new(rx));
            if let Some(creds) = &self.credentials {
                let username: tonic::metadata::AsciiMetadataValue =
                    creds.username.parse().map_err(|_| {
                        GnmiError::ChannelConstruction("username is not valid metadata".to_string())
                    })?;
                let password: tonic::metadata::AsciiMetadataValue =
                    creds.password.parse().map_err(|_| {
                        GnmiError::ChannelConstruction("password is not valid metadata".to_string())
                    })?;
                request.metadata_mut().insert("username", username);
                request.metadata_mut().insert("password", password);
            }

            let mut client = self.client.clone();
            let response = client.subscribe(request).await?;
            let frames: FrameStream = Box::pin(response.into_inner());
            Ok((tx, frames))
        })
    }
}

/// Lifecycle states of a subscription session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Subscribing,
    Syncing,
    Synced,
    Reconnecting,
    Closed,
}

/// Receiver of session output. Dispatch is synchronous and ordered.
pub trait UpdateSink: Send + 'static {
    /// A parsed update, in stream arrival order.
    fn on_update(&mut self, update: UpdateEvent);

    /// The initial state snapshot is complete.
    fn on_sync(&mut self);

    /// The session terminated abnormally. At most one per session.
    fn on_error(&mut self, error: GnmiError);
}

/// Session output as plain values, for channel-based consumers.
#[derive(Debug)]
pub enum SessionEvent {
    Update(UpdateEvent),
    Sync,
    Error(GnmiError),
}

impl UpdateSink for mpsc::UnboundedSender<SessionEvent> {
    fn on_update(&mut self, update: UpdateEvent) {
        let _ = self.send(SessionEvent::Update(update));
    }

    fn on_sync(&mut self) {
        let _ = self.send(SessionEvent::Sync);
    }

    fn on_error(&mut self, error: GnmiError) {
        let _ = self.send(SessionEvent::Error(error));
    }
}

/// Handle to a running subscription session.
pub struct SubscriptionSession {
    state_rx: watch::Receiver<SessionState>,
    close_tx: watch::Sender<bool>,
    poll_tx: mpsc::UnboundedSender<()>,
    _handle: JoinHandle<()>,
}

impl SubscriptionSession {
    pub(crate) fn spawn<S: UpdateSink>(
        transport: Box<dyn SubscribeTransport>,
        request: SubscribeRequest,
        immediate_dispatch: bool,
        retry: RetryConfig,
        sink: S,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);
        let (close_tx, close_rx) = watch::channel(false);
        let (poll_tx, poll_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(drive(
            transport,
            request,
            immediate_dispatch,
            retry,
            sink,
            state_tx,
            close_rx,
            poll_rx,
        ));

        Self {
            state_rx,
            close_tx,
            poll_tx,
            _handle: handle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Request session shutdown. Safe to call from any context; a second
    /// call is a no-op. In-flight dispatch completes, nothing follows it.
    pub fn close(&self) {
        let _ = self.close_tx.send(true);
    }

    /// Trigger a polled update on a POLL-mode subscription.
    pub fn poll(&self) -> Result<()> {
        if *self.close_tx.borrow() || self.state() == SessionState::Closed {
            return Err(GnmiError::SessionClosed);
        }
        self.poll_tx.send(()).map_err(|_| GnmiError::SessionClosed)
    }

    /// Wait until the session reaches [`SessionState::Closed`].
    pub async fn closed(&mut self) {
        let _ = self
            .state_rx
            .wait_for(|state| *state == SessionState::Closed)
            .await;
    }
}

enum StreamEnd {
    /// The inbound stream or the connection attempt failed.
    Failure(GnmiError),
    /// The target completed the stream (e.g. a ONCE subscription).
    Clean,
    /// `close()` was requested.
    CloseRequested,
}

#[allow(clippy::too_many_arguments)]
async fn drive<S: UpdateSink>(
    mut transport: Box<dyn SubscribeTransport>,
    request: SubscribeRequest,
    immediate_dispatch: bool,
    retry: RetryConfig,
    mut sink: S,
    state_tx: watch::Sender<SessionState>,
    mut close_rx: watch::Receiver<bool>,
    mut poll_rx: mpsc::UnboundedReceiver<()>,
) {
    let mut pending: Vec<UpdateEvent> = Vec::new();
    let mut attempt: u32 = 0;
    let mut delay = retry.initial_delay_ms;

    loop {
        set_state(&state_tx, SessionState::Subscribing);

        let opened = tokio::select! {
            biased;
            _ = wait_close(&mut close_rx) => {
                set_state(&state_tx, SessionState::Closed);
                return;
            }
            opened = transport.open(request.clone()) => opened,
        };

        let failure = match opened {
            Ok((outbound, frames)) => {
                set_state(&state_tx, SessionState::Syncing);
                // A fresh stream re-sends the initial snapshot; drop any
                // partial snapshot from the previous connection.
                pending.clear();
                let mut synced = false;
                let end = run_stream(
                    outbound,
                    frames,
                    immediate_dispatch,
                    &mut sink,
                    &mut pending,
                    &mut synced,
                    &state_tx,
                    &mut close_rx,
                    &mut poll_rx,
                    &mut attempt,
                    &mut delay,
                    &retry,
                )
                .await;
                match end {
                    StreamEnd::CloseRequested => {
                        set_state(&state_tx, SessionState::Closed);
                        return;
                    }
                    StreamEnd::Clean => {
                        info!("subscription stream completed");
                        set_state(&state_tx, SessionState::Closed);
                        return;
                    }
                    StreamEnd::Failure(e) => e,
                }
            }
            Err(e) => e,
        };

        if !failure.is_transient() {
            error!(error = %failure, "subscription failed");
            sink.on_error(GnmiError::SessionTerminated(failure.to_string()));
            set_state(&state_tx, SessionState::Closed);
            return;
        }

        attempt += 1;
        if attempt > retry.max_retries {
            warn!(
                retries = retry.max_retries,
                error = %failure,
                "exhausted reconnect attempts"
            );
            sink.on_error(GnmiError::SessionTerminated(format!(
                "giving up after {} reconnect attempts: {}",
                retry.max_retries, failure
            )));
            set_state(&state_tx, SessionState::Closed);
            return;
        }

        set_state(&state_tx, SessionState::Reconnecting);
        let sleep_ms = if retry.use_jitter {
            apply_jitter(delay)
        } else {
            delay
        };
        debug!(
            attempt,
            max = retry.max_retries,
            delay_ms = sleep_ms,
            error = %failure,
            "stream error, reconnecting"
        );
        tokio::select! {
            biased;
            _ = wait_close(&mut close_rx) => {
                set_state(&state_tx, SessionState::Closed);
                return;
            }
            _ = tokio::time::sleep(std::time::Duration::from_millis(sleep_ms)) => {}
        }
        delay = next_delay(delay, &retry);
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_stream<S: UpdateSink>(
    outbound: mpsc::Sender<SubscribeRequest>,
    mut frames: FrameStream,
    immediate_dispatch: bool,
    sink: &mut S,
    pending: &mut Vec<UpdateEvent>,
    synced: &mut bool,
    state_tx: &watch::Sender<SessionState>,
    close_rx: &mut watch::Receiver<bool>,
    poll_rx: &mut mpsc::UnboundedReceiver<()>,
    attempt: &mut u32,
    delay: &mut u64,
    retry: &RetryConfig,
) -> StreamEnd {
    let mut poll_open = true;
    loop {
        tokio::select! {
            biased;
            _ = wait_close(close_rx) => return StreamEnd::CloseRequested,
            requested = poll_rx.recv(), if poll_open => {
                match requested {
                    Some(()) => {
                        let poll = SubscribeRequest {
                            request: Some(subscribe_request::Request::Poll(Poll {})),
                            extension: vec![],
                        };
                        if outbound.send(poll).await.is_err() {
                            debug!("outbound request stream closed, dropping poll");
                        }
                    }
                    None => poll_open = false,
                }
            }
            frame = frames.next() => match frame {
                Some(Ok(response)) => {
                    // Receiving anything proves the connection works again.
                    *attempt = 0;
                    *delay = retry.initial_delay_ms;
                    handle_response(response, immediate_dispatch, sink, pending, synced, state_tx);
                }
                Some(Err(status)) => return StreamEnd::Failure(GnmiError::Rpc(status)),
                None => return StreamEnd::Clean,
            },
        }
    }
}

#[allow(deprecated)]
fn handle_response<S: UpdateSink>(
    response: SubscribeResponse,
    immediate_dispatch: bool,
    sink: &mut S,
    pending: &mut Vec<UpdateEvent>,
    synced: &mut bool,
    state_tx: &watch::Sender<SessionState>,
) {
    use crate::generated::gnmi::subscribe_response::Response;

    match response.response {
        Some(Response::Update(notification)) => {
            let events = events_from_notification(&notification);
            if *synced || immediate_dispatch {
                for event in events {
                    sink.on_update(event);
                }
            } else {
                pending.extend(events);
            }
        }
        Some(Response::SyncResponse(marker)) => {
            debug!(marker, "received sync response");
            for event in pending.drain(..) {
                sink.on_update(event);
            }
            sink.on_sync();
            *synced = true;
            set_state(state_tx, SessionState::Synced);
        }
        Some(Response::Error(err)) => {
            // Deprecated in-band error; targets still emitting it do not
            // consider it fatal to the stream.
            error!(code = err.code, message = %err.message, "received gNMI error frame");
        }
        None => {}
    }
}

fn set_state(state_tx: &watch::Sender<SessionState>, state: SessionState) {
    if *state_tx.borrow() != state {
        debug!(state = ?state, "session state change");
        let _ = state_tx.send(state);
    }
}

async fn wait_close(close_rx: &mut watch::Receiver<bool>) {
    if close_rx.wait_for(|closed| *closed).await.is_err() {
        // Handle dropped without close(): the session runs on.
        std::future::pending::<()>().await;
    }
}

/// Grow the backoff delay by the configured multiplier, clamped to the cap.
fn next_delay(delay: u64, retry: &RetryConfig) -> u64 {
    ((delay as f64 * retry.multiplier) as u64).min(retry.max_delay_ms)
}

/// Randomize a delay to between 50% and 100% of its value.
fn apply_jitter(delay: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let random_factor =
        (RandomState::new().hash_one(std::time::SystemTime::now()) % 50) as f64 / 100.0 + 0.5;

    (delay as f64 * random_factor) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::generated::gnmi::subscribe_response::Response;
    use crate::generated::gnmi::{Notification, TypedValue, Update, typed_value};
    use crate::request::RequestBuilder;

    fn update_frame(path: &str, value: i64) -> std::result::Result<SubscribeResponse, tonic::Status> {
        Ok(SubscribeResponse {
            response: Some(Response::Update(Notification {
                timestamp: value,
                update: vec![Update {
                    path: Some(RequestBuilder::parse_path(path)),
                    val: Some(TypedValue {
                        value: Some(typed_value::Value::IntVal(value)),
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            })),
            extension: vec![],
        })
    }

    fn sync_frame() -> std::result::Result<SubscribeResponse, tonic::Status> {
        Ok(SubscribeResponse {
            response: Some(Response::SyncResponse(true)),
            extension: vec![],
        })
    }

    enum Script {
        Fail(tonic::Code),
        Frames {
            frames: Vec<std::result::Result<SubscribeResponse, tonic::Status>>,
            then_hang: bool,
        },
    }

    struct ScriptedTransport {
        connections: VecDeque<Script>,
        outbound: Arc<Mutex<Option<mpsc::Receiver<SubscribeRequest>>>>,
    }

    impl ScriptedTransport {
        fn new(connections: Vec<Script>) -> Self {
            Self {
                connections: connections.into(),
                outbound: Arc::new(Mutex::new(None)),
            }
        }
    }

    impl SubscribeTransport for ScriptedTransport {
        fn open(
            &mut self,
            _initial: SubscribeRequest,
        ) -> BoxFuture<'_, Result<(mpsc::Sender<SubscribeRequest>, FrameStream)>> {
            let script = self.connections.pop_front();
            let slot = self.outbound.clone();
            Box::pin(async move {
                match script {
                    None => Err(GnmiError::SessionTerminated(
                        "scripted transport exhausted".to_string(),
                    )),
                    Some(Script::Fail(code)) => {
                        Err(GnmiError::Rpc(tonic::Status::new(code, "scripted failure")))
                    }
                    Some(Script::Frames { frames, then_hang }) => {
                        let (tx, rx) = mpsc::channel(16);
                        *slot.lock().unwrap() = Some(rx);
                        let base = tokio_stream::iter(frames);
                        let stream: FrameStream = if then_hang {
                            Box::pin(base.chain(tokio_stream::pending()))
                        } else {
                            Box::pin(base)
                        };
                        Ok((tx, stream))
                    }
                }
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<SessionEvent>>>);

    impl RecordingSink {
        fn events(&self) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .map(|e| match e {
                    SessionEvent::Update(u) => format!("update:{}", u.timestamp),
                    SessionEvent::Sync => "sync".to_string(),
                    SessionEvent::Error(_) => "error".to_string(),
                })
                .collect()
        }

        fn error_count(&self) -> usize {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|e| matches!(e, SessionEvent::Error(_)))
                .count()
        }
    }

    impl UpdateSink for RecordingSink {
        fn on_update(&mut self, update: UpdateEvent) {
            self.0.lock().unwrap().push(SessionEvent::Update(update));
        }

        fn on_sync(&mut self) {
            self.0.lock().unwrap().push(SessionEvent::Sync);
        }

        fn on_error(&mut self, error: GnmiError) {
            self.0.lock().unwrap().push(SessionEvent::Error(error));
        }
    }

    /// Honors RUST_LOG so session state transitions can be traced while
    /// debugging a failing test.
    fn init_tracing() {
        use tracing_subscriber::EnvFilter;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn test_retry() -> RetryConfig {
        RetryConfig::default()
            .with_initial_delay(5)
            .with_max_delay(20)
            .without_jitter()
    }

    fn dummy_request() -> SubscribeRequest {
        SubscribeRequest::default()
    }

    #[tokio::test]
    async fn test_once_buffers_until_sync_in_order() {
        let transport = ScriptedTransport::new(vec![Script::Frames {
            frames: vec![
                update_frame("/a", 1),
                update_frame("/b", 2),
                update_frame("/c", 3),
                sync_frame(),
            ],
            then_hang: false,
        }]);
        let sink = RecordingSink::default();

        let mut session = SubscriptionSession::spawn(
            Box::new(transport),
            dummy_request(),
            false,
            test_retry(),
            sink.clone(),
        );
        session.closed().await;

        assert_eq!(
            sink.events(),
            vec!["update:1", "update:2", "update:3", "sync"]
        );
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_updates_not_dispatched_before_sync() {
        let transport = ScriptedTransport::new(vec![Script::Frames {
            frames: vec![update_frame("/a", 1), update_frame("/b", 2)],
            then_hang: true,
        }]);
        let sink = RecordingSink::default();

        let mut session = SubscriptionSession::spawn(
            Box::new(transport),
            dummy_request(),
            false,
            test_retry(),
            sink.clone(),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sink.events().is_empty());

        session.close();
        session.closed().await;
        // Buffered updates from an incomplete snapshot are never delivered.
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_immediate_dispatch_before_sync() {
        let transport = ScriptedTransport::new(vec![Script::Frames {
            frames: vec![update_frame("/a", 1), update_frame("/b", 2)],
            then_hang: true,
        }]);
        let sink = RecordingSink::default();

        let session = SubscriptionSession::spawn(
            Box::new(transport),
            dummy_request(),
            true,
            test_retry(),
            sink.clone(),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.events(), vec!["update:1", "update:2"]);
        session.close();
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let transport = ScriptedTransport::new(vec![Script::Frames {
            frames: vec![sync_frame()],
            then_hang: true,
        }]);
        let sink = RecordingSink::default();

        let mut session = SubscriptionSession::spawn(
            Box::new(transport),
            dummy_request(),
            false,
            test_retry(),
            sink.clone(),
        );

        session.close();
        session.close();
        session.closed().await;

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(sink.error_count(), 0);
        assert!(matches!(session.poll(), Err(GnmiError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_transient_disconnect_reconnects_silently() {
        init_tracing();
        let transport = ScriptedTransport::new(vec![
            Script::Frames {
                frames: vec![
                    sync_frame(),
                    update_frame("/a", 1),
                    Err(tonic::Status::unavailable("connection reset")),
                ],
                then_hang: false,
            },
            Script::Frames {
                frames: vec![sync_frame(), update_frame("/a", 2)],
                then_hang: true,
            },
        ]);
        let sink = RecordingSink::default();

        let mut session = SubscriptionSession::spawn(
            Box::new(transport),
            dummy_request(),
            false,
            test_retry(),
            sink.clone(),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(session.state(), SessionState::Synced);
        assert_eq!(
            sink.events(),
            vec!["update:1", "sync", "update:2", "sync"]
        );
        assert_eq!(sink.error_count(), 0);

        session.close();
        session.closed().await;
    }

    #[tokio::test]
    async fn test_retry_exhaustion_surfaces_one_error() {
        init_tracing();
        let transport = ScriptedTransport::new(vec![
            Script::Fail(tonic::Code::Unavailable),
            Script::Fail(tonic::Code::Unavailable),
            Script::Fail(tonic::Code::Unavailable),
        ]);
        let sink = RecordingSink::default();

        let mut session = SubscriptionSession::spawn(
            Box::new(transport),
            dummy_request(),
            false,
            test_retry().with_max_retries(2),
            sink.clone(),
        );
        session.closed().await;

        assert_eq!(sink.error_count(), 1);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_non_transient_error_terminates_without_retry() {
        let transport = ScriptedTransport::new(vec![
            Script::Fail(tonic::Code::InvalidArgument),
            // Would succeed, but must never be reached.
            Script::Frames {
                frames: vec![sync_frame()],
                then_hang: true,
            },
        ]);
        let sink = RecordingSink::default();

        let mut session = SubscriptionSession::spawn(
            Box::new(transport),
            dummy_request(),
            false,
            test_retry(),
            sink.clone(),
        );
        session.closed().await;

        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.events(), vec!["error"]);
    }

    #[tokio::test]
    async fn test_poll_forwards_a_poll_frame() {
        let transport = ScriptedTransport::new(vec![Script::Frames {
            frames: vec![sync_frame()],
            then_hang: true,
        }]);
        let outbound = transport.outbound.clone();
        let sink = RecordingSink::default();

        let session = SubscriptionSession::spawn(
            Box::new(transport),
            dummy_request(),
            false,
            test_retry(),
            sink.clone(),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        session.poll().unwrap();

        let mut rx = outbound.lock().unwrap().take().unwrap();
        let frame = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("poll frame not forwarded")
            .expect("outbound closed");
        assert!(matches!(
            frame.request,
            Some(subscribe_request::Request::Poll(_))
        ));

        session.close();
    }

    #[test]
    fn test_next_delay_doubles_then_clamps() {
        let retry = RetryConfig::default()
            .with_initial_delay(500)
            .with_max_delay(2000);
        let mut delay = retry.initial_delay_ms;
        let mut observed = Vec::new();
        for _ in 0..4 {
            delay = next_delay(delay, &retry);
            observed.push(delay);
        }
        assert_eq!(observed, vec![1000, 2000, 2000, 2000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_schedule_grows_and_clamps() {
        let transport = ScriptedTransport::new(
            (0..4).map(|_| Script::Fail(tonic::Code::Unavailable)).collect(),
        );
        let sink = RecordingSink::default();
        let retry = RetryConfig::default()
            .with_max_retries(3)
            .with_initial_delay(100)
            .with_max_delay(250)
            .without_jitter();

        let started = tokio::time::Instant::now();
        let mut session = SubscriptionSession::spawn(
            Box::new(transport),
            dummy_request(),
            false,
            retry,
            sink.clone(),
        );
        session.closed().await;

        // Sleeps of 100ms, 200ms, then clamped to 250ms before giving up.
        assert_eq!(started.elapsed(), Duration::from_millis(550));
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_apply_jitter_bounds() {
        for _ in 0..10 {
            let jittered = apply_jitter(1000);
            assert!(jittered >= 500);
            assert!(jittered <= 1000);
        }
    }
}

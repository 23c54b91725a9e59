//! UseCase: real-time connection of one direct-message thread.
//!
//! A `ConnectionManager` is a handle to a single connection task. The task
//! exclusively owns the transport, the heartbeat interval, the reconnect
//! timer and the conversation state; transport events, timer expiries and UI
//! commands are multiplexed through one `tokio::select!` loop, so they never
//! overlap. Timers are owned values: leaving a phase drops them, which is
//! what cancels them.
//!
//! Phases of the task:
//!
//! ```text
//! Connecting --open--> Open --close(!=1000)--> Backoff --timer--> Connecting
//!     |                  |                        |
//!     +--failure---------+--> Backoff / Idle       +--Retry--> Connecting
//!                        +--close(1000)--> Idle --Retry--> Connecting
//! ```
//!
//! Any phase moves to `Stopped` on `disconnect`, which closes the transport
//! with code 1000 and resets the stores.

use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    config::ConnectionConfig,
    domain::{
        CLOSE_ABNORMAL, CLOSE_NORMAL, ChatSnapshot, ConnectionState, ConnectionTokenProvider,
        ConversationState, GatewayError, ReconnectDecision, ReconnectPolicy, RetrySchedule,
        SendError, ThreadId, Transport, TransportConnector, TransportError, TransportEvent,
    },
    infrastructure::{dto::websocket::OutboundFrame, transport::build_transport_url},
};

use super::dispatch_event::EventDispatcher;

/// Collaborators shared by every connection
#[derive(Clone)]
pub struct ConnectionDeps {
    pub config: ConnectionConfig,
    pub tokens: Arc<dyn ConnectionTokenProvider>,
    pub connector: Arc<dyn TransportConnector>,
}

impl ConnectionDeps {
    pub fn new(
        config: ConnectionConfig,
        tokens: Arc<dyn ConnectionTokenProvider>,
        connector: Arc<dyn TransportConnector>,
    ) -> Self {
        Self {
            config,
            tokens,
            connector,
        }
    }
}

#[derive(Debug)]
enum Command {
    Send {
        content: String,
        reply: oneshot::Sender<Result<(), SendError>>,
    },
    Typing(bool),
    Retry,
    Disconnect,
}

struct Session {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

/// Handle to the connection of one thread
pub struct ConnectionManager {
    thread_id: ThreadId,
    deps: ConnectionDeps,
    snapshot_tx: Arc<watch::Sender<ChatSnapshot>>,
    session: Option<Session>,
}

impl ConnectionManager {
    pub fn new(thread_id: ThreadId, deps: ConnectionDeps) -> Self {
        let (snapshot_tx, _) = watch::channel(ChatSnapshot::default());
        Self::with_snapshot_sender(thread_id, deps, Arc::new(snapshot_tx))
    }

    /// Create a manager publishing into an existing snapshot channel.
    ///
    /// The channel is reset to an empty, disconnected view of `thread_id`.
    pub fn with_snapshot_sender(
        thread_id: ThreadId,
        deps: ConnectionDeps,
        snapshot_tx: Arc<watch::Sender<ChatSnapshot>>,
    ) -> Self {
        snapshot_tx.send_replace(ChatSnapshot {
            thread_id: Some(thread_id.clone()),
            ..ChatSnapshot::default()
        });
        Self {
            thread_id,
            deps,
            snapshot_tx,
            session: None,
        }
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Start the connection, or re-initiate it after a terminal failure or a
    /// deliberate server close.
    ///
    /// No-op while an attempt is in flight or the session is live, and when
    /// no credentials are configured.
    pub fn connect(&mut self) {
        if !self.deps.tokens.is_authenticated() {
            tracing::debug!(
                "Not authenticated; skipping connect for thread '{}'",
                self.thread_id
            );
            return;
        }

        if let Some(session) = &self.session
            && !session.task.is_finished()
        {
            let status = self.snapshot_tx.borrow().status;
            match status {
                ConnectionState::Connecting | ConnectionState::Connected => {
                    tracing::debug!(
                        "Connection to thread '{}' already {}; ignoring connect",
                        self.thread_id,
                        status
                    );
                }
                ConnectionState::Disconnected | ConnectionState::Error => {
                    let _ = session.commands.send(Command::Retry);
                }
            }
            return;
        }

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let task = ConnectionTask::new(
            self.thread_id.clone(),
            &self.deps,
            self.snapshot_tx.clone(),
            commands_rx,
        );
        self.session = Some(Session {
            commands: commands_tx,
            task: tokio::spawn(task.run()),
        });
    }

    /// Tear the connection down. Returns once the connection task has
    /// exited, so no frame of this connection can be observed afterwards.
    pub async fn disconnect(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let _ = session.commands.send(Command::Disconnect);
        if let Err(e) = session.task.await {
            tracing::warn!(
                "Connection task of thread '{}' ended abnormally: {}",
                self.thread_id,
                e
            );
        }
    }

    /// Send a message. Fails fast with `NotConnected` unless connected;
    /// nothing is queued. The connection is checked before the content, so
    /// a blank message while offline is also `NotConnected`.
    pub async fn send_message(&self, content: &str) -> Result<(), SendError> {
        let Some(session) = &self.session else {
            return Err(SendError::NotConnected);
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        session
            .commands
            .send(Command::Send {
                content: content.to_string(),
                reply: reply_tx,
            })
            .map_err(|_| SendError::NotConnected)?;
        reply_rx.await.unwrap_or(Err(SendError::NotConnected))
    }

    /// Fire-and-forget typing indicator; ignored unless connected.
    pub fn set_typing(&self, is_typing: bool) {
        if let Some(session) = &self.session {
            let _ = session.commands.send(Command::Typing(is_typing));
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        // The task finishes its teardown on its own
        if let Some(session) = self.session.take() {
            let _ = session.commands.send(Command::Disconnect);
        }
    }
}

#[derive(Debug, Error)]
enum AttemptError {
    #[error("token issuance failed: {0}")]
    Token(#[from] GatewayError),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
}

/// One handshake: fresh token, URL, open.
async fn open_transport(
    tokens: Arc<dyn ConnectionTokenProvider>,
    connector: Arc<dyn TransportConnector>,
    ws_base_url: String,
    thread_id: ThreadId,
) -> Result<Transport, AttemptError> {
    let token = tokens.issue_token(&thread_id).await?;
    let url = build_transport_url(&ws_base_url, &thread_id, token)?;
    Ok(connector.open(&url).await?)
}

enum Phase {
    Connecting,
    Open(Transport),
    Backoff(RetrySchedule),
    Idle,
    Stopped,
}

/// Commands that interrupt an offline phase
enum Interrupt {
    Retry,
    Stop,
}

struct ConnectionTask {
    thread_id: ThreadId,
    config: ConnectionConfig,
    tokens: Arc<dyn ConnectionTokenProvider>,
    connector: Arc<dyn TransportConnector>,
    dispatcher: EventDispatcher,
    policy: ReconnectPolicy,
    state: ConversationState,
    status: ConnectionState,
    retry: Option<RetrySchedule>,
    snapshot_tx: Arc<watch::Sender<ChatSnapshot>>,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl ConnectionTask {
    fn new(
        thread_id: ThreadId,
        deps: &ConnectionDeps,
        snapshot_tx: Arc<watch::Sender<ChatSnapshot>>,
        commands: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            dispatcher: EventDispatcher::new(thread_id.clone()),
            thread_id,
            config: deps.config.clone(),
            tokens: deps.tokens.clone(),
            connector: deps.connector.clone(),
            policy: ReconnectPolicy::new(deps.config.reconnect),
            state: ConversationState::default(),
            status: ConnectionState::Disconnected,
            retry: None,
            snapshot_tx,
            commands,
        }
    }

    async fn run(mut self) {
        let mut phase = Phase::Connecting;
        loop {
            phase = match phase {
                Phase::Connecting => self.connecting().await,
                Phase::Open(transport) => self.connected(transport).await,
                Phase::Backoff(schedule) => self.backing_off(schedule).await,
                Phase::Idle => self.idle().await,
                Phase::Stopped => break,
            };
        }

        self.state.reset();
        self.status = ConnectionState::Disconnected;
        self.retry = None;
        self.publish();
        tracing::info!("Disconnected from thread '{}'", self.thread_id);
    }

    async fn connecting(&mut self) -> Phase {
        self.status = ConnectionState::Connecting;
        self.retry = None;
        self.publish();
        tracing::info!(
            "Connecting to thread '{}' (reconnect attempt {}/{})",
            self.thread_id,
            self.policy.attempts(),
            self.policy.max_attempts()
        );

        let attempt = open_transport(
            self.tokens.clone(),
            self.connector.clone(),
            self.config.ws_base_url.clone(),
            self.thread_id.clone(),
        );
        tokio::pin!(attempt);

        loop {
            tokio::select! {
                result = &mut attempt => {
                    return match result {
                        Ok(transport) => {
                            self.on_open();
                            Phase::Open(transport)
                        }
                        Err(e) => {
                            tracing::warn!(
                                "Connect attempt for thread '{}' failed: {}",
                                self.thread_id,
                                e
                            );
                            self.on_close(CLOSE_ABNORMAL)
                        }
                    };
                }
                command = self.commands.recv() => match self.offline_command(command) {
                    Some(Interrupt::Stop) => return Phase::Stopped,
                    Some(Interrupt::Retry) => {
                        tracing::debug!("Connect already in flight for thread '{}'", self.thread_id);
                    }
                    None => {}
                },
            }
        }
    }

    async fn connected(&mut self, mut transport: Transport) -> Phase {
        let period = self.config.heartbeat_period();
        let mut heartbeat = time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                event = transport.next_event() => match event {
                    Some(TransportEvent::Frame(text)) => self.on_frame(&text),
                    Some(TransportEvent::Error(e)) => {
                        tracing::warn!("Transport error on thread '{}': {}", self.thread_id, e);
                    }
                    Some(TransportEvent::Closed(code)) => {
                        drop(heartbeat);
                        return self.on_close(code);
                    }
                    None => {
                        drop(heartbeat);
                        return self.on_close(CLOSE_ABNORMAL);
                    }
                },
                _ = heartbeat.tick() => {
                    if let Err(e) = send_frame(&transport, &OutboundFrame::Ping) {
                        tracing::debug!("Failed to send heartbeat: {}", e);
                    }
                }
                command = self.commands.recv() => match command {
                    Some(Command::Send { content, reply }) => {
                        let result = if content.trim().is_empty() {
                            Err(SendError::EmptyMessage)
                        } else {
                            send_frame(&transport, &OutboundFrame::SendMessage { content })
                                .map_err(SendError::from)
                        };
                        let _ = reply.send(result);
                    }
                    Some(Command::Typing(is_typing)) => {
                        if let Err(e) = send_frame(&transport, &OutboundFrame::Typing { is_typing }) {
                            tracing::debug!("Failed to send typing indicator: {}", e);
                        }
                    }
                    Some(Command::Retry) => {}
                    Some(Command::Disconnect) | None => {
                        drop(heartbeat);
                        transport.close(CLOSE_NORMAL);
                        return Phase::Stopped;
                    }
                },
            }
        }
    }

    async fn backing_off(&mut self, schedule: RetrySchedule) -> Phase {
        let timer = time::sleep(schedule.delay);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = &mut timer => return Phase::Connecting,
                command = self.commands.recv() => match self.offline_command(command) {
                    Some(Interrupt::Stop) => return Phase::Stopped,
                    Some(Interrupt::Retry) => {
                        tracing::info!(
                            "Manual reconnect to thread '{}'; cancelling pending timer",
                            self.thread_id
                        );
                        self.policy.reset();
                        return Phase::Connecting;
                    }
                    None => {}
                },
            }
        }
    }

    async fn idle(&mut self) -> Phase {
        loop {
            let command = self.commands.recv().await;
            match self.offline_command(command) {
                Some(Interrupt::Stop) => return Phase::Stopped,
                Some(Interrupt::Retry) => {
                    self.policy.reset();
                    self.state.error = None;
                    return Phase::Connecting;
                }
                None => {}
            }
        }
    }

    /// Handle a command while no transport is open
    fn offline_command(&self, command: Option<Command>) -> Option<Interrupt> {
        match command {
            Some(Command::Send { reply, .. }) => {
                let _ = reply.send(Err(SendError::NotConnected));
                None
            }
            Some(Command::Typing(_)) => None,
            Some(Command::Retry) => Some(Interrupt::Retry),
            Some(Command::Disconnect) | None => Some(Interrupt::Stop),
        }
    }

    fn on_open(&mut self) {
        self.policy.reset();
        self.status = ConnectionState::Connected;
        self.retry = None;
        self.state.error = None;
        self.publish();
        tracing::info!("Connected to thread '{}'", self.thread_id);
    }

    /// Apply the close policy and pick the next phase
    fn on_close(&mut self, code: u16) -> Phase {
        // Stop events cannot arrive while the transport is down
        self.state.typing.reset();
        self.status = ConnectionState::Disconnected;

        if code == CLOSE_NORMAL {
            tracing::info!("Thread '{}' closed deliberately by the server", self.thread_id);
            self.retry = None;
            self.publish();
            return Phase::Idle;
        }

        match self.policy.on_abnormal_close() {
            ReconnectDecision::Retry(schedule) => {
                tracing::info!(
                    "Connection to thread '{}' lost (code {}); reconnecting in {:?} (attempt {}/{})",
                    self.thread_id,
                    code,
                    schedule.delay,
                    schedule.attempt,
                    self.policy.max_attempts()
                );
                self.retry = Some(schedule);
                self.publish();
                Phase::Backoff(schedule)
            }
            ReconnectDecision::Exhausted => {
                tracing::error!(
                    "Failed to reconnect to thread '{}' after {} attempts",
                    self.thread_id,
                    self.policy.max_attempts()
                );
                self.status = ConnectionState::Error;
                self.retry = None;
                self.state.error = Some(format!(
                    "Connection lost. Gave up after {} reconnect attempts.",
                    self.policy.max_attempts()
                ));
                self.publish();
                Phase::Idle
            }
        }
    }

    fn on_frame(&mut self, text: &str) {
        match self.dispatcher.dispatch(text, &mut self.state) {
            Ok(outcome) => {
                if outcome.changes_state() {
                    self.publish();
                }
            }
            Err(e) => {
                tracing::warn!("Skipping inbound frame on thread '{}': {}", self.thread_id, e);
            }
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(ChatSnapshot {
            thread_id: Some(self.thread_id.clone()),
            messages: self.state.messages.to_vec(),
            typing_users: self.state.typing.usernames(),
            status: self.status,
            error: self.state.error.clone(),
            retry: self.retry,
        });
    }
}

fn send_frame(transport: &Transport, frame: &OutboundFrame) -> Result<(), TransportError> {
    let json = serde_json::to_string(frame).map_err(|e| TransportError::Encode(e.to_string()))?;
    transport.send_text(json)
}

//! UseCase: the direct-message facade used by the UI.
//!
//! Holds at most one live `ConnectionManager`. Switching threads awaits the
//! teardown of the previous connection before the next one is created, so
//! frames of the old thread never reach the new thread's stores.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{
    ChatSnapshot, GatewayError, SendError, Thread, ThreadId, ThreadInfoLoader,
};

use super::connection_manager::{ConnectionDeps, ConnectionManager};

pub struct DirectMessageClient {
    deps: ConnectionDeps,
    threads: Arc<dyn ThreadInfoLoader>,
    snapshot_tx: Arc<watch::Sender<ChatSnapshot>>,
    active: Option<ConnectionManager>,
}

impl DirectMessageClient {
    pub fn new(deps: ConnectionDeps, threads: Arc<dyn ThreadInfoLoader>) -> Self {
        let (snapshot_tx, _) = watch::channel(ChatSnapshot::default());
        Self {
            deps,
            threads,
            snapshot_tx: Arc::new(snapshot_tx),
            active: None,
        }
    }

    /// Connect to `thread_id`.
    ///
    /// An absent or invalid thread ID, or missing credentials, is a no-op.
    /// The same thread is handed to the current manager; a different one
    /// tears the current connection down first.
    pub async fn connect(&mut self, thread_id: Option<&str>) {
        let Some(raw) = thread_id else {
            tracing::debug!("No thread selected; nothing to connect");
            return;
        };
        if !self.deps.tokens.is_authenticated() {
            tracing::debug!("Not authenticated; skipping connect");
            return;
        }
        let thread_id = match ThreadId::new(raw.to_string()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Ignoring connect request: {}", e);
                return;
            }
        };

        if let Some(active) = self.active.as_mut()
            && *active.thread_id() == thread_id
        {
            active.connect();
            return;
        }

        self.disconnect().await;
        tracing::info!("Switching to thread '{}'", thread_id);
        let mut manager = ConnectionManager::with_snapshot_sender(
            thread_id,
            self.deps.clone(),
            self.snapshot_tx.clone(),
        );
        manager.connect();
        self.active = Some(manager);
    }

    /// Close the active connection, if any, and reset the view.
    pub async fn disconnect(&mut self) {
        if let Some(mut manager) = self.active.take() {
            manager.disconnect().await;
        }
        self.snapshot_tx.send_replace(ChatSnapshot::default());
    }

    pub async fn send_message(&self, content: &str) -> Result<(), SendError> {
        match &self.active {
            Some(manager) => manager.send_message(content).await,
            None => Err(SendError::NotConnected),
        }
    }

    pub fn set_typing(&self, is_typing: bool) {
        if let Some(manager) = &self.active {
            manager.set_typing(is_typing);
        }
    }

    /// Thread metadata (participants) for the header.
    pub async fn load_thread(&self, thread_id: &ThreadId) -> Result<Thread, GatewayError> {
        self.threads.load_thread(thread_id).await
    }

    pub fn active_thread(&self) -> Option<&ThreadId> {
        self.active.as_ref().map(ConnectionManager::thread_id)
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribe to snapshot updates; survives thread switches.
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.snapshot_tx.subscribe()
    }
}

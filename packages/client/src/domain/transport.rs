//! Transport abstraction between the connection task and the socket.
//!
//! A `Transport` is a pair of channels: commands flow out to the socket and
//! events flow back in. The WebSocket implementation pumps these channels
//! from background tasks; tests drive them directly.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::TransportError;

/// Close code of a deliberate shutdown; suppresses reconnection
pub const CLOSE_NORMAL: u16 = 1000;
/// Close frame carried no status code
pub const CLOSE_NO_STATUS: u16 = 1005;
/// Connection dropped without a close frame
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Events delivered by the transport, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Inbound text frame
    Frame(String),
    /// Diagnostic only; a `Closed` event always follows
    Error(String),
    /// The connection is gone
    Closed(u16),
}

/// Commands accepted by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    Text(String),
    Close(u16),
}

/// Channel type for outbound commands
pub type TransportSender = mpsc::UnboundedSender<TransportCommand>;
/// Channel type for inbound events
pub type TransportReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// An open bidirectional connection, exclusively owned by one connection task
#[derive(Debug)]
pub struct Transport {
    outbound: TransportSender,
    inbound: TransportReceiver,
    reader: Option<JoinHandle<()>>,
}

impl Transport {
    pub fn new(outbound: TransportSender, inbound: TransportReceiver) -> Self {
        Self {
            outbound,
            inbound,
            reader: None,
        }
    }

    /// Attach the background task feeding `inbound`; it is aborted on drop.
    pub fn with_reader(mut self, reader: JoinHandle<()>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn send_text(&self, text: String) -> Result<(), TransportError> {
        self.outbound
            .send(TransportCommand::Text(text))
            .map_err(|_| TransportError::Closed)
    }

    /// Request a close with the given code. Best effort.
    pub fn close(&self, code: u16) {
        if self.outbound.send(TransportCommand::Close(code)).is_err() {
            tracing::debug!("Transport already closed before close({})", code);
        }
    }

    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.inbound.recv().await
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Opens transports
#[async_trait]
pub trait TransportConnector: Send + Sync {
    async fn open(&self, url: &str) -> Result<Transport, TransportError>;
}

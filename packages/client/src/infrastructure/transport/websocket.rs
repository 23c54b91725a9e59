//! WebSocket を使った TransportConnector 実装
//!
//! ## 責務
//!
//! - tokio-tungstenite でハンドシェイクを行う
//! - ソケットを writer タスクと reader タスクに分割し、`Transport` のチャネルと接続する
//!
//! reader タスクは必ず最後に `TransportEvent::Closed` を 1 回だけ送ります。

use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        self,
        protocol::{CloseFrame, Message, frame::coding::CloseCode},
    },
};

use crate::domain::{
    CLOSE_ABNORMAL, CLOSE_NO_STATUS, Transport, TransportCommand, TransportConnector,
    TransportError, TransportEvent,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// tokio-tungstenite based connector
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportConnector for WebSocketConnector {
    async fn open(&self, url: &str) -> Result<Transport, TransportError> {
        let (ws_stream, _response) = connect_async(url).await.map_err(|e| match e {
            tungstenite::Error::Http(response) => {
                TransportError::Rejected(response.status().as_u16())
            }
            other => TransportError::Connect(other.to_string()),
        })?;

        let (write, read) = ws_stream.split();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        tokio::spawn(writer_loop(out_rx, write));
        let reader = tokio::spawn(reader_loop(read, in_tx));

        Ok(Transport::new(out_tx, in_rx).with_reader(reader))
    }
}

/// Forwards outbound commands to the socket until a close is requested or
/// the command channel is dropped.
async fn writer_loop(
    mut rx: mpsc::UnboundedReceiver<TransportCommand>,
    mut sink: SplitSink<WsStream, Message>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            TransportCommand::Text(text) => {
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    tracing::warn!("Failed to write frame: {}", e);
                    break;
                }
            }
            TransportCommand::Close(code) => {
                let frame = CloseFrame {
                    code: CloseCode::from(code),
                    reason: "client closing".to_string().into(),
                };
                if let Err(e) = sink.send(Message::Close(Some(frame))).await {
                    tracing::debug!("Failed to write close frame: {}", e);
                }
                break;
            }
        }
    }
}

/// Translates socket messages into transport events.
async fn reader_loop(mut stream: SplitStream<WsStream>, tx: mpsc::UnboundedSender<TransportEvent>) {
    while let Some(message) = stream.next().await {
        let event = match message {
            Ok(Message::Text(text)) => TransportEvent::Frame(text.as_str().to_owned()),
            Ok(Message::Close(frame)) => {
                let code = frame.map_or(CLOSE_NO_STATUS, |f| u16::from(f.code));
                let _ = tx.send(TransportEvent::Closed(code));
                return;
            }
            Ok(Message::Binary(data)) => {
                tracing::debug!("Ignoring binary frame ({} bytes)", data.len());
                continue;
            }
            Ok(_) => continue,
            Err(e) => {
                let _ = tx.send(TransportEvent::Error(e.to_string()));
                break;
            }
        };
        if tx.send(event).is_err() {
            // Transport dropped by its owner
            return;
        }
    }
    let _ = tx.send(TransportEvent::Closed(CLOSE_ABNORMAL));
}

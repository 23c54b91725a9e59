//! Transport implementations.

pub mod url;
pub mod websocket;

pub use url::build_transport_url;
pub use websocket::WebSocketConnector;

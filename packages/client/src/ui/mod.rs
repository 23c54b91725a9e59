//! Terminal UI: formatting, snapshot rendering and the interactive session.

pub mod error;
pub mod formatter;
pub mod renderer;
pub mod session;

pub use error::ClientError;
pub use session::run_client_session;

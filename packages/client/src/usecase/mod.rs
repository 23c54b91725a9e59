//! UseCase layer: frame dispatch, the per-thread connection task and the
//! facade the UI talks to.

pub mod connection_manager;
pub mod direct_message;
pub mod dispatch_event;

pub use connection_manager::{ConnectionDeps, ConnectionManager};
pub use direct_message::DirectMessageClient;
pub use dispatch_event::{DispatchError, DispatchOutcome, EventDispatcher};

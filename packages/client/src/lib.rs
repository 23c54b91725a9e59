//! Tayori direct-message client.
//!
//! The connection core lives in [`usecase`]: [`usecase::DirectMessageClient`]
//! manages the real-time connection of one active thread and publishes a
//! [`domain::ChatSnapshot`] for the UI to render.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

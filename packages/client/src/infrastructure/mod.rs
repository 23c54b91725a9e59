//! Infrastructure layer: wire DTOs, the REST gateway and the WebSocket transport.

pub mod dto;
pub mod rest;
pub mod transport;

//! REST gateway implementations.

pub mod thread_api;

pub use thread_api::HttpThreadApi;

//! `tracing` subscriber setup shared by the Tayori binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives used when `RUST_LOG` is unset: the client library, this
/// crate and the binary itself log at `level`; dependencies stay silent.
fn default_directives(binary_name: &str, level: &str) -> String {
    // Cargo bin names use '-', tracing targets use '_'
    let target = binary_name.replace('-', "_");
    format!("tayori_client={level},tayori_shared={level},{target}={level}")
}

/// Install the global subscriber, writing human-readable lines to stderr.
///
/// `RUST_LOG` takes precedence over `default_log_level`. Call once, at the
/// top of `main`:
///
/// ```no_run
/// tayori_shared::logger::setup_logger("tayori-client", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(binary_name, default_log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

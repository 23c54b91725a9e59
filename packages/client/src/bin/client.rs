//! Direct-message client for one Tayori thread.
//!
//! Loads the thread, connects with a fresh connection token and keeps the
//! connection alive with heartbeats and exponential-backoff reconnection.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tayori-client -- --thread 42 --auth-token <token>
//! TAYORI_AUTH_TOKEN=<token> cargo run --bin tayori-client -- -t 42 --max-attempts 3
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;

use tayori_client::{
    config::{ApiConfig, ConnectionConfig, DEFAULT_API_BASE_URL, DEFAULT_WS_BASE_URL},
    infrastructure::{rest::HttpThreadApi, transport::WebSocketConnector},
    ui::run_client_session,
    usecase::{ConnectionDeps, DirectMessageClient},
};
use tayori_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tayori-client")]
#[command(about = "Real-time direct-message client with heartbeat and automatic reconnection", long_about = None)]
struct Args {
    /// Thread to open
    #[arg(short = 't', long)]
    thread: String,

    /// REST API base URL
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// WebSocket base URL; `/<thread>/?token=...` is appended
    #[arg(long, default_value = DEFAULT_WS_BASE_URL)]
    ws_url: String,

    /// Bearer token of the signed-in user
    #[arg(long, env = "TAYORI_AUTH_TOKEN")]
    auth_token: Option<String>,

    /// Heartbeat interval in seconds
    #[arg(long, default_value_t = 30)]
    heartbeat_secs: u64,

    /// Reconnect attempts before giving up
    #[arg(long, default_value_t = 5)]
    max_attempts: u32,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let api_config = ApiConfig {
        api_base_url: args.api_url,
        auth_token: args.auth_token,
    };
    let mut connection_config = ConnectionConfig {
        ws_base_url: args.ws_url,
        heartbeat_interval: Duration::from_secs(args.heartbeat_secs.max(1)),
        ..ConnectionConfig::default()
    };
    connection_config.reconnect.max_attempts = args.max_attempts;

    let api = match HttpThreadApi::new(&api_config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!("Invalid API configuration: {}", e);
            std::process::exit(1);
        }
    };
    let deps = ConnectionDeps::new(connection_config, api.clone(), Arc::new(WebSocketConnector::new()));
    let client = DirectMessageClient::new(deps, api);

    if let Err(e) = run_client_session(client, &args.thread).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

//! Chat relay - Entry Point
//!
//! Usage: `chat-relay [config-file]`. Without an argument `config.toml` in
//! the working directory is used if present.

use log::info;
use std::process;

use chat_relay::{Server, ServerConfig};
use chat_relay::error::ChatServerError;
use chat_relay::error::handlers::handle_error;
use chat_relay::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    setup_logging();

    let loaded = match std::env::args().nth(1) {
        Some(path) => ServerConfig::load_from(&path),
        None => ServerConfig::load(),
    };

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            handle_error(&ChatServerError::from(e));
            process::exit(1);
        }
    };

    info!("Launching chat relay...");

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            handle_error(&e);
            process::exit(1);
        }
    };

    server.start().await;
}

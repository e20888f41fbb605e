use log::{error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::client::handle_client;
use crate::config::ServerConfig;
use crate::error::ChatServerError;
use crate::router::{Router, RouterHandle};

pub struct Server {
    listener: TcpListener,
    router: RouterHandle,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listener and starts the router.
    ///
    /// Failing to bind is fatal to the caller.
    pub async fn bind(config: ServerConfig) -> Result<Self, ChatServerError> {
        let address = config.listen_address();

        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => {
                info!("Server bound to {}", address);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", address, e);
                return Err(e.into());
            }
        };

        let router = Router::spawn(config.router_queue_capacity);

        Ok(Self {
            listener,
            router,
            config: Arc::new(config),
        })
    }

    /// Address actually bound, useful when the configured port is 0
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one pump task per client
    pub async fn start(&self) {
        info!(
            "Chat relay accepting connections on {}",
            self.config.listen_address()
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("Accepted connection from {}", addr);
                    let router = self.router.clone();
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(handle_client(stream, addr, router, config));
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

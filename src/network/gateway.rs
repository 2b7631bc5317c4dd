//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the configured socket and spawns a Connection task for
//! each incoming client.

use crate::handlers::Registry;
use crate::network::Connection;
use crate::state::Matrix;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    matrix: Arc<Matrix>,
    registry: Arc<Registry>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(addr: SocketAddr, matrix: Arc<Matrix>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Listener bound");
        Ok(Self {
            listener,
            matrix,
            registry: Arc::new(Registry::new()),
        })
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    continue;
                }
            };

            if let Err(e) = stream.set_nodelay(true) {
                error!(%addr, error = %e, "Failed to set TCP_NODELAY");
            }

            let (uid, outgoing) = self.matrix.add_connection(addr);
            if self.matrix.config.debug.net {
                info!(%uid, %addr, "Connection accepted");
            }

            let connection = Connection::new(
                uid.clone(),
                stream,
                addr,
                Arc::clone(&self.matrix),
                Arc::clone(&self.registry),
                outgoing,
            );
            tokio::spawn(async move {
                if let Err(e) = connection.run().await {
                    error!(%uid, %addr, error = %e, "Connection error");
                }
            });
        }
    }
}

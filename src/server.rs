//! TCP Server
//!
//! Binds the listening socket, owns the [`DatabaseSet`], and spawns one
//! session task per accepted connection.
//!
//! Shutdown is not graceful: when the shutdown future resolves the listener is
//! closed and [`Server::run_until`] returns without waiting for open sessions.

use crate::commands::CommandHandler;
use crate::config::ServerConfig;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::DatabaseSet;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Errors that stop the server before it accepts anything.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A bound server, ready to accept connections.
pub struct Server {
    listener: TcpListener,
    databases: Arc<DatabaseSet>,
    stats: Arc<ConnectionStats>,
}

impl Server {
    /// Validates `config`, creates the databases and binds the listener.
    pub async fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        if config.databases == 0 {
            return Err(ServerError::InvalidConfig(
                "at least one database is required".to_string(),
            ));
        }

        let addr = config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;

        let databases = Arc::new(DatabaseSet::new(config.databases));
        info!(
            address = %addr,
            databases = config.databases,
            "Server bound"
        );

        Ok(Self {
            listener,
            databases,
            stats: Arc::new(ConnectionStats::new()),
        })
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The databases shared by all sessions.
    pub fn databases(&self) -> Arc<DatabaseSet> {
        Arc::clone(&self.databases)
    }

    /// Connection statistics shared by all sessions.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// Accepts connections until `shutdown` resolves, then closes the listener.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Server {
            listener,
            databases,
            stats,
        } = self;

        tokio::select! {
            _ = accept_loop(listener, databases, Arc::clone(&stats)) => {}
            _ = shutdown => {
                info!("Shutdown signal received, closing listener");
            }
        }

        info!(
            accepted = stats.connections_accepted.load(Ordering::Relaxed),
            active = stats.active(),
            commands = stats.commands_processed.load(Ordering::Relaxed),
            "Listener closed"
        );
    }
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    databases: Arc<DatabaseSet>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                // Create a command handler for this connection
                let handler = CommandHandler::new(Arc::clone(&databases));
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn ephemeral_config() -> ServerConfig {
        ServerConfig {
            port: 0,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_bind_failure() {
        let first = Server::bind(&ephemeral_config()).await.unwrap();
        let port = first.local_addr().unwrap().port();

        let config = ServerConfig {
            port,
            ..ServerConfig::default()
        };
        let err = Server::bind(&config).await.err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));
    }

    #[tokio::test]
    async fn test_zero_databases_rejected() {
        let config = ServerConfig {
            databases: 0,
            ..ephemeral_config()
        };
        let err = Server::bind(&config).await.err().unwrap();
        assert!(matches!(err, ServerError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let server = Server::bind(&ephemeral_config()).await.unwrap();
        let addr = server.local_addr().unwrap();
        let databases = server.databases();
        let stats = server.stats();
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(server.run_until(async {
            let _ = rx.await;
        }));

        let mut client = BufReader::new(TcpStream::connect(addr).await.unwrap());
        client.get_mut().write_all(b"SET k v\n").await.unwrap();
        let mut line = String::new();
        client.read_line(&mut line).await.unwrap();
        assert_eq!(line, "OK\n");
        assert_eq!(databases.select(0).unwrap().get("k"), Some("v".to_string()));
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active(), 1);
        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 1);

        tx.send(()).unwrap();
        task.await.unwrap();

        // The listener is gone
        assert!(TcpStream::connect(addr).await.is_err());
    }
}

//! Connection Handler Module
//!
//! This module handles individual client connections.
//! Each client gets its own handler task that runs in a loop,
//! reading command lines and sending replies.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned (database 0 selected)
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read line from socket   │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Execute command         │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Write reply + newline   │ │
//!    │  └───────────┬─────────────┘ │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. EOF / read or write error
//!        │
//!        ▼
//! 5. Handler task ends
//! ```
//!
//! Command errors are answered and the loop continues. Only stream errors
//! end the session.

use crate::commands::CommandHandler;
use crate::protocol::{parse_command, LineParser, ParseError, Reply};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
///
/// This is the server's only record of open connections. It is used for
/// logging and introspection and has no effect on command behavior.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Number of sessions currently open.
    pub fn active(&self) -> u64 {
        self.active_connections.load(Ordering::Relaxed)
    }
}

/// Handles a single client session.
///
/// The only session state besides the stream is the selected database index,
/// which starts at 0 and is changed by `SELECT`.
pub struct ConnectionHandler<S> {
    /// The client stream
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The command handler (shared across connections)
    command_handler: CommandHandler,

    /// Line framer
    parser: LineParser,

    /// Currently selected database
    db_index: usize,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream, usually a `TcpStream`
    /// * `addr` - The client's socket address
    /// * `command_handler` - The command handler for executing commands
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            parser: LineParser::new(),
            db_index: 0,
            stats,
        }
    }

    /// Runs the session until the client goes away.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected gracefully"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    info!(client = %self.addr, "Client disconnected")
                }
                ConnectionError::IoError(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        self.stats.connection_closed();
        result
    }

    /// The main read-execute-respond loop.
    ///
    /// Only a stream failure or end of stream breaks out of it.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = self.parser.next_line(&mut self.buffer)? {
                self.handle_line(&line).await?;
            }

            self.read_more_data().await?;
        }
    }

    /// Handles one framed line.
    async fn handle_line(&mut self, line: &Bytes) -> Result<(), ConnectionError> {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            // Blank lines get no reply
            Ok(None) => return Ok(()),
            Err(e) => {
                debug!(client = %self.addr, error = %e, "Rejected command line");
                self.send_response(&Reply::error(format!("ERR {}", e)))
                    .await?;
                return Ok(());
            }
        };

        let response = self.command_handler.execute(&command, &mut self.db_index);
        self.stats.command_processed();
        debug!(
            client = %self.addr,
            command = %command.name,
            db = self.db_index,
            "Processed command"
        );

        self.send_response(&response).await
    }

    /// Reads more data from the stream into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        // Ensure we have some capacity
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(4096);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

        if n == 0 {
            if self.buffer.is_empty() {
                return Err(ConnectionError::ClientDisconnected);
            } else {
                // Partial line in buffer; it is never executed
                return Err(ConnectionError::UnexpectedEof);
            }
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Sends a reply to the client.
    async fn send_response(&mut self, response: &Reply) -> Result<(), ConnectionError> {
        let bytes = response.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Framing error
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Unexpected end of stream (partial line)
    #[error("Unexpected end of stream")]
    UnexpectedEof,
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion.
///
/// # Arguments
///
/// * `stream` - The client stream
/// * `addr` - The client's socket address
/// * `command_handler` - The command handler for executing commands
/// * `stats` - Shared connection statistics
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DatabaseSet;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};
    use tokio_test::io::Builder;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn create_handler() -> CommandHandler {
        CommandHandler::new(Arc::new(DatabaseSet::new(16)))
    }

    async fn run_mock(mock: tokio_test::io::Mock) -> Result<(), ConnectionError> {
        let stats = Arc::new(ConnectionStats::new());
        ConnectionHandler::new(mock, test_addr(), create_handler(), stats)
            .run()
            .await
    }

    #[tokio::test]
    async fn test_session_replies_in_order() {
        let mock = Builder::new()
            .read(b"SET key1 value1\n")
            .write(b"OK\n")
            .read(b"GET key1\n")
            .write(b"\"value1\"\n")
            .read(b"GET missing\n")
            .write(b"(nil)\n")
            .build();

        let result = run_mock(mock).await;
        assert!(matches!(result, Err(ConnectionError::ClientDisconnected)));
    }

    #[tokio::test]
    async fn test_session_pipelined_lines() {
        let mock = Builder::new()
            .read(b"INCR c\nINCR c\r\nINCR c\n")
            .write(b"(integer) 1\n")
            .write(b"(integer) 2\n")
            .write(b"(integer) 3\n")
            .build();

        run_mock(mock).await.unwrap_err();
    }

    #[tokio::test]
    async fn test_session_line_split_across_reads() {
        let mock = Builder::new()
            .read(b"SE")
            .read(b"T k v")
            .read(b"\n")
            .write(b"OK\n")
            .build();

        run_mock(mock).await.unwrap_err();
    }

    #[tokio::test]
    async fn test_session_skips_blank_lines() {
        let mock = Builder::new()
            .read(b"\n   \n\t\r\nPING\n")
            .write(b"PONG\n")
            .build();

        run_mock(mock).await.unwrap_err();
    }

    #[tokio::test]
    async fn test_session_survives_command_errors() {
        let mock = Builder::new()
            .read(b"FOO bar\n")
            .write(b"(error) ERR unknown command 'FOO'\n")
            .read(b"GET\n")
            .write(b"(error) ERR wrong number of arguments for 'get' command\n")
            .read(b"GET \xff\n")
            .write(b"(error) ERR invalid UTF-8 in command line\n")
            .read(b"PING\n")
            .write(b"PONG\n")
            .build();

        run_mock(mock).await.unwrap_err();
    }

    #[tokio::test]
    async fn test_session_select_is_per_session() {
        let handler = create_handler();
        let stats = Arc::new(ConnectionStats::new());

        let first = Builder::new()
            .read(b"SELECT 2\n")
            .write(b"OK\n")
            .read(b"SET k v\n")
            .write(b"OK\n")
            .read(b"SELECT 16\n")
            .write(b"(error) ERR DB index is out of range\n")
            .read(b"GET k\n")
            .write(b"\"v\"\n")
            .build();
        let second = Builder::new()
            .read(b"GET k\n")
            .write(b"(nil)\n")
            .build();

        ConnectionHandler::new(first, test_addr(), handler.clone(), Arc::clone(&stats))
            .run()
            .await
            .unwrap_err();
        ConnectionHandler::new(second, test_addr(), handler, Arc::clone(&stats))
            .run()
            .await
            .unwrap_err();

        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 2);
        assert_eq!(stats.active(), 0);
    }

    #[tokio::test]
    async fn test_session_quit_is_unknown() {
        let mock = Builder::new()
            .read(b"QUIT\n")
            .write(b"(error) ERR unknown command 'QUIT'\n")
            .read(b"PING\n")
            .write(b"PONG\n")
            .build();

        let result = run_mock(mock).await;
        assert!(matches!(result, Err(ConnectionError::ClientDisconnected)));
    }

    #[tokio::test]
    async fn test_session_oversized_line_closes() {
        let chunk = vec![b'a'; 64 * 1024];
        let mut builder = Builder::new();
        builder.read(b"PING\n").write(b"PONG\n");
        for _ in 0..8 {
            builder.read(&chunk);
        }
        // One byte past the limit with no newline in sight
        builder.read(b"a");

        let result = run_mock(builder.build()).await;
        assert!(matches!(
            result,
            Err(ConnectionError::ParseError(ParseError::LineTooLong { .. }))
        ));
    }

    #[tokio::test]
    async fn test_session_partial_line_at_eof() {
        let mock = Builder::new().read(b"SET k v").build();

        let result = run_mock(mock).await;
        assert!(matches!(result, Err(ConnectionError::UnexpectedEof)));
    }

    async fn create_test_server() -> (SocketAddr, Arc<DatabaseSet>, Arc<ConnectionStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let databases = Arc::new(DatabaseSet::new(16));
        let stats = Arc::new(ConnectionStats::new());

        let databases_clone = Arc::clone(&databases);
        let stats_clone = Arc::clone(&stats);

        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                let handler = CommandHandler::new(Arc::clone(&databases_clone));
                let stats = Arc::clone(&stats_clone);
                tokio::spawn(handle_connection(stream, client_addr, handler, stats));
            }
        });

        (addr, databases, stats)
    }

    #[tokio::test]
    async fn test_set_get_over_tcp() {
        let (addr, databases, _) = create_test_server().await;

        let stream = TcpStream::connect(addr).await.unwrap();
        let mut client = BufReader::new(stream);
        let mut line = String::new();

        client.get_mut().write_all(b"SET name Ariz\n").await.unwrap();
        client.read_line(&mut line).await.unwrap();
        assert_eq!(line, "OK\n");

        line.clear();
        client.get_mut().write_all(b"GET name\n").await.unwrap();
        client.read_line(&mut line).await.unwrap();
        assert_eq!(line, "\"Ariz\"\n");

        assert_eq!(
            databases.select(0).unwrap().get("name"),
            Some("Ariz".to_string())
        );
    }

    #[tokio::test]
    async fn test_connection_stats() {
        let (addr, _, stats) = create_test_server().await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);

        let mut client = TcpStream::connect(addr).await.unwrap();

        // Give the server time to accept the connection
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 1);

        // Send a command
        client.write_all(b"PING\n").await.unwrap();
        let mut buf = [0u8; 64];
        let _ = client.read(&mut buf).await.unwrap();

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert!(stats.commands_processed.load(Ordering::Relaxed) >= 1);
        assert!(stats.bytes_read.load(Ordering::Relaxed) > 0);
        assert!(stats.bytes_written.load(Ordering::Relaxed) > 0);

        // Close connection
        drop(client);

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }
}

//! Server configuration and command-line parsing.

use crate::{DEFAULT_DATABASES, DEFAULT_HOST, DEFAULT_PORT};
use thiserror::Error;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on (0 picks an ephemeral port)
    pub port: u16,
    /// Number of databases created at startup
    pub databases: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            databases: DEFAULT_DATABASES,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// What the binary should do after reading its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(ServerConfig),
    Help,
    Version,
}

/// Errors in command-line arguments
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),

    #[error("invalid port number '{0}'")]
    InvalidPort(String),

    #[error("invalid database count '{0}' (must be at least 1)")]
    InvalidDatabases(String),

    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// Parses command-line arguments, excluding the program name.
pub fn parse_args<I>(args: I) -> Result<CliAction, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut config = ServerConfig::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--host" | "-h" => {
                config.host = args.next().ok_or(ConfigError::MissingValue("--host"))?;
            }
            "--port" | "-p" => {
                let value = args.next().ok_or(ConfigError::MissingValue("--port"))?;
                config.port = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidPort(value))?;
            }
            "--databases" | "-d" => {
                let value = args
                    .next()
                    .ok_or(ConfigError::MissingValue("--databases"))?;
                config.databases = match value.parse() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(ConfigError::InvalidDatabases(value)),
                };
            }
            "--help" => return Ok(CliAction::Help),
            "--version" | "-v" => return Ok(CliAction::Version),
            _ => return Err(ConfigError::UnknownArgument(arg)),
        }
    }

    Ok(CliAction::Run(config))
}

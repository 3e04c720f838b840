//! Command Handler Module
//!
//! This module implements every command the server understands. It receives a
//! parsed [`Command`], runs it against the session's selected database and
//! returns exactly one [`Reply`]. It performs no I/O.
//!
//! ## Supported Commands
//!
//! ### Key Commands
//! - `SET key value...` - Set a key; remaining tokens are joined with single spaces
//! - `GET key` - Get a key's value
//! - `DEL key` - Delete a key
//! - `INCR key` - Increment an integer value
//! - `EXISTS key` - Check if a key exists
//!
//! ### Database Commands
//! - `SELECT index` - Switch the session to another database
//! - `COMPACT` - Dump the selected database as `SET` statements
//! - `DBSIZE` - Number of keys in the selected database
//! - `FLUSHDB` - Clear the selected database
//!
//! ### Connection Commands
//! - `PING [message]` - Test connection
//! - `ECHO message` - Echo message

use crate::protocol::{Command, Reply};
use crate::storage::{Database, DatabaseSet, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Command-level failures. None of these end the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("wrong number of arguments for '{command}' command")]
    WrongArity { command: &'static str },

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// `SELECT` argument is not a non-negative integer.
    #[error("DB index is out of range")]
    InvalidDbIndex,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::error(format!("ERR {}", err))
    }
}

type CommandResult = Result<Reply, CommandError>;

/// Dispatches commands against a shared [`DatabaseSet`].
///
/// The handler itself is stateless; the only per-session state, the selected
/// database index, is owned by the caller and passed in on every call.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    databases: Arc<DatabaseSet>,
}

impl CommandHandler {
    /// Creates a new command handler over the given databases.
    pub fn new(databases: Arc<DatabaseSet>) -> Self {
        Self { databases }
    }

    /// Returns the databases this handler operates on.
    pub fn databases(&self) -> &Arc<DatabaseSet> {
        &self.databases
    }

    /// Executes a command and returns the reply.
    ///
    /// # Arguments
    ///
    /// * `command` - The parsed command
    /// * `db_index` - The session's selected database; `SELECT` updates it
    pub fn execute(&self, command: &Command, db_index: &mut usize) -> Reply {
        trace!(command = %command.name, db = *db_index, "Executing command");

        match self.dispatch(&command.name, &command.args, db_index) {
            Ok(reply) => reply,
            Err(err) => err.into(),
        }
    }

    /// Dispatches a command to its handler.
    fn dispatch(&self, cmd: &str, args: &[String], db_index: &mut usize) -> CommandResult {
        match cmd {
            "SELECT" => self.cmd_select(args, db_index),
            "PING" => self.cmd_ping(args),
            "ECHO" => self.cmd_echo(args),
            _ => {
                let db = self.databases.select(*db_index)?;
                match cmd {
                    "SET" => self.cmd_set(db, args),
                    "GET" => self.cmd_get(db, args),
                    "DEL" => self.cmd_del(db, args),
                    "INCR" => self.cmd_incr(db, args),
                    "EXISTS" => self.cmd_exists(db, args),
                    "COMPACT" => self.cmd_compact(db, args),
                    "DBSIZE" => self.cmd_dbsize(db, args),
                    "FLUSHDB" => self.cmd_flushdb(db, args),
                    _ => Err(CommandError::UnknownCommand(cmd.to_string())),
                }
            }
        }
    }

    // ========================================================================
    // Key Commands
    // ========================================================================

    /// SET key value [value ...]
    fn cmd_set(&self, db: &Database, args: &[String]) -> CommandResult {
        let (key, value) = match args {
            [key, value @ ..] if !value.is_empty() => (key, value.join(" ")),
            _ => return Err(CommandError::WrongArity { command: "set" }),
        };

        db.set(key.clone(), value);
        Ok(Reply::ok())
    }

    /// GET key
    fn cmd_get(&self, db: &Database, args: &[String]) -> CommandResult {
        let key = single_arg(args, "get")?;

        Ok(match db.get(key) {
            Some(value) => Reply::string(value),
            None => Reply::nil(),
        })
    }

    /// DEL key
    fn cmd_del(&self, db: &Database, args: &[String]) -> CommandResult {
        let key = single_arg(args, "del")?;

        Ok(Reply::integer(db.delete(key) as i64))
    }

    /// INCR key
    fn cmd_incr(&self, db: &Database, args: &[String]) -> CommandResult {
        let key = single_arg(args, "incr")?;

        Ok(Reply::integer(db.increment(key)?))
    }

    /// EXISTS key
    fn cmd_exists(&self, db: &Database, args: &[String]) -> CommandResult {
        let key = single_arg(args, "exists")?;

        Ok(Reply::integer(db.exists(key) as i64))
    }

    // ========================================================================
    // Database Commands
    // ========================================================================

    /// SELECT index
    ///
    /// The session index only changes when the whole command succeeds.
    fn cmd_select(&self, args: &[String], db_index: &mut usize) -> CommandResult {
        let raw = single_arg(args, "select")?;

        let index = raw
            .parse::<i64>()
            .ok()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(CommandError::InvalidDbIndex)?;
        self.databases.select(index)?;

        *db_index = index;
        Ok(Reply::ok())
    }

    /// COMPACT
    fn cmd_compact(&self, db: &Database, args: &[String]) -> CommandResult {
        no_args(args, "compact")?;

        let statements: Vec<String> = db
            .snapshot()
            .into_iter()
            .map(|(key, value)| format!("SET {} {}", key, value))
            .collect();

        if statements.is_empty() {
            Ok(Reply::nil())
        } else {
            Ok(Reply::Lines(statements))
        }
    }

    /// DBSIZE
    fn cmd_dbsize(&self, db: &Database, args: &[String]) -> CommandResult {
        no_args(args, "dbsize")?;

        Ok(Reply::integer(db.len() as i64))
    }

    /// FLUSHDB
    fn cmd_flushdb(&self, db: &Database, args: &[String]) -> CommandResult {
        no_args(args, "flushdb")?;

        db.clear();
        Ok(Reply::ok())
    }

    // ========================================================================
    // Connection Commands
    // ========================================================================

    /// PING [message]
    fn cmd_ping(&self, args: &[String]) -> CommandResult {
        match args {
            [] => Ok(Reply::pong()),
            [message] => Ok(Reply::string(message.clone())),
            _ => Err(CommandError::WrongArity { command: "ping" }),
        }
    }

    /// ECHO message
    fn cmd_echo(&self, args: &[String]) -> CommandResult {
        let message = single_arg(args, "echo")?;

        Ok(Reply::string(message.clone()))
    }
}

fn single_arg<'a>(args: &'a [String], command: &'static str) -> Result<&'a String, CommandError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(CommandError::WrongArity { command }),
    }
}

fn no_args(args: &[String], command: &'static str) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::WrongArity { command })
    }
}

//! SlotKV - A Multi-Database In-Memory Key-Value Server
//!
//! This is the main entry point for the SlotKV server.
//! It parses the command line, sets up logging, binds the listener and
//! serves until Ctrl+C or SIGTERM.

use slotkv::config::{parse_args, CliAction, ServerConfig};
use slotkv::{shutdown_signal, Server};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn print_help() {
    println!(
        r#"
SlotKV - A Multi-Database In-Memory Key-Value Server

USAGE:
    slotkv [OPTIONS]

OPTIONS:
    -h, --host <HOST>         Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>         Port to listen on (default: 9736)
    -d, --databases <N>       Number of databases (default: 16)
    -v, --version             Print version information
        --help                Print this help message

EXAMPLES:
    slotkv                        # Start on 127.0.0.1:9736
    slotkv --port 6380            # Start on port 6380
    slotkv --host 0.0.0.0 -d 4    # All interfaces, 4 databases

CONNECTING:
    Any line-based TCP client works:
    $ nc 127.0.0.1 9736
    SET name Ariz
    OK
    GET name
    "Ariz"
"#
    );
}

fn print_banner(config: &ServerConfig) {
    println!(
        r#"
SlotKV v{} - Multi-Database In-Memory Key-Value Server
──────────────────────────────────────────────────────────────
Server started on {} ({} databases)
Ready to accept connections.

Use Ctrl+C to shutdown.
"#,
        slotkv::VERSION,
        config.bind_address(),
        config.databases
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = match parse_args(std::env::args().skip(1)) {
        Ok(CliAction::Run(config)) => config,
        Ok(CliAction::Help) => {
            print_help();
            return Ok(());
        }
        Ok(CliAction::Version) => {
            println!("SlotKV version {}", slotkv::VERSION);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    // Set up logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // A bind failure is fatal
    let server = Server::bind(&config).await?;
    print_banner(&config);
    info!("Listening on {}", server.local_addr()?);

    server.run_until(shutdown_signal()).await;

    info!("Server shutdown complete");
    Ok(())
}

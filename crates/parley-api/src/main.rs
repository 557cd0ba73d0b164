//! Parley REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads config from the data directory, initializes
//! the store and completion provider, then starts the HTTP server or runs
//! a one-off command.

mod http;
mod state;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley_infra::config::{load_config, resolve_data_dir};
use state::AppState;

#[derive(Parser)]
#[command(name = "parley", version, about = "Minimal conversational chat backend")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Listen address override (defaults to config, then 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Listen port override (defaults to config, then 5000)
        #[arg(long)]
        port: Option<u16>,
    },

    /// List known thread identifiers
    Threads,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,parley=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let data_dir = resolve_data_dir();
    let mut config = load_config(&data_dir).await;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let state = AppState::init(&config, data_dir).await?;

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Parley API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!(
                "  {} store: {}, model: {}, data dir: {}",
                console::style("●").dim(),
                config.store.backend,
                config.model.name,
                state.data_dir.display()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Threads => {
            // Listing needs only the store, not the provider credential.
            let store = state::open_store(&config, &data_dir).await?;
            let threads = store.list_threads().await?;

            if threads.is_empty() {
                println!("  No threads recorded yet.");
            } else {
                for thread_id in &threads {
                    println!("  {thread_id}");
                }
                println!(
                    "  {}",
                    console::style(format!("{} thread(s)", threads.len())).dim()
                );
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

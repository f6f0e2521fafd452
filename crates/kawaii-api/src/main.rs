//! Kawaii chat relay entry point.
//!
//! Binary name: `kawaii`
//!
//! Parses CLI arguments, sets up tracing and configuration, then either
//! serves the relay or runs a one-shot maintenance command.

mod cli;
mod http;
mod state;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use kawaii_core::retention::scheduler::RetentionScheduler;
use kawaii_infra::config::{load_config, resolve_data_dir};
use kawaii_observe::{TracingOptions, default_directive, init_tracing, shutdown_tracing};
use kawaii_types::config::RelayConfig;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        default_directive: default_directive(cli.verbose, cli.quiet).to_string(),
        json: cli.json_logs,
        otel: cli.otel,
    })?;

    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let mut config = load_config(&data_dir).await;

    let result = match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(&data_dir, config).await
        }
        Commands::Sweep => cli::sweep::sweep(&data_dir, &config, cli.json).await,
        Commands::Chats => cli::chats::list_chats(&data_dir, cli.json).await,
    };

    shutdown_tracing();
    result
}

/// Run the relay until Ctrl+C or SIGTERM.
async fn serve(data_dir: &Path, config: RelayConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let sweep_interval = config.retention.sweep_interval();

    let state = AppState::init(data_dir, config).await?;

    let scheduler = RetentionScheduler::new();
    scheduler
        .start(Arc::new(state.sweeper()), sweep_interval)
        .await?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, data_dir = %data_dir.display(), "kawaii relay listening");

    println!(
        "  {} Kawaii relay listening on {}",
        console::style("🌸").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let db_pool = state.db_pool.clone();
    let router = http::router::build_router(state);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    scheduler.stop().await?;
    db_pool.close().await;
    println!("\n  Server stopped.");
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

use clap::Parser;
use ledger_node::{api, config::Args, AppState};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = args.node_config()?;
    let state = AppState::new(&config)?;
    info!(
        difficulty = config.pow.difficulty(),
        peers = config.bootstrap_peers.len(),
        "ledger initialised with genesis block"
    );

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!("ledger-node listening on http://{}", args.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

use clap::Parser;
use hashchain_core::Ledger;
use hashchain_node::{router, AppState, Args};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let ledger = Ledger::with_pow(args.proof_of_work()?);
    info!(
        difficulty = ledger.difficulty(),
        parallel = args.parallel,
        allow_tamper = args.allow_tamper,
        "ledger initialised"
    );

    let app = router(AppState::new(ledger, args.allow_tamper));

    let addr: SocketAddr = args.listen.parse()?;
    info!("hashchain-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

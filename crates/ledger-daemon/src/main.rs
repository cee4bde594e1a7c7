//! ledger-daemon entry point.
//!
//! Thin by design: load configuration, stand up each external adapter,
//! wire the HTTP router and consumer loop, then block until a shutdown
//! signal arrives. All route handlers live in `ledger_api`; adapter
//! bootstrap lives in each adapter's own crate.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ledger_api::{build_app, AppState};
use ledger_config::{Config, Secrets};
use ledger_objectstore::S3ObjectStore;
use ledger_queue::SqsQueue;
use ledger_store::PostgresStore;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};

const SHUTDOWN_DRAIN: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    match run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "startup failed");
            std::process::exit(1);
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("load configuration")?;
    let secrets = Secrets::from_env().context("load secrets")?;
    info!(?config, "starting ledger-daemon");

    let store = PostgresStore::connect(&config.db_url(&secrets))
        .await
        .context("connect to sql store")?;
    info!("sql store ready");

    let objects = S3ObjectStore::connect(
        config.aws_endpoint.as_deref(),
        &config.aws_region,
        &config.s3_bucket,
    )
    .await
    .context("bootstrap object store")?;
    info!(bucket = %config.s3_bucket, "object store ready");

    let queue = SqsQueue::connect(config.aws_endpoint.as_deref(), &config.aws_region, &config.sqs_queue)
        .await
        .context("bootstrap queue")?;
    info!(queue = %config.sqs_queue, "queue ready");

    let store: Arc<dyn ledger_store::TransactionStore> = Arc::new(store);
    let objects: Arc<dyn ledger_objectstore::ObjectStore> = Arc::new(objects);
    let queue: Arc<dyn ledger_queue::Queue> = Arc::new(queue);

    let state = AppState {
        store,
        objects,
        queue: queue.clone(),
        region: Arc::new(config.region.clone()),
    };
    let app = build_app(state);

    let addr = format!("0.0.0.0:{}", config.app_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, "http server listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let consumer_handle = tokio::spawn(ledger_consumer::run(queue, shutdown_rx));

    let server = axum::serve(listener, app).with_graceful_shutdown(wait_for_signal());
    server.await.context("http server")?;

    info!("http server stopped, signalling consumer loop");
    let _ = shutdown_tx.send(true);

    if tokio::time::timeout(SHUTDOWN_DRAIN, consumer_handle).await.is_err() {
        error!("consumer loop did not finish within the shutdown drain deadline");
    }

    info!("shutdown complete");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, starting graceful shutdown"),
        _ = terminate => info!("received SIGTERM, starting graceful shutdown"),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

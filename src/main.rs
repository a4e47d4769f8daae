use anyhow::{Context, Result};
use std::net::Ipv4Addr;
use std::sync::Arc;
use studentdb::{
    api,
    config::{self, Config, StoreBackend},
    logging,
    mongo::MongoStudentStore,
    students::{InMemoryStudentStore, StudentStore},
};
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::init_config().context("Failed to load config from environment")?;
    logging::init_tracing();

    match config.store_backend {
        StoreBackend::Memory => serve(Arc::new(InMemoryStudentStore::new()), config).await,
        StoreBackend::Mongo => {
            let settings = config
                .mongo
                .as_ref()
                .context("MongoDB backend selected without MongoDB settings")?;
            let store = MongoStudentStore::connect(settings)
                .await
                .context("Failed to connect to MongoDB")?;
            serve(Arc::new(store), config).await
        }
    }
}

async fn serve<S>(store: Arc<S>, config: &Config) -> Result<()>
where
    S: StudentStore + 'static,
{
    let app = api::create_router(Arc::clone(&store), config.cors_origin.clone());
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    tracing::info!(
        backend = store.backend(),
        "Listening on http://0.0.0.0:{}",
        config.port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    store.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::warn!("Signal received, starting graceful shutdown");
}

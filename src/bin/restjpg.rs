//! rest-jpg server binary.
//!
//! Reads configuration from the environment, opens the configured storage
//! backend, and serves the HTTP API until Ctrl-C or SIGTERM.

use anyhow::{Context, Result};
use restjpg::{
    config::Config,
    http::{AppState, build_router},
    storage::{create_storage_backend, parse_storage_backend},
    templates::build_env,
};
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "restjpg=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let version = restjpg::config::version()?;

    if env::args().any(|arg| arg == "--version") {
        println!("{version}");
        return Ok(());
    }

    tracing::info!(?version, "Starting rest-jpg");

    let config = Config::new()?;

    let templates = build_env(
        config.external_base.as_ref().to_string(),
        config.version.clone(),
    )
    .context("template environment")?;

    let storage_backend =
        parse_storage_backend(&config.storage_backend, config.database_url.as_deref())?;
    tracing::info!(?storage_backend, "opening storage");
    let storage = create_storage_backend(storage_backend).await?;

    tokio::fs::create_dir_all(config.upload_path.as_ref())
        .await
        .with_context(|| {
            format!(
                "creating upload directory {}",
                config.upload_path.as_ref().display()
            )
        })?;

    let http_port = *config.http_port.as_ref();
    let app = build_router(AppState::new(
        Arc::new(config),
        Arc::new(templates),
        storage,
    ));

    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    {
        let tracker = tracker.clone();
        let inner_token = token.clone();

        let ctrl_c = async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::error!("failed to listen for Ctrl+C: {}", err);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(err) => {
                    tracing::error!("failed to install SIGTERM handler: {}", err);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::spawn(async move {
            tokio::select! {
                () = inner_token.cancelled() => { },
                _ = terminate => {},
                _ = ctrl_c => {},
            }

            tracker.close();
            inner_token.cancel();
        });
    }

    let bind_address = format!("0.0.0.0:{http_port}");
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {bind_address}"))?;
    tracing::info!("Starting server on {bind_address}");

    {
        let inner_token = token.clone();
        tracker.spawn(async move {
            let shutdown_token = inner_token.clone();
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_token.cancelled().await;
                    tracing::info!("axum graceful shutdown complete");
                })
                .await;
            if let Err(err) = result {
                tracing::error!("axum task failed: {}", err);
            }

            inner_token.cancel();
        });
    }

    tracker.wait().await;

    Ok(())
}

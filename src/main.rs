//! Demo service showing the canonical logging middleware.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    extract::Path,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use blogger::config::{load_from_env, load_from_file, ConfigWatcher};
use blogger::logger::{self, Level};
use blogger::middleware::{canonical_logging, HttpLogging};
use blogger::DomainError;

#[derive(Parser)]
#[command(name = "blogger")]
#[command(about = "Demo HTTP service with canonical request logging", long_about = None)]
struct Cli {
    /// TOML config file; BLOGGER_* environment variables are used without it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_from_file(path)?,
        None => load_from_env(),
    };
    let logger = logger::init(&config)?;

    // Level changes apply live; everything else needs a restart.
    let _watcher = match &cli.config {
        Some(path) => {
            let (watcher, mut updates) = ConfigWatcher::new(path);
            let watcher = watcher.run()?;
            let logger = logger.clone();
            tokio::spawn(async move {
                while let Some(new_config) = updates.recv().await {
                    let level = new_config.level.parse().unwrap_or(Level::Info);
                    match logger.set_level(level) {
                        Ok(()) => tracing::info!(level = %level, "Log level updated"),
                        Err(e) => tracing::error!(error = %e, "Failed to update log level"),
                    }
                }
            });
            Some(watcher)
        }
        None => None,
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/users/{id}", get(get_user))
        .route("/api/auth/login", post(login))
        .layer(from_fn_with_state(HttpLogging::new(logger), canonical_logging))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let listener = TcpListener::bind(cli.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutdown complete");
    logger::teardown();
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn get_user(Path(id): Path<u64>) -> Result<Json<Value>, DomainError> {
    if id != 1 {
        return Err(DomainError::not_found(404_001, format!("user {id} does not exist"))
            .with_detail("user_id", id));
    }
    Ok(Json(json!({ "id": id, "name": "Ada" })))
}

async fn login(Json(body): Json<Value>) -> Result<Json<Value>, DomainError> {
    let username = body.get("username").and_then(Value::as_str).unwrap_or_default();
    if username.is_empty() {
        return Err(DomainError::bad_request(400_001, "username is required"));
    }
    Ok(Json(json!({ "token": format!("demo-token-{username}") })))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received");
}

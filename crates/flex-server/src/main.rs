//! Flex API server
//!
//! `flex-server` (or `flex-server serve`) runs the HTTP API;
//! `flex-server repair` reconciles user and class application links once and exits.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use clap::{Parser, Subcommand};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flex_api::AppState;
use flex_auth::JwtService;
use flex_core::config::{AppConfig, StorageBackend};
use flex_db::{
    ClassDirectory, ClassRepository, Database, MemoryClassDirectory, MemoryUserDirectory,
    PoolConfig, UserDirectory, UserRepository,
};
use flex_services::{AccountService, ApplicationCoordinator};

mod health;

use health::{HealthChecker, HealthConfig};

const DEFAULT_LOG_FILTER: &str = "info,flex_server=debug,flex_api=debug,flex_services=debug,tower_http=debug";

#[derive(Debug, Parser)]
#[command(name = "flex-server", version, about = "Yoga class application backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Restore the user/class application links and exit
    Repair,
}

/// Directory backends chosen by `STORAGE`
struct Storage {
    users: Arc<dyn UserDirectory>,
    classes: Arc<dyn ClassDirectory>,
    database: Option<Database>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    let storage = open_storage(&config).await?;

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, &storage).await,
        Command::Repair => repair(&storage).await,
    };

    if let Some(db) = &storage.database {
        db.close().await;
    }
    result
}

/// Initialize tracing/logging
///
/// `LOG_FORMAT=json` switches to one JSON object per event.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().flatten_event(true).with_current_span(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

async fn open_storage(config: &AppConfig) -> anyhow::Result<Storage> {
    match config.database.storage {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok(Storage {
                users: Arc::new(MemoryUserDirectory::new()),
                classes: Arc::new(MemoryClassDirectory::new()),
                database: None,
            })
        }
        StorageBackend::Postgres => {
            let db = Database::connect(&PoolConfig::from(&config.database))
                .await
                .context("failed to connect to database")?;
            db.migrate().await.context("failed to run migrations")?;
            info!("Connected to database");

            Ok(Storage {
                users: Arc::new(UserRepository::new(db.pool().clone())),
                classes: Arc::new(ClassRepository::new(db.pool().clone())),
                database: Some(db),
            })
        }
    }
}

async fn serve(config: &AppConfig, storage: &Storage) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting Flex API"
    );

    let jwt = Arc::new(JwtService::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.jwt_expiry_seconds,
    ));
    let state = AppState {
        coordinator: ApplicationCoordinator::new(storage.users.clone(), storage.classes.clone()),
        accounts: AccountService::new(storage.users.clone(), jwt.clone()),
        jwt,
    };

    let mut checker = HealthChecker::new(HealthConfig::default(), config.database.storage);
    if let Some(db) = &storage.database {
        checker = checker.with_database(db.clone());
    }

    let origin = HeaderValue::from_str(&config.server.client_origin)
        .with_context(|| format!("invalid CLIENT_ORIGIN {}", config.server.client_origin))?;
    let app = build_router(state, Arc::new(checker), origin);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn repair(storage: &Storage) -> anyhow::Result<()> {
    let coordinator = ApplicationCoordinator::new(storage.users.clone(), storage.classes.clone());
    let report = coordinator.reconcile().await?;

    info!(
        links_restored = report.links_restored,
        applicants_removed = report.applicants_removed,
        references_removed = report.references_removed,
        clean = report.is_clean(),
        "Repair finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Build the application router
fn build_router(state: AppState, health: Arc<HealthChecker>, origin: HeaderValue) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::readiness))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    Router::new()
        .merge(health_routes)
        .merge(flex_api::router().with_state(state))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
            ),
        )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const ORIGIN: &str = "http://localhost:3000";

    fn test_app() -> Router {
        let users = Arc::new(MemoryUserDirectory::new());
        let classes = Arc::new(MemoryClassDirectory::new());
        let jwt = Arc::new(JwtService::new(b"test-secret-key-at-least-32-bytes", 3600));

        let state = AppState {
            coordinator: ApplicationCoordinator::new(users.clone(), classes),
            accounts: AccountService::new(users, jwt.clone()),
            jwt,
        };
        let health = Arc::new(HealthChecker::new(HealthConfig::default(), StorageBackend::Memory));

        build_router(state, health, HeaderValue::from_static(ORIGIN))
    }

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::parse_from(["flex-server"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["flex-server", "repair"]);
        assert!(matches!(cli.command, Some(Command::Repair)));
    }

    #[tokio::test]
    async fn test_liveness() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_with_memory_storage() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_client_origin() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/user/login")
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            ORIGIN
        );
    }

    #[tokio::test]
    async fn test_api_routes_are_mounted() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/dashboard/applied/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = test_app()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::application::services::{NotificationDispatcher, NotificationService, NotificationServiceImpl};
use crate::config::Settings;
use crate::infrastructure::repositories::PgNotificationRepository;
use crate::infrastructure::{cache, database};
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::middleware::cors;
use crate::presentation::middleware::logging;
use crate::presentation::websocket::Gateway;
use crate::shared::snowflake::SnowflakeGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Present only when rate limiting is enabled
    pub redis: Option<ConnectionManager>,
    pub snowflake: Arc<SnowflakeGenerator>,
    pub gateway: Arc<Gateway>,
    pub notifications: Arc<dyn NotificationService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the shared services around an existing pool and Redis connection.
    pub fn new(settings: Settings, db: PgPool, redis: Option<ConnectionManager>) -> Self {
        let snowflake = Arc::new(SnowflakeGenerator::new(settings.snowflake.machine_id as u64));
        let gateway = Arc::new(Gateway::new(settings.websocket.heartbeat_interval_ms));

        let dispatcher: Arc<dyn NotificationDispatcher> = gateway.clone();
        let notifications: Arc<dyn NotificationService> = Arc::new(NotificationServiceImpl::new(
            Arc::new(PgNotificationRepository::new(db.clone())),
            snowflake.clone(),
            dispatcher,
        ));

        Self {
            db,
            redis,
            snowflake,
            gateway,
            notifications,
            settings: Arc::new(settings),
        }
    }
}

/// Router with every layer the server runs with
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);

    routes::create_router(state)
        .layer(CompressionLayer::new())
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        if settings.database.run_migrations {
            database::run_migrations(&db).await?;
            tracing::info!("Database migrations applied");
        }

        let redis = if settings.rate_limit.enabled {
            Some(cache::create_redis_client(&settings.redis).await?)
        } else {
            tracing::warn!("Rate limiting disabled, skipping Redis connection");
            None
        };

        let addr = settings.server_addr();
        let state = AppState::new(settings, db, redis);
        let router = build_router(state);

        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(
            self.listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

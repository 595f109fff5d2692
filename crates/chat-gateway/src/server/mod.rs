//! Gateway server setup
//!
//! Provides the WebSocket server wiring and routes.

mod extract;
mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use axum::{routing::get, Router};
use chat_cache::{KeyValueStore, MemoryStore, PresenceStore, RedisPool};
use chat_common::{AppConfig, AppError, JwtService, PresenceBackend};
use chat_service::{ServiceContext, ServiceContextBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/chat", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Select the presence backend named in the configuration
pub fn create_presence_store(config: &AppConfig) -> Result<PresenceStore, AppError> {
    let store: Arc<dyn KeyValueStore> = match config.presence.backend {
        PresenceBackend::Redis => {
            let redis = config
                .redis
                .as_ref()
                .ok_or_else(|| AppError::Cache("REDIS_URL is not configured".to_string()))?;
            tracing::info!("Connecting to Redis...");
            let pool = RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
            Arc::new(pool)
        }
        PresenceBackend::Memory => {
            tracing::warn!("Using in-process presence store; presence is not shared between processes");
            Arc::new(MemoryStore::new())
        }
    };

    Ok(PresenceStore::from_config(store, &config.presence))
}

/// Initialize all collaborators and create the service context
pub async fn create_service_context(config: &AppConfig) -> Result<ServiceContext, AppError> {
    // Create database pool
    tracing::info!("Connecting to PostgreSQL...");
    let pool = chat_db::create_pool(&chat_db::PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    let presence = create_presence_store(config)?;

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));

    ServiceContextBuilder::new()
        .users(Arc::new(chat_db::PgUserDirectory::new(pool.clone())))
        .conversations(Arc::new(chat_db::PgConversationMembership::new(pool.clone())))
        .messages(Arc::new(chat_db::PgMessageStore::new(pool)))
        .tokens(jwt_service)
        .presence(presence)
        .build()
        .map_err(AppError::from)
}

/// Run the gateway server on an already bound listener
pub async fn serve(listener: TcpListener, state: GatewayState) -> Result<(), AppError> {
    let app = create_app(state);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Server error: {e}")))
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .gateway
        .address()
        .parse()
        .map_err(|e| AppError::validation(format!("Invalid gateway address: {e}")))?;

    let service_context = create_service_context(&config).await?;
    let state = GatewayState::new(service_context, config.gateway);

    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/chat", addr);

    serve(listener, state).await
}

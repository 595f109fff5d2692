//! Gateway state
//!
//! Application state for the gateway server.

use crate::broadcast::FanoutEngine;
use crate::connection::ConnectionManager;
use chat_common::GatewayConfig;
use chat_service::ServiceContext;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Service context with collaborators and the presence store
    service_context: Arc<ServiceContext>,
    /// Connection manager for WebSocket connections
    connection_manager: Arc<ConnectionManager>,
    /// Fan-out engine for message events
    fanout: Arc<FanoutEngine>,
    /// Gateway configuration
    config: Arc<GatewayConfig>,
}

impl GatewayState {
    /// Create a new gateway state with an empty connection registry
    pub fn new(service_context: ServiceContext, config: GatewayConfig) -> Self {
        let connection_manager = ConnectionManager::new_shared();
        let fanout = FanoutEngine::new(connection_manager.clone(), config.fanout_strategy);

        Self {
            service_context: Arc::new(service_context),
            connection_manager,
            fanout: Arc::new(fanout),
            config: Arc::new(config),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &ConnectionManager {
        &self.connection_manager
    }

    /// Get the fan-out engine
    pub fn fanout(&self) -> &FanoutEngine {
        &self.fanout
    }

    /// Get the gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("fanout", &self.fanout)
            .field("config", &self.config)
            .finish()
    }
}

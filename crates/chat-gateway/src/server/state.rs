//! Gateway state
//!
//! Application state shared across every WebSocket connection on this node.

use std::sync::Arc;

use chat_common::AppConfig;
use chat_queue::Producer;
use chat_service::services::ServiceContext;

use crate::connection::ConnMgr;
use crate::hub::Hub;

/// Gateway application state.
#[derive(Clone)]
pub struct GatewayState {
    service_context: Arc<ServiceContext>,
    conn_mgr: Arc<ConnMgr>,
    hub: Arc<Hub>,
    producer: Arc<Producer>,
    config: Arc<AppConfig>,
}

impl GatewayState {
    #[must_use]
    pub fn new(
        service_context: Arc<ServiceContext>,
        conn_mgr: Arc<ConnMgr>,
        hub: Arc<Hub>,
        producer: Arc<Producer>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            service_context,
            conn_mgr,
            hub,
            producer,
            config,
        }
    }

    #[must_use]
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    #[must_use]
    pub fn conn_mgr(&self) -> &Arc<ConnMgr> {
        &self.conn_mgr
    }

    #[must_use]
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    #[must_use]
    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("session_count", &self.conn_mgr.session_count())
            .field("node_id", &self.config.gateway.node_id)
            .finish()
    }
}

pub mod commands;
pub mod config;
pub mod db;
pub mod gateway;
pub mod render;
pub mod session;

use config::GatewayConfig;
use db::Database;
use gateway::GatewayClient;
use session::SessionStore;

/// Everything one page session owns. Lives as long as the host process.
pub struct AppState {
    pub id: uuid::Uuid,
    pub session: SessionStore,
    pub gateway: GatewayClient,
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database, config: GatewayConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            session: SessionStore::new(),
            gateway: GatewayClient::new(config),
            db,
        }
    }
}

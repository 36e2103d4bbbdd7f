use std::sync::Arc;

use crate::config::{AppConfig, MonitorConfig, SecretChain};
use crate::domain::order::StoreConnector;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub secrets: Arc<SecretChain>,
    pub connector: Arc<dyn StoreConnector>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        secrets: Arc<SecretChain>,
        connector: Arc<dyn StoreConnector>,
    ) -> Self {
        Self {
            config,
            secrets,
            connector,
        }
    }

    /// 요청마다 자격 증명을 새로 조회합니다.
    pub async fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig::resolve(&self.secrets, &self.config).await
    }
}

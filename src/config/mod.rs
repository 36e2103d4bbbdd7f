pub mod app_config;
pub mod database;
pub mod secrets;

pub use app_config::{AppConfig, ConfigError, MonitorConfig};
pub use database::establish_connection;
pub use secrets::{Credential, SecretChain, SecretProvider};

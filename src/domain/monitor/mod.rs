mod dashboard;
pub mod dto;
pub mod handler;

pub use handler::{monitor_handler, send_alert_handler};

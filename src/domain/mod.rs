pub mod health;
pub mod monitor;
pub mod order;
pub mod webhook;

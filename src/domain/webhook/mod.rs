//! Pub/Sub push endpoint for build and invoice events

pub mod dto;
pub mod handler;

pub use handler::notify_handler;

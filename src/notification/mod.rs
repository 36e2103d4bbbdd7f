//! Build and invoice event notifications
//!
//! Push-model counterpart of `monitoring`: one Pub/Sub message in, at most one
//! Telegram message out.

pub mod event;
pub mod message;
mod notifier;

pub use event::{classify, decode_payload, BuildEvent, InvoiceEvent, NotificationEvent};
pub use notifier::{EventNotifier, NotifyOutcome};

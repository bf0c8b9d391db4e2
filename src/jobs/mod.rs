//! Scheduled notifications.

mod notifier;
mod scheduler;

pub use notifier::{LogNotifier, Notifier, TelegramNotifier};
pub use scheduler::{spawn_scheduler, Jobs, MORNING_DIGEST, STALE_DEAL_ALERTS, TICK_INTERVAL};

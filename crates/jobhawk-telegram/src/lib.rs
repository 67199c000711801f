//! `jobhawk-telegram` — Telegram delivery for engine notifications.

pub mod notifier;

pub use notifier::TelegramNotifier;

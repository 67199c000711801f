use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::warn;

use jobhawk_core::config::TelegramConfig;
use jobhawk_core::types::{Notifier, UserId};

/// Fire-and-forget Telegram notifier.
///
/// The engine's correctness never depends on delivery: a rejected send is
/// logged at warn and dropped. Messages here are short status lines, so
/// no chunking or markdown escaping is needed.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            bot: Bot::new(&config.bot_token),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, user_id: UserId, text: &str) {
        if let Err(e) = self.bot.send_message(ChatId(user_id), text).await {
            warn!(user_id, error = %e, "Telegram: notification send failed");
        }
    }
}

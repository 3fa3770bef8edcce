use std::sync::Arc;

use portfolio_core_contact_contracts::{ContactSendMessageError, ContactService};
use portfolio_extern_contracts::telegram::{TelegramApiService, TelegramMessage, TelegramParseMode};
use portfolio_models::contact::ContactSubmission;
use portfolio_shared_contracts::time::TimeService;
use url::Url;

pub use relay::ContactRelayServiceImpl;

mod format;
mod relay;

/// Delivers contact form submissions to a Telegram chat.
#[derive(Debug, Clone)]
pub struct ContactServiceImpl<TelegramApi, Time> {
    telegram_api: TelegramApi,
    time: Time,
    config: ContactServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ContactServiceConfig {
    pub chat_id: Arc<str>,
    pub portfolio_url: Option<Arc<Url>>,
}

impl<TelegramApi, Time> ContactServiceImpl<TelegramApi, Time> {
    pub fn new(telegram_api: TelegramApi, time: Time, config: ContactServiceConfig) -> Self {
        Self {
            telegram_api,
            time,
            config,
        }
    }
}

impl<TelegramApi, Time> ContactService for ContactServiceImpl<TelegramApi, Time>
where
    TelegramApi: TelegramApiService,
    Time: TimeService,
{
    async fn send_message(
        &self,
        submission: ContactSubmission,
    ) -> Result<(), ContactSendMessageError> {
        let text = format::telegram_message(
            &submission,
            self.time.now(),
            self.config.portfolio_url.as_deref(),
        );

        let response = self
            .telegram_api
            .send_message(TelegramMessage {
                chat_id: self.config.chat_id.to_string(),
                text,
                parse_mode: TelegramParseMode::MarkdownV2,
            })
            .await?;

        if !response.ok {
            return Err(ContactSendMessageError::Send);
        }

        tracing::info!("contact message delivered");

        Ok(())
    }
}

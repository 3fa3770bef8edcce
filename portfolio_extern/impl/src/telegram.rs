use std::sync::Arc;

use anyhow::{anyhow, Context};
use portfolio_extern_contracts::telegram::{
    TelegramApiService, TelegramMessage, TelegramSendMessageResponse,
};
use portfolio_models::Sensitive;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::HttpClient;

const API_BASE: &str = "https://api.telegram.org/";

#[derive(Debug, Clone)]
pub struct TelegramApiServiceImpl {
    config: TelegramApiServiceConfig,
    client: HttpClient,
}

impl TelegramApiServiceImpl {
    pub fn new(config: TelegramApiServiceConfig, client: HttpClient) -> Self {
        Self { config, client }
    }
}

#[derive(Debug, Clone)]
pub struct TelegramApiServiceConfig {
    /// Contains the bot token, so it must never be logged.
    send_message_endpoint: Sensitive<Arc<Url>>,
}

impl TelegramApiServiceConfig {
    pub fn new(api_base_override: Option<Url>, bot_token: &str) -> anyhow::Result<Self> {
        let mut endpoint = match api_base_override {
            Some(api_base) => api_base,
            None => API_BASE.parse()?,
        };

        endpoint
            .path_segments_mut()
            .map_err(|()| anyhow!("Telegram api base url cannot be a base"))?
            .pop_if_empty()
            .push(&format!("bot{bot_token}"))
            .push("sendMessage");

        Ok(Self {
            send_message_endpoint: Sensitive(endpoint.into()),
        })
    }
}

impl TelegramApiService for TelegramApiServiceImpl {
    async fn send_message(
        &self,
        message: TelegramMessage,
    ) -> anyhow::Result<TelegramSendMessageResponse> {
        let response = self
            .client
            .post((**self.config.send_message_endpoint).clone())
            .json(&SendMessageRequest {
                chat_id: &message.chat_id,
                text: &message.text,
                parse_mode: message.parse_mode.as_str(),
                disable_web_page_preview: true,
            })
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to reach the Telegram bot api")?;

        let status = response.status();
        let body = response
            .json::<SendMessageResponse>()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Malformed response from the Telegram bot api ({status})"))?;

        if body.ok && !status.is_success() {
            anyhow::bail!("Telegram bot api reported success with status {status}");
        }

        if !body.ok {
            tracing::warn!(
                %status,
                error_code = ?body.error_code,
                description = ?body.description,
                "Telegram bot api rejected message"
            );
        }

        Ok(body.into())
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    ok: bool,
    error_code: Option<u16>,
    description: Option<String>,
}

impl From<SendMessageResponse> for TelegramSendMessageResponse {
    fn from(value: SendMessageResponse) -> Self {
        Self {
            ok: value.ok,
            description: value.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint() {
        for (api_base, expected) in [
            (None, "https://api.telegram.org/bot123:abc/sendMessage"),
            (
                Some("http://127.0.0.1:8003/"),
                "http://127.0.0.1:8003/bot123:abc/sendMessage",
            ),
            (
                Some("http://127.0.0.1:8003/telegram"),
                "http://127.0.0.1:8003/telegram/bot123:abc/sendMessage",
            ),
        ] {
            let config =
                TelegramApiServiceConfig::new(api_base.map(|x| x.parse().unwrap()), "123:abc")
                    .unwrap();
            assert_eq!(config.send_message_endpoint.as_str(), expected);
        }
    }

    #[test]
    fn config_debug_hides_token() {
        let config = TelegramApiServiceConfig::new(None, "123:abc").unwrap();
        assert!(!format!("{config:?}").contains("123:abc"));
    }
}

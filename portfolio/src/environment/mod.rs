use std::sync::Arc;

use anyhow::ensure;
use portfolio_config::Config;
use portfolio_core_contact_impl::ContactServiceConfig;
use portfolio_extern_impl::{
    http::HttpClient, relay::ContactRelayApiServiceConfig, telegram::TelegramApiServiceConfig,
};
use portfolio_form::ContactFormConfig;
use types::{Contact, ContactRelay, RelayApi, RestServer, TelegramApi, Time};

pub mod types;

/// Builds the relay server, which talks to the Telegram bot api directly.
pub fn rest_server(config: &Config) -> anyhow::Result<RestServer> {
    ensure!(
        !config.telegram.bot_token.is_empty(),
        "telegram.bot_token is not set"
    );
    ensure!(
        !config.telegram.chat_id.is_empty(),
        "telegram.chat_id is not set"
    );

    let telegram_api_service_config = TelegramApiServiceConfig::new(
        Some(config.telegram.api_base.clone()),
        &config.telegram.bot_token,
    )?;
    let telegram_api = TelegramApi::new(
        telegram_api_service_config,
        HttpClient::new(*config.telegram.timeout)?,
    );

    let contact_service_config = ContactServiceConfig {
        chat_id: config.telegram.chat_id.as_str().into(),
        portfolio_url: config.contact.portfolio_url.clone().map(Arc::new),
    };
    let contact = Contact::new(telegram_api, Time::default(), contact_service_config);

    Ok(RestServer::new(contact))
}

/// Builds the client side contact service, which only knows the relay url.
pub fn contact_relay(config: &Config) -> anyhow::Result<ContactRelay> {
    let relay_api = RelayApi::new(
        ContactRelayApiServiceConfig::new(&config.form.relay_url)?,
        HttpClient::new(*config.form.relay_timeout)?,
    );
    Ok(ContactRelay::new(relay_api))
}

pub fn contact_form_config(config: &Config) -> ContactFormConfig {
    ContactFormConfig {
        result_display: *config.form.result_display,
    }
}

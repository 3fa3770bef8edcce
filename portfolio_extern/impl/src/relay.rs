use std::sync::Arc;

use anyhow::Context;
use portfolio_extern_contracts::relay::{ContactRelayApiService, ContactRelayResponse};
use portfolio_models::contact::ContactFormFields;
use serde::Deserialize;
use url::Url;

use crate::http::HttpClient;

const CONTACT_ROUTE: &str = "contact";

#[derive(Debug, Clone)]
pub struct ContactRelayApiServiceImpl {
    config: ContactRelayApiServiceConfig,
    client: HttpClient,
}

impl ContactRelayApiServiceImpl {
    pub fn new(config: ContactRelayApiServiceConfig, client: HttpClient) -> Self {
        Self { config, client }
    }
}

#[derive(Debug, Clone)]
pub struct ContactRelayApiServiceConfig {
    contact_endpoint: Arc<Url>,
}

impl ContactRelayApiServiceConfig {
    pub fn new(relay_url: &Url) -> anyhow::Result<Self> {
        let contact_endpoint = relay_url
            .join(CONTACT_ROUTE)
            .with_context(|| format!("Invalid contact relay url {relay_url}"))?;
        Ok(Self {
            contact_endpoint: contact_endpoint.into(),
        })
    }
}

impl ContactRelayApiService for ContactRelayApiServiceImpl {
    async fn send(&self, fields: ContactFormFields) -> anyhow::Result<ContactRelayResponse> {
        let response = self
            .client
            .post((*self.config.contact_endpoint).clone())
            .json(&fields)
            .send()
            .await
            .context("Failed to reach the contact relay")?;

        let status = response.status();
        if status.is_success() {
            let accepted = response
                .json::<bool>()
                .await
                .with_context(|| format!("Malformed response from the contact relay ({status})"))?;
            return Ok(if accepted {
                ContactRelayResponse::Accepted
            } else {
                ContactRelayResponse::Rejected {
                    detail: "Message not accepted".into(),
                }
            });
        }

        let ApiError { detail } = response
            .json::<ApiError>()
            .await
            .with_context(|| format!("Malformed response from the contact relay ({status})"))?;

        Ok(ContactRelayResponse::Rejected { detail })
    }
}

#[derive(Deserialize)]
struct ApiError {
    detail: String,
}

use std::{ops::Deref, sync::LazyLock, time::Duration};

use anyhow::Context;
use portfolio_utils::portfolio_version;

pub static USER_AGENT: LazyLock<String> = LazyLock::new(|| {
    let homepage = env!("CARGO_PKG_HOMEPAGE");
    let repository = env!("CARGO_PKG_REPOSITORY");
    let version = portfolio_version();

    format!("Portfolio Contact Relay ({homepage}, {repository}, Version {version})")
});

const _: () = {
    assert!(!env!("CARGO_PKG_HOMEPAGE").is_empty());
    assert!(!env!("CARGO_PKG_REPOSITORY").is_empty());
};

#[derive(Debug, Clone)]
pub struct HttpClient(reqwest::Client);

impl HttpClient {
    /// Creates a client whose requests fail once `timeout` has elapsed.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT.as_str())
            .timeout(timeout)
            .build()
            .map(Self)
            .context("Failed to build http client")
    }
}

impl Deref for HttpClient {
    type Target = reqwest::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

use std::{net::IpAddr, path::Path};

use anyhow::Context;
use config::{Environment, File, FileFormat};
use serde::Deserialize;
use url::Url;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of config files loaded on top of the default one.
pub const CONFIG_PATHS_ENV: &str = "PORTFOLIO_CONFIG";

/// Prefix of environment variables overriding single config keys, e.g.
/// `PORTFOLIO__TELEGRAM__BOT_TOKEN`.
pub const ENV_PREFIX: &str = "PORTFOLIO";

/// Loads the default config file, the files listed in `PORTFOLIO_CONFIG` and
/// environment overrides, in that order.
pub fn load() -> anyhow::Result<Config> {
    let extra_paths = std::env::var(CONFIG_PATHS_ENV).unwrap_or_default();
    let paths = std::iter::once(DEFAULT_CONFIG_PATH)
        .chain(extra_paths.split(':').filter(|path| !path.is_empty()))
        .collect::<Vec<_>>();

    build(&paths, &[], true)
}

/// Loads the given config files followed by the given toml snippets, without
/// looking at the environment.
pub fn load_with_override(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
) -> anyhow::Result<Config> {
    build(paths, overrides, false)
}

fn build(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
    environment: bool,
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    let builder = overrides.iter().fold(builder, |builder, content| {
        builder.add_source(File::from_str(content, FileFormat::Toml))
    });

    let builder = if environment {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
    } else {
        builder
    };

    builder
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    pub form: FormConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct TelegramConfig {
    pub api_base: Url,
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &"[redacted]")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactConfig {
    pub portfolio_url: Option<Url>,
}

#[derive(Debug, Deserialize)]
pub struct FormConfig {
    pub result_display: Duration,
    pub relay_url: Url,
    pub relay_timeout: Duration,
}

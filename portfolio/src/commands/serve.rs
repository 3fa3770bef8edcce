use portfolio_config::Config;
use tracing::info;

use crate::environment;

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let server = environment::rest_server(&config)?;
    info!(
        "Starting contact relay on {}:{}",
        config.http.host, config.http.port
    );
    server.serve(config.http.host, config.http.port).await
}

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tweetage::config::{CliArgs, Config};
use tweetage::render::Templates;
use tweetage::state::AppState;
use tweetage::twitter::TwitterClient;
use tweetage::{server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let config = Config::try_from(CliArgs::parse())?;

    telemetry::init_tracing()?;

    // Twitter API client
    let twitter = TwitterClient::new(config.consumer.clone(), &config.api_base, &config.callback_url)?;
    let templates = Templates::new()?;

    info!(
        api_base = %config.api_base,
        callback_url = %config.callback_url,
        "configuration loaded"
    );

    let state = Arc::new(AppState::new(twitter, templates));
    server::serve(&config.bind_addr, state).await
}

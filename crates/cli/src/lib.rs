pub mod args;
mod listings;
pub mod telemetry;
mod token;
mod watch;

use std::{path::Path, time::Duration};

use alloy::{
    providers::ProviderBuilder,
    rpc::client::RpcClient,
    transports::layers::{RetryBackoffLayer, ThrottleLayer},
};
use anyhow::Context;
use args::Cli;
use launchpad_sdk::{
    config::{DeploymentConfig, ImageTable, SyncSettings},
    page::Page,
    source::RpcSource,
    sync::Synchronizer,
};
use tokio_util::sync::CancellationToken;

use crate::args::Commands;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = if let Some(throttle) = cli.rpc_throttle {
        RpcClient::builder()
            .layer(ThrottleLayer::new(throttle))
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    } else {
        RpcClient::builder()
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    };
    client.set_poll_interval(Duration::from_millis(100));
    let provider = ProviderBuilder::new().connect_client(client);

    let config = DeploymentConfig::load(&cli.config)
        .with_context(|| format!("loading deployment config {}", cli.config.display()))?;
    let images = load_images(&cli.images)?;
    tracing::info!(
        rpc = %cli.rpc,
        chains = ?config.chain_ids(),
        images = images.len(),
        max_listings = cli.max_listings,
        "starting launchpad client"
    );

    let sync = Synchronizer::new(
        RpcSource::new(provider),
        config,
        images,
        SyncSettings { max_listings: cli.max_listings, ..Default::default() },
    );

    let (mut page, refresh) = Page::mount();
    if let Some(account) = cli.account {
        page.connect(account);
    }

    let cancellation_signal = CancellationToken::new();
    let cancellation_token = cancellation_signal.child_token();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install CTRL+C signal handler");
            return;
        }
        cancellation_signal.cancel();
    });

    match cli.command {
        Commands::Listings => {
            let event = refresh.run(&sync).await;
            listings::render(&page, &sync.snapshot(), &event);
        },
        Commands::Watch { interval, num_refreshes } => {
            watch::render(
                &page,
                &sync,
                Duration::from_secs(interval),
                num_refreshes,
                cancellation_token,
            )
            .await?
        },
        Commands::Token { index } => token::render(&sync, index).await?,
    }

    Ok(())
}

/// Image table is optional enrichment, listings are rendered without images
/// if the file is absent.
fn load_images(path: &Path) -> anyhow::Result<ImageTable> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "image table not found, listing without images");
        return Ok(ImageTable::default());
    }
    ImageTable::load(path).with_context(|| format!("loading image table {}", path.display()))
}

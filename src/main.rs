use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subtitle_companion::{
    config::Config,
    models::Placeholder,
    providers::build_providers,
    services::{
        HistorySnapshotter, LookupCoordinator, RecencyLog, ResolutionQueue, ResolutionWorker,
        Resolver, SubtitleStore,
    },
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "subtitle-companion")]
#[command(version)]
#[command(about = "Subtitle addon service with a recently-watched history")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Public base URL used in download links
    #[arg(short = 'b', long, value_name = "URL")]
    base_url: Option<String>,

    /// Directory for history and subtitle snapshots
    #[arg(short = 'd', long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = if cli.log_level == "trace" {
        format!("subtitle_companion={},tower_http=trace", cli.log_level)
    } else {
        format!("subtitle_companion={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Subtitle Companion v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(base_url) = cli.base_url {
        config.web.base_url = base_url;
    }
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    config.validate()?;

    let placeholder = Placeholder::new(
        config.history.pending_label.clone(),
        config.providers.placeholder_poster_url.clone(),
    );

    let history = RecencyLog::new(config.history.capacity, placeholder.clone());
    let mut snapshotter =
        HistorySnapshotter::new(history.clone(), config.storage.history_snapshot_path());
    snapshotter.restore().await;

    let subtitles = SubtitleStore::open(
        config.storage.subtitle_dir.clone(),
        config.storage.subtitle_snapshot_path(),
    )
    .await;
    subtitles.ensure_storage_dirs().await?;
    info!(
        "Subtitle store ready with {} records in {}",
        subtitles.len().await,
        config.storage.subtitle_dir.display()
    );

    let providers = build_providers(&config.providers)?;
    info!(
        "Metadata providers: {}",
        providers
            .iter()
            .map(|p| p.kind().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let resolver = Arc::new(Resolver::new(providers, placeholder));

    let shutdown = CancellationToken::new();

    let (queue, receiver) = ResolutionQueue::new(config.resolution.queue_size);
    let worker = ResolutionWorker::new(
        receiver,
        queue.clone(),
        resolver,
        history.clone(),
        config.resolution.max_concurrent,
    )
    .spawn(shutdown.clone());

    let snapshot_task = tokio::spawn(
        snapshotter.run(config.storage.snapshot_interval, shutdown.clone()),
    );

    let coordinator = LookupCoordinator::new(history, subtitles, queue, &config.web.base_url);

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down gracefully");
                signal_token.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    let web_server = WebServer::new(config, coordinator)?;
    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    let served = web_server.serve(shutdown.clone()).await;

    shutdown.cancel();
    if let Err(e) = worker.await {
        error!("Resolution worker task failed: {}", e);
    }
    if let Err(e) = snapshot_task.await {
        error!("History snapshot task failed: {}", e);
    }

    served?;
    info!("Subtitle Companion stopped");
    Ok(())
}

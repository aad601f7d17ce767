use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use jambox::domain::entities::ClientIdentity;
use jambox::infrastructure::{
    AppConfig, CliArgs, HttpImageFetcher, JellyfinClient, KeyringCredentialStorage,
    MemoryImageCache, StorageManager,
};
use jambox::presentation::App;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn create_app(args: &CliArgs) -> Result<App> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);

    init_logging(&config)?;

    info!(version = jambox::VERSION, "Starting Jambox");

    let mut state = storage.load_state()?;
    let (device_id, created) = state.ensure_device_id();
    if created {
        info!(device_id = %device_id, "Generated device ID");
        if let Err(e) = storage.save_state(&state) {
            warn!(error = %e, "Failed to save device ID");
        }
    }

    let identity = ClientIdentity::new(device_id)
        .with_names(config.client.name.clone(), config.client.device.clone());
    let jellyfin = Arc::new(
        JellyfinClient::with_timeout(identity, config.http.timeout())?
            .with_item_limit(config.http.item_limit),
    );
    let fetcher = Arc::new(HttpImageFetcher::new(config.http.timeout())?);
    let images = Arc::new(MemoryImageCache::new(fetcher, config.images.capacity));
    let credentials = Arc::new(KeyringCredentialStorage::new());

    Ok(App::new(config, storage, state, jellyfin, credentials, images))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    let args = CliArgs::parse();
    let mut app = create_app(&args)?;

    let mut stdout = std::io::stdout();
    let result = app.run(args.command, &mut stdout).await;
    stdout.flush()?;

    result
}

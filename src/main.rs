use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use photogrid::application::{PageOutcome, PhotoFeedController};
use photogrid::domain::{ImageStatus, PhotoRecord};
use photogrid::infrastructure::{
    AppConfig, CliArgs, ConfigLoader, ImageLoaderFactory, MemoryImageCache, PhotoApiClient,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

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
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let mut config = ConfigLoader::new()?.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

/// Loads up to `pages` pages, one at a time, the way scrolling to the last cell would.
async fn load_pages(feed: &mut PhotoFeedController, pages: u32) {
    feed.reset();

    for loaded in 1..=pages {
        match feed.next_completion().await {
            Some(PageOutcome::Appended { count: 0, .. }) => {
                info!("Feed has no more photos");
                return;
            }
            Some(PageOutcome::Failed(error)) => {
                warn!(
                    error = %error,
                    retryable = error.is_network_error(),
                    "Stopped loading pages"
                );
                return;
            }
            _ => {}
        }

        if loaded < pages {
            if let Some(last) = feed.items().last().cloned() {
                feed.item_appeared(&last);
            }
        }
    }
}

async fn load_images(records: &[PhotoRecord], factory: &ImageLoaderFactory) {
    let mut loaders: Vec<_> = records
        .iter()
        .map(|record| (record.id(), factory.loader(Some(record.url()))))
        .collect();

    for (_, loader) in &mut loaders {
        loader.load();
    }

    for (id, loader) in &loaders {
        let mut status = loader.subscribe();
        let _ = status
            .wait_for(|s| !matches!(s, ImageStatus::Downloading | ImageStatus::Decoding))
            .await;

        match loader.image() {
            Some(image) => println!("{id:>6}  {}x{}", image.width(), image.height()),
            None => println!("{id:>6}  (placeholder)"),
        }
    }
}

async fn run(args: CliArgs, config: AppConfig) -> Result<()> {
    let client = Arc::new(PhotoApiClient::with_base_url(
        &config.api_base_url,
        config.request_timeout(),
    )?);
    let cache = Arc::new(MemoryImageCache::from_capacity(config.image_cache_capacity));
    info!(base_url = client.base_url(), page_size = config.page_size, "Loading photo feed");

    let mut feed = PhotoFeedController::new(client.clone(), config.page_size);
    load_pages(&mut feed, args.pages.max(1)).await;

    if let Some(query) = args.search {
        feed.set_search_query(query);
    }

    let visible = feed.filtered_items().into_owned();
    for record in &visible {
        println!("{:>6}  {}", record.id(), record.title());
    }

    info!(
        loaded = feed.items().len(),
        shown = visible.len(),
        next_page = feed.current_page(),
        "Feed ready"
    );

    if args.images {
        let factory = ImageLoaderFactory::new(cache.clone(), client);
        load_images(&visible, &factory).await;
        info!(stats = %cache.stats(), "Images loaded");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = photogrid::VERSION, "Starting photogrid");

    run(args, config).await
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use homedir::my_home;
use tracing_subscriber::EnvFilter;

use peek::cache::{image_validation, ImageCache, ImageLoader};
use peek::preview::HttpFetcher;
use peek::{Config, PreviewService};

mod cli;
use cli::{CacheAction, Command};

fn get_base_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("PEEK_BASE_PATH") {
        return Ok(PathBuf::from(path));
    }

    let home = my_home()
        .context("could not determine home directory")?
        .context("home directory path is empty")?;
    Ok(home.join(".local/share/peek"))
}

async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Meta { url } => {
            let service = PreviewService::from_config(&config.fetch)?;
            let preview = service.fetch_metadata(&url).await;
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }

        Command::Image { url } => {
            let cache = Arc::new(ImageCache::from_config(&config)?);
            let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?.with_status_check());
            let loader = ImageLoader::new(cache, fetcher);

            match loader.load(&url).await {
                Some(data) => {
                    let format = image::guess_format(&data)
                        .map(|f| format!("{f:?}"))
                        .unwrap_or_else(|_| "unknown".to_string());
                    let (width, height) = image_validation::image_dimensions(&data).unwrap_or_default();
                    println!("{} bytes, {format}, {width}x{height}", data.len());
                }
                None => println!("no image at {url}"),
            }
        }

        Command::Cache { action } => {
            let cache = ImageCache::from_config(&config)?;
            match action {
                CacheAction::Size => {
                    let size = cache.disk_size();
                    println!("Disk cache size: {:.2} MB", size as f64 / 1024.0 / 1024.0);
                }
                CacheAction::Clear => cache.clear_all()?,
                CacheAction::ClearExpired => cache.clear_expired()?,
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let config = Config::load_with(get_base_path()?)?;
    tracing::debug!(base_path = %config.base_path().display(), "config loaded");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?
        .block_on(run(args.command, config))
}

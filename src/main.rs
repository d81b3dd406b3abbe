mod artist_image_batch;
mod artist_image_cache;
mod artist_image_fetcher;
mod artist_image_resolver;
mod cli;
mod config;
mod config_persistence;
mod fingerprint;
mod image_pipeline;
mod library;
mod media_file_discovery;
mod metadata;
mod progress_logger;
mod protocol;
#[cfg(test)]
mod test_support;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use clap::Parser;
use log::{info, warn};
use tokio::sync::broadcast;

use artist_image_batch::{ArtistImageBatch, BatchGeneration, BatchSettings};
use artist_image_cache::ArtistImageCache;
use artist_image_fetcher::{HttpImageDownloader, ImageDownloader};
use artist_image_resolver::{ArtistImageResolver, DeezerArtistResolver};
use cli::Args;
use config::default_config_path;
use config_persistence::load_or_create_config;
use library::artist_extraction::all_artists;
use library::artist_store::ArtistStore;
use library::library_scanner::scan_library;
use progress_logger::ProgressLogger;
use protocol::Message;

fn refresh_artist_store(artist_store: &ArtistStore, folders: &[PathBuf], separators: &[String]) {
    let scan = scan_library(folders, separators);
    artist_store.replace_all(all_artists(&scan.tracks, &scan.albums));
    info!("Artist store holds {} artists", artist_store.len());
}

/// Runs a fresh batch on its own thread; it supersedes any batch still running.
fn spawn_batch<R, D>(batch: &Arc<ArtistImageBatch<R, D>>) -> io::Result<JoinHandle<u64>>
where
    R: ArtistImageResolver + 'static,
    D: ImageDownloader + 'static,
{
    let batch = Arc::clone(batch);
    thread::Builder::new()
        .name("artist-image-batch".to_string())
        .spawn(move || batch.start_batch())
}

/// One rescan tick: reload the artist universe, then start a superseding batch.
fn rescan_and_restart<R, D>(
    batch: &Arc<ArtistImageBatch<R, D>>,
    artist_store: &ArtistStore,
    folders: &[PathBuf],
    separators: &[String],
) -> io::Result<JoinHandle<u64>>
where
    R: ArtistImageResolver + 'static,
    D: ImageDownloader + 'static,
{
    refresh_artist_store(artist_store, folders, separators);
    spawn_batch(batch)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
    );
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => default_config_path().ok_or("no configuration directory available")?,
    };
    let config = load_or_create_config(&config_path)?;
    info!("Using config {}", config_path.display());

    let folders = args.library_folders(&config.library.folders);
    if folders.is_empty() {
        warn!("No library folders configured; only existing cache entries are kept");
    }

    let cache = ArtistImageCache::from_config(&config.paths)?;
    cache.ensure_dirs()?;
    info!(
        "Artist images: thumbnails in {}, full size in {}",
        cache.small_dir().display(),
        cache.large_dir().display()
    );

    let artist_store = ArtistStore::default();
    refresh_artist_store(&artist_store, &folders, &config.library.artist_separators);

    let resolver = DeezerArtistResolver::new(
        config.fetch.search_url.clone(),
        config.fetch.user_agent.clone(),
        config.fetch.resolve_timeout(),
    );
    let downloader = HttpImageDownloader::new(
        config.fetch.user_agent.clone(),
        config.fetch.fetch_timeout(),
        config.fetch.proxy(),
    )?;

    let (bus_sender, _) = broadcast::channel::<Message>(1024);
    let mut progress_logger = ProgressLogger::new(bus_sender.subscribe());
    let progress_thread = thread::Builder::new()
        .name("progress-logger".to_string())
        .spawn(move || progress_logger.run())?;

    let batch = Arc::new(ArtistImageBatch::new(
        resolver,
        downloader,
        cache,
        artist_store.clone(),
        BatchGeneration::default(),
        bus_sender,
        BatchSettings {
            worker_count: config.fetch.worker_count,
            thumbnail_size_px: config.fetch.thumbnail_size_px,
        },
    ));

    match args.rescan_every {
        None => {
            batch.start_batch();
            // The batch holds the last sender; dropping it closes the bus.
            drop(batch);
        }
        Some(interval) => {
            info!("Rescanning every {}s", interval.as_secs());
            spawn_batch(&batch)?;
            loop {
                thread::sleep(interval);
                rescan_and_restart(
                    &batch,
                    &artist_store,
                    &folders,
                    &config.library.artist_separators,
                )?;
            }
        }
    }

    if progress_thread.join().is_err() {
        warn!("Progress logger thread panicked");
    }
    Ok(())
}

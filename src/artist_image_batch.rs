//! Batch runner that fills the artist image cache for every artist missing a
//! thumbnail.
//!
//! A batch scans the thumbnail directory once, then spreads the missing artists
//! over a fixed number of worker threads. Each batch runs under a generation
//! number; starting a newer batch makes the older one's remaining work no-ops
//! without interrupting requests already on the wire.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};
use tokio::sync::broadcast::Sender;

use crate::artist_image_cache::ArtistImageCache;
use crate::artist_image_fetcher::{fetch_and_store, ImageDownloader};
use crate::artist_image_resolver::{ArtistImageResolver, ResolveOutcome};
use crate::library::artist_store::ArtistStore;
use crate::library::models::Artist;
use crate::protocol::{ArtistImageMessage, ArtistImageOutcome, Message};

/// Process-wide batch generation. The live value belongs to the most recently
/// started batch; workers of any other generation stand down.
#[derive(Debug, Clone, Default)]
pub struct BatchGeneration {
    live: Arc<AtomicU64>,
    issued: Arc<AtomicU64>,
}

impl BatchGeneration {
    /// Issues a generation number no earlier batch has used.
    pub fn mint(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Makes `generation` the live one. Last writer wins.
    pub fn activate(&self, generation: u64) {
        self.live.store(generation, Ordering::SeqCst);
    }

    pub fn is_live(&self, generation: u64) -> bool {
        self.live.load(Ordering::SeqCst) == generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Upper bound on artists processed at the same time.
    pub worker_count: usize,
    pub thumbnail_size_px: u32,
}

pub struct ArtistImageBatch<R, D> {
    resolver: R,
    downloader: D,
    cache: ArtistImageCache,
    artist_store: ArtistStore,
    generation: BatchGeneration,
    bus_producer: Sender<Message>,
    settings: BatchSettings,
}

fn panic_payload_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "non-string panic payload".to_string()
}

impl<R, D> ArtistImageBatch<R, D>
where
    R: ArtistImageResolver,
    D: ImageDownloader,
{
    pub fn new(
        resolver: R,
        downloader: D,
        cache: ArtistImageCache,
        artist_store: ArtistStore,
        generation: BatchGeneration,
        bus_producer: Sender<Message>,
        settings: BatchSettings,
    ) -> Self {
        Self {
            resolver,
            downloader,
            cache,
            artist_store,
            generation,
            bus_producer,
            settings,
        }
    }

    /// Mints a fresh generation and runs a batch under it.
    pub fn start_batch(&self) -> u64 {
        let generation = self.generation.mint();
        self.run_batch(generation);
        generation
    }

    /// Runs one batch under `generation`, which becomes the live generation.
    /// Returns once every dispatched artist has been handled.
    pub fn run_batch(&self, generation: u64) {
        self.generation.activate(generation);

        let artists = self.artist_store.snapshot();
        let total_artists = artists.len();
        let present = self.cached_thumbnails();
        let missing: Vec<Artist> = artists
            .into_iter()
            .filter(|artist| !present.contains(&artist.artisthash))
            .collect();
        let total = missing.len();

        info!(
            "Artist image batch {}: {} of {} artists missing an image",
            generation, total, total_artists
        );
        self.emit(ArtistImageMessage::BatchStarted {
            generation,
            missing: total,
            total_artists,
        });

        let completed = AtomicUsize::new(0);
        if total > 0 {
            let next_index = AtomicUsize::new(0);
            let drain = || {
                while let Some(artist) = missing.get(next_index.fetch_add(1, Ordering::SeqCst)) {
                    let outcome = self.process_artist_guarded(generation, artist);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    self.emit(ArtistImageMessage::ArtistProcessed {
                        generation,
                        artisthash: artist.artisthash.clone(),
                        outcome,
                        completed: done,
                        total,
                    });
                }
            };

            let worker_count = self.settings.worker_count.clamp(1, total);
            thread::scope(|scope| {
                let mut spawned = 0usize;
                for worker_index in 0..worker_count {
                    match thread::Builder::new()
                        .name(format!("artist-image-{worker_index}"))
                        .spawn_scoped(scope, &drain)
                    {
                        Ok(_) => spawned += 1,
                        Err(error) => {
                            warn!("Failed to spawn artist image worker: {}", error);
                            break;
                        }
                    }
                }
                if spawned == 0 {
                    drain();
                }
            });
        }

        let completed = completed.into_inner();
        info!(
            "Artist image batch {} finished: {}/{} artists processed",
            generation, completed, total
        );
        self.emit(ArtistImageMessage::BatchFinished {
            generation,
            completed,
            total,
        });
    }

    fn cached_thumbnails(&self) -> HashSet<String> {
        match self.cache.thumbnail_index() {
            Ok(present) => present,
            Err(error) => {
                // Per-artist thumbnail checks still prevent overwriting good entries.
                warn!(
                    "Failed to list artist thumbnails in {}: {}",
                    self.cache.small_dir().display(),
                    error
                );
                HashSet::new()
            }
        }
    }

    fn process_artist_guarded(&self, generation: u64, artist: &Artist) -> ArtistImageOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| self.process_artist(generation, artist)))
            .unwrap_or_else(|payload| {
                warn!(
                    "Artist image task for '{}' panicked: {}",
                    artist.name,
                    panic_payload_to_string(payload.as_ref())
                );
                ArtistImageOutcome::FetchFailed
            })
    }

    fn process_artist(&self, generation: u64, artist: &Artist) -> ArtistImageOutcome {
        if !self.generation.is_live(generation) {
            return ArtistImageOutcome::Superseded;
        }
        if self.cache.has_thumbnail(&artist.artisthash) {
            return ArtistImageOutcome::AlreadyCached;
        }

        let image_url = match self.resolver.resolve(&artist.name) {
            ResolveOutcome::Found(image_url) => image_url,
            ResolveOutcome::NoMatch => return ArtistImageOutcome::NoImageFound,
            ResolveOutcome::Unavailable(reason) => {
                debug!("Artist image lookup for '{}' unavailable: {}", artist.name, reason);
                return ArtistImageOutcome::NoImageFound;
            }
        };

        // The lookup may have outlived its batch; drop the result.
        if !self.generation.is_live(generation) {
            return ArtistImageOutcome::Superseded;
        }

        match fetch_and_store(
            &self.downloader,
            &self.cache,
            &image_url,
            &artist.artisthash,
            self.settings.thumbnail_size_px,
        ) {
            Ok(()) => {
                debug!("Stored artist image for '{}'", artist.name);
                ArtistImageOutcome::Stored
            }
            Err(error) if error.is_undecodable() => {
                debug!("Artist image for '{}' at {} is not an image", artist.name, image_url);
                ArtistImageOutcome::FetchFailed
            }
            Err(error) => {
                debug!(
                    "Artist image for '{}' from {} not stored: {}",
                    artist.name, image_url, error
                );
                ArtistImageOutcome::FetchFailed
            }
        }
    }

    fn emit(&self, message: ArtistImageMessage) {
        let _ = self.bus_producer.send(Message::ArtistImages(message));
    }
}

//! Downloads a resolved artist image and stores its two renditions.

use std::io::{self, Read};
use std::time::Duration;

use crate::artist_image_cache::ArtistImageCache;
use crate::image_pipeline::{self, RenderError};

/// Larger bodies are not artist pictures.
const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid proxy '{proxy}': {reason}")]
    Proxy { proxy: String, reason: String },
    #[error("image request failed: {0}")]
    Request(String),
    #[error("image read failed: {0}")]
    Read(#[from] io::Error),
    #[error("image response was empty")]
    EmptyBody,
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl FetchError {
    /// The body arrived but was not an image; nothing was written.
    pub fn is_undecodable(&self) -> bool {
        matches!(self, Self::Render(RenderError::Undecodable))
    }
}

pub trait ImageDownloader: Send + Sync {
    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP downloader, optionally routed through an HTTP or SOCKS proxy.
pub struct HttpImageDownloader {
    http_client: ureq::Agent,
    user_agent: String,
}

impl HttpImageDownloader {
    pub fn new(
        user_agent: impl Into<String>,
        timeout: Duration,
        proxy: Option<&str>,
    ) -> Result<Self, FetchError> {
        let mut builder = ureq::AgentBuilder::new().timeout(timeout);
        if let Some(proxy) = proxy {
            let parsed = ureq::Proxy::new(proxy).map_err(|error| FetchError::Proxy {
                proxy: proxy.to_string(),
                reason: error.to_string(),
            })?;
            builder = builder.proxy(parsed);
        }
        Ok(Self {
            http_client: builder.build(),
            user_agent: user_agent.into(),
        })
    }
}

impl ImageDownloader for HttpImageDownloader {
    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .http_client
            .get(url)
            .set("User-Agent", &self.user_agent)
            .call()
            .map_err(|error| FetchError::Request(error.to_string()))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_IMAGE_BYTES)
            .read_to_end(&mut bytes)?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(bytes)
    }
}

/// Downloads `url` and writes the large and thumbnail renditions for `artisthash`.
pub fn fetch_and_store(
    downloader: &dyn ImageDownloader,
    cache: &ArtistImageCache,
    url: &str,
    artisthash: &str,
    thumbnail_edge_px: u32,
) -> Result<(), FetchError> {
    let bytes = downloader.download(url)?;
    image_pipeline::write_artist_renditions(
        &bytes,
        &cache.large_path(artisthash),
        &cache.thumbnail_path(artisthash),
        thumbnail_edge_px,
    )?;
    Ok(())
}

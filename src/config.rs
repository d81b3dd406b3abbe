//! Persistent configuration model and defaults.

use std::path::PathBuf;
use std::time::Duration;

const APP_DIR_NAME: &str = "artsync";

/// Root configuration persisted to `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Artist image cache locations.
    pub paths: PathsConfig,
    #[serde(default)]
    /// Remote lookup and download behavior.
    pub fetch: FetchConfig,
    #[serde(default)]
    /// Catalog scan preferences.
    pub library: LibraryConfig,
}

/// Cache directories. Empty values resolve under the user cache directory.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub small_artist_images_dir: String,
    #[serde(default)]
    pub large_artist_images_dir: String,
}

/// Remote lookup and download preferences.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct FetchConfig {
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Edge length of the square thumbnail rendition.
    #[serde(default = "default_thumbnail_size_px")]
    pub thumbnail_size_px: u32,
    #[serde(default = "default_resolve_timeout_secs")]
    pub resolve_timeout_secs: u64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Upper bound on concurrently processed artists.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Proxy for image downloads, e.g. `socks5://127.0.0.1:1080`. Empty means direct.
    #[serde(default)]
    pub proxy_url: String,
}

/// Catalog scan preferences.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub folders: Vec<String>,
    /// Separators splitting multi-artist tag values.
    #[serde(default = "default_artist_separators")]
    pub artist_separators: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            user_agent: default_user_agent(),
            thumbnail_size_px: default_thumbnail_size_px(),
            resolve_timeout_secs: default_resolve_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            worker_count: default_worker_count(),
            proxy_url: String::new(),
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            artist_separators: default_artist_separators(),
        }
    }
}

impl FetchConfig {
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn proxy(&self) -> Option<&str> {
        let proxy = self.proxy_url.trim();
        (!proxy.is_empty()).then_some(proxy)
    }
}

impl PathsConfig {
    pub fn small_artist_images_dir(&self) -> Option<PathBuf> {
        resolve_cache_dir(&self.small_artist_images_dir, "small")
    }

    pub fn large_artist_images_dir(&self) -> Option<PathBuf> {
        resolve_cache_dir(&self.large_artist_images_dir, "large")
    }
}

fn resolve_cache_dir(configured: &str, rendition: &str) -> Option<PathBuf> {
    if !configured.trim().is_empty() {
        return Some(PathBuf::from(configured.trim()));
    }
    dirs::cache_dir().map(|path| {
        path.join(APP_DIR_NAME)
            .join("artist_images")
            .join(rendition)
    })
}

/// Default location of `config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|path| path.join(APP_DIR_NAME).join("config.toml"))
}

/// Clamps values that would stall or break a batch.
pub fn sanitize_config(config: Config) -> Config {
    let mut sanitized = config;
    sanitized.paths.small_artist_images_dir =
        sanitized.paths.small_artist_images_dir.trim().to_string();
    sanitized.paths.large_artist_images_dir =
        sanitized.paths.large_artist_images_dir.trim().to_string();
    sanitized.fetch.search_url = sanitized.fetch.search_url.trim().to_string();
    if sanitized.fetch.search_url.is_empty() {
        sanitized.fetch.search_url = default_search_url();
    }
    sanitized.fetch.proxy_url = sanitized.fetch.proxy_url.trim().to_string();
    sanitized.fetch.thumbnail_size_px = sanitized.fetch.thumbnail_size_px.max(1);
    sanitized.fetch.resolve_timeout_secs = sanitized.fetch.resolve_timeout_secs.max(1);
    sanitized.fetch.fetch_timeout_secs = sanitized.fetch.fetch_timeout_secs.max(1);
    sanitized.fetch.worker_count = sanitized.fetch.worker_count.max(1);
    sanitized.library.folders = sanitized
        .library
        .folders
        .into_iter()
        .map(|folder| folder.trim().to_string())
        .filter(|folder| !folder.is_empty())
        .collect();
    sanitized
        .library
        .artist_separators
        .retain(|separator| !separator.is_empty());
    sanitized
}

fn default_search_url() -> String {
    "https://api.deezer.com/search/artist".to_string()
}

fn default_user_agent() -> String {
    format!("artsync/{}", env!("CARGO_PKG_VERSION"))
}

fn default_thumbnail_size_px() -> u32 {
    64
}

fn default_resolve_timeout_secs() -> u64 {
    30
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

fn default_worker_count() -> usize {
    20
}

fn default_artist_separators() -> Vec<String> {
    vec![";".to_string(), "/".to_string()]
}

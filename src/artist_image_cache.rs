//! On-disk layout of the artist image cache.
//!
//! Each artist owns `<artisthash>.webp` in the small (thumbnail) directory and
//! the same name in the large directory. Only the thumbnail decides whether an
//! artist counts as fetched.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::PathsConfig;
use crate::image_pipeline::RENDITION_EXTENSION;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("no cache directory available for {0} artist images")]
    Unresolved(&'static str),
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistImageCache {
    small_dir: PathBuf,
    large_dir: PathBuf,
}

impl ArtistImageCache {
    pub fn new(small_dir: impl Into<PathBuf>, large_dir: impl Into<PathBuf>) -> Self {
        Self {
            small_dir: small_dir.into(),
            large_dir: large_dir.into(),
        }
    }

    pub fn from_config(paths: &PathsConfig) -> Result<Self, CacheError> {
        let small_dir = paths
            .small_artist_images_dir()
            .ok_or(CacheError::Unresolved("small"))?;
        let large_dir = paths
            .large_artist_images_dir()
            .ok_or(CacheError::Unresolved("large"))?;
        Ok(Self::new(small_dir, large_dir))
    }

    pub fn ensure_dirs(&self) -> Result<(), CacheError> {
        for dir in [&self.small_dir, &self.large_dir] {
            fs::create_dir_all(dir).map_err(|source| CacheError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn small_dir(&self) -> &Path {
        &self.small_dir
    }

    pub fn large_dir(&self) -> &Path {
        &self.large_dir
    }

    fn file_name(artisthash: &str) -> String {
        format!("{artisthash}.{RENDITION_EXTENSION}")
    }

    pub fn thumbnail_path(&self, artisthash: &str) -> PathBuf {
        self.small_dir.join(Self::file_name(artisthash))
    }

    pub fn large_path(&self, artisthash: &str) -> PathBuf {
        self.large_dir.join(Self::file_name(artisthash))
    }

    pub fn has_thumbnail(&self, artisthash: &str) -> bool {
        self.thumbnail_path(artisthash).is_file()
    }

    /// Hashes that already have a thumbnail, read from one directory listing.
    ///
    /// A missing directory is an empty cache.
    pub fn thumbnail_index(&self) -> io::Result<HashSet<String>> {
        let entries = match fs::read_dir(&self.small_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(error) => return Err(error),
        };

        let mut present = HashSet::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_rendition = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == RENDITION_EXTENSION);
            if !is_rendition || !entry.file_type().is_ok_and(|kind| kind.is_file()) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                present.insert(stem.to_string());
            }
        }
        Ok(present)
    }
}

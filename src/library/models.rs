//! Catalog records shared by scanning, extraction, and image batches.

use std::path::PathBuf;

use crate::fingerprint::fingerprint;

/// One indexed audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    /// Contributing artists, in tag order.
    pub artists: Vec<String>,
    pub album: String,
    /// Album artists, in tag order.
    pub album_artists: Vec<String>,
}

/// An album grouped from scanned tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub title: String,
    pub album_artists: Vec<String>,
}

/// An artist identity. `artisthash` is the fingerprint of `name` and is the
/// key used for deduplication and for cached image file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artist {
    pub name: String,
    pub artisthash: String,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let artisthash = fingerprint(&name);
        Self { name, artisthash }
    }
}

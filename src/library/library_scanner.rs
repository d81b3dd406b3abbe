//! Builds the track/album catalog from tagged audio files on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::fingerprint::fingerprint;
use crate::library::models::{Album, Track};
use crate::media_file_discovery::collect_audio_files_from_folder;
use crate::metadata::metadata_tags::{read_artist_tags, ArtistTags};

#[derive(Debug, Clone, Default)]
pub struct LibraryScan {
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
}

/// Splits a multi-artist tag value ("A; B/C") into trimmed, non-empty names.
pub fn split_artist_names(value: &str, separators: &[String]) -> Vec<String> {
    let mut names = vec![value.to_string()];
    for separator in separators.iter().filter(|separator| !separator.is_empty()) {
        names = names
            .iter()
            .flat_map(|name| name.split(separator.as_str()))
            .map(str::to_string)
            .collect();
    }
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn track_from_tags(path: PathBuf, tags: ArtistTags, separators: &[String]) -> Track {
    let artists = split_artist_names(&tags.artist, separators);
    let mut album_artists = split_artist_names(&tags.album_artist, separators);
    if album_artists.is_empty() {
        album_artists = artists.clone();
    }
    let title = if tags.title.is_empty() {
        title_from_path(&path)
    } else {
        tags.title
    };

    Track {
        path,
        title,
        artists,
        album: tags.album,
        album_artists,
    }
}

/// Groups tracks into albums keyed by album title and lead album artist.
pub fn albums_from_tracks(tracks: &[Track]) -> Vec<Album> {
    let mut seen = HashSet::new();
    let mut albums = Vec::new();
    for track in tracks.iter().filter(|track| !track.album.trim().is_empty()) {
        let lead_artist = track
            .album_artists
            .first()
            .map(|name| fingerprint(name))
            .unwrap_or_default();
        if seen.insert((fingerprint(&track.album), lead_artist)) {
            albums.push(Album {
                title: track.album.clone(),
                album_artists: track.album_artists.clone(),
            });
        }
    }
    albums
}

pub fn scan_library(folders: &[PathBuf], separators: &[String]) -> LibraryScan {
    let mut tracks = Vec::new();
    for folder in folders {
        let files = collect_audio_files_from_folder(folder);
        info!(
            "Scanning {} audio files under {}",
            files.len(),
            folder.display()
        );
        for path in files {
            match read_artist_tags(&path) {
                Some(tags) => tracks.push(track_from_tags(path, tags, separators)),
                None => debug!("Skipping untagged file {}", path.display()),
            }
        }
    }

    let albums = albums_from_tracks(&tracks);
    info!(
        "Library scan found {} tracks across {} albums",
        tracks.len(),
        albums.len()
    );
    LibraryScan { tracks, albums }
}

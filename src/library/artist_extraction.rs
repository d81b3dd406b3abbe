//! Derives the deduplicated artist universe from track and album metadata.

use std::collections::{BTreeSet, HashSet};

use crate::library::models::{Album, Artist, Track};

pub fn artists_from_tracks(tracks: &[Track]) -> BTreeSet<String> {
    tracks
        .iter()
        .flat_map(|track| track.artists.iter())
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn album_artists(albums: &[Album]) -> BTreeSet<String> {
    albums
        .iter()
        .flat_map(|album| album.album_artists.iter())
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns one artist per distinct fingerprint.
///
/// Names are sorted before deduplication, so when several spellings share a
/// fingerprint the first one in byte order survives regardless of scan order.
pub fn all_artists(tracks: &[Track], albums: &[Album]) -> Vec<Artist> {
    let mut names = artists_from_tracks(tracks);
    names.extend(album_artists(albums));

    let mut seen_hashes = HashSet::with_capacity(names.len());
    names
        .into_iter()
        .map(Artist::new)
        .filter(|artist| seen_hashes.insert(artist.artisthash.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::all_artists;
    use crate::library::models::{Album, Track};

    fn track(artists: &[&str]) -> Track {
        Track {
            path: PathBuf::from("/music/track.flac"),
            title: "Track".to_string(),
            artists: artists.iter().map(|name| name.to_string()).collect(),
            album: "Album".to_string(),
            album_artists: Vec::new(),
        }
    }

    fn album(album_artists: &[&str]) -> Album {
        Album {
            title: "Album".to_string(),
            album_artists: album_artists.iter().map(|name| name.to_string()).collect(),
        }
    }

    #[test]
    fn test_all_artists_dedups_case_variants_across_tracks_and_albums() {
        let tracks = vec![track(&["Daft Punk"]), track(&["daft punk"])];
        let albums = vec![album(&["DAFT PUNK"])];

        let artists = all_artists(&tracks, &albums);
        assert_eq!(artists.len(), 1);
        // "DAFT PUNK" sorts first in byte order.
        assert_eq!(artists[0].name, "DAFT PUNK");
    }

    #[test]
    fn test_all_artists_is_independent_of_input_order() {
        let forward = all_artists(
            &[track(&["Björk", "Bjork"]), track(&["Air"])],
            &[album(&["air"])],
        );
        let reversed = all_artists(
            &[track(&["Air"]), track(&["Bjork", "Björk"])],
            &[album(&["air"])],
        );
        assert_eq!(forward, reversed);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn test_all_artists_drops_blank_names() {
        let artists = all_artists(&[track(&["", "   ", "Low"])], &[]);
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].name, "Low");
    }

    #[test]
    fn test_all_artists_keeps_distinct_identities() {
        let artists = all_artists(&[track(&["Coldplay", "Coldplay (Live)"])], &[]);
        assert_eq!(artists.len(), 2);
    }
}

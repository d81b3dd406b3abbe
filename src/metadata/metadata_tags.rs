//! Artist-related tag readers backed by `lofty`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use lofty::config::{ParseOptions, ParsingMode};
use lofty::file::TaggedFile;
use lofty::file::TaggedFileExt;
use lofty::prelude::Accessor;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};
use log::debug;

/// Raw tag values a catalog scan needs. Multi-artist values are left unsplit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtistTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub album_artist: String,
}

fn first_non_empty_value<F>(primary_tag: Option<&Tag>, tags: &[Tag], mut extractor: F) -> String
where
    F: FnMut(&Tag) -> Option<String>,
{
    primary_tag
        .into_iter()
        .chain(tags.iter())
        .filter_map(|tag| extractor(tag))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn tag_parse_options(parsing_mode: ParsingMode, max_junk_bytes: usize) -> ParseOptions {
    ParseOptions::new()
        .read_properties(false)
        .read_cover_art(false)
        .parsing_mode(parsing_mode)
        .max_junk_bytes(max_junk_bytes)
}

fn probe_by_extension(path: &Path) -> Result<TaggedFile, String> {
    Probe::open(path)
        .map_err(|error| format!("extension probe failed: {error}"))?
        .options(tag_parse_options(ParsingMode::BestAttempt, 1024))
        .read()
        .map_err(|error| format!("best-attempt parse failed: {error}"))
}

/// Second chance for files whose extension lies about their container.
fn probe_by_content(path: &Path) -> Result<TaggedFile, String> {
    let file = File::open(path).map_err(|error| format!("open failed: {error}"))?;
    Probe::new(BufReader::new(file))
        .options(tag_parse_options(ParsingMode::Relaxed, 64 * 1024))
        .guess_file_type()
        .map_err(|error| format!("content sniffing failed: {error}"))?
        .read()
        .map_err(|error| format!("relaxed parse failed: {error}"))
}

fn read_tagged_file(path: &Path) -> Option<TaggedFile> {
    let first_error = match probe_by_extension(path) {
        Ok(tagged_file) => return Some(tagged_file),
        Err(reason) => reason,
    };
    match probe_by_content(path) {
        Ok(tagged_file) => {
            debug!("Tags of {} recovered by content sniffing", path.display());
            Some(tagged_file)
        }
        Err(reason) => {
            debug!("No tags read from {}: {}; {}", path.display(), first_error, reason);
            None
        }
    }
}

/// Reads title/artist/album/album-artist tags, or `None` if the file has no
/// parseable tag container.
pub fn read_artist_tags(path: &Path) -> Option<ArtistTags> {
    let tagged_file = read_tagged_file(path)?;
    let primary_tag = tagged_file.primary_tag();
    let tags = tagged_file.tags();

    let title = first_non_empty_value(primary_tag, tags, |tag| {
        tag.title().map(|value| value.into_owned())
    });
    let artist = first_non_empty_value(primary_tag, tags, |tag| {
        tag.artist().map(|value| value.into_owned())
    });
    let album = first_non_empty_value(primary_tag, tags, |tag| {
        tag.album().map(|value| value.into_owned())
    });
    let album_artist = first_non_empty_value(primary_tag, tags, |tag| {
        tag.get_string(ItemKey::AlbumArtist).map(str::to_string)
    });

    Some(ArtistTags {
        title,
        artist,
        album,
        album_artist,
    })
}

#[cfg(test)]
mod tests {
    use super::read_artist_tags;
    use std::fs;

    #[test]
    fn test_read_artist_tags_missing_file_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        assert!(read_artist_tags(&dir.path().join("missing.mp3")).is_none());
    }

    #[test]
    fn test_read_artist_tags_non_audio_content_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("notes.flac");
        fs::write(&path, b"this is plain text, not a flac stream").expect("fixture write");
        assert!(read_artist_tags(&path).is_none());
    }
}

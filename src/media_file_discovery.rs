//! Finds audio files under library folders.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

pub const SUPPORTED_AUDIO_EXTENSIONS: [&str; 8] =
    ["mp3", "wav", "ogg", "opus", "flac", "aac", "m4a", "mp4"];

pub fn is_supported_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_AUDIO_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Dot-directories hold trash, sync state, and similar non-library content.
fn is_hidden_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

/// Every supported audio file below `library_root`, sorted by path.
pub fn collect_audio_files_from_folder(library_root: &Path) -> Vec<PathBuf> {
    let mut audio_files = Vec::new();
    let mut pending = vec![library_root.to_path_buf()];

    while let Some(folder) = pending.pop() {
        let listing = match fs::read_dir(&folder) {
            Ok(listing) => listing,
            Err(err) if folder == library_root => {
                warn!("Cannot read library folder {}: {}", folder.display(), err);
                continue;
            }
            Err(err) => {
                debug!("Skipping unreadable folder {}: {}", folder.display(), err);
                continue;
            }
        };

        for entry in listing.flatten() {
            let path = entry.path();
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => {
                    if !is_hidden_dir(&path) {
                        pending.push(path);
                    }
                }
                Ok(kind) if kind.is_file() && is_supported_audio_file(&path) => {
                    audio_files.push(path);
                }
                Ok(_) => {}
                Err(err) => debug!("Failed to inspect {}: {}", path.display(), err),
            }
        }
    }

    audio_files.sort_unstable();
    audio_files
}

//! Image decoding and rendition writing for the artist image cache.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use zune_core::{colorspace::ColorSpace, options::DecoderOptions};
use zune_jpeg::JpegDecoder;

/// Codec every rendition is written in.
pub const RENDITION_FORMAT: ImageFormat = ImageFormat::WebP;
/// File extension matching [`RENDITION_FORMAT`].
pub const RENDITION_EXTENSION: &str = "webp";
const TEMP_SUFFIX: &str = "tmp";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("response body is not a decodable image")]
    Undecodable,
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

fn ensure_parent_dir(path: &Path) -> Result<(), RenderError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.exists() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|source| RenderError::Io {
        path: parent.to_path_buf(),
        source,
    })
}

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique temporary sibling for one write of `target_path`. Concurrent writers
/// of the same rendition never share a temp file.
pub fn temp_path_for(target_path: &Path) -> PathBuf {
    let sequence = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    target_path.with_extension(format!(
        "{RENDITION_EXTENSION}.{}-{sequence}.{TEMP_SUFFIX}",
        std::process::id()
    ))
}

fn save_rendition_atomic(image: &DynamicImage, target_path: &Path) -> Result<(), RenderError> {
    ensure_parent_dir(target_path)?;
    let temp_path = temp_path_for(target_path);
    // The WebP encoder only accepts 8-bit RGB(A).
    let encodable = DynamicImage::ImageRgba8(image.to_rgba8());
    if let Err(source) = encodable.save_with_format(&temp_path, RENDITION_FORMAT) {
        let _ = fs::remove_file(&temp_path);
        return Err(RenderError::Encode {
            path: target_path.to_path_buf(),
            source,
        });
    }
    fs::rename(&temp_path, target_path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        RenderError::Io {
            path: target_path.to_path_buf(),
            source,
        }
    })
}

fn looks_like_jpeg(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0xff && bytes[1] == 0xd8
}

fn decode_jpeg_non_strict(bytes: &[u8]) -> Option<DynamicImage> {
    if !looks_like_jpeg(bytes) {
        return None;
    }

    let options = DecoderOptions::new_cmd()
        .set_strict_mode(false)
        .jpeg_set_out_colorspace(ColorSpace::RGBA);
    let mut decoder = JpegDecoder::new_with_options(bytes, options);
    let pixels = decoder.decode().ok()?;
    let (width, height) = decoder.dimensions()?;
    let image = image::RgbaImage::from_raw(width as u32, height as u32, pixels)?;
    Some(DynamicImage::ImageRgba8(image))
}

/// Decodes any format the `image` crate recognizes, retrying slightly broken
/// JPEGs with a non-strict decoder.
pub fn decode_image_from_memory_with_fallback(bytes: &[u8]) -> Option<DynamicImage> {
    image::load_from_memory(bytes)
        .ok()
        .or_else(|| decode_jpeg_non_strict(bytes))
}

/// Square of `edge_px` pixels, center-cropped to fill. Unlike a plain
/// `resize` to `(edge, edge)`, non-square pictures are cropped rather than
/// squashed.
pub fn square_thumbnail(image: &DynamicImage, edge_px: u32) -> DynamicImage {
    let edge = edge_px.max(1);
    image.resize_to_fill(edge, edge, FilterType::Lanczos3)
}

/// Decodes `bytes` and writes the full-size rendition to `large_path`, then the
/// square thumbnail to `small_path`.
///
/// Nothing is written when the bytes do not decode. The two writes are
/// independent: a failure after the large write leaves it in place.
pub fn write_artist_renditions(
    bytes: &[u8],
    large_path: &Path,
    small_path: &Path,
    thumbnail_edge_px: u32,
) -> Result<(), RenderError> {
    let decoded = decode_image_from_memory_with_fallback(bytes).ok_or(RenderError::Undecodable)?;
    save_rendition_atomic(&decoded, large_path)?;
    let thumbnail = square_thumbnail(&decoded, thumbnail_edge_px);
    save_rendition_atomic(&thumbnail, small_path)
}

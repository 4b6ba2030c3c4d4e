use crate::error::ReadError;
use crate::exif_reader::{read_embedded_metadata, EmbeddedMetadata};
use crate::record::{
    CaptureSource, ImageRecord, Thumbnail, ThumbnailSource, DEFAULT_DATE_FORMAT,
};
use chrono::{DateTime, Local, NaiveDateTime};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 150;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub thumbnail_width: u32,
    pub date_format: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

pub fn extract(path: &Path) -> Result<ImageRecord, ReadError> {
    extract_with_options(path, &ExtractOptions::default())
}

/// Reads one JPEG into an [`ImageRecord`].
///
/// Capture time: `DateTimeOriginal`, then `DateTime`, then the file creation time.
/// Dimensions: EXIF tags, then the frame header (or the decoded size), else unknown.
/// Thumbnail: embedded EXIF preview, then a scaled full decode, else none.
///
/// Only an unreadable file or bytes that no decoder accepts are errors.
pub fn extract_with_options(path: &Path, options: &ExtractOptions) -> Result<ImageRecord, ReadError> {
    let bytes = fs::read(path).map_err(|source| ReadError::FileUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let embedded = read_embedded_metadata(&bytes);
    if embedded.is_none() {
        debug!(path = %path.display(), "no EXIF container");
    }

    let header = header_dimensions(&bytes);
    let mut decoded = None;
    if header.is_none() {
        debug!(path = %path.display(), "frame header unreadable, trying full decode");
        match decode_full(&bytes) {
            Ok(image) => decoded = Some(image),
            Err(reason) => {
                return Err(ReadError::UnsupportedImage {
                    path: path.to_path_buf(),
                    reason,
                })
            }
        }
    }

    let (captured_at, capture_source) = match capture_time_from_exif(embedded.as_ref()) {
        Some(found) => found,
        None => {
            debug!(path = %path.display(), "falling back to file creation time");
            (file_created_at(path)?, CaptureSource::FileCreated)
        }
    };

    let decoded_dims = decoded.as_ref().map(|image| (image.width(), image.height()));
    let frame_dims = header.or(decoded_dims);
    let width = embedded
        .as_ref()
        .and_then(|meta| meta.width)
        .or(frame_dims.map(|(w, _)| w));
    let height = embedded
        .as_ref()
        .and_then(|meta| meta.height)
        .or(frame_dims.map(|(_, h)| h));

    let thumbnail = build_thumbnail(
        embedded
            .as_ref()
            .and_then(|meta| meta.thumbnail_jpeg.as_deref()),
        decoded,
        &bytes,
        options.thumbnail_width,
    );
    if thumbnail.is_none() {
        debug!(path = %path.display(), "no thumbnail");
    }

    Ok(ImageRecord::with_date_format(
        path.to_path_buf(),
        captured_at,
        capture_source,
        &options.date_format,
    )
    .with_dimensions(width, height)
    .with_thumbnail(thumbnail))
}

fn capture_time_from_exif(
    embedded: Option<&EmbeddedMetadata>,
) -> Option<(NaiveDateTime, CaptureSource)> {
    let meta = embedded?;
    meta.date_time_original
        .map(|date| (date, CaptureSource::DateTimeOriginal))
        .or_else(|| meta.date_time.map(|date| (date, CaptureSource::DateTime)))
}

/// Creation time in local wall-clock time. Filesystems that keep no birth time report the
/// modification time instead.
pub fn file_created_at(path: &Path) -> Result<NaiveDateTime, ReadError> {
    let unavailable = |source| ReadError::FileUnavailable {
        path: path.to_path_buf(),
        source,
    };
    let meta = fs::metadata(path).map_err(unavailable)?;
    let time = meta
        .created()
        .or_else(|_| meta.modified())
        .map_err(unavailable)?;
    Ok(DateTime::<Local>::from(time).naive_local())
}

/// Width and height from the frame header, without decoding pixels. Bytes that are not
/// JPEG despite the extension are read with their guessed format.
fn header_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg)
        .into_dimensions()
        .ok()
        .or_else(|| {
            ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()
                .ok()?
                .into_dimensions()
                .ok()
        })
        .filter(|(w, h)| *w > 0 && *h > 0)
}

/// Embedded preview, else a scaled copy of the full image, else nothing.
fn build_thumbnail(
    embedded_jpeg: Option<&[u8]>,
    decoded: Option<DynamicImage>,
    bytes: &[u8],
    target_width: u32,
) -> Option<Thumbnail> {
    embedded_jpeg
        .and_then(decode_embedded_thumbnail)
        .or_else(|| {
            let source = match decoded {
                Some(image) => image,
                None => decode_full(bytes)
                    .map_err(|reason| debug!(%reason, "full decode failed"))
                    .ok()?,
            };
            Some(scaled_thumbnail(&source, target_width))
        })
}

/// JPEG decoder first, then whatever format the bytes look like.
fn decode_full(bytes: &[u8]) -> Result<DynamicImage, String> {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).or_else(|jpeg_err| {
        image::load_from_memory(bytes).map_err(|guess_err| format!("{jpeg_err}; {guess_err}"))
    })
}

fn decode_embedded_thumbnail(jpeg: &[u8]) -> Option<Thumbnail> {
    let image = image::load_from_memory_with_format(jpeg, ImageFormat::Jpeg).ok()?;
    Some(Thumbnail::from_rgb_image(
        ThumbnailSource::Embedded,
        image.to_rgb8(),
    ))
}

fn scaled_thumbnail(source: &DynamicImage, target_width: u32) -> Thumbnail {
    let target_width = target_width.max(1);
    let height = scaled_height(source.width(), source.height(), target_width);
    let scaled = source.resize_exact(target_width, height, FilterType::Triangle);
    Thumbnail::from_rgb_image(ThumbnailSource::Scaled, scaled.to_rgb8())
}

/// `round(height / (width / target_width))`, never below one pixel.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let factor = f64::from(width) / f64::from(target_width);
    ((f64::from(height) / factor).round() as u32).max(1)
}

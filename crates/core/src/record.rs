use crate::sanitize::normalize_proposed_name;
use chrono::NaiveDateTime;
use image::RgbImage;
use serde::Serialize;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

/// Which tier of the date fallback chain produced `captured_at`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum CaptureSource {
    DateTimeOriginal,
    DateTime,
    FileCreated,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ThumbnailSource {
    Embedded,
    Scaled,
}

/// Decoded RGB preview, `rgb.len() == width * height * 3`.
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub source: ThumbnailSource,
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Thumbnail {
    pub fn from_rgb_image(source: ThumbnailSource, image: RgbImage) -> Self {
        Self {
            source,
            width: image.width(),
            height: image.height(),
            rgb: image.into_raw(),
        }
    }
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("source", &self.source)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgb_len", &self.rgb.len())
            .finish()
    }
}

/// One JPEG on disk plus everything read from it at load time.
///
/// Only `current_path` and `proposed_name` change after construction. The proposed name is
/// always sanitised and `.jpg` suffixed, see [`ImageRecord::set_proposed_name`].
#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    current_path: PathBuf,
    captured_at: NaiveDateTime,
    capture_source: CaptureSource,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(skip)]
    thumbnail: Option<Thumbnail>,
    proposed_name: String,
}

impl ImageRecord {
    pub fn new(
        current_path: PathBuf,
        captured_at: NaiveDateTime,
        capture_source: CaptureSource,
    ) -> Self {
        Self::with_date_format(
            current_path,
            captured_at,
            capture_source,
            DEFAULT_DATE_FORMAT,
        )
    }

    pub fn with_date_format(
        current_path: PathBuf,
        captured_at: NaiveDateTime,
        capture_source: CaptureSource,
        date_format: &str,
    ) -> Self {
        let proposed_name = normalize_proposed_name(&format_capture_time(captured_at, date_format));
        Self {
            current_path,
            captured_at,
            capture_source,
            width: None,
            height: None,
            thumbnail: None,
            proposed_name,
        }
    }

    pub fn with_dimensions(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width.filter(|v| *v > 0);
        self.height = height.filter(|v| *v > 0);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Option<Thumbnail>) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn current_name(&self) -> String {
        self.current_path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    pub fn capture_source(&self) -> CaptureSource {
        self.capture_source
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// `W x H`, or `n/a` when either dimension is unknown.
    pub fn resolution(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) => format!("{} x {}", w, h),
            _ => "n/a".to_string(),
        }
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    pub fn proposed_name(&self) -> &str {
        &self.proposed_name
    }

    pub fn set_proposed_name(&mut self, name: &str) {
        self.proposed_name = normalize_proposed_name(name);
    }

    pub(crate) fn set_current_path(&mut self, path: PathBuf) {
        self.current_path = path;
    }
}

/// Falls back to [`DEFAULT_DATE_FORMAT`] when `date_format` has invalid strftime items.
fn format_capture_time(captured_at: NaiveDateTime, date_format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", captured_at.format(date_format)).is_err() {
        return captured_at.format(DEFAULT_DATE_FORMAT).to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn taken(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .expect("valid timestamp")
    }

    #[test]
    fn proposed_name_comes_from_capture_time() {
        let record = ImageRecord::new(
            PathBuf::from("/photos/a.jpg"),
            taken(2020, 1, 1, 10, 0, 0),
            CaptureSource::FileCreated,
        );
        assert_eq!(record.proposed_name(), "2020-01-01 10-00-00.jpg");
        assert_eq!(record.current_name(), "a.jpg");
    }

    #[test]
    fn custom_date_format_is_applied() {
        let record = ImageRecord::with_date_format(
            PathBuf::from("/photos/b.jpg"),
            taken(2021, 6, 15, 8, 30, 0),
            CaptureSource::DateTimeOriginal,
            "%Y%m%d_%H%M%S",
        );
        assert_eq!(record.proposed_name(), "20210615_083000.jpg");
    }

    #[test]
    fn invalid_date_format_falls_back_to_default() {
        let record = ImageRecord::with_date_format(
            PathBuf::from("/photos/b.jpg"),
            taken(2021, 6, 15, 8, 30, 0),
            CaptureSource::DateTimeOriginal,
            "%Y-%Q",
        );
        assert_eq!(record.proposed_name(), "2021-06-15 08-30-00.jpg");
    }

    #[test]
    fn proposed_name_keeps_jpg_suffix_after_every_edit() {
        let mut record = ImageRecord::new(
            PathBuf::from("/photos/a.jpg"),
            taken(2020, 1, 1, 10, 0, 0),
            CaptureSource::FileCreated,
        );
        for input in ["holiday", "holiday.JPG", "", "nested/name", "x.jpeg"] {
            record.set_proposed_name(input);
            assert!(
                record.proposed_name().to_lowercase().ends_with(".jpg"),
                "{input:?} -> {}",
                record.proposed_name()
            );
        }
        record.set_proposed_name("holiday.JPG");
        assert_eq!(record.proposed_name(), "holiday.JPG");
    }

    #[test]
    fn resolution_reports_unknown_dimensions() {
        let record = ImageRecord::new(
            PathBuf::from("/photos/a.jpg"),
            taken(2020, 1, 1, 10, 0, 0),
            CaptureSource::FileCreated,
        );
        assert_eq!(record.resolution(), "n/a");

        let record = record.with_dimensions(Some(4000), Some(0));
        assert_eq!(record.height(), None);
        assert_eq!(record.resolution(), "n/a");

        let record = record.with_dimensions(Some(4000), Some(3000));
        assert_eq!(record.resolution(), "4000 x 3000");
    }

    #[test]
    fn thumbnail_debug_omits_pixels() {
        let thumb = Thumbnail::from_rgb_image(ThumbnailSource::Scaled, RgbImage::new(4, 2));
        assert_eq!(thumb.rgb.len(), 4 * 2 * 3);
        let debug = format!("{thumb:?}");
        assert!(debug.contains("rgb_len: 24"));
    }
}

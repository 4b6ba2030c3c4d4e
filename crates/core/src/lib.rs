//! Capture-date based renaming of JPEG files.
//!
//! [`extract`] turns a file into an [`ImageRecord`]; [`rename`] moves it to its proposed
//! name. [`collect_jpg_files`], [`extract_all`] and [`rename_all`] drive whole folders.

mod batch;
mod config;
mod error;
mod exif_reader;
mod extractor;
#[cfg(test)]
mod fixtures;
mod record;
mod rename;
mod sanitize;
mod scan;

pub use batch::{extract_all, rename_all, BatchSummary, LoadResult, RenameReport};
pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
};
pub use error::{ReadError, RenameError};
pub use extractor::{extract, extract_with_options, ExtractOptions, DEFAULT_THUMBNAIL_WIDTH};
pub use record::{CaptureSource, ImageRecord, Thumbnail, ThumbnailSource, DEFAULT_DATE_FORMAT};
pub use rename::{
    compute_target, rename, rename_with_options, RenameOptions, RenameOutcome,
    DEFAULT_MAX_CONFLICT_ATTEMPTS,
};
pub use scan::{collect_jpg_files, is_jpg, ScanOptions, ScanResult, ScanStats};

use crate::error::{ReadError, RenameError};
use crate::extractor::{extract_with_options, ExtractOptions};
use crate::record::ImageRecord;
use crate::rename::{rename_with_options, RenameOptions, RenameOutcome};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Default)]
pub struct LoadResult {
    pub records: Vec<ImageRecord>,
    pub failures: Vec<ReadError>,
}

/// Extracts every path in parallel. Records and failures keep the input order.
pub fn extract_all(paths: &[PathBuf], options: &ExtractOptions) -> LoadResult {
    let results: Vec<Result<ImageRecord, ReadError>> = paths
        .par_iter()
        .map(|path| extract_with_options(path, options))
        .collect();

    let mut loaded = LoadResult::default();
    for result in results {
        match result {
            Ok(record) => loaded.records.push(record),
            Err(err) => {
                warn!(error = %err, "skipping file");
                loaded.failures.push(err);
            }
        }
    }
    loaded
}

#[derive(Debug)]
pub struct RenameReport {
    pub path: PathBuf,
    pub result: Result<RenameOutcome, RenameError>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub renamed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_reports(reports: &[RenameReport]) -> Self {
        reports
            .iter()
            .fold(Self::default(), |mut summary, report| {
                match &report.result {
                    Ok(RenameOutcome::Renamed { .. }) => summary.renamed += 1,
                    Ok(RenameOutcome::Unchanged) => summary.unchanged += 1,
                    Err(_) => summary.failed += 1,
                }
                summary
            })
    }
}

/// Renames each record in order on the calling thread. A failure is reported and the batch
/// moves on; earlier renames are kept.
pub fn rename_all(records: &mut [ImageRecord], options: &RenameOptions) -> Vec<RenameReport> {
    records
        .iter_mut()
        .map(|record| {
            let path = record.current_path().to_path_buf();
            let result = rename_with_options(record, options);
            if let Err(err) = &result {
                warn!(path = %path.display(), error = %err, "rename failed");
            }
            RenameReport { path, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenameError;
    use crate::fixtures::{exif_jpeg, plain_jpeg, write_file, ExifFixture};
    use crate::record::CaptureSource;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn record_named(dir: &std::path::Path, file: &str, proposed: &str) -> ImageRecord {
        let path = write_file(dir, file, file.as_bytes());
        let taken = NaiveDate::from_ymd_opt(2021, 6, 15)
            .and_then(|d| d.and_hms_opt(8, 30, 0))
            .expect("valid timestamp");
        let mut record = ImageRecord::new(path, taken, CaptureSource::DateTimeOriginal);
        record.set_proposed_name(proposed);
        record
    }

    #[test]
    fn extract_all_keeps_order_and_reports_failures() {
        let temp = tempdir().expect("tempdir");
        let a = write_file(temp.path(), "a.jpg", &plain_jpeg(32, 16));
        let b = write_file(
            temp.path(),
            "b.jpg",
            &exif_jpeg(
                32,
                16,
                &ExifFixture {
                    date_time_original: Some("2021:06:15 08:30:00"),
                    ..ExifFixture::default()
                },
            ),
        );
        let junk = write_file(temp.path(), "junk.jpg", b"nope");
        let missing = temp.path().join("missing.jpg");

        let loaded = extract_all(
            &[a.clone(), junk.clone(), b.clone(), missing.clone()],
            &ExtractOptions::default(),
        );
        let paths: Vec<_> = loaded.records.iter().map(|r| r.current_path().to_path_buf()).collect();
        assert_eq!(paths, vec![a, b]);
        assert_eq!(loaded.records[0].capture_source(), CaptureSource::FileCreated);
        assert_eq!(loaded.records[1].proposed_name(), "2021-06-15 08-30-00.jpg");

        let failed: Vec<_> = loaded.failures.iter().map(|e| e.path().clone()).collect();
        assert_eq!(failed, vec![junk, missing]);
        assert!(matches!(loaded.failures[0], ReadError::UnsupportedImage { .. }));
        assert!(matches!(loaded.failures[1], ReadError::FileUnavailable { .. }));
    }

    #[test]
    fn duplicate_targets_without_resolution_keep_first_success() {
        let temp = tempdir().expect("tempdir");
        let mut records = vec![
            record_named(temp.path(), "first.jpg", "same"),
            record_named(temp.path(), "second.jpg", "same"),
        ];

        let reports = rename_all(&mut records, &RenameOptions::resolving(false));
        assert!(matches!(reports[0].result, Ok(RenameOutcome::Renamed { .. })));
        assert!(matches!(
            reports[1].result,
            Err(RenameError::TargetExists { .. })
        ));
        assert_eq!(reports[1].path, temp.path().join("second.jpg"));

        assert_eq!(fs::read(temp.path().join("same.jpg")).expect("read"), b"first.jpg");
        assert!(temp.path().join("second.jpg").exists());
        assert_eq!(records[0].current_path(), temp.path().join("same.jpg").as_path());
        assert_eq!(
            BatchSummary::from_reports(&reports),
            BatchSummary {
                renamed: 1,
                unchanged: 0,
                failed: 1,
            }
        );
    }

    #[test]
    fn duplicate_targets_with_resolution_get_suffix() {
        let temp = tempdir().expect("tempdir");
        let mut records = vec![
            record_named(temp.path(), "first.jpg", "same"),
            record_named(temp.path(), "second.jpg", "same"),
            record_named(temp.path(), "same_1.jpg", "same_1"),
        ];

        let reports = rename_all(&mut records, &RenameOptions::resolving(true));
        assert!(reports.iter().all(|r| r.result.is_ok()));
        assert_eq!(records[0].proposed_name(), "same.jpg");
        assert_eq!(records[1].proposed_name(), "same_2.jpg");
        assert_eq!(records[2].proposed_name(), "same_1.jpg");
        assert_eq!(fs::read(temp.path().join("same_2.jpg")).expect("read"), b"second.jpg");
        assert_eq!(
            BatchSummary::from_reports(&reports),
            BatchSummary {
                renamed: 2,
                unchanged: 1,
                failed: 0,
            }
        );
    }

    #[test]
    fn two_files_resolve_to_first_suffix() {
        let temp = tempdir().expect("tempdir");
        let mut records = vec![
            record_named(temp.path(), "first.jpg", "same"),
            record_named(temp.path(), "second.jpg", "same"),
        ];

        rename_all(&mut records, &RenameOptions::resolving(true));
        assert_eq!(records[1].proposed_name(), "same_1.jpg");
        assert_eq!(records[1].current_path(), temp.path().join("same_1.jpg").as_path());
    }
}

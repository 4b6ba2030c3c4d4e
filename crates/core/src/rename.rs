use crate::error::RenameError;
use crate::record::ImageRecord;
use crate::sanitize::split_jpg_suffix;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_MAX_CONFLICT_ATTEMPTS: usize = 10_000;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RenameOptions {
    pub resolve_conflicts: bool,
    pub max_conflict_attempts: usize,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            resolve_conflicts: false,
            max_conflict_attempts: DEFAULT_MAX_CONFLICT_ATTEMPTS,
        }
    }
}

impl RenameOptions {
    pub fn resolving(resolve_conflicts: bool) -> Self {
        Self {
            resolve_conflicts,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RenameOutcome {
    Unchanged,
    Renamed { from: PathBuf, to: PathBuf },
}

/// Sibling of the current file named after the proposed name.
pub fn compute_target(record: &ImageRecord) -> PathBuf {
    sibling(record.current_path(), record.proposed_name())
}

pub fn rename(record: &mut ImageRecord, resolve_conflicts: bool) -> Result<RenameOutcome, RenameError> {
    rename_with_options(record, &RenameOptions::resolving(resolve_conflicts))
}

/// Moves the record's file to its proposed name.
///
/// A target equal to the current path (ignoring case) is a no-op. An existing target is an
/// error unless `resolve_conflicts` is set, in which case `_1`, `_2`, ... is appended to the
/// proposed name until a free path is found. `current_path` only changes after the move
/// succeeded.
pub fn rename_with_options(
    record: &mut ImageRecord,
    options: &RenameOptions,
) -> Result<RenameOutcome, RenameError> {
    let mut target = compute_target(record);
    if same_path_ignoring_case(&target, record.current_path()) {
        return Ok(RenameOutcome::Unchanged);
    }

    if path_exists(&target) {
        if !options.resolve_conflicts {
            return Err(RenameError::TargetExists { target });
        }
        target = resolve_conflict(record, options.max_conflict_attempts)?;
        if same_path_ignoring_case(&target, record.current_path()) {
            return Ok(RenameOutcome::Unchanged);
        }
    }

    let from = record.current_path().to_path_buf();
    fs::rename(&from, &target).map_err(|source| RenameError::MoveFailed {
        from: from.clone(),
        to: target.clone(),
        source,
    })?;

    info!(from = %from.display(), to = %target.display(), "renamed");
    record.set_current_path(target.clone());
    Ok(RenameOutcome::Renamed { from, to: target })
}

/// Tries `<stem>_<n><ext>` from n = 1 and stores the first free name in the record.
/// The record's own current path counts as free.
fn resolve_conflict(record: &mut ImageRecord, max_attempts: usize) -> Result<PathBuf, RenameError> {
    let requested = record.proposed_name().to_string();
    let (stem, ext) = split_jpg_suffix(&requested);

    for n in 1..=max_attempts {
        let name = format!("{}_{}{}", stem, n, ext);
        let candidate = sibling(record.current_path(), &name);
        if same_path_ignoring_case(&candidate, record.current_path()) || !path_exists(&candidate) {
            debug!(requested = %requested, resolved = %name, "resolved name conflict");
            record.set_proposed_name(&name);
            return Ok(compute_target(record));
        }
    }

    Err(RenameError::ConflictsExhausted {
        name: requested,
        attempts: max_attempts,
    })
}

fn sibling(current_path: &Path, name: &str) -> PathBuf {
    match current_path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Dangling symlinks count as existing so they are never overwritten.
fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Case-insensitive on every platform: a case-only change is treated as the same file.
fn same_path_ignoring_case(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

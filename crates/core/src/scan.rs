use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub recursive: bool,
    pub include_hidden: bool,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ScanStats {
    pub scanned_files: usize,
    pub jpg_files: usize,
    pub skipped_non_jpg: usize,
    pub skipped_hidden: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub files: Vec<PathBuf>,
    pub stats: ScanStats,
}

/// Lists `.jpg` / `.jpeg` files (any case) under `root`, sorted by name.
pub fn collect_jpg_files(root: &Path, options: &ScanOptions) -> Result<ScanResult> {
    if !root.is_dir() {
        anyhow::bail!("フォルダが存在しません: {}", root.display());
    }

    let mut stats = ScanStats::default();
    let mut files = Vec::new();

    if options.recursive {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("フォルダ走査に失敗しました: {}", root.display()))?;
            if entry.file_type().is_dir() {
                continue;
            }
            classify(entry.path(), options, &mut stats, &mut files);
        }
    } else {
        for entry in fs::read_dir(root)
            .with_context(|| format!("フォルダを読めませんでした: {}", root.display()))?
        {
            let entry =
                entry.with_context(|| format!("エントリ読み取り失敗: {}", root.display()))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            classify(&path, options, &mut stats, &mut files);
        }
        files.sort();
    }

    Ok(ScanResult { files, stats })
}

fn classify(path: &Path, options: &ScanOptions, stats: &mut ScanStats, files: &mut Vec<PathBuf>) {
    stats.scanned_files += 1;
    if is_hidden(path) && !options.include_hidden {
        stats.skipped_hidden += 1;
        return;
    }
    if is_jpg(path) {
        stats.jpg_files += 1;
        files.push(path.to_path_buf());
    } else {
        stats.skipped_non_jpg += 1;
    }
}

pub fn is_jpg(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg")
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

use std::path::PathBuf;
use thiserror::Error;

/// Why a single file could not be turned into an [`ImageRecord`](crate::ImageRecord).
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("画像ファイルを読めませんでした: {path}: {source}")]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JPEGとして解析できませんでした: {path}: {reason}")]
    UnsupportedImage { path: PathBuf, reason: String },
}

impl ReadError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ReadError::FileUnavailable { path, .. } | ReadError::UnsupportedImage { path, .. } => {
                path
            }
        }
    }
}

/// Why a single rename did not happen. The source file is untouched in every case.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("リネーム先が既に存在します: {target}")]
    TargetExists { target: PathBuf },

    #[error("リネームに失敗しました: {from} -> {to}: {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("空いている連番が見つかりませんでした: {name} ({attempts}回試行)")]
    ConflictsExhausted { name: String, attempts: usize },
}

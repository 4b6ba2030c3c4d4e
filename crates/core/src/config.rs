use crate::extractor::{ExtractOptions, DEFAULT_THUMBNAIL_WIDTH};
use crate::record::DEFAULT_DATE_FORMAT;
use crate::rename::{RenameOptions, DEFAULT_MAX_CONFLICT_ATTEMPTS};
use crate::scan::ScanOptions;
use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub date_format: String,
    pub recursive_default: bool,
    pub include_hidden_default: bool,
    pub resolve_conflicts_default: bool,
    pub thumbnail_width: u32,
    pub max_conflict_attempts: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            recursive_default: false,
            include_hidden_default: false,
            resolve_conflicts_default: false,
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            max_conflict_attempts: DEFAULT_MAX_CONFLICT_ATTEMPTS,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!("日付フォーマットが不正です: {}", self.date_format);
        }
        if self.thumbnail_width == 0 {
            anyhow::bail!("thumbnail_width は1以上にしてください");
        }
        if self.max_conflict_attempts == 0 {
            anyhow::bail!("max_conflict_attempts は1以上にしてください");
        }
        Ok(())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            thumbnail_width: self.thumbnail_width,
            date_format: self.date_format.clone(),
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive_default,
            include_hidden: self.include_hidden_default,
        }
    }

    pub fn rename_options(&self) -> RenameOptions {
        RenameOptions {
            resolve_conflicts: self.resolve_conflicts_default,
            max_conflict_attempts: self.max_conflict_attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("", "", "jpg-renamer")
        .context("OS標準設定ディレクトリを取得できませんでした")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    load_config_from(&paths.config_path)
}

pub fn save_config(config: &AppConfig) -> Result<PathBuf> {
    let paths = app_paths()?;
    save_config_to(config, &paths.config_path)?;
    Ok(paths.config_path)
}

/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("設定ファイルを読めませんでした: {}", path.display()))?;

    let config = toml::from_str::<AppConfig>(&raw).context("設定ファイルのパースに失敗しました")?;
    config.validate()?;
    Ok(config)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    config.validate()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| {
            format!("設定ディレクトリを作成できませんでした: {}", dir.display())
        })?;
    }
    let body = toml::to_string_pretty(config).context("設定のシリアライズに失敗しました")?;
    fs::write(path, body)
        .with_context(|| format!("設定ファイルを書き込めませんでした: {}", path.display()))?;
    Ok(())
}

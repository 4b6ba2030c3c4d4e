use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use jpg_renamer_core::{
    app_paths, collect_jpg_files, compute_target, extract_all, load_config, load_config_from,
    rename_all, save_config, save_config_to, AppConfig, BatchSummary, ImageRecord, LoadResult,
    RenameOutcome,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "jpg-renamer")]
#[command(about = "JPG写真を撮影日時のファイル名に一括リネームします")]
struct Cli {
    /// 設定ファイルのパス (省略時はOS標準の場所)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Scan(ScanArgs),
    Rename(RenameArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct FolderArgs {
    dir: PathBuf,
    #[arg(long)]
    recursive: bool,
    #[arg(long)]
    include_hidden: bool,
}

#[derive(Debug, Args)]
struct ScanArgs {
    #[command(flatten)]
    folder: FolderArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(Debug, Args)]
struct RenameArgs {
    #[command(flatten)]
    folder: FolderArgs,
    #[arg(long)]
    resolve_conflicts: bool,
    /// 個別のファイル名指定 (例: --name IMG_0001.JPG=beach)
    #[arg(long = "name", value_parser = parse_name_override)]
    names: Vec<(String, String)>,
    #[arg(long, default_value_t = false)]
    apply: bool,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
    Init,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct ScanOutput<'a> {
    records: &'a [ImageRecord],
    failures: Vec<FailureOutput>,
}

#[derive(Debug, Serialize)]
struct FailureOutput {
    path: PathBuf,
    error: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("エラー: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Commands::Scan(args) => cmd_scan(args, &config),
        Commands::Rename(args) => cmd_rename(args, &config),
        Commands::Config(args) => match args.action {
            ConfigAction::Show => cmd_config_show(cli.config, &config),
            ConfigAction::Init => cmd_config_init(cli.config),
        },
    }
}

fn load_folder(folder: &FolderArgs, config: &AppConfig) -> Result<LoadResult> {
    let mut scan_options = config.scan_options();
    scan_options.recursive |= folder.recursive;
    scan_options.include_hidden |= folder.include_hidden;

    let scan = collect_jpg_files(&folder.dir, &scan_options)?;
    tracing::debug!(?scan.stats, "collected files");
    Ok(extract_all(&scan.files, &config.extract_options()))
}

fn cmd_scan(args: ScanArgs, config: &AppConfig) -> Result<ExitCode> {
    let loaded = load_folder(&args.folder, config)?;

    match args.output {
        OutputFormat::Json => {
            let output = ScanOutput {
                records: &loaded.records,
                failures: loaded
                    .failures
                    .iter()
                    .map(|err| FailureOutput {
                        path: err.path().clone(),
                        error: err.to_string(),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => print_records(&loaded),
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_rename(args: RenameArgs, config: &AppConfig) -> Result<ExitCode> {
    let mut loaded = load_folder(&args.folder, config)?;
    apply_name_overrides(&mut loaded.records, &args.names)?;

    println!("元ファイル -> 新ファイル");
    for record in &loaded.records {
        println!(
            "{} -> {}",
            record.current_path().display(),
            compute_target(record).display()
        );
    }
    for err in &loaded.failures {
        eprintln!("読み込み失敗: {err}");
    }

    if !args.apply {
        eprintln!("dry-runモード: 実ファイルは変更していません。適用するには --apply を指定してください。");
        return Ok(ExitCode::SUCCESS);
    }

    let mut options = config.rename_options();
    options.resolve_conflicts |= args.resolve_conflicts;

    let reports = rename_all(&mut loaded.records, &options);
    for report in &reports {
        match &report.result {
            Ok(RenameOutcome::Renamed { to, .. }) => {
                println!("リネーム: {} -> {}", report.path.display(), to.display())
            }
            Ok(RenameOutcome::Unchanged) => {}
            Err(err) => eprintln!("失敗: {}: {err}", report.path.display()),
        }
    }

    let summary = BatchSummary::from_reports(&reports);
    eprintln!(
        "適用完了: {}件 (変更なし {}件, 失敗 {}件, 読み込み失敗 {}件)",
        summary.renamed,
        summary.unchanged,
        summary.failed,
        loaded.failures.len()
    );

    if summary.failed > 0 || !loaded.failures.is_empty() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn apply_name_overrides(records: &mut [ImageRecord], names: &[(String, String)]) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    let mut pending: HashMap<&str, &str> = names
        .iter()
        .map(|(from, to)| (from.as_str(), to.as_str()))
        .collect();

    for record in records.iter_mut() {
        if let Some(to) = pending.remove(record.current_name().as_str()) {
            record.set_proposed_name(to);
        }
    }

    if let Some(from) = pending.keys().next() {
        anyhow::bail!("--name の対象ファイルが見つかりません: {from}");
    }
    Ok(())
}

fn parse_name_override(raw: &str) -> Result<(String, String), String> {
    let (from, to) = raw
        .split_once('=')
        .ok_or_else(|| format!("OLD=NEW の形式で指定してください: {raw}"))?;
    if from.trim().is_empty() || to.trim().is_empty() {
        return Err(format!("ファイル名が空です: {raw}"));
    }
    Ok((from.trim().to_string(), to.trim().to_string()))
}

fn cmd_config_show(path: Option<PathBuf>, config: &AppConfig) -> Result<ExitCode> {
    let path = match path {
        Some(path) => path,
        None => app_paths()?.config_path,
    };
    println!("設定ファイル: {}", path.display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_init(path: Option<PathBuf>) -> Result<ExitCode> {
    let config = AppConfig::default();
    let written = match path {
        Some(path) => {
            save_config_to(&config, &path)?;
            path
        }
        None => save_config(&config)?,
    };
    println!("設定ファイルを作成しました: {}", written.display());
    Ok(ExitCode::SUCCESS)
}

fn print_records(loaded: &LoadResult) {
    println!("ファイル | 撮影日時 (source) | 解像度 | サムネイル | 新ファイル名");
    for record in &loaded.records {
        let thumbnail = record
            .thumbnail()
            .map(|t| format!("{:?} {}x{}", t.source, t.width, t.height))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} | {} ({:?}) | {} | {} | {}",
            record.current_name(),
            record.captured_at().format("%Y-%m-%d %H:%M:%S"),
            record.capture_source(),
            record.resolution(),
            thumbnail,
            record.proposed_name()
        );
    }

    for err in &loaded.failures {
        eprintln!("読み込み失敗: {err}");
    }

    println!(
        "\n集計: loaded={} failed={}",
        loaded.records.len(),
        loaded.failures.len()
    );
}

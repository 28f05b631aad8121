mod cli;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fudousan_stats_core::{Dashboard, DashboardConfig, DataStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let data_path = resolve_data_path()?;
    let file = File::open(&data_path)
        .with_context(|| format!("データファイルを開けません: {}", data_path.display()))?;
    let reader = BufReader::new(file);
    let store: DataStore = serde_json::from_reader(reader).with_context(|| {
        format!(
            "データファイルの解析に失敗しました: {}",
            data_path.display()
        )
    })?;
    info!(path = %data_path.display(), datasets = store.keys().count(), "loaded data file");

    let config = match std::env::var_os("FUDOUSAN_CONFIG") {
        Some(path) => DashboardConfig::load(Path::new(&path))?,
        None => DashboardConfig::builtin()?,
    };

    let mut dashboard = Dashboard::with_data(config, store);
    cli::run(&mut dashboard)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_data_path() -> Result<PathBuf> {
    if let Some(arg) = std::env::args_os().nth(1) {
        return Ok(PathBuf::from(arg));
    }

    let cwd = std::env::current_dir().context("カレントディレクトリの取得に失敗しました")?;
    let candidates = [
        cwd.join("config").join("sample_data.json"),
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("config")
            .join("sample_data.json"),
    ];

    for path in candidates {
        if path.exists() {
            return Ok(path);
        }
    }

    anyhow::bail!(
        "データファイルが見つかりません。引数で指定するか config/sample_data.json を配置してください。"
    )
}

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::series::YearRange;

const BUILTIN_CONFIG: ConfigSource<'static> = ConfigSource::Yaml(
    "dashboard.yaml",
    include_str!("../../config/dashboard.yaml"),
);

#[derive(Debug, Clone, Copy)]
enum ConfigSource<'a> {
    Yaml(&'a str, &'a str),
    Json(&'a str, &'a str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub year_range: YearRange,
    #[serde(default = "DashboardConfig::default_axis_label_suffix")]
    pub axis_label_suffix: String,
    #[serde(default = "DashboardConfig::default_price_title")]
    pub price_title: String,
    #[serde(default = "DashboardConfig::default_count_title")]
    pub count_title: String,
}

impl DashboardConfig {
    pub fn default_axis_label_suffix() -> String {
        "年".to_string()
    }

    pub fn default_price_title() -> String {
        "取引平均価格（万円）".to_string()
    }

    pub fn default_count_title() -> String {
        "取引件数".to_string()
    }

    /// The configuration shipped in `config/dashboard.yaml`.
    pub fn builtin() -> Result<Self> {
        parse_config(&BUILTIN_CONFIG)
    }

    pub fn from_yaml_str(name: &str, body: &str) -> Result<Self> {
        parse_config(&ConfigSource::Yaml(name, body))
    }

    pub fn from_json_str(name: &str, body: &str) -> Result<Self> {
        parse_config(&ConfigSource::Json(name, body))
    }

    /// Loads a YAML or JSON file, picked by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("設定ファイルを開けません: {}", path.display()))?;
        let name = path.display().to_string();
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        if extension.eq_ignore_ascii_case("json") {
            Self::from_json_str(&name, &body)
        } else if extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml") {
            Self::from_yaml_str(&name, &body)
        } else {
            Err(anyhow!(
                "設定ファイルの形式を判別できません (yaml / json): {}",
                name
            ))
        }
    }

    pub fn axis_labels(&self) -> Vec<String> {
        self.year_range.labels_with_suffix(&self.axis_label_suffix)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            year_range: YearRange::default(),
            axis_label_suffix: Self::default_axis_label_suffix(),
            price_title: Self::default_price_title(),
            count_title: Self::default_count_title(),
        }
    }
}

fn parse_config(source: &ConfigSource<'_>) -> Result<DashboardConfig> {
    match source {
        ConfigSource::Yaml(name, body) => serde_yaml::from_str::<DashboardConfig>(body)
            .map_err(|err| anyhow!("YAML 設定 {} の解析に失敗しました: {}", name, err)),
        ConfigSource::Json(name, body) => serde_json::from_str::<DashboardConfig>(body)
            .map_err(|err| anyhow!("JSON 設定 {} の解析に失敗しました: {}", name, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_matches_defaults() {
        let config = DashboardConfig::builtin().expect("built-in config should load");
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.year_range.len(), 11);
        assert_eq!(config.axis_labels()[0], "2010年");
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config = DashboardConfig::from_json_str(
            "short.json",
            r#"{ "year_range": ["2018", "2019", "2020"] }"#,
        )
        .unwrap();
        assert_eq!(config.year_range.len(), 3);
        assert_eq!(config.axis_label_suffix, "年");
        assert_eq!(config.axis_labels(), vec!["2018年", "2019年", "2020年"]);
        assert_eq!(config.count_title, "取引件数");

        let config = DashboardConfig::from_yaml_str("title.yaml", "price_title: \"平均価格\"").unwrap();
        assert_eq!(config.price_title, "平均価格");
        assert_eq!(config.axis_labels()[0], "2010年");
        assert_eq!(config.axis_labels().len(), 11);
    }

    #[test]
    fn empty_suffix_yields_raw_year_labels() {
        let config =
            DashboardConfig::from_yaml_str("raw.yaml", "axis_label_suffix: \"\"").unwrap();
        assert_eq!(config.axis_labels()[10], "2020");
    }

    fn write_config(dir: &tempfile::TempDir, file_name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(file_name);
        std::fs::write(&path, body).expect("write config file");
        path
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().expect("temp dir");

        let json = write_config(&dir, "dashboard.json", r#"{ "count_title": "件数" }"#);
        let config = DashboardConfig::load(&json).expect("json config");
        assert_eq!(config.count_title, "件数");
        assert_eq!(config.axis_label_suffix, "年");

        let yml = write_config(&dir, "dashboard.yml", "year_range: [\"2019\", \"2020\"]\n");
        let config = DashboardConfig::load(&yml).expect("yml config");
        assert_eq!(config.axis_labels(), vec!["2019年", "2020年"]);

        let upper = write_config(&dir, "dashboard.YAML", "price_title: \"価格\"\n");
        let config = DashboardConfig::load(&upper).expect("upper-case extension");
        assert_eq!(config.price_title, "価格");
    }

    #[test]
    fn load_reports_missing_file_and_unknown_extension() {
        let dir = tempfile::tempdir().expect("temp dir");

        let err = DashboardConfig::load(&dir.path().join("missing.yaml"))
            .expect_err("file does not exist");
        assert!(err.to_string().contains("設定ファイルを開けません"));
        assert!(err.to_string().contains("missing.yaml"));

        let toml = write_config(&dir, "dashboard.toml", "price_title = \"x\"");
        let err = DashboardConfig::load(&toml).expect_err("unsupported format");
        assert!(err.to_string().contains("形式を判別できません"));
    }

    #[test]
    fn invalid_year_range_is_reported() {
        let err = DashboardConfig::from_yaml_str("broken.yaml", "year_range: [\"2020\", \"2019\"]")
            .expect_err("descending range");
        let message = format!("{}", err);
        assert!(message.contains("解析に失敗しました"));
        assert!(message.contains("broken.yaml"));
    }
}

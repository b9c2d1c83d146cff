use crate::core::filter::FilterSpec;
use crate::core::ConfigProvider;
use crate::domain::model::{OutputFormat, RouteType};
use crate::domain::ports::AnalysisSettings;
use crate::domain::tables::Table;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub dashboard: DashboardConfig,
    pub source: SourceConfig,
    pub filters: Option<FiltersConfig>,
    pub analysis: Option<AnalysisConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub data_dir: String,
    /// 以資料表名稱 (例如 `orders`) 覆寫預設檔名
    pub files: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub segments: Option<Vec<String>>,
    pub route_types: Option<Vec<RouteType>>,
    pub products: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub international_cities: Option<Vec<String>>,
    pub top_routes: Option<usize>,
    pub max_table_rows: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<OutputFormat>,
    pub bundle: Option<BundleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// "compact" (預設) 或 "json"
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashboardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ProcessingError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("source.data_dir", &self.source.data_dir)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        if let Some(title) = &self.dashboard.title {
            validation::validate_non_empty_string("dashboard.title", title)?;
        }

        // 只接受已知資料表名稱，檔名必須是 .csv
        if let Some(files) = &self.source.files {
            for (name, file) in files {
                if !Table::ALL.iter().any(|t| t.name() == name) {
                    return Err(DashboardError::InvalidConfigValueError {
                        field: "source.files".to_string(),
                        value: name.clone(),
                        reason: format!(
                            "Unknown table. Valid tables: {}",
                            Table::ALL.map(|t| t.name()).join(", ")
                        ),
                    });
                }
                validation::validate_file_extensions(
                    &format!("source.files.{}", name),
                    &[file.as_str()],
                    &["csv"],
                )?;
            }
        }

        if let Some(filters) = &self.filters {
            validation::validate_date_order(
                "filters.start_date",
                filters.start_date,
                filters.end_date,
            )?;
        }

        if let Some(analysis) = &self.analysis {
            if let Some(top) = analysis.top_routes {
                validation::validate_positive_number("analysis.top_routes", top, 1)?;
            }
            if let Some(rows) = analysis.max_table_rows {
                validation::validate_range(
                    "analysis.max_table_rows",
                    rows,
                    1,
                    crate::config::MAX_TABLE_ROWS_LIMIT,
                )?;
            }
            if let Some(cities) = &analysis.international_cities {
                for city in cities {
                    validation::validate_non_empty_string("analysis.international_cities", city)?;
                }
            }
        }

        if self.load.output_formats.is_empty() {
            return Err(DashboardError::MissingConfigError {
                field: "load.output_formats".to_string(),
            });
        }

        if let Some(bundle) = self.load.bundle.as_ref().filter(|b| b.enabled) {
            validation::validate_file_extensions(
                "load.bundle.filename",
                &[bundle.filename.as_str()],
                &["zip"],
            )?;
        }

        if let Some(format) = self.log_format() {
            if !["compact", "json"].contains(&format) {
                return Err(DashboardError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: "Valid formats: compact, json".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 取得資料目錄
    pub fn data_dir(&self) -> &str {
        &self.source.data_dir
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_format.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn title(&self) -> &str {
        self.dashboard
            .title
            .as_deref()
            .unwrap_or(crate::config::DEFAULT_TITLE)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn dataset_file(&self, table: Table) -> String {
        self.source
            .files
            .as_ref()
            .and_then(|files| files.get(table.name()))
            .cloned()
            .unwrap_or_else(|| table.default_file().to_string())
    }

    fn filter_spec(&self) -> FilterSpec {
        let filters = self.filters.clone().unwrap_or_default();
        FilterSpec {
            start_date: filters.start_date,
            end_date: filters.end_date,
            segments: filters.segments,
            route_types: filters.route_types,
            products: filters.products,
        }
    }

    fn analysis(&self) -> AnalysisSettings {
        let defaults = AnalysisSettings::default();
        let Some(analysis) = &self.analysis else {
            return defaults;
        };

        AnalysisSettings {
            international_cities: analysis
                .international_cities
                .clone()
                .unwrap_or(defaults.international_cities),
            top_routes: analysis.top_routes.unwrap_or(defaults.top_routes),
            max_table_rows: analysis.max_table_rows.unwrap_or(defaults.max_table_rows),
        }
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        self.load.output_formats.clone()
    }

    fn bundle_name(&self) -> Option<&str> {
        self.load
            .bundle
            .as_ref()
            .filter(|b| b.enabled)
            .map(|b| b.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[dashboard]

[source]
data_dir = "./data"

[load]
output_path = "./output"
output_formats = ["html"]
"#;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[dashboard]
title = "Q1 Cost Review"

[source]
data_dir = "./exports"
files = { orders = "orders_2024.csv" }

[filters]
start_date = "2024-01-01"
end_date = "2024-03-31"
segments = ["SMB", "Enterprise"]
route_types = ["International"]

[analysis]
international_cities = ["Singapore", "Dubai"]
top_routes = 10

[load]
output_path = "./test-output"
output_formats = ["html", "json"]
bundle = { enabled = true, filename = "q1.zip" }

[monitoring]
enabled = true
log_format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.title(), "Q1 Cost Review");
        assert_eq!(config.data_dir(), "./exports");
        assert_eq!(config.dataset_file(Table::Orders), "orders_2024.csv");
        assert_eq!(config.dataset_file(Table::CostBreakdown), "cost_breakdown.csv");

        let spec = config.filter_spec();
        assert_eq!(spec.end_date, NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(spec.route_types, Some(vec![RouteType::International]));
        assert!(spec.products.is_none());

        let analysis = config.analysis();
        assert_eq!(analysis.top_routes, 10);
        assert_eq!(analysis.max_table_rows, 500);
        assert_eq!(analysis.international_cities, vec!["Singapore", "Dubai"]);

        assert_eq!(
            config.output_formats(),
            vec![OutputFormat::Html, OutputFormat::Json]
        );
        assert_eq!(config.bundle_name(), Some("q1.zip"));
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_format(), Some("json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.title(), crate::config::DEFAULT_TITLE);
        assert_eq!(config.filter_spec(), FilterSpec::default());
        assert_eq!(config.analysis(), AnalysisSettings::default());
        assert!(config.bundle_name().is_none());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("COST_INTEL_TEST_DATA_DIR", "/srv/nexgen");

        let toml_content = r#"
[dashboard]

[source]
data_dir = "${COST_INTEL_TEST_DATA_DIR}"

[load]
output_path = "${COST_INTEL_TEST_UNSET_VAR}"
output_formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data_dir(), "/srv/nexgen");
        assert_eq!(config.output_path(), "${COST_INTEL_TEST_UNSET_VAR}");

        std::env::remove_var("COST_INTEL_TEST_DATA_DIR");
    }

    #[test]
    fn test_unknown_output_format_fails_to_parse() {
        let toml_content = MINIMAL.replace("[\"html\"]", "[\"pdf\"]");
        assert!(TomlConfig::from_toml_str(&toml_content).is_err());
    }

    #[test]
    fn test_config_validation() {
        let bad_bundle = format!(
            "{}bundle = {{ enabled = true, filename = \"out.tar\" }}\n",
            MINIMAL
        );
        let config = TomlConfig::from_toml_str(&bad_bundle).unwrap();
        assert!(config.validate().is_err());

        let disabled_bundle = format!(
            "{}bundle = {{ enabled = false, filename = \"out.tar\" }}\n",
            MINIMAL
        );
        let config = TomlConfig::from_toml_str(&disabled_bundle).unwrap();
        assert!(config.validate().is_ok());

        let unknown_table = MINIMAL.replace(
            "data_dir = \"./data\"",
            "data_dir = \"./data\"\nfiles = { shipments = \"shipments.csv\" }",
        );
        let config = TomlConfig::from_toml_str(&unknown_table).unwrap();
        assert!(config.validate().is_err());

        let inverted = format!(
            "{}\n[filters]\nstart_date = \"2024-05-01\"\nend_date = \"2024-01-01\"\n",
            MINIMAL
        );
        let config = TomlConfig::from_toml_str(&inverted).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "./output");
    }
}

pub mod cli;
pub mod toml_config;

pub const DEFAULT_TITLE: &str = "NexGen Logistics Cost Intelligence Dashboard";

/// 原始資料表格的列數上限，避免輸出的 HTML 過大
pub const MAX_TABLE_ROWS_LIMIT: usize = 100_000;

#[cfg(feature = "cli")]
pub use command_line::CliConfig;

#[cfg(feature = "cli")]
mod command_line {
    use super::{DEFAULT_TITLE, MAX_TABLE_ROWS_LIMIT};
    use crate::core::filter::FilterSpec;
    use crate::core::ConfigProvider;
    use crate::domain::model::{OutputFormat, RouteType};
    use crate::domain::ports::AnalysisSettings;
    use crate::domain::tables::Table;
    use crate::utils::error::{DashboardError, Result};
    use crate::utils::validation::{self, Validate};
    use chrono::NaiveDate;
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "cost-intel")]
    #[command(about = "Logistics cost intelligence dashboard built from order CSV exports")]
    pub struct CliConfig {
        /// Directory holding the seven input CSV files
        #[arg(long, default_value = ".")]
        pub data_dir: String,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, default_value = DEFAULT_TITLE)]
        pub title: String,

        /// First order date to include (YYYY-MM-DD)
        #[arg(long)]
        pub start_date: Option<NaiveDate>,

        /// Last order date to include (YYYY-MM-DD)
        #[arg(long)]
        pub end_date: Option<NaiveDate>,

        /// Customer segments to include; omit for all
        #[arg(long, value_delimiter = ',')]
        pub segments: Option<Vec<String>>,

        /// Route types to include (Domestic, International); omit for all
        #[arg(long, value_delimiter = ',')]
        pub route_types: Option<Vec<RouteType>>,

        /// Product categories to include; omit for all
        #[arg(long, value_delimiter = ',')]
        pub products: Option<Vec<String>>,

        /// Cities that mark a route as international
        #[arg(
            long,
            value_delimiter = ',',
            default_values = AnalysisSettings::DEFAULT_INTERNATIONAL_CITIES
        )]
        pub international_cities: Vec<String>,

        #[arg(long, default_value = "15")]
        pub top_routes: usize,

        #[arg(long, default_value = "500")]
        pub max_table_rows: usize,

        #[arg(
            long,
            value_enum,
            value_delimiter = ',',
            default_values = ["html", "csv", "json"]
        )]
        pub formats: Vec<OutputFormat>,

        /// Write all outputs into one ZIP archive with this name
        #[arg(long)]
        pub bundle: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,
    }

    impl ConfigProvider for CliConfig {
        fn title(&self) -> &str {
            &self.title
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn dataset_file(&self, table: Table) -> String {
            table.default_file().to_string()
        }

        fn filter_spec(&self) -> FilterSpec {
            FilterSpec {
                start_date: self.start_date,
                end_date: self.end_date,
                segments: self.segments.clone(),
                route_types: self.route_types.clone(),
                products: self.products.clone(),
            }
        }

        fn analysis(&self) -> AnalysisSettings {
            AnalysisSettings {
                international_cities: self.international_cities.clone(),
                top_routes: self.top_routes,
                max_table_rows: self.max_table_rows,
            }
        }

        fn output_formats(&self) -> Vec<OutputFormat> {
            self.formats.clone()
        }

        fn bundle_name(&self) -> Option<&str> {
            self.bundle.as_deref()
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_path("data_dir", &self.data_dir)?;
            validation::validate_path("output_path", &self.output_path)?;
            validation::validate_non_empty_string("title", &self.title)?;
            validation::validate_date_order("start_date", self.start_date, self.end_date)?;
            validation::validate_positive_number("top_routes", self.top_routes, 1)?;
            validation::validate_range(
                "max_table_rows",
                self.max_table_rows,
                1,
                MAX_TABLE_ROWS_LIMIT,
            )?;

            for city in &self.international_cities {
                validation::validate_non_empty_string("international_cities", city)?;
            }

            if self.formats.is_empty() {
                return Err(DashboardError::MissingConfigError {
                    field: "formats".to_string(),
                });
            }

            if let Some(bundle) = &self.bundle {
                validation::validate_file_extensions("bundle", &[bundle.as_str()], &["zip"])?;
            }

            Ok(())
        }
    }

}

use crate::domain::model::{OutputFormat, TransformResult};
use crate::domain::tables::{Datasets, Table};
use crate::utils::error::{DashboardError, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// 分析參數
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub international_cities: Vec<String>,
    pub top_routes: usize,
    pub max_table_rows: usize,
}

impl AnalysisSettings {
    pub const DEFAULT_INTERNATIONAL_CITIES: [&'static str; 4] =
        ["Singapore", "Dubai", "Hong Kong", "Bangkok"];
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            international_cities: Self::DEFAULT_INTERNATIONAL_CITIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            top_routes: 15,
            max_table_rows: 500,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn title(&self) -> &str;
    fn output_path(&self) -> &str;
    fn dataset_file(&self, table: Table) -> String;
    fn filter_spec(&self) -> crate::core::filter::FilterSpec;
    fn analysis(&self) -> AnalysisSettings;
    fn output_formats(&self) -> Vec<OutputFormat>;
    /// ZIP 檔名；None 表示個別輸出檔案
    fn bundle_name(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Datasets>;
    async fn transform(&self, data: Datasets) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
    /// 失敗時寫出錯誤頁面，回傳其路徑
    async fn report_failure(&self, error: &DashboardError) -> Result<String>;
}

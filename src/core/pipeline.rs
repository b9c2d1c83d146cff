use crate::core::filter::apply_filter;
use crate::core::{loader, merge, metrics, render};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    MasterRecord, OutputFormat, RenderedFile, RouteType, TransformResult,
};
use crate::domain::report::{DashboardReport, FilterOptions, RecordCounts};
use crate::domain::tables::Datasets;
use crate::utils::error::{DashboardError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Loads the CSV inputs from `source`, builds the dashboard and writes the
/// rendered files to `sink`.
pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    source: S,
    sink: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(source: S, sink: S, config: C) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    /// 依資料產生報表 (不含輸出檔案)
    pub fn build_report(&self, data: &Datasets) -> Result<(DashboardReport, Vec<MasterRecord>)> {
        let analysis = self.config.analysis();

        let join_coverage = merge::check_join_keys(data);
        let master = merge::build_master(data, &analysis.international_cities);

        let options = FilterOptions::from_records(&master.records).ok_or(
            DashboardError::EmptyMasterTable {
                rows: data.costs.len(),
            },
        )?;

        let filter = self.config.filter_spec().resolve(&options)?;
        let filtered = apply_filter(&master.records, &filter);

        tracing::info!(
            "🔎 {} of {} orders match the selected filters",
            filtered.len(),
            master.records.len()
        );
        if filtered.is_empty() {
            tracing::warn!("⚠️ No orders match the selected filters");
        }

        let fleet = data.fleet.as_deref().map(metrics::fleet_summary);
        let warehouses = data
            .warehouses
            .as_deref()
            .map(|w| metrics::warehouse_summary(w, &filter.products));

        let report = DashboardReport {
            title: self.config.title().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            counts: RecordCounts {
                cost_rows: data.costs.len(),
                joined_rows: master.joined_rows,
                dropped_rows: master.dropped_rows,
                master_rows: master.records.len(),
                filtered_rows: filtered.len(),
            },
            kpis: metrics::kpis(&filtered),
            cost_breakdown: metrics::cost_breakdown(&filtered),
            product_cost: metrics::product_cost(&filtered),
            segment_efficiency: metrics::segment_efficiency(&filtered),
            domestic_routes: metrics::route_cost_per_km(
                &filtered,
                RouteType::Domestic,
                analysis.top_routes,
            ),
            international_routes: metrics::route_cost_per_km(
                &filtered,
                RouteType::International,
                analysis.top_routes,
            ),
            scatter: metrics::cost_vs_rating(&filtered),
            monthly_cost: metrics::monthly_cost(&filtered),
            carriers: metrics::carrier_performance(&filtered, &data.deliveries),
            fleet,
            warehouses,
            join_coverage,
            options,
            filter,
        };

        Ok((report, filtered))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    async fn extract(&self) -> Result<Datasets> {
        loader::load_datasets(&self.source, &self.config).await
    }

    async fn transform(&self, data: Datasets) -> Result<TransformResult> {
        let (report, filtered_records) = self.build_report(&data)?;
        let max_rows = self.config.analysis().max_table_rows;

        let mut files = Vec::new();
        for format in self.config.output_formats() {
            let contents = match format {
                OutputFormat::Html => render::render_html(&report, &filtered_records, max_rows)?,
                OutputFormat::Csv => render::render_csv(&filtered_records)?,
                OutputFormat::Json => render::render_json(&report)?,
            };
            tracing::debug!("Rendered {} ({} bytes)", format.file_name(), contents.len());
            files.push(RenderedFile {
                name: format.file_name().to_string(),
                contents: contents.into_bytes(),
            });
        }

        Ok(TransformResult {
            report,
            filtered_records,
            files,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        if result.files.is_empty() {
            return Err(DashboardError::ProcessingError {
                message: "no output formats selected".to_string(),
            });
        }

        let output_path = self.config.output_path();

        if let Some(bundle) = self.config.bundle_name() {
            tracing::debug!("Creating ZIP bundle with {} files", result.files.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for file in &result.files {
                    zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
                    zip.write_all(&file.contents)?;
                }
                // 完成並取回底層 Vec<u8>
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.sink.write_file(bundle, &zip_data).await?;
            return Ok(format!("{}/{}", output_path, bundle));
        }

        for file in &result.files {
            self.sink.write_file(&file.name, &file.contents).await?;
            tracing::debug!("Wrote {}", file.name);
        }

        Ok(format!("{}/{}", output_path, result.files[0].name))
    }

    async fn report_failure(&self, error: &DashboardError) -> Result<String> {
        let name = OutputFormat::Html.file_name();
        let page = render::render_error_page(self.config.title(), error);
        self.sink.write_file(name, page.as_bytes()).await?;
        Ok(format!("{}/{}", self.config.output_path(), name))
    }
}

use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 依序執行 extract / transform / load
pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// 失敗時先寫出錯誤頁面，再回傳原本的錯誤
    pub async fn run(&self) -> Result<String> {
        match self.run_phases().await {
            Ok(output_path) => Ok(output_path),
            Err(e) => {
                match self.pipeline.report_failure(&e).await {
                    Ok(page) => tracing::warn!("⚠️ Wrote error page to {}", page),
                    Err(write_err) => {
                        tracing::error!("❌ Could not write error page: {}", write_err)
                    }
                }
                Err(e)
            }
        }
    }

    async fn run_phases(&self) -> Result<String> {
        tracing::info!("📊 Building cost intelligence dashboard");
        self.monitor.log_stats("start");

        tracing::info!("📥 Loading datasets...");
        let datasets = self.pipeline.extract().await?;
        tracing::info!("Loaded {} cost rows", datasets.costs.len());
        self.monitor.log_stats("extract");

        tracing::info!("🔄 Building master table and charts...");
        let result = self.pipeline.transform(datasets).await?;
        tracing::info!(
            "Selected {} of {} orders, rendered {} files",
            result.report.counts.filtered_rows,
            result.report.counts.master_rows,
            result.files.len()
        );
        self.monitor.log_stats("transform");

        tracing::info!("💾 Writing outputs...");
        let output_path = self.pipeline.load(result).await?;
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

use anyhow::Context;
use clap::Parser;
use cost_intel::config::toml_config::TomlConfig;
use cost_intel::core::ConfigProvider;
use cost_intel::core::Storage;
use cost_intel::domain::tables::Table;
use cost_intel::utils::{logger, validation::Validate};
use cost_intel::{DashboardEngine, DashboardPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-dashboard")]
#[command(about = "Cost intelligence dashboard with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dashboard.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show which inputs would be read without building anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置 (日誌格式由配置決定，因此先載入)
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(config.log_format(), args.verbose);

    tracing::info!("🚀 Starting TOML-based dashboard builder");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    let source = LocalStorage::new(config.data_dir().to_string());

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No dashboard will be built");
        perform_dry_run(&config, &source)
            .await
            .context("dry run failed")?;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let sink = LocalStorage::new(config.output_path().to_string());
    let pipeline = DashboardPipeline::new(source, sink, config);
    let engine = DashboardEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Dashboard built successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Dashboard built successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Dashboard build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let formats: Vec<&str> = config
        .output_formats()
        .iter()
        .map(|f| f.file_name())
        .collect();

    println!("📋 Configuration Summary:");
    println!("  Dashboard: {}", config.title());
    if let Some(description) = &config.dashboard.description {
        println!("  Description: {}", description);
    }
    println!("  Data directory: {}", config.data_dir());
    println!("  Output: {}", config.output_path());
    println!("  Files: {}", formats.join(", "));

    if let Some(bundle) = config.bundle_name() {
        println!("  Bundle: {} (ZIP)", bundle);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn describe_selection<T: ToString>(values: &Option<Vec<T>>) -> String {
    match values {
        None => "all".to_string(),
        Some(v) if v.is_empty() => "none".to_string(),
        Some(v) => v.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(", "),
    }
}

async fn perform_dry_run(config: &TomlConfig, source: &LocalStorage) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();

    // 輸入檔案
    println!("📥 Input Files ({}):", source.base_path());
    let mut missing_required = Vec::new();
    for table in Table::ALL {
        let file = config.dataset_file(table);
        let status = match (source.exists(&file).await, table.is_supplementary()) {
            (true, _) => "✅ found",
            (false, true) => "⚠️ missing (section will be skipped)",
            (false, false) => {
                missing_required.push(file.clone());
                "❌ missing"
            }
        };
        println!("  {:<22} {:<28} {}", table.name(), file, status);
    }

    // 篩選條件
    let spec = config.filter_spec();
    let analysis = config.analysis();
    println!();
    println!("🔎 Filters:");
    println!(
        "  Dates: {} .. {}",
        spec.start_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "earliest".to_string()),
        spec.end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "latest".to_string())
    );
    println!("  Segments: {}", describe_selection(&spec.segments));
    println!("  Route types: {}", describe_selection(&spec.route_types));
    println!("  Products: {}", describe_selection(&spec.products));

    println!();
    println!("⚙️ Analysis:");
    println!(
        "  International cities: {}",
        analysis.international_cities.join(", ")
    );
    println!("  Top routes per chart: {}", analysis.top_routes);
    println!("  Max table rows: {}", analysis.max_table_rows);

    println!();
    if missing_required.is_empty() {
        println!("✅ Dry run analysis complete. All required inputs are present.");
        Ok(())
    } else {
        anyhow::bail!("missing required input files: {}", missing_required.join(", "))
    }
}

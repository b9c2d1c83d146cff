use cost_intel::domain::model::OutputFormat;
use cost_intel::domain::tables::Table;
use cost_intel::utils::error::{DashboardError, ErrorSeverity};
use cost_intel::{CliConfig, DashboardEngine, DashboardPipeline, LocalStorage};
use std::path::Path;
use tempfile::TempDir;
use tokio_test::assert_err;

const HEADERS: [(&str, &str); 5] = [
    (
        "orders.csv",
        "Order_ID,Order_Date,Customer_Segment,Product_Category,Order_Value_INR\n\
         ORD001,2024-01-05,SMB,Books,1000\n",
    ),
    (
        "delivery_performance.csv",
        "Order_ID,Carrier,Customer_Rating\nORD001,QuickShip,4\n",
    ),
    (
        "routes_distance.csv",
        "Order_ID,Route,Distance_KM\nORD001,Mumbai-Pune,100\n",
    ),
    (
        "cost_breakdown.csv",
        "Order_ID,Fuel_Cost,Labor_Cost,Vehicle_Maintenance,Insurance,Packaging_Cost,\
         Technology_Platform_Fee,Other_Overhead\nORD001,200,100,50,25,10,10,5\n",
    ),
    ("customer_feedback.csv", "Order_ID,Rating\nORD001,5\n"),
];

fn write_inputs(dir: &Path) {
    for (name, contents) in HEADERS {
        std::fs::write(dir.join(name), contents).unwrap();
    }
}

async fn run(data_dir: &Path, output_dir: &Path) -> cost_intel::Result<String> {
    let config = CliConfig {
        data_dir: data_dir.to_string_lossy().to_string(),
        output_path: output_dir.to_string_lossy().to_string(),
        title: "Schema Test".to_string(),
        start_date: None,
        end_date: None,
        segments: None,
        route_types: None,
        products: None,
        international_cities: vec!["Singapore".to_string()],
        top_routes: 15,
        max_table_rows: 500,
        formats: vec![OutputFormat::Json],
        bundle: None,
        verbose: false,
        monitor: false,
    };

    let source = LocalStorage::new(config.data_dir.clone());
    let sink = LocalStorage::new(config.output_path.clone());
    DashboardEngine::new(DashboardPipeline::new(source, sink, config))
        .run()
        .await
}

#[tokio::test]
async fn test_minimal_inputs_without_supplementary_tables() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_inputs(data_dir.path());

    let result = run(data_dir.path(), output_dir.path()).await;

    assert!(result.is_ok());
    assert!(output_dir.path().join("summary.json").exists());
}

#[tokio::test]
async fn test_missing_required_file() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_inputs(data_dir.path());
    std::fs::remove_file(data_dir.path().join("routes_distance.csv")).unwrap();

    let err = assert_err!(run(data_dir.path(), output_dir.path()).await);

    match &err {
        DashboardError::MissingDataFile { table, path } => {
            assert_eq!(table, Table::RoutesDistance.name());
            assert_eq!(path, "routes_distance.csv");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.severity(), ErrorSeverity::High);
    assert_eq!(err.exit_code(), 1);
    assert!(!output_dir.path().join("summary.json").exists());

    // 失敗時仍寫出錯誤頁面
    let page = std::fs::read_to_string(output_dir.path().join("dashboard.html")).unwrap();
    assert!(page.contains("routes_distance.csv"));
    assert!(page.contains("Make sure routes_distance.csv exists in the data directory"));
    assert!(!page.contains("Plotly.newPlot"));
}

#[tokio::test]
async fn test_missing_column_is_reported() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_inputs(data_dir.path());
    std::fs::write(
        data_dir.path().join("cost_breakdown.csv"),
        "Order_ID,Fuel_Cost,Labor_Cost\nORD001,200,100\n",
    )
    .unwrap();

    let err = assert_err!(run(data_dir.path(), output_dir.path()).await);

    match err {
        DashboardError::SchemaMismatch { table, missing } => {
            assert_eq!(table, "cost_breakdown");
            assert!(missing.contains(&"Insurance".to_string()));
            assert!(missing.contains(&"Other_Overhead".to_string()));
            assert!(!missing.contains(&"Fuel_Cost".to_string()));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unjoinable_keys_give_empty_master_table() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_inputs(data_dir.path());
    std::fs::write(
        data_dir.path().join("orders.csv"),
        "Order_ID,Order_Date,Customer_Segment,Product_Category,Order_Value_INR\n\
         ORD999,2024-01-05,SMB,Books,1000\n",
    )
    .unwrap();

    let err = assert_err!(run(data_dir.path(), output_dir.path()).await);

    assert!(matches!(err, DashboardError::EmptyMasterTable { rows: 1 }));
    assert_eq!(err.exit_code(), 2);
}

use cost_intel::domain::model::{OutputFormat, RouteType};
use cost_intel::{CliConfig, DashboardEngine, DashboardPipeline, LocalStorage};
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use tokio_test::assert_ok;

const ORDERS: &str = "\
Order_ID,Order_Date,Customer_Segment,Priority,Product_Category,Order_Value_INR,Origin,Destination
ORD001,2024-01-05,SMB,Express,Books,1000,Mumbai,Pune
ORD002,2024-02-07,Enterprise,Standard,Electronics,3000,Delhi,Singapore
ORD003,2024-02-20,SMB,Economy,Electronics,500,Chennai,Bangalore
ORD004,2024-03-02,Individual,Standard,Books,800,Kolkata,Hyderabad
";

const DELIVERY: &str = "\
Order_ID,Carrier,Promised_Delivery_Days,Actual_Delivery_Days,Delivery_Status,Customer_Rating,Delivery_Cost_INR
ORD001,QuickShip,3,2,On-Time,4,100
ORD002,QuickShip,3,5,Slightly-Delayed,2,300
ORD003,GlobalTransit,2,2,On-Time,5,80
ORD004,GlobalTransit,4,4,On-Time,4,90
";

const ROUTES: &str = "\
Order_ID,Route,Distance_KM,Fuel_Consumption_L,Toll_Charges_INR,Traffic_Delay_Minutes
ORD001,Mumbai-Pune,100,12,150,20
ORD002,Delhi-Singapore,1000,0,0,0
ORD003,Chennai-Bangalore,250,30,200,45
";

const COSTS: &str = "\
Order_ID,Fuel_Cost,Labor_Cost,Vehicle_Maintenance,Insurance,Packaging_Cost,Technology_Platform_Fee,Other_Overhead
ORD001,200,100,50,25,10,10,5
ORD002,800,400,100,50,50,50,50
ORD003,100,100,20,10,10,5,5
ORD004,50,20,10,5,5,5,5
";

const FEEDBACK: &str = "\
Order_ID,Feedback_Date,Rating,Feedback_Text,Would_Recommend,Issue_Category
ORD002,2024-02-14,3,Late but fine,Yes,Timing
";

const FLEET: &str = "\
Vehicle_ID,Vehicle_Type,Capacity_KG,Fuel_Efficiency_KM_per_L,Current_Location,Status,Age_Years,CO2_Emissions_Kg_per_KM
V001,Truck,5000,6,Mumbai,Available,4,0.9
V002,Truck,5000,8,Delhi,In_Transit,2,0.7
V003,Van,1500,12,Pune,Available,1,0.3
";

const WAREHOUSE: &str = "\
Warehouse_ID,Location,Product_Category,Current_Stock_Units,Reorder_Level,Storage_Cost_per_Unit,Last_Restocked_Date
WH01,Mumbai,Books,100,150,2.5,2024-01-01
WH01,Mumbai,Electronics,400,100,5,2024-01-01
WH02,Delhi,Electronics,50,80,4,2024-01-02
";

fn write_fixture(dir: &Path, with_supplements: bool) {
    let mut files = vec![
        ("orders.csv", ORDERS),
        ("delivery_performance.csv", DELIVERY),
        ("routes_distance.csv", ROUTES),
        ("cost_breakdown.csv", COSTS),
        ("customer_feedback.csv", FEEDBACK),
    ];
    if with_supplements {
        files.push(("vehicle_fleet.csv", FLEET));
        files.push(("warehouse_inventory.csv", WAREHOUSE));
    }
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).unwrap();
    }
}

fn config(data_dir: &Path, output_dir: &Path) -> CliConfig {
    CliConfig {
        data_dir: data_dir.to_string_lossy().to_string(),
        output_path: output_dir.to_string_lossy().to_string(),
        title: "NexGen Test Dashboard".to_string(),
        start_date: None,
        end_date: None,
        segments: None,
        route_types: None,
        products: None,
        international_cities: vec!["Singapore".to_string(), "Dubai".to_string()],
        top_routes: 15,
        max_table_rows: 500,
        formats: vec![OutputFormat::Html, OutputFormat::Csv, OutputFormat::Json],
        bundle: None,
        verbose: false,
        monitor: false,
    }
}

async fn run(config: CliConfig) -> cost_intel::Result<String> {
    let source = LocalStorage::new(config.data_dir.clone());
    let sink = LocalStorage::new(config.output_path.clone());
    let monitor = config.monitor;
    let pipeline = DashboardPipeline::new(source, sink, config);
    DashboardEngine::new_with_monitoring(pipeline, monitor)
        .run()
        .await
}

fn read_summary(output_dir: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(output_dir.join("summary.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn test_end_to_end_dashboard_files() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_fixture(data_dir.path(), true);

    let output_path = assert_ok!(run(config(data_dir.path(), output_dir.path())).await);
    assert!(output_path.ends_with("dashboard.html"));

    let html = std::fs::read_to_string(output_dir.path().join("dashboard.html")).unwrap();
    assert!(html.contains("NexGen Test Dashboard"));
    assert!(html.contains("chart-cost-breakdown"));
    assert!(html.contains("chart-international-routes"));
    assert!(html.contains("Delhi-Singapore"));

    let csv = std::fs::read_to_string(output_dir.path().join("filtered_data.csv")).unwrap();
    // ORD004 has no route and is dropped
    assert_eq!(csv.lines().count(), 4);
    assert!(!csv.contains("ORD004"));

    let summary = read_summary(output_dir.path());
    assert_eq!(summary["kpis"]["total_cost"], 2150.0);
    assert_eq!(summary["kpis"]["order_count"], 3);
    assert_eq!(summary["counts"]["cost_rows"], 4);
    assert_eq!(summary["counts"]["dropped_rows"], 1);
    assert_eq!(summary["counts"]["master_rows"], 3);
    assert_eq!(summary["international_routes"][0]["label"], "Delhi-Singapore");
    assert_eq!(summary["international_routes"][0]["value"], 1.5);
    assert_eq!(summary["fleet"].as_array().unwrap().len(), 2);
    assert_eq!(summary["warehouses"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_end_to_end_cost_breakdown_and_ratings() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_fixture(data_dir.path(), false);

    assert_ok!(run(config(data_dir.path(), output_dir.path())).await);

    let summary = read_summary(output_dir.path());

    let breakdown = summary["cost_breakdown"].as_array().unwrap();
    let fuel = breakdown
        .iter()
        .find(|g| g["label"] == "Fuel_Cost")
        .unwrap();
    assert_eq!(fuel["value"], 1100.0);

    // feedback rating overrides the delivery rating for ORD002
    let scatter = summary["scatter"].as_array().unwrap();
    let ord2 = scatter.iter().find(|p| p["order_id"] == "ORD002").unwrap();
    assert_eq!(ord2["final_rating"], 3.0);

    assert!(summary["fleet"].is_null());
    assert!(summary["warehouses"].is_null());
}

#[tokio::test]
async fn test_end_to_end_with_filters() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_fixture(data_dir.path(), true);

    let mut config = config(data_dir.path(), output_dir.path());
    config.route_types = Some(vec![RouteType::Domestic]);
    config.segments = Some(vec!["SMB".to_string()]);
    config.start_date = chrono::NaiveDate::from_ymd_opt(2024, 2, 1);

    assert_ok!(run(config).await);

    let summary = read_summary(output_dir.path());
    assert_eq!(summary["kpis"]["order_count"], 1);
    assert_eq!(summary["kpis"]["total_cost"], 250.0);
    assert_eq!(summary["filter"]["start_date"], "2024-02-01");
    assert!(summary["international_routes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_end_to_end_empty_selection_still_renders() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_fixture(data_dir.path(), false);

    let mut config = config(data_dir.path(), output_dir.path());
    config.products = Some(vec![]);

    assert_ok!(run(config).await);

    let summary = read_summary(output_dir.path());
    assert_eq!(summary["kpis"]["order_count"], 0);
    assert_eq!(summary["kpis"]["total_cost"], 0.0);

    let csv = std::fs::read_to_string(output_dir.path().join("filtered_data.csv")).unwrap();
    assert_eq!(csv.lines().count(), 1);
}

#[tokio::test]
async fn test_end_to_end_zip_bundle() {
    let data_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    write_fixture(data_dir.path(), true);

    let mut config = config(data_dir.path(), output_dir.path());
    config.bundle = Some("nexgen_dashboard.zip".to_string());
    config.monitor = true;

    let output_path = assert_ok!(run(config).await);
    assert!(output_path.ends_with("nexgen_dashboard.zip"));
    assert!(!output_dir.path().join("dashboard.html").exists());

    let zip_data = std::fs::read(output_dir.path().join("nexgen_dashboard.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 3);

    let mut csv_content = String::new();
    archive
        .by_name("filtered_data.csv")
        .unwrap()
        .read_to_string(&mut csv_content)
        .unwrap();
    assert!(csv_content.contains("ORD002"));
    assert!(csv_content.contains("International"));
}

//! Aggregated dashboard content. Serialized as `summary.json` and rendered
//! into the HTML page.

use crate::domain::model::RouteType;
use crate::domain::tables::Table;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_cost: f64,
    pub avg_cost_per_order: Option<f64>,
    pub avg_cost_per_km: Option<f64>,
    pub avg_efficiency_ratio: Option<f64>,
    pub order_count: usize,
}

/// 單一分組的彙總值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupValue {
    pub label: String,
    pub value: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub order_id: String,
    pub segment: String,
    pub total_cost: f64,
    pub final_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarrierPerformance {
    pub carrier: String,
    pub orders: usize,
    pub on_time_rate: Option<f64>,
    pub avg_delivery_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    pub vehicle_type: String,
    pub vehicles: usize,
    pub available: usize,
    pub avg_fuel_efficiency_km_per_l: Option<f64>,
    pub avg_age_years: Option<f64>,
    pub avg_co2_kg_per_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarehouseSummary {
    pub location: String,
    pub stock_units: f64,
    pub storage_value: f64,
    pub items_below_reorder: usize,
}

/// Order_ID 對應情況
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinCoverage {
    pub table: Table,
    pub rows: usize,
    pub blank_keys: usize,
    pub unmatched_cost_keys: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub segments: Vec<String>,
    pub route_types: Vec<RouteType>,
    pub products: Vec<String>,
}

/// 實際套用的篩選條件（已展開預設值）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFilter {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub segments: Vec<String>,
    pub route_types: Vec<RouteType>,
    pub products: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordCounts {
    pub cost_rows: usize,
    pub joined_rows: usize,
    pub dropped_rows: usize,
    pub master_rows: usize,
    pub filtered_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub title: String,
    pub generated_at: String,
    pub counts: RecordCounts,
    pub options: FilterOptions,
    pub filter: ResolvedFilter,
    pub kpis: Kpis,
    pub cost_breakdown: Vec<GroupValue>,
    pub product_cost: Vec<GroupValue>,
    pub segment_efficiency: Vec<GroupValue>,
    pub domestic_routes: Vec<GroupValue>,
    pub international_routes: Vec<GroupValue>,
    pub scatter: Vec<ScatterPoint>,
    pub monthly_cost: Vec<GroupValue>,
    pub carriers: Vec<CarrierPerformance>,
    pub fleet: Option<Vec<FleetSummary>>,
    pub warehouses: Option<Vec<WarehouseSummary>>,
    pub join_coverage: Vec<JoinCoverage>,
}

//! Row types for the seven input CSV files.
//!
//! Only the columns the dashboard uses are mapped; extra columns in a file are
//! ignored. Numeric cells that are blank or unparseable load as `None`.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// 輸入資料表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Orders,
    DeliveryPerformance,
    RoutesDistance,
    CostBreakdown,
    CustomerFeedback,
    VehicleFleet,
    WarehouseInventory,
}

impl Table {
    pub const ALL: [Table; 7] = [
        Table::Orders,
        Table::DeliveryPerformance,
        Table::RoutesDistance,
        Table::CostBreakdown,
        Table::CustomerFeedback,
        Table::VehicleFleet,
        Table::WarehouseInventory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Orders => "orders",
            Table::DeliveryPerformance => "delivery_performance",
            Table::RoutesDistance => "routes_distance",
            Table::CostBreakdown => "cost_breakdown",
            Table::CustomerFeedback => "customer_feedback",
            Table::VehicleFleet => "vehicle_fleet",
            Table::WarehouseInventory => "warehouse_inventory",
        }
    }

    pub fn default_file(&self) -> &'static str {
        match self {
            Table::Orders => "orders.csv",
            Table::DeliveryPerformance => "delivery_performance.csv",
            Table::RoutesDistance => "routes_distance.csv",
            Table::CostBreakdown => "cost_breakdown.csv",
            Table::CustomerFeedback => "customer_feedback.csv",
            Table::VehicleFleet => "vehicle_fleet.csv",
            Table::WarehouseInventory => "warehouse_inventory.csv",
        }
    }

    /// Columns that must appear in the header row.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Table::Orders => &[
                "Order_ID",
                "Order_Date",
                "Customer_Segment",
                "Product_Category",
                "Order_Value_INR",
            ],
            Table::DeliveryPerformance => &["Order_ID", "Carrier", "Customer_Rating"],
            Table::RoutesDistance => &["Order_ID", "Route", "Distance_KM"],
            Table::CostBreakdown => &[
                "Order_ID",
                "Fuel_Cost",
                "Labor_Cost",
                "Vehicle_Maintenance",
                "Insurance",
                "Packaging_Cost",
                "Technology_Platform_Fee",
                "Other_Overhead",
            ],
            Table::CustomerFeedback => &["Order_ID", "Rating"],
            Table::VehicleFleet => &["Vehicle_ID", "Vehicle_Type", "Status"],
            Table::WarehouseInventory => &[
                "Warehouse_ID",
                "Location",
                "Product_Category",
                "Current_Stock_Units",
                "Reorder_Level",
            ],
        }
    }

    /// 車隊與倉庫資料為補充資料，缺檔時略過對應區塊
    pub fn is_supplementary(&self) -> bool {
        matches!(self, Table::VehicleFleet | Table::WarehouseInventory)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderRow {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Order_Date")]
    pub order_date: String,
    #[serde(rename = "Customer_Segment")]
    pub customer_segment: String,
    #[serde(rename = "Product_Category")]
    pub product_category: String,
    #[serde(rename = "Order_Value_INR", deserialize_with = "csv::invalid_option")]
    pub order_value_inr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliveryRow {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Carrier")]
    pub carrier: String,
    #[serde(rename = "Customer_Rating", deserialize_with = "csv::invalid_option")]
    pub customer_rating: Option<f64>,
    #[serde(
        rename = "Promised_Delivery_Days",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub promised_delivery_days: Option<f64>,
    #[serde(
        rename = "Actual_Delivery_Days",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub actual_delivery_days: Option<f64>,
    #[serde(rename = "Delivery_Status", default)]
    pub delivery_status: String,
    #[serde(
        rename = "Delivery_Cost_INR",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub delivery_cost_inr: Option<f64>,
}

impl DeliveryRow {
    /// 實際天數不超過承諾天數即準時；缺天數時改看 Delivery_Status
    pub fn is_on_time(&self) -> Option<bool> {
        match (self.actual_delivery_days, self.promised_delivery_days) {
            (Some(actual), Some(promised)) => Some(actual <= promised),
            _ => {
                let status = self.delivery_status.trim();
                if status.is_empty() {
                    None
                } else {
                    Some(
                        status.eq_ignore_ascii_case("on-time")
                            || status.eq_ignore_ascii_case("on time"),
                    )
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteRow {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Route")]
    pub route: String,
    #[serde(rename = "Distance_KM", deserialize_with = "csv::invalid_option")]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CostRow {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Fuel_Cost", deserialize_with = "csv::invalid_option")]
    pub fuel_cost: Option<f64>,
    #[serde(rename = "Labor_Cost", deserialize_with = "csv::invalid_option")]
    pub labor_cost: Option<f64>,
    #[serde(rename = "Vehicle_Maintenance", deserialize_with = "csv::invalid_option")]
    pub vehicle_maintenance: Option<f64>,
    #[serde(rename = "Insurance", deserialize_with = "csv::invalid_option")]
    pub insurance: Option<f64>,
    #[serde(rename = "Packaging_Cost", deserialize_with = "csv::invalid_option")]
    pub packaging_cost: Option<f64>,
    #[serde(
        rename = "Technology_Platform_Fee",
        deserialize_with = "csv::invalid_option"
    )]
    pub technology_platform_fee: Option<f64>,
    #[serde(rename = "Other_Overhead", deserialize_with = "csv::invalid_option")]
    pub other_overhead: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedbackRow {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Rating", deserialize_with = "csv::invalid_option")]
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleRow {
    #[serde(rename = "Vehicle_ID")]
    pub vehicle_id: String,
    #[serde(rename = "Vehicle_Type")]
    pub vehicle_type: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Capacity_KG", default, deserialize_with = "csv::invalid_option")]
    pub capacity_kg: Option<f64>,
    #[serde(
        rename = "Fuel_Efficiency_KM_per_L",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub fuel_efficiency_km_per_l: Option<f64>,
    #[serde(rename = "Age_Years", default, deserialize_with = "csv::invalid_option")]
    pub age_years: Option<f64>,
    #[serde(
        rename = "CO2_Emissions_Kg_per_KM",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub co2_emissions_kg_per_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WarehouseRow {
    #[serde(rename = "Warehouse_ID")]
    pub warehouse_id: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Product_Category")]
    pub product_category: String,
    #[serde(rename = "Current_Stock_Units", deserialize_with = "csv::invalid_option")]
    pub current_stock_units: Option<f64>,
    #[serde(rename = "Reorder_Level", deserialize_with = "csv::invalid_option")]
    pub reorder_level: Option<f64>,
    #[serde(
        rename = "Storage_Cost_per_Unit",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    pub storage_cost_per_unit: Option<f64>,
}

impl WarehouseRow {
    pub fn needs_reorder(&self) -> bool {
        match (self.current_stock_units, self.reorder_level) {
            (Some(stock), Some(level)) => stock <= level,
            _ => false,
        }
    }
}

/// 一次執行所載入的全部資料表
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub orders: Vec<OrderRow>,
    pub deliveries: Vec<DeliveryRow>,
    pub routes: Vec<RouteRow>,
    pub costs: Vec<CostRow>,
    pub feedback: Vec<FeedbackRow>,
    pub fleet: Option<Vec<VehicleRow>>,
    pub warehouses: Option<Vec<WarehouseRow>>,
}

impl Datasets {
    pub fn row_count(&self, table: Table) -> Option<usize> {
        match table {
            Table::Orders => Some(self.orders.len()),
            Table::DeliveryPerformance => Some(self.deliveries.len()),
            Table::RoutesDistance => Some(self.routes.len()),
            Table::CostBreakdown => Some(self.costs.len()),
            Table::CustomerFeedback => Some(self.feedback.len()),
            Table::VehicleFleet => self.fleet.as_ref().map(Vec::len),
            Table::WarehouseInventory => self.warehouses.as_ref().map(Vec::len),
        }
    }
}

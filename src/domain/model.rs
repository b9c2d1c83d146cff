use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RouteType {
    Domestic,
    International,
}

impl RouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Domestic => "Domestic",
            RouteType::International => "International",
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "domestic" => Ok(RouteType::Domestic),
            "international" => Ok(RouteType::International),
            other => Err(format!(
                "unknown route type '{}', expected Domestic or International",
                other
            )),
        }
    }
}

/// 成本組成項目，順序即圖表顯示順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostComponent {
    Fuel,
    Labor,
    VehicleMaintenance,
    Insurance,
    Packaging,
    TechnologyPlatformFee,
    OtherOverhead,
}

impl CostComponent {
    pub const ALL: [CostComponent; 7] = [
        CostComponent::Fuel,
        CostComponent::Labor,
        CostComponent::VehicleMaintenance,
        CostComponent::Insurance,
        CostComponent::Packaging,
        CostComponent::TechnologyPlatformFee,
        CostComponent::OtherOverhead,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            CostComponent::Fuel => "Fuel_Cost",
            CostComponent::Labor => "Labor_Cost",
            CostComponent::VehicleMaintenance => "Vehicle_Maintenance",
            CostComponent::Insurance => "Insurance",
            CostComponent::Packaging => "Packaging_Cost",
            CostComponent::TechnologyPlatformFee => "Technology_Platform_Fee",
            CostComponent::OtherOverhead => "Other_Overhead",
        }
    }
}

/// One row of the joined per-order table that every chart is computed from.
///
/// Rows only exist here once cost per km, efficiency ratio, final rating,
/// route and order date are all known.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterRecord {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Fuel_Cost")]
    pub fuel_cost: Option<f64>,
    #[serde(rename = "Labor_Cost")]
    pub labor_cost: Option<f64>,
    #[serde(rename = "Vehicle_Maintenance")]
    pub vehicle_maintenance: Option<f64>,
    #[serde(rename = "Insurance")]
    pub insurance: Option<f64>,
    #[serde(rename = "Packaging_Cost")]
    pub packaging_cost: Option<f64>,
    #[serde(rename = "Technology_Platform_Fee")]
    pub technology_platform_fee: Option<f64>,
    #[serde(rename = "Other_Overhead")]
    pub other_overhead: Option<f64>,
    #[serde(rename = "Total_Cost")]
    pub total_cost: f64,
    #[serde(rename = "Route")]
    pub route: String,
    #[serde(rename = "Distance_KM")]
    pub distance_km: f64,
    #[serde(rename = "Order_Date")]
    pub order_date: NaiveDate,
    #[serde(rename = "Customer_Segment")]
    pub customer_segment: String,
    #[serde(rename = "Product_Category")]
    pub product_category: String,
    #[serde(rename = "Order_Value_INR")]
    pub order_value_inr: f64,
    #[serde(rename = "Carrier")]
    pub carrier: Option<String>,
    #[serde(rename = "Customer_Rating")]
    pub customer_rating: Option<f64>,
    #[serde(rename = "Rating")]
    pub rating: Option<f64>,
    #[serde(rename = "Final_Rating")]
    pub final_rating: f64,
    #[serde(rename = "Cost_Per_KM")]
    pub cost_per_km: f64,
    #[serde(rename = "Cost_Per_Order")]
    pub cost_per_order: f64,
    #[serde(rename = "Cost_Efficiency_Ratio")]
    pub cost_efficiency_ratio: f64,
    #[serde(rename = "Route_Type")]
    pub route_type: RouteType,
}

impl MasterRecord {
    pub const COLUMNS: [&'static str; 23] = [
        "Order_ID",
        "Fuel_Cost",
        "Labor_Cost",
        "Vehicle_Maintenance",
        "Insurance",
        "Packaging_Cost",
        "Technology_Platform_Fee",
        "Other_Overhead",
        "Total_Cost",
        "Route",
        "Distance_KM",
        "Order_Date",
        "Customer_Segment",
        "Product_Category",
        "Order_Value_INR",
        "Carrier",
        "Customer_Rating",
        "Rating",
        "Final_Rating",
        "Cost_Per_KM",
        "Cost_Per_Order",
        "Cost_Efficiency_Ratio",
        "Route_Type",
    ];

    pub fn component(&self, component: CostComponent) -> Option<f64> {
        match component {
            CostComponent::Fuel => self.fuel_cost,
            CostComponent::Labor => self.labor_cost,
            CostComponent::VehicleMaintenance => self.vehicle_maintenance,
            CostComponent::Insurance => self.insurance,
            CostComponent::Packaging => self.packaging_cost,
            CostComponent::TechnologyPlatformFee => self.technology_platform_fee,
            CostComponent::OtherOverhead => self.other_overhead,
        }
    }

    /// 依欄位順序輸出成字串，給 HTML 表格使用
    pub fn display_cells(&self) -> Vec<String> {
        fn opt(v: Option<f64>) -> String {
            v.map(|x| x.to_string()).unwrap_or_default()
        }

        vec![
            self.order_id.clone(),
            opt(self.fuel_cost),
            opt(self.labor_cost),
            opt(self.vehicle_maintenance),
            opt(self.insurance),
            opt(self.packaging_cost),
            opt(self.technology_platform_fee),
            opt(self.other_overhead),
            self.total_cost.to_string(),
            self.route.clone(),
            self.distance_km.to_string(),
            self.order_date.to_string(),
            self.customer_segment.clone(),
            self.product_category.clone(),
            self.order_value_inr.to_string(),
            self.carrier.clone().unwrap_or_default(),
            opt(self.customer_rating),
            opt(self.rating),
            self.final_rating.to_string(),
            self.cost_per_km.to_string(),
            self.cost_per_order.to_string(),
            self.cost_efficiency_ratio.to_string(),
            self.route_type.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFormat::Html => "dashboard.html",
            OutputFormat::Csv => "filtered_data.csv",
            OutputFormat::Json => "summary.json",
        }
    }
}

/// 單一輸出檔案
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub report: crate::domain::report::DashboardReport,
    pub filtered_records: Vec<MasterRecord>,
    pub files: Vec<RenderedFile>,
}

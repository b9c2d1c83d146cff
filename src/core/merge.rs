//! Builds the per-order master table from the order-keyed input tables.

use crate::domain::model::{MasterRecord, RouteType};
use crate::domain::report::JoinCoverage;
use crate::domain::tables::{
    CostRow, Datasets, DeliveryRow, FeedbackRow, OrderRow, RouteRow, Table,
};
use crate::utils::format::round2;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// 寬鬆解析日期，無法解析時回傳 None
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Classifies a route as international when it mentions any of the given cities.
pub fn classify_route(route: &str, international_cities: &[String]) -> RouteType {
    let route = route.to_lowercase();
    let is_international = international_cities
        .iter()
        .filter(|city| !city.trim().is_empty())
        .any(|city| route.contains(&city.trim().to_lowercase()));

    if is_international {
        RouteType::International
    } else {
        RouteType::Domestic
    }
}

pub fn total_cost(row: &CostRow) -> f64 {
    [
        row.fuel_cost,
        row.labor_cost,
        row.vehicle_maintenance,
        row.insurance,
        row.packaging_cost,
        row.technology_platform_fee,
        row.other_overhead,
    ]
    .iter()
    .flatten()
    .sum()
}

trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for OrderRow {
    fn key(&self) -> &str {
        &self.order_id
    }
}

impl Keyed for DeliveryRow {
    fn key(&self) -> &str {
        &self.order_id
    }
}

impl Keyed for RouteRow {
    fn key(&self) -> &str {
        &self.order_id
    }
}

impl Keyed for FeedbackRow {
    fn key(&self) -> &str {
        &self.order_id
    }
}

/// 依 Order_ID 建索引，空白鍵值不參與 join
fn index_by_key<T: Keyed>(rows: &[T]) -> HashMap<&str, Vec<&T>> {
    let mut index: HashMap<&str, Vec<&T>> = HashMap::new();
    for row in rows {
        let key = row.key().trim();
        if !key.is_empty() {
            index.entry(key).or_default().push(row);
        }
    }
    index
}

/// Left-join matches: a missing key still yields one row with `None`.
fn matches<'a, T>(index: &HashMap<&str, Vec<&'a T>>, key: &str) -> Vec<Option<&'a T>> {
    match index.get(key) {
        Some(rows) => rows.iter().map(|r| Some(*r)).collect(),
        None => vec![None],
    }
}

fn coverage<T: Keyed>(table: Table, rows: &[T], cost_keys: &HashSet<&str>) -> JoinCoverage {
    let keys: HashSet<&str> = rows.iter().map(|r| r.key().trim()).collect();
    JoinCoverage {
        table,
        rows: rows.len(),
        blank_keys: rows.iter().filter(|r| r.key().trim().is_empty()).count(),
        unmatched_cost_keys: cost_keys.iter().filter(|k| !keys.contains(*k)).count(),
    }
}

/// Reports, for every table joined onto the cost table, how many rows have a
/// blank Order_ID and how many cost-table keys find no partner.
pub fn check_join_keys(datasets: &Datasets) -> Vec<JoinCoverage> {
    let cost_keys: HashSet<&str> = datasets
        .costs
        .iter()
        .map(|c| c.order_id.trim())
        .filter(|k| !k.is_empty())
        .collect();

    let blank_cost_keys = datasets
        .costs
        .iter()
        .filter(|c| c.order_id.trim().is_empty())
        .count();

    let report = vec![
        JoinCoverage {
            table: Table::CostBreakdown,
            rows: datasets.costs.len(),
            blank_keys: blank_cost_keys,
            unmatched_cost_keys: 0,
        },
        coverage(Table::RoutesDistance, &datasets.routes, &cost_keys),
        coverage(Table::Orders, &datasets.orders, &cost_keys),
        coverage(Table::DeliveryPerformance, &datasets.deliveries, &cost_keys),
        coverage(Table::CustomerFeedback, &datasets.feedback, &cost_keys),
    ];

    for entry in &report {
        if entry.blank_keys > 0 {
            tracing::warn!(
                "⚠️ {} has {} rows with a blank Order_ID",
                entry.table,
                entry.blank_keys
            );
        }
        if entry.unmatched_cost_keys > 0 {
            tracing::warn!(
                "⚠️ {} cost orders have no match in {}",
                entry.unmatched_cost_keys,
                entry.table
            );
        }
    }

    report
}

#[derive(Debug, Clone)]
pub struct MasterTable {
    pub records: Vec<MasterRecord>,
    /// 合併後 (尚未剔除) 的列數
    pub joined_rows: usize,
    pub dropped_rows: usize,
}

/// Joins routes, orders, deliveries and feedback onto the cost rows, derives
/// the cost metrics and drops rows that cannot be charted.
pub fn build_master(datasets: &Datasets, international_cities: &[String]) -> MasterTable {
    let routes = index_by_key(&datasets.routes);
    let orders = index_by_key(&datasets.orders);
    let deliveries = index_by_key(&datasets.deliveries);
    let feedback = index_by_key(&datasets.feedback);

    let mut records = Vec::new();
    let mut joined_rows = 0;

    for cost in &datasets.costs {
        let key = cost.order_id.trim();
        let total = total_cost(cost);

        for route in matches(&routes, key) {
            for order in matches(&orders, key) {
                for delivery in matches(&deliveries, key) {
                    for fb in matches(&feedback, key) {
                        joined_rows += 1;
                        let derived = derive_record(
                            cost,
                            total,
                            route,
                            order,
                            delivery,
                            fb,
                            international_cities,
                        );
                        if let Some(record) = derived {
                            records.push(record);
                        }
                    }
                }
            }
        }
    }

    let dropped_rows = joined_rows - records.len();
    if dropped_rows > 0 {
        tracing::info!(
            "🧹 Dropped {} of {} joined rows with missing cost, rating, route or date",
            dropped_rows,
            joined_rows
        );
    }

    MasterTable {
        records,
        joined_rows,
        dropped_rows,
    }
}

fn derive_record(
    cost: &CostRow,
    total: f64,
    route: Option<&RouteRow>,
    order: Option<&OrderRow>,
    delivery: Option<&DeliveryRow>,
    feedback: Option<&FeedbackRow>,
    international_cities: &[String],
) -> Option<MasterRecord> {
    let route_row = route?;
    let order_row = order?;

    let route_name = route_row.route.trim();
    if route_name.is_empty() {
        return None;
    }

    // 距離為 0 視為缺值
    let distance = route_row.distance_km.filter(|d| *d != 0.0)?;
    let cost_per_km = Some(round2(total / distance)).filter(|v| v.is_finite())?;

    let order_value = order_row.order_value_inr?;
    let efficiency = Some(round2(order_value / total)).filter(|v| v.is_finite())?;

    let order_date = parse_order_date(&order_row.order_date)?;

    let customer_rating = delivery.and_then(|d| d.customer_rating);
    let rating = feedback.and_then(|f| f.rating);
    let final_rating = rating.or(customer_rating)?;

    Some(MasterRecord {
        order_id: cost.order_id.trim().to_string(),
        fuel_cost: cost.fuel_cost,
        labor_cost: cost.labor_cost,
        vehicle_maintenance: cost.vehicle_maintenance,
        insurance: cost.insurance,
        packaging_cost: cost.packaging_cost,
        technology_platform_fee: cost.technology_platform_fee,
        other_overhead: cost.other_overhead,
        total_cost: total,
        route: route_name.to_string(),
        distance_km: distance,
        order_date,
        customer_segment: order_row.customer_segment.clone(),
        product_category: order_row.product_category.clone(),
        order_value_inr: order_value,
        carrier: delivery.map(|d| d.carrier.clone()),
        customer_rating,
        rating,
        final_rating,
        cost_per_km,
        cost_per_order: total,
        cost_efficiency_ratio: efficiency,
        route_type: classify_route(route_name, international_cities),
    })
}

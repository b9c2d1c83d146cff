//! KPI and chart aggregations over the filtered master table.

use crate::domain::model::{CostComponent, MasterRecord, RouteType};
use crate::domain::report::{
    CarrierPerformance, FleetSummary, GroupValue, Kpis, ScatterPoint, WarehouseSummary,
};
use crate::domain::tables::{DeliveryRow, VehicleRow, WarehouseRow};
use std::collections::{BTreeMap, HashSet};

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn mean_of(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    mean(values.flatten())
}

pub fn kpis(records: &[MasterRecord]) -> Kpis {
    Kpis {
        total_cost: records.iter().map(|r| r.total_cost).sum(),
        avg_cost_per_order: mean(records.iter().map(|r| r.cost_per_order)),
        avg_cost_per_km: mean(records.iter().map(|r| r.cost_per_km)),
        avg_efficiency_ratio: mean(records.iter().map(|r| r.cost_efficiency_ratio)),
        order_count: records.len(),
    }
}

/// Chart 1: 各成本項目總和 (缺值略過)
pub fn cost_breakdown(records: &[MasterRecord]) -> Vec<GroupValue> {
    CostComponent::ALL
        .iter()
        .map(|component| {
            let values: Vec<f64> = records
                .iter()
                .filter_map(|r| r.component(*component))
                .collect();
            GroupValue {
                label: component.column().to_string(),
                value: values.iter().sum(),
                count: values.len(),
            }
        })
        .collect()
}

/// Mean of `value` grouped by `key`, sorted ascending by the mean.
///
/// Groups are first ordered by key, and the sort is stable, so equal means keep
/// key order.
pub fn mean_by<K, V>(records: &[MasterRecord], key: K, value: V) -> Vec<GroupValue>
where
    K: Fn(&MasterRecord) -> String,
    V: Fn(&MasterRecord) -> f64,
{
    let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(key(record)).or_insert((0.0, 0));
        entry.0 += value(record);
        entry.1 += 1;
    }

    let mut out: Vec<GroupValue> = groups
        .into_iter()
        .map(|(label, (sum, count))| GroupValue {
            label,
            value: sum / count as f64,
            count,
        })
        .collect();
    out.sort_by(|a, b| a.value.total_cmp(&b.value));
    out
}

/// Chart 3
pub fn product_cost(records: &[MasterRecord]) -> Vec<GroupValue> {
    mean_by(records, |r| r.product_category.clone(), |r| r.cost_per_order)
}

/// Chart 4
pub fn segment_efficiency(records: &[MasterRecord]) -> Vec<GroupValue> {
    mean_by(
        records,
        |r| r.customer_segment.clone(),
        |r| r.cost_efficiency_ratio,
    )
}

/// Chart 2a/2b: the `top` most expensive routes by mean cost per km, still in
/// ascending order.
pub fn route_cost_per_km(
    records: &[MasterRecord],
    route_type: RouteType,
    top: usize,
) -> Vec<GroupValue> {
    let subset: Vec<MasterRecord> = records
        .iter()
        .filter(|r| r.route_type == route_type)
        .cloned()
        .collect();

    let all = mean_by(&subset, |r| r.route.clone(), |r| r.cost_per_km);
    let skip = all.len().saturating_sub(top);
    all.into_iter().skip(skip).collect()
}

/// Chart 5
pub fn cost_vs_rating(records: &[MasterRecord]) -> Vec<ScatterPoint> {
    records
        .iter()
        .map(|r| ScatterPoint {
            order_id: r.order_id.clone(),
            segment: r.customer_segment.clone(),
            total_cost: r.total_cost,
            final_rating: r.final_rating,
        })
        .collect()
}

/// 依月份 (YYYY-MM) 加總總成本，依時間排序
pub fn monthly_cost(records: &[MasterRecord]) -> Vec<GroupValue> {
    let mut months: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = months
            .entry(record.order_date.format("%Y-%m").to_string())
            .or_insert((0.0, 0));
        entry.0 += record.total_cost;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|(label, (value, count))| GroupValue {
            label,
            value,
            count,
        })
        .collect()
}

/// On-time rate and mean delivery cost per carrier, for the orders present in
/// `records`. Sorted ascending by on-time rate; carriers without any
/// on-time information sort first.
pub fn carrier_performance(
    records: &[MasterRecord],
    deliveries: &[DeliveryRow],
) -> Vec<CarrierPerformance> {
    let order_ids: HashSet<&str> = records.iter().map(|r| r.order_id.as_str()).collect();

    let mut carriers: BTreeMap<String, Vec<&DeliveryRow>> = BTreeMap::new();
    for delivery in deliveries {
        if order_ids.contains(delivery.order_id.trim()) && !delivery.carrier.trim().is_empty() {
            carriers
                .entry(delivery.carrier.trim().to_string())
                .or_default()
                .push(delivery);
        }
    }

    let mut out: Vec<CarrierPerformance> = carriers
        .into_iter()
        .map(|(carrier, rows)| {
            let known: Vec<bool> = rows.iter().filter_map(|d| d.is_on_time()).collect();
            let on_time_rate = if known.is_empty() {
                None
            } else {
                Some(known.iter().filter(|v| **v).count() as f64 / known.len() as f64)
            };

            CarrierPerformance {
                carrier,
                orders: rows.len(),
                on_time_rate,
                avg_delivery_cost: mean_of(rows.iter().map(|d| d.delivery_cost_inr)),
            }
        })
        .collect();

    out.sort_by(|a, b| {
        a.on_time_rate
            .unwrap_or(f64::NEG_INFINITY)
            .total_cmp(&b.on_time_rate.unwrap_or(f64::NEG_INFINITY))
    });
    out
}

pub fn fleet_summary(fleet: &[VehicleRow]) -> Vec<FleetSummary> {
    let mut groups: BTreeMap<String, Vec<&VehicleRow>> = BTreeMap::new();
    for vehicle in fleet {
        groups
            .entry(vehicle.vehicle_type.trim().to_string())
            .or_default()
            .push(vehicle);
    }

    groups
        .into_iter()
        .map(|(vehicle_type, rows)| FleetSummary {
            vehicle_type,
            vehicles: rows.len(),
            available: rows
                .iter()
                .filter(|v| v.status.trim().eq_ignore_ascii_case("available"))
                .count(),
            avg_fuel_efficiency_km_per_l: mean_of(
                rows.iter().map(|v| v.fuel_efficiency_km_per_l),
            ),
            avg_age_years: mean_of(rows.iter().map(|v| v.age_years)),
            avg_co2_kg_per_km: mean_of(rows.iter().map(|v| v.co2_emissions_kg_per_km)),
        })
        .collect()
}

/// 倉庫依地點彙總，只計入選取的產品類別
pub fn warehouse_summary(
    warehouses: &[WarehouseRow],
    products: &[String],
) -> Vec<WarehouseSummary> {
    let mut groups: BTreeMap<String, Vec<&WarehouseRow>> = BTreeMap::new();
    for row in warehouses
        .iter()
        .filter(|w| products.iter().any(|p| p == w.product_category.trim()))
    {
        groups
            .entry(row.location.trim().to_string())
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|(location, rows)| WarehouseSummary {
            location,
            stock_units: rows.iter().filter_map(|w| w.current_stock_units).sum(),
            storage_value: rows
                .iter()
                .filter_map(|w| Some(w.current_stock_units? * w.storage_cost_per_unit?))
                .sum(),
            items_below_reorder: rows.iter().filter(|w| w.needs_reorder()).count(),
        })
        .collect()
}

use crate::domain::model::{MasterRecord, RouteType};
use crate::domain::report::{FilterOptions, ResolvedFilter};
use crate::utils::error::{DashboardError, Result};
use chrono::NaiveDate;

/// User selection. `None` means "everything"; an empty list selects nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub segments: Option<Vec<String>>,
    pub route_types: Option<Vec<RouteType>>,
    pub products: Option<Vec<String>>,
}

/// 保留第一次出現的順序去除重複
fn unique_in_order<T: PartialEq + Clone>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

impl FilterOptions {
    /// Returns `None` for an empty table.
    pub fn from_records(records: &[MasterRecord]) -> Option<Self> {
        let min_date = records.iter().map(|r| r.order_date).min()?;
        let max_date = records.iter().map(|r| r.order_date).max()?;

        Some(Self {
            min_date,
            max_date,
            segments: unique_in_order(records.iter().map(|r| r.customer_segment.clone())),
            route_types: unique_in_order(records.iter().map(|r| r.route_type)),
            products: unique_in_order(records.iter().map(|r| r.product_category.clone())),
        })
    }
}

impl FilterSpec {
    /// Expands unset selections to all available values and clamps the date
    /// range to the data.
    pub fn resolve(&self, options: &FilterOptions) -> Result<ResolvedFilter> {
        let start_date = self
            .start_date
            .unwrap_or(options.min_date)
            .clamp(options.min_date, options.max_date);
        let end_date = self
            .end_date
            .unwrap_or(options.max_date)
            .clamp(options.min_date, options.max_date);

        if start_date > end_date {
            return Err(DashboardError::ConfigValidationError {
                field: "filters.date_range".to_string(),
                message: format!("start date {} is after end date {}", start_date, end_date),
            });
        }

        let segments = self
            .segments
            .clone()
            .unwrap_or_else(|| options.segments.clone());
        let route_types = self
            .route_types
            .clone()
            .unwrap_or_else(|| options.route_types.clone());
        let products = self
            .products
            .clone()
            .unwrap_or_else(|| options.products.clone());

        for segment in &segments {
            if !options.segments.contains(segment) {
                tracing::warn!("⚠️ Segment '{}' does not appear in the data", segment);
            }
        }
        for product in &products {
            if !options.products.contains(product) {
                tracing::warn!("⚠️ Product category '{}' does not appear in the data", product);
            }
        }

        Ok(ResolvedFilter {
            start_date,
            end_date,
            segments,
            route_types,
            products,
        })
    }
}

impl ResolvedFilter {
    pub fn matches(&self, record: &MasterRecord) -> bool {
        record.order_date >= self.start_date
            && record.order_date <= self.end_date
            && self.segments.contains(&record.customer_segment)
            && self.route_types.contains(&record.route_type)
            && self.products.contains(&record.product_category)
    }
}

pub fn apply_filter(records: &[MasterRecord], filter: &ResolvedFilter) -> Vec<MasterRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        id: &str,
        date: (i32, u32, u32),
        segment: &str,
        product: &str,
        rt: RouteType,
    ) -> MasterRecord {
        MasterRecord {
            order_id: id.to_string(),
            fuel_cost: Some(10.0),
            labor_cost: None,
            vehicle_maintenance: None,
            insurance: None,
            packaging_cost: None,
            technology_platform_fee: None,
            other_overhead: None,
            total_cost: 10.0,
            route: "Pune-Delhi".to_string(),
            distance_km: 10.0,
            order_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            customer_segment: segment.to_string(),
            product_category: product.to_string(),
            order_value_inr: 20.0,
            carrier: None,
            customer_rating: Some(4.0),
            rating: None,
            final_rating: 4.0,
            cost_per_km: 1.0,
            cost_per_order: 10.0,
            cost_efficiency_ratio: 2.0,
            route_type: rt,
        }
    }

    fn sample() -> Vec<MasterRecord> {
        vec![
            record("A", (2024, 1, 5), "SMB", "Books", RouteType::Domestic),
            record(
                "B",
                (2024, 2, 10),
                "Enterprise",
                "Electronics",
                RouteType::International,
            ),
            record("C", (2024, 3, 20), "SMB", "Electronics", RouteType::Domestic),
            record("D", (2024, 1, 1), "Individual", "Books", RouteType::Domestic),
        ]
    }

    fn ids(records: &[MasterRecord]) -> Vec<&str> {
        records.iter().map(|r| r.order_id.as_str()).collect()
    }

    #[test]
    fn test_options_keep_first_appearance_order() {
        let options = FilterOptions::from_records(&sample()).unwrap();

        assert_eq!(options.min_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(options.max_date, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        assert_eq!(options.segments, vec!["SMB", "Enterprise", "Individual"]);
        assert_eq!(
            options.route_types,
            vec![RouteType::Domestic, RouteType::International]
        );
        assert_eq!(options.products, vec!["Books", "Electronics"]);
        assert!(FilterOptions::from_records(&[]).is_none());
    }

    #[test]
    fn test_default_spec_selects_everything() {
        let records = sample();
        let options = FilterOptions::from_records(&records).unwrap();
        let filter = FilterSpec::default().resolve(&options).unwrap();

        assert_eq!(apply_filter(&records, &filter).len(), 4);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let records = sample();
        let options = FilterOptions::from_records(&records).unwrap();
        let spec = FilterSpec {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 5),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 10),
            ..Default::default()
        };

        let filter = spec.resolve(&options).unwrap();
        assert_eq!(ids(&apply_filter(&records, &filter)), vec!["A", "B"]);
    }

    #[test]
    fn test_dates_are_clamped_to_data_range() {
        let options = FilterOptions::from_records(&sample()).unwrap();
        let spec = FilterSpec {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2030, 1, 1),
            ..Default::default()
        };

        let filter = spec.resolve(&options).unwrap();
        assert_eq!(filter.start_date, options.min_date);
        assert_eq!(filter.end_date, options.max_date);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let options = FilterOptions::from_records(&sample()).unwrap();
        let spec = FilterSpec {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            ..Default::default()
        };

        assert!(spec.resolve(&options).is_err());
    }

    #[test]
    fn test_membership_filters_combine() {
        let records = sample();
        let options = FilterOptions::from_records(&records).unwrap();
        let spec = FilterSpec {
            segments: Some(vec!["SMB".to_string()]),
            route_types: Some(vec![RouteType::Domestic]),
            products: Some(vec!["Electronics".to_string()]),
            ..Default::default()
        };

        let filter = spec.resolve(&options).unwrap();
        assert_eq!(ids(&apply_filter(&records, &filter)), vec!["C"]);
    }

    #[test]
    fn test_empty_selection_selects_nothing() {
        let records = sample();
        let options = FilterOptions::from_records(&records).unwrap();
        let spec = FilterSpec {
            segments: Some(vec![]),
            ..Default::default()
        };

        let filter = spec.resolve(&options).unwrap();
        assert!(apply_filter(&records, &filter).is_empty());
    }
}

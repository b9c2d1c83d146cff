use crate::core::{ConfigProvider, Storage};
use crate::domain::tables::{Datasets, Table};
use crate::utils::error::{DashboardError, Result};
use serde::de::DeserializeOwned;

/// 解析單一 CSV 檔案並檢查欄位
pub fn parse_table<T: DeserializeOwned>(table: Table, data: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = table
        .required_columns()
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(DashboardError::SchemaMismatch {
            table: table.name().to_string(),
            missing,
        });
    }

    let mut rows = Vec::new();
    for result in reader.deserialize::<T>() {
        let row = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            DashboardError::MalformedRow {
                table: table.name().to_string(),
                line,
                message: e.to_string(),
            }
        })?;
        rows.push(row);
    }

    tracing::debug!("Parsed {} rows from {}", rows.len(), table);
    Ok(rows)
}

async fn read_table<S, T>(storage: &S, table: Table, path: &str) -> Result<Vec<T>>
where
    S: Storage,
    T: DeserializeOwned,
{
    if !storage.exists(path).await {
        return Err(DashboardError::MissingDataFile {
            table: table.name().to_string(),
            path: path.to_string(),
        });
    }

    let data = storage.read_file(path).await?;
    parse_table(table, &data)
}

/// 補充資料表：檔案不存在時回傳 None
async fn read_optional_table<S, T>(
    storage: &S,
    table: Table,
    path: &str,
) -> Result<Option<Vec<T>>>
where
    S: Storage,
    T: DeserializeOwned,
{
    if !storage.exists(path).await {
        tracing::warn!("⚠️ {} not found, skipping the {} section", path, table);
        return Ok(None);
    }

    let data = storage.read_file(path).await?;
    parse_table(table, &data).map(Some)
}

/// Reads all seven tables through the given storage.
pub async fn load_datasets<S: Storage, C: ConfigProvider>(
    storage: &S,
    config: &C,
) -> Result<Datasets> {
    let file = |table: Table| config.dataset_file(table);

    let datasets = Datasets {
        orders: read_table(storage, Table::Orders, &file(Table::Orders)).await?,
        deliveries: read_table(
            storage,
            Table::DeliveryPerformance,
            &file(Table::DeliveryPerformance),
        )
        .await?,
        routes: read_table(storage, Table::RoutesDistance, &file(Table::RoutesDistance)).await?,
        costs: read_table(storage, Table::CostBreakdown, &file(Table::CostBreakdown)).await?,
        feedback: read_table(
            storage,
            Table::CustomerFeedback,
            &file(Table::CustomerFeedback),
        )
        .await?,
        fleet: read_optional_table(storage, Table::VehicleFleet, &file(Table::VehicleFleet))
            .await?,
        warehouses: read_optional_table(
            storage,
            Table::WarehouseInventory,
            &file(Table::WarehouseInventory),
        )
        .await?,
    };

    for table in Table::ALL {
        if let Some(rows) = datasets.row_count(table) {
            tracing::info!("📥 Loaded {} rows from {}", rows, table);
        }
    }

    Ok(datasets)
}

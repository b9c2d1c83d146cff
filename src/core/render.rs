//! Renders a [`DashboardReport`] into the output files.
//!
//! The HTML page is self-contained apart from the Plotly bundle, which is
//! loaded from its CDN. Every chart is emitted as a Plotly figure spec.

use crate::domain::model::MasterRecord;
use crate::domain::report::{DashboardReport, GroupValue};
use crate::utils::error::{DashboardError, Result};
use crate::utils::format::{escape_html, format_thousands};
use serde_json::{json, Value};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone)]
pub struct Figure {
    pub id: &'static str,
    pub spec: Value,
}

fn title(text: &str) -> Value {
    json!({ "text": format!("<b>{}</b>", text) })
}

fn horizontal_bar(
    id: &'static str,
    chart_title: &str,
    groups: &[GroupValue],
    x_title: &str,
    y_title: &str,
) -> Figure {
    Figure {
        id,
        spec: json!({
            "data": [{
                "type": "bar",
                "orientation": "h",
                "x": groups.iter().map(|g| g.value).collect::<Vec<_>>(),
                "y": groups.iter().map(|g| g.label.as_str()).collect::<Vec<_>>(),
            }],
            "layout": {
                "title": title(chart_title),
                "xaxis": { "title": { "text": x_title } },
                "yaxis": { "title": { "text": y_title }, "automargin": true },
            }
        }),
    }
}

fn vertical_bar(
    id: &'static str,
    chart_title: &str,
    groups: &[GroupValue],
    x_title: &str,
    y_title: &str,
) -> Figure {
    Figure {
        id,
        spec: json!({
            "data": [{
                "type": "bar",
                "x": groups.iter().map(|g| g.label.as_str()).collect::<Vec<_>>(),
                "y": groups.iter().map(|g| g.value).collect::<Vec<_>>(),
            }],
            "layout": {
                "title": title(chart_title),
                "xaxis": { "title": { "text": x_title } },
                "yaxis": { "title": { "text": y_title } },
            }
        }),
    }
}

/// Builds every chart that has data to show, in page order.
pub fn figures(report: &DashboardReport) -> Vec<Figure> {
    let mut figs = Vec::new();

    let labels: Vec<&str> = report.cost_breakdown.iter().map(|g| g.label.as_str()).collect();
    let values: Vec<f64> = report.cost_breakdown.iter().map(|g| g.value).collect();
    figs.push(Figure {
        id: "chart-cost-breakdown",
        spec: json!({
            "data": [{
                "type": "pie",
                "hole": 0.4,
                "labels": labels,
                "values": values,
                "textposition": "inside",
                "textinfo": "percent+label",
            }],
            "layout": { "title": title("Chart 1: Overall Cost Breakdown") }
        }),
    });

    figs.push(horizontal_bar(
        "chart-product-cost",
        "Chart 3: Avg. Cost-per-Order by Product",
        &report.product_cost,
        "Cost_Per_Order",
        "Product_Category",
    ));

    figs.push(vertical_bar(
        "chart-segment-efficiency",
        "Chart 4: Cost Efficiency by Customer Segment",
        &report.segment_efficiency,
        "Customer_Segment",
        "Cost_Efficiency_Ratio",
    ));

    // 每個客群一條 trace，對應 color='Customer_Segment'
    let mut segments: Vec<&str> = Vec::new();
    for point in &report.scatter {
        if !segments.contains(&point.segment.as_str()) {
            segments.push(point.segment.as_str());
        }
    }
    let traces: Vec<Value> = segments
        .iter()
        .map(|segment| {
            let points: Vec<_> = report
                .scatter
                .iter()
                .filter(|p| p.segment == *segment)
                .collect();
            json!({
                "type": "scatter",
                "mode": "markers",
                "name": segment,
                "x": points.iter().map(|p| p.total_cost).collect::<Vec<_>>(),
                "y": points.iter().map(|p| p.final_rating).collect::<Vec<_>>(),
                "text": points.iter().map(|p| p.order_id.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();
    figs.push(Figure {
        id: "chart-cost-vs-rating",
        spec: json!({
            "data": traces,
            "layout": {
                "title": title("Chart 5: Cost vs. Customer Satisfaction"),
                "xaxis": { "title": { "text": "Total Cost (INR)" } },
                "yaxis": { "title": { "text": "Rating (1-5)" } },
                "legend": { "title": { "text": "Customer_Segment" } },
            }
        }),
    });

    if !report.domestic_routes.is_empty() {
        figs.push(horizontal_bar(
            "chart-domestic-routes",
            "Chart 2a: Most Expensive Domestic Routes",
            &report.domestic_routes,
            "Cost_Per_KM",
            "Route",
        ));
    }

    if !report.international_routes.is_empty() {
        figs.push(horizontal_bar(
            "chart-international-routes",
            "Chart 2b: Most Expensive International Routes",
            &report.international_routes,
            "Cost_Per_KM",
            "Route",
        ));
    }

    if !report.monthly_cost.is_empty() {
        let months: Vec<&str> = report.monthly_cost.iter().map(|g| g.label.as_str()).collect();
        let totals: Vec<f64> = report.monthly_cost.iter().map(|g| g.value).collect();
        figs.push(Figure {
            id: "chart-monthly-cost",
            spec: json!({
                "data": [{
                    "type": "scatter",
                    "mode": "lines+markers",
                    "x": months,
                    "y": totals,
                }],
                "layout": {
                    "title": title("Monthly Total Cost"),
                    "xaxis": { "title": { "text": "Month" } },
                    "yaxis": { "title": { "text": "Total Cost (INR)" } },
                }
            }),
        });
    }

    if !report.carriers.is_empty() {
        let carriers: Vec<&str> = report.carriers.iter().map(|c| c.carrier.as_str()).collect();
        let rates: Vec<Option<f64>> = report
            .carriers
            .iter()
            .map(|c| c.on_time_rate.map(|r| r * 100.0))
            .collect();
        figs.push(Figure {
            id: "chart-carrier-on-time",
            spec: json!({
                "data": [{
                    "type": "bar",
                    "x": carriers,
                    "y": rates,
                }],
                "layout": {
                    "title": title("On-Time Delivery Rate by Carrier"),
                    "yaxis": { "title": { "text": "On-time (%)" }, "range": [0, 100] },
                }
            }),
        });
    }

    figs
}

fn kpi_card(label: &str, value: String) -> String {
    format!(
        "<div class=\"kpi\"><div class=\"kpi-label\">{}</div><div class=\"kpi-value\">{}</div></div>",
        escape_html(label),
        escape_html(&value)
    )
}

fn opt_amount(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{}{}", format_thousands(v, 2), suffix),
        None => "n/a".to_string(),
    }
}

/// 防止 JSON 內容提前結束 <script> 區塊
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn table_html(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut html = String::from("<table><thead><tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn opt_cell(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format_thousands(v, decimals))
        .unwrap_or_else(|| "n/a".to_string())
}

pub fn render_html(
    report: &DashboardReport,
    records: &[MasterRecord],
    max_table_rows: usize,
) -> Result<String> {
    let filter = &report.filter;

    let mut html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<script src=\"{cdn}\"></script>\n<style>{css}</style>\n</head>\n<body>\n",
        title = escape_html(&report.title),
        cdn = PLOTLY_CDN,
        css = STYLE
    );

    // 篩選條件
    html.push_str(&format!(
        "<aside class=\"filters\"><h2>🚛 Filters</h2>\
         <p><b>Date range:</b> {} – {}</p>\
         <p><b>Customer segments:</b> {}</p>\
         <p><b>Route types:</b> {}</p>\
         <p><b>Product categories:</b> {}</p></aside>\n",
        filter.start_date,
        filter.end_date,
        escape_html(&filter.segments.join(", ")),
        escape_html(
            &filter
                .route_types
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        escape_html(&filter.products.join(", "))
    ));

    html.push_str(&format!(
        "<main>\n<h1>{}</h1>\n<p>Dynamic analysis of logistics costs and performance.</p>\n",
        escape_html(&report.title)
    ));

    let kpis = &report.kpis;
    html.push_str(&format!(
        "<section class=\"kpis\">{}{}{}{}</section>\n<hr>\n",
        kpi_card("Total Cost", format!("{} INR", format_thousands(kpis.total_cost, 0))),
        kpi_card("Avg. Cost / Order", opt_amount(kpis.avg_cost_per_order, " INR")),
        kpi_card("Avg. Cost / KM", opt_amount(kpis.avg_cost_per_km, " INR")),
        kpi_card("Avg. Efficiency Ratio", opt_amount(kpis.avg_efficiency_ratio, "x")),
    ));

    let figs = figures(report);
    let placeholder = |html: &mut String, id: &str| {
        if figs.iter().any(|f| f.id == id) {
            html.push_str(&format!("<div class=\"chart\" id=\"{}\"></div>", id));
        }
    };

    html.push_str("<section class=\"grid\"><div>");
    placeholder(&mut html, "chart-cost-breakdown");
    placeholder(&mut html, "chart-product-cost");
    html.push_str("</div><div>");
    placeholder(&mut html, "chart-segment-efficiency");
    placeholder(&mut html, "chart-cost-vs-rating");
    html.push_str("</div></section>\n<hr>\n");

    html.push_str("<h2>Route Efficiency Analysis (Cost per KM)</h2>\n");
    placeholder(&mut html, "chart-domestic-routes");
    placeholder(&mut html, "chart-international-routes");

    html.push_str("<hr>\n<h2>Cost Trend &amp; Delivery Performance</h2>\n");
    html.push_str("<section class=\"grid\"><div>");
    placeholder(&mut html, "chart-monthly-cost");
    html.push_str("</div><div>");
    placeholder(&mut html, "chart-carrier-on-time");
    html.push_str("</div></section>\n");

    if let Some(fleet) = &report.fleet {
        html.push_str("<hr>\n<h2>Vehicle Fleet</h2>\n");
        html.push_str(&table_html(
            &[
                "Vehicle type",
                "Vehicles",
                "Available",
                "Avg. km/L",
                "Avg. age (years)",
                "Avg. CO2 kg/km",
            ],
            fleet.iter().map(|f| {
                vec![
                    f.vehicle_type.clone(),
                    f.vehicles.to_string(),
                    f.available.to_string(),
                    opt_cell(f.avg_fuel_efficiency_km_per_l, 2),
                    opt_cell(f.avg_age_years, 1),
                    opt_cell(f.avg_co2_kg_per_km, 3),
                ]
            }),
        ));
    }

    if let Some(warehouses) = &report.warehouses {
        html.push_str("<hr>\n<h2>Warehouse Inventory</h2>\n");
        html.push_str(&table_html(
            &[
                "Location",
                "Stock units",
                "Storage value (INR)",
                "Items at/below reorder level",
            ],
            warehouses.iter().map(|w| {
                vec![
                    w.location.clone(),
                    format_thousands(w.stock_units, 0),
                    format_thousands(w.storage_value, 2),
                    w.items_below_reorder.to_string(),
                ]
            }),
        ));
    }

    html.push_str("<hr>\n<h2>Raw Data Explorer</h2>\n");
    if records.len() > max_table_rows {
        html.push_str(&format!(
            "<p class=\"note\">Showing the first {} of {} rows; \
             the full selection is in filtered_data.csv.</p>\n",
            max_table_rows,
            records.len()
        ));
    }
    html.push_str(&table_html(
        &MasterRecord::COLUMNS,
        records.iter().take(max_table_rows).map(|r| r.display_cells()),
    ));

    html.push_str("\n</main>\n<script>\n");
    for fig in &figs {
        let spec = serde_json::to_string(&fig.spec)?;
        html.push_str(&format!(
            "(function(){{var f={};Plotly.newPlot(\"{}\",f.data,f.layout,{{responsive:true}});}})();\n",
            script_safe(&spec),
            fig.id
        ));
    }
    html.push_str("</script>\n</body>\n</html>\n");

    Ok(html)
}

/// Filtered master rows as CSV with the original column names.
pub fn render_csv(records: &[MasterRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if records.is_empty() {
        writer.write_record(MasterRecord::COLUMNS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| DashboardError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

pub fn render_json(report: &DashboardReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// 載入或轉換失敗時取代 dashboard.html 的錯誤頁面
pub fn render_error_page(title: &str, error: &DashboardError) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{css}</style>\n</head>\n<body>\n<main>\n\
         <h1>{title}</h1>\n\
         <div class=\"error\"><p>❌ {message}</p><p>💡 {suggestion}</p></div>\n\
         <p class=\"note\">Data loading failed. Please check your CSV files and run again.</p>\n\
         </main>\n</body>\n</html>\n",
        title = escape_html(title),
        css = STYLE,
        message = escape_html(&error.user_friendly_message()),
        suggestion = escape_html(&error.recovery_suggestion()),
    )
}

const STYLE: &str = "body{font-family:-apple-system,Segoe UI,Roboto,sans-serif;margin:0;display:flex}\
.filters{width:260px;padding:16px;background:#f0f2f6;min-height:100vh;box-sizing:border-box}\
main{flex:1;padding:24px;overflow-x:auto}\
.kpis{display:grid;grid-template-columns:repeat(4,1fr);gap:16px}\
.kpi-label{color:#555;font-size:14px}.kpi-value{font-size:28px;font-weight:600}\
.grid{display:grid;grid-template-columns:1fr 1fr;gap:16px}\
.chart{min-height:420px}\
table{border-collapse:collapse;font-size:12px}th,td{border:1px solid #ddd;padding:4px 6px;text-align:left}\
th{background:#fafafa;position:sticky;top:0}.note{color:#666}\
.error{background:#fdecea;border:1px solid #f5c2c0;border-radius:6px;padding:8px 16px;color:#8a1c1c}";

//! # Dashboard Plan
//!
//! Chooses metric cards and chart kinds from the shape of a `Table`. Rendering is
//! left to the client; the plan only names the columns each chart binds to.

use crate::types::{infer_schema, Cell, ColumnKind, ColumnSchema, Table};
use serde::Serialize;

/// How many numeric columns get a metric card.
pub const MAX_METRIC_CARDS: usize = 4;

pub const NO_METRICS_NOTICE: &str = "No numeric data found for metrics.";
pub const TREEMAP_UNAVAILABLE: &str = "Need categorical and numeric data for Treemap.";
pub const SECONDARY_UNAVAILABLE: &str = "Not enough data dimensions for secondary chart.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub column: String,
    pub total: f64,
    /// The total with thousands separators and two decimals, e.g. `1,234.50`.
    pub display: String,
}

/// A chart selection, or the reason none could be made.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Treemap {
        path: Vec<String>,
        values: String,
        color: String,
    },
    Sunburst {
        path: Vec<String>,
        values: String,
    },
    Scatter {
        x: String,
        y: String,
        color: Option<String>,
    },
    Unavailable {
        message: String,
    },
}

impl ChartSpec {
    fn unavailable(message: &str) -> Self {
        ChartSpec::Unavailable {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPlan {
    pub records: usize,
    pub schema: Vec<ColumnSchema>,
    pub metrics: Vec<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_notice: Option<String>,
    pub primary_chart: ChartSpec,
    pub secondary_chart: ChartSpec,
}

impl DashboardPlan {
    pub fn from_table(table: &Table) -> Self {
        let schema = infer_schema(table);
        let names_of = |kind: ColumnKind| -> Vec<&str> {
            schema
                .iter()
                .filter(|c| c.kind == kind)
                .map(|c| c.name.as_str())
                .collect()
        };
        let numeric = names_of(ColumnKind::Numeric);
        let categorical = names_of(ColumnKind::Categorical);

        let metrics: Vec<Metric> = numeric
            .iter()
            .take(MAX_METRIC_CARDS)
            .map(|&column| {
                let total: f64 = table.column(column).filter_map(Cell::as_f64).sum();
                Metric {
                    column: column.to_string(),
                    total,
                    display: format_thousands(total),
                }
            })
            .collect();
        let metrics_notice = metrics
            .is_empty()
            .then(|| NO_METRICS_NOTICE.to_string());

        let primary_chart = match (categorical.first(), numeric.first()) {
            (Some(&category), Some(&value)) => ChartSpec::Treemap {
                path: vec![category.to_string()],
                values: value.to_string(),
                color: category.to_string(),
            },
            _ => ChartSpec::unavailable(TREEMAP_UNAVAILABLE),
        };

        let secondary_chart = if categorical.len() >= 2 && !numeric.is_empty() {
            ChartSpec::Sunburst {
                path: vec![categorical[0].to_string(), categorical[1].to_string()],
                values: numeric[0].to_string(),
            }
        } else if numeric.len() >= 2 {
            ChartSpec::Scatter {
                x: numeric[0].to_string(),
                y: numeric[1].to_string(),
                color: categorical.first().map(|c| c.to_string()),
            }
        } else {
            ChartSpec::unavailable(SECONDARY_UNAVAILABLE)
        };

        let records = table.len();
        Self {
            records,
            schema,
            metrics,
            metrics_notice,
            primary_chart,
            secondary_chart,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDescription {
    pub name: &'static str,
    pub description: &'static str,
}

/// What the dashboard shows before any data has been loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Landing {
    pub title: &'static str,
    pub tagline: &'static str,
    pub instructions: &'static str,
    pub sources: Vec<SourceDescription>,
}

impl Default for Landing {
    fn default() -> Self {
        Self {
            title: "Welcome to VIZON",
            tagline: "The Universal AI Data Analyst",
            instructions: "To get started, select a data source:",
            sources: vec![
                SourceDescription {
                    name: "Upload File",
                    description: "Traditional CSV/Excel analysis.",
                },
                SourceDescription {
                    name: "Image Analysis",
                    description: "Take a photo of a bill, menu, or report.",
                },
                SourceDescription {
                    name: "Website URL",
                    description: "Paste a link to extract product or financial data.",
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DashboardView {
    Landing(Landing),
    Ready(DashboardPlan),
}

/// The landing payload when there is no usable table, the plan otherwise.
pub fn dashboard_view(table: Option<&Table>) -> DashboardView {
    match table {
        Some(table) if !table.is_empty() => DashboardView::Ready(DashboardPlan::from_table(table)),
        _ => DashboardView::Landing(Landing::default()),
    }
}

/// Formats a number with comma thousands separators and two decimals.
pub fn format_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}

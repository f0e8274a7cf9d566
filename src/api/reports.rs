//! Reports and PDF exports
//!
//! Report aggregates are consumed as opaque JSON. PDF exports are streamed
//! from the server and written to disk; nothing is rendered client-side.

use super::client::ApiClient;
use super::error::ApiResult;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Report aggregates served under `/reports/{kind}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Members,
    Financial,
    Vehicles,
    /// Only available as a PDF export
    Comprehensive,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Members,
        ReportKind::Financial,
        ReportKind::Vehicles,
        ReportKind::Comprehensive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Members => "members",
            ReportKind::Financial => "financial",
            ReportKind::Vehicles => "vehicles",
            ReportKind::Comprehensive => "comprehensive",
        }
    }

    pub fn has_aggregate(&self) -> bool {
        !matches!(self, ReportKind::Comprehensive)
    }

    pub fn next(&self) -> ReportKind {
        let idx = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn file_name(&self) -> String {
        format!("{}-report.pdf", self.as_str())
    }
}

/// Inclusive date range, `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    fn params(&self) -> Vec<(String, String)> {
        vec![
            ("startDate".to_string(), self.start.clone()),
            ("endDate".to_string(), self.end.clone()),
        ]
    }
}

/// Fetch a report aggregate
pub async fn fetch_report(client: &ApiClient, kind: ReportKind, range: &DateRange) -> ApiResult<Value> {
    let url = client.url_with_query(&format!("reports/{}", kind.as_str()), &range.params());
    let body = client.get(&url).await?;
    Ok(unwrap_data(body))
}

/// Fetch dashboard statistics
pub async fn fetch_dashboard(client: &ApiClient) -> ApiResult<Value> {
    let body = client.get(&client.url("reports/dashboard")).await?;
    Ok(unwrap_data(body))
}

/// Download a PDF export
pub async fn fetch_pdf(client: &ApiClient, kind: ReportKind, range: &DateRange) -> ApiResult<Vec<u8>> {
    let url = client.url_with_query(&format!("pdf/{}", kind.as_str()), &range.params());
    client.get_bytes(&url).await
}

/// Write a downloaded PDF into `dir`, returning the file path
pub async fn save_pdf(dir: &Path, kind: ReportKind, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = dir.join(kind.file_name());
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") && map.len() <= 3 => {
            map.remove("data").unwrap_or(Value::Null)
        },
        other => other,
    }
}

fn count(stats: &Value, path: &[&str]) -> String {
    let mut current = stats;
    for key in path {
        current = &current[*key];
    }
    match current {
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.len().to_string(),
        Value::String(s) => s.clone(),
        _ => "0".to_string(),
    }
}

/// Flatten dashboard statistics into labeled lines
pub fn dashboard_summary(stats: &Value) -> Vec<(String, String)> {
    let rows: [(&str, &[&str]); 13] = [
        ("Members: active", &["members", "active"]),
        ("Members: inactive", &["members", "inactive"]),
        ("Members: deceased", &["members", "deceased"]),
        ("Members: withdrawn", &["members", "withdrawn"]),
        ("Income this month", &["finances", "currentMonth", "income"]),
        ("Expenses this month", &["finances", "currentMonth", "expenses"]),
        ("Income last month", &["finances", "lastMonth", "income"]),
        ("Expenses last month", &["finances", "lastMonth", "expenses"]),
        ("Vehicles available", &["vehicles", "available"]),
        ("Vehicles in use", &["vehicles", "inUse"]),
        ("Vehicles in maintenance", &["vehicles", "maintenance"]),
        ("Recent payments", &["recent", "payments"]),
        ("Recent trips", &["recent", "trips"]),
    ];

    rows.iter()
        .map(|(label, path)| (label.to_string(), count(stats, path)))
        .collect()
}

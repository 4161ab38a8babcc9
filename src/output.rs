use crate::config::Config;
use crate::error::Result;
use crate::types::Table;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// A chart-ready document: one JSON object per date, in the column order the
/// frontend expects. Missing values are emitted as explicit `null`, never
/// omitted.
#[derive(Debug, Clone)]
pub struct SeriesDoc {
    rows: Vec<Map<String, Value>>,
}

impl SeriesDoc {
    /// Build a document from a table, selecting columns in emission order.
    pub fn from_table(table: &Table, columns: &[&str]) -> Result<Self> {
        let mut selected = Vec::with_capacity(columns.len());
        for name in columns {
            selected.push((*name, table.require_column(name)?));
        }

        let mut rows = Vec::with_capacity(table.len());
        for (i, date) in table.dates().iter().enumerate() {
            let mut row = Map::new();
            row.insert("date".to_string(), json!(date.format("%Y-%m-%d").to_string()));
            for (name, values) in &selected {
                row.insert(name.to_string(), json!(values[i]));
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    /// Build a sub-daily performance document: one object per observation,
    /// keyed by an ISO-8601 UTC timestamp plus a short value key.
    pub fn timestamped(points: &[(chrono::DateTime<chrono::Utc>, Option<f64>)], key: &str) -> Self {
        let rows = points
            .iter()
            .map(|(ts, value)| {
                let mut row = Map::new();
                row.insert(
                    "t".to_string(),
                    json!(ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
                );
                row.insert(key.to_string(), json!(value));
                row
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_json(&self) -> Value {
        json!({ "series": self.rows })
    }
}

/// Write an artifact document under the configured output directory. The
/// file is fully overwritten on each run; the write goes through a temp file
/// and rename so a crash never leaves a half-written artifact behind.
pub fn write_artifact(doc: &SeriesDoc, config: &Config, file_name: &str) -> Result<String> {
    fs::create_dir_all(&config.output_dir)?;

    let path = Path::new(&config.output_dir).join(file_name);
    let tmp_path = Path::new(&config.output_dir).join(format!("{file_name}.tmp"));

    let body = serde_json::to_string_pretty(&doc.to_json())?;
    fs::write(&tmp_path, body)?;
    fs::rename(&tmp_path, &path)?;

    debug!("Wrote {} rows to {}", doc.len(), path.display());
    Ok(path.to_string_lossy().into_owned())
}

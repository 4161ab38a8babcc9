use crate::artifacts::ArtifactReport;
use crate::config::Config;
use crate::constants::{
    MCAP_REBUILD_ARTIFACT, MCAP_REBUILD_FILE, PRICE_BUYBACKS_FILE,
};
use crate::error::{ChartsError, Result};
use crate::output::{write_artifact, SeriesDoc};
use crate::pipeline::normalize::coerce_numeric;
use crate::types::Table;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Input key fallbacks for the buyback column of a previously written
/// artifact, consulted in order.
const BUYBACK_KEYS: [&str; 4] = [
    "buybacks_usd",
    "buybacks",
    "buybacks_native_usd",
    "buybacks_native",
];

/// Rebuild the cumulative-buybacks-vs-market-cap artifact locally from the
/// already written price/buybacks file, without touching the network. Market
/// cap comes from the input row when present, otherwise from price x the
/// configured circulating supply; `pct_bought` is the share of market cap
/// retired so far.
pub fn rebuild(config: &Config) -> Result<ArtifactReport> {
    let input_path = Path::new(&config.output_dir).join(PRICE_BUYBACKS_FILE);
    if !input_path.exists() {
        return Err(ChartsError::Config(format!(
            "Missing input artifact: {}",
            input_path.display()
        )));
    }

    let raw: Value = serde_json::from_str(&fs::read_to_string(&input_path)?)?;
    let mut rows: Vec<Value> = raw
        .get("series")
        .and_then(|s| s.as_array())
        .cloned()
        .unwrap_or_default();
    rows.sort_by(|a, b| {
        let da = a.get("date").and_then(|d| d.as_str()).unwrap_or("");
        let db = b.get("date").and_then(|d| d.as_str()).unwrap_or("");
        da.cmp(db)
    });

    let mut dates = Vec::new();
    let mut cum_col = Vec::new();
    let mut mcap_col = Vec::new();
    let mut pct_col = Vec::new();
    let mut cum = 0.0;
    let mut dropped = 0usize;

    for row in &rows {
        let date = match row.get("date").and_then(|d| d.as_str()).and_then(parse_date) {
            Some(date) => date,
            None => {
                dropped += 1;
                continue;
            }
        };

        let price = row
            .get("price")
            .or_else(|| row.get("price_usd"))
            .and_then(coerce_numeric);
        let buyback = BUYBACK_KEYS
            .iter()
            .find_map(|key| row.get(*key).filter(|v| !v.is_null()))
            .and_then(coerce_numeric)
            .unwrap_or(0.0);
        cum += buyback;

        let mcap = row
            .get("mcap_usd")
            .and_then(coerce_numeric)
            .or_else(|| match (price, config.circulating_supply) {
                (Some(p), Some(supply)) => Some(p * supply),
                _ => None,
            });
        let pct = match mcap {
            Some(m) if m != 0.0 => Some(cum / m),
            _ => None,
        };

        dates.push(date);
        cum_col.push(Some(round6(cum)));
        mcap_col.push(mcap.map(round6));
        pct_col.push(pct);
    }

    if dropped > 0 {
        warn!("Dropped {} input row(s) with unparseable dates", dropped);
    }

    let mut table = Table::new(dates);
    table.push_column("cum_buybacks_usd", cum_col)?;
    table.push_column("mcap_usd", mcap_col)?;
    table.push_column("pct_bought", pct_col)?;

    let doc = SeriesDoc::from_table(&table, &["cum_buybacks_usd", "mcap_usd", "pct_bought"])?;
    let output_file = write_artifact(&doc, config, MCAP_REBUILD_FILE)?;
    info!(rows = doc.len(), file = %output_file, "Rebuilt mcap/buybacks artifact");

    Ok(ArtifactReport {
        artifact: MCAP_REBUILD_ARTIFACT.to_string(),
        rows: doc.len(),
        output_file,
    })
}

/// Dates in previously written artifacts are `%Y-%m-%d`, but tolerate full
/// ISO timestamps from older revisions.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_with(dir: &tempfile::TempDir, supply: Option<f64>) -> Config {
        Config {
            output_dir: dir.path().to_string_lossy().into_owned(),
            circulating_supply: supply,
            ..Config::default()
        }
    }

    fn write_input(dir: &tempfile::TempDir, doc: Value) {
        fs::write(
            dir.path().join(PRICE_BUYBACKS_FILE),
            serde_json::to_string(&doc).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn missing_input_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = rebuild(&config_with(&dir, Some(1000.0))).unwrap_err();
        assert!(matches!(err, ChartsError::Config(_)));
    }

    #[test]
    fn accumulates_buybacks_and_derives_pct() {
        let dir = tempfile::tempdir().unwrap();
        write_input(
            &dir,
            json!({"series": [
                {"date": "2024-01-02", "price": 2.0, "buybacks_usd": 40.0},
                {"date": "2024-01-01", "price": 1.0, "buybacks_usd": 10.0},
            ]}),
        );
        let report = rebuild(&config_with(&dir, Some(100.0))).unwrap();
        assert_eq!(report.rows, 2);

        let out: Value =
            serde_json::from_str(&fs::read_to_string(report.output_file).unwrap()).unwrap();
        let series = out["series"].as_array().unwrap();
        // rows re-sorted by date before accumulation
        assert_eq!(series[0]["date"], "2024-01-01");
        assert_eq!(series[0]["cum_buybacks_usd"], 10.0);
        assert_eq!(series[0]["mcap_usd"], 100.0);
        assert_eq!(series[0]["pct_bought"], 0.1);
        assert_eq!(series[1]["cum_buybacks_usd"], 50.0);
        assert_eq!(series[1]["mcap_usd"], 200.0);
        assert_eq!(series[1]["pct_bought"], 0.25);
    }

    #[test]
    fn buyback_key_fallbacks_apply_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_input(
            &dir,
            json!({"series": [
                {"date": "2024-01-01", "price": 1.0, "buybacks": 7.0},
                {"date": "2024-01-02", "price": 1.0, "buybacks_native": 3.0},
            ]}),
        );
        let report = rebuild(&config_with(&dir, None)).unwrap();
        let out: Value =
            serde_json::from_str(&fs::read_to_string(report.output_file).unwrap()).unwrap();
        let series = out["series"].as_array().unwrap();
        assert_eq!(series[1]["cum_buybacks_usd"], 10.0);
        // no supply configured, so mcap and pct stay null
        assert!(series[1]["mcap_usd"].is_null());
        assert!(series[1]["pct_bought"].is_null());
    }

    #[test]
    fn unparseable_dates_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        write_input(
            &dir,
            json!({"series": [
                {"date": "not a date", "price": 1.0, "buybacks_usd": 5.0},
                {"date": "2024-01-01T12:30:00", "price": 1.0, "buybacks_usd": 5.0},
            ]}),
        );
        let report = rebuild(&config_with(&dir, None)).unwrap();
        assert_eq!(report.rows, 1);
    }
}

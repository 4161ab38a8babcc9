use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::types::{CanonicalPoint, CanonicalSeries, RawRows};

/// Wrapper key some vendor responses use around the row array.
const ROWS_ENVELOPE_KEY: &str = "rows";

/// Ordered fallback aliases for the value field, consulted when a row does
/// not carry the requested column name directly.
static VALUE_ALIASES: Lazy<Vec<&'static str>> = Lazy::new(|| vec!["v", "val", "value"]);

/// Ordered date field candidates. The first key present in a row decides how
/// the date is parsed; a present-but-unparseable field drops the row rather
/// than falling through to the next candidate.
static DATE_FIELDS: Lazy<Vec<(&'static str, DateKind)>> = Lazy::new(|| {
    vec![
        ("t", DateKind::EpochMillis),
        ("timestamp", DateKind::Timestamp),
        ("date", DateKind::DateOnly),
        ("time", DateKind::Timestamp),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum DateKind {
    EpochMillis,
    Timestamp,
    DateOnly,
}

/// Normalize raw vendor rows into a canonical daily series for one metric.
///
/// Tolerates an envelope around the row array, value fields under several
/// aliases, and dates in epoch-milliseconds, ISO-timestamp, or date-only
/// form. Rows without a parseable date are dropped; values that are not
/// numeric become `None`. Duplicate dates keep the last-seen value. The
/// result is sorted strictly ascending by date. Never fails: unusable input
/// yields an empty series.
pub fn normalize(raw: &RawRows, value_field: &str) -> CanonicalSeries {
    let rows = match unwrap_rows(raw) {
        Some(rows) => rows,
        None => return CanonicalSeries::empty(value_field),
    };

    let mut by_date: BTreeMap<NaiveDate, Option<f64>> = BTreeMap::new();
    let mut dropped = 0usize;

    for row in rows {
        let obj = match row.as_object() {
            Some(obj) => obj,
            // mixed/non-object entries invalidate the whole payload shape
            None => return CanonicalSeries::empty(value_field),
        };

        let date = match resolve_date(obj) {
            Some(date) => date,
            None => {
                dropped += 1;
                continue;
            }
        };

        let value = resolve_value(obj, value_field);
        // last-seen wins on double-reported dates
        by_date.insert(date, value);
    }

    if dropped > 0 {
        debug!(
            "Dropped {} row(s) without a parseable date for '{}'",
            dropped, value_field
        );
    }

    CanonicalSeries {
        name: value_field.to_string(),
        points: by_date
            .into_iter()
            .map(|(date, value)| CanonicalPoint { date, value })
            .collect(),
    }
}

/// Unwrap the row array, looking through a `{"rows": [...]}` envelope.
fn unwrap_rows(raw: &RawRows) -> Option<&Vec<Value>> {
    if let Some(rows) = raw.as_array() {
        return Some(rows);
    }
    raw.as_object()
        .and_then(|obj| obj.get(ROWS_ENVELOPE_KEY))
        .and_then(|v| v.as_array())
}

/// Resolve the value for one row: the exact requested field first, then the
/// fixed alias list in order. A present alias is adopted even when its value
/// turns out non-numeric; that just coerces to `None`.
fn resolve_value(row: &serde_json::Map<String, Value>, value_field: &str) -> Option<f64> {
    let raw = row.get(value_field).or_else(|| {
        VALUE_ALIASES
            .iter()
            .find_map(|alias| row.get(*alias))
    });
    raw.and_then(coerce_numeric)
}

/// Coerce a JSON value to a finite f64. Numeric strings parse; sentinel
/// strings ("METRIC NOT FOUND"), booleans, nulls and the rest become `None`.
pub(crate) fn coerce_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Resolve the calendar date for one row using the fixed field priority.
fn resolve_date(row: &serde_json::Map<String, Value>) -> Option<NaiveDate> {
    let (_, kind, raw) = DATE_FIELDS
        .iter()
        .find_map(|(key, kind)| row.get(*key).map(|raw| (*key, *kind, raw)))?;

    match kind {
        DateKind::EpochMillis => parse_epoch_millis(raw),
        DateKind::Timestamp => parse_timestamp(raw),
        DateKind::DateOnly => parse_date_only(raw),
    }
}

fn parse_epoch_millis(raw: &Value) -> Option<NaiveDate> {
    let millis = match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

fn parse_timestamp(raw: &Value) -> Option<NaiveDate> {
    // numeric timestamps fall back to epoch-milliseconds handling
    if raw.is_number() {
        return parse_epoch_millis(raw);
    }
    let s = raw.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_utc().date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_date_only(raw: &Value) -> Option<NaiveDate> {
    let s = raw.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw))
}

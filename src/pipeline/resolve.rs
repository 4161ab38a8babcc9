use chrono::Duration;
use std::collections::HashMap;

use crate::error::Result;
use crate::types::Table;

/// Per-column gap handling, applied after alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// Leave missing values as missing
    None,
    /// Replace a gap with the most recent earlier non-missing value
    CarryForward,
    /// Ensure the column is a running total, inferring whether the source
    /// reported a cumulative series or period deltas
    CumulativeReconstruct,
}

/// Apply fill policies to the named columns of an aligned table. Columns not
/// named keep their gaps.
pub fn resolve(table: &mut Table, policies: &HashMap<String, FillPolicy>) -> Result<()> {
    for (name, policy) in policies {
        table.require_column(name)?;
        match policy {
            FillPolicy::None => {}
            FillPolicy::CarryForward => {
                if let Some(values) = table.column_mut(name) {
                    carry_forward(values);
                }
            }
            FillPolicy::CumulativeReconstruct => {
                let rebuilt = cumulative_reconstruct(table.require_column(name)?);
                if let Some(values) = table.column_mut(name) {
                    *values = rebuilt;
                }
            }
        }
    }
    Ok(())
}

/// Fill each gap with the most recent earlier non-missing value. Gaps before
/// the first observation remain missing.
pub fn carry_forward(values: &mut [Option<f64>]) {
    let mut last = None;
    for slot in values.iter_mut() {
        match slot {
            Some(v) => last = Some(*v),
            None => *slot = last,
        }
    }
}

/// Guarantee a running total.
///
/// Vendor feeds inconsistently report the same conceptual metric as either
/// a running total or period deltas, so the mode is inferred per run: when
/// the non-missing values are already non-decreasing they are taken as the
/// running total unchanged (gaps stay open); otherwise the series is summed
/// as deltas over the full axis with missing treated as zero. An all-missing
/// column stays all missing.
pub fn cumulative_reconstruct(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    if observed.is_empty() {
        return values.to_vec();
    }
    if observed.windows(2).all(|w| w[0] <= w[1]) {
        return values.to_vec();
    }

    let mut total = 0.0;
    values
        .iter()
        .map(|v| {
            total += v.unwrap_or(0.0);
            Some(total)
        })
        .collect()
}

/// Reindex a table onto a dense calendar-day axis spanning its observed date
/// range, then carry every column forward over the dense axis. Used for
/// metrics that must render as a continuous day-by-day series. An empty
/// table passes through unchanged.
pub fn reindex_daily(table: &Table) -> Result<Table> {
    if table.is_empty() {
        return Ok(table.clone());
    }
    let first = table.dates()[0];
    let last = table.dates()[table.len() - 1];

    let mut dates = Vec::new();
    let mut day = first;
    while day <= last {
        dates.push(day);
        day += Duration::days(1);
    }

    let mut dense = Table::new(dates);
    for column in table.columns() {
        let by_date: HashMap<_, _> = table
            .dates()
            .iter()
            .zip(column.values.iter())
            .map(|(d, v)| (*d, *v))
            .collect();
        let mut values: Vec<Option<f64>> = dense
            .dates()
            .iter()
            .map(|d| by_date.get(d).copied().flatten())
            .collect();
        carry_forward(&mut values);
        dense.push_column(&column.name, values)?;
    }
    Ok(dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::align::align;
    use crate::types::{CanonicalPoint, CanonicalSeries};
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn carry_forward_fills_internal_gaps_only() {
        let mut values = vec![None, Some(5.0), None, None, Some(7.0)];
        carry_forward(&mut values);
        assert_eq!(values, vec![None, Some(5.0), Some(5.0), Some(5.0), Some(7.0)]);
    }

    #[test]
    fn cumulative_passes_monotonic_series_through() {
        let values = vec![Some(1.0), None, Some(2.0), Some(2.0), Some(5.0)];
        assert_eq!(cumulative_reconstruct(&values), values);
    }

    #[test]
    fn cumulative_sums_deltas_with_missing_as_zero() {
        let values = vec![Some(10.0), None, Some(5.0), Some(0.0)];
        assert_eq!(
            cumulative_reconstruct(&values),
            vec![Some(10.0), Some(10.0), Some(15.0), Some(15.0)]
        );
    }

    #[test]
    fn cumulative_keeps_all_missing_column_missing() {
        let values = vec![None, None, None];
        assert_eq!(cumulative_reconstruct(&values), values);
    }

    #[test]
    fn resolve_applies_policy_per_column() {
        let buybacks = CanonicalSeries {
            name: "buybacks".to_string(),
            points: vec![
                CanonicalPoint { date: date(1), value: Some(8.0) },
                CanonicalPoint { date: date(2), value: Some(3.0) },
            ],
        };
        let price = CanonicalSeries {
            name: "price".to_string(),
            points: vec![
                CanonicalPoint { date: date(1), value: Some(1.0) },
                CanonicalPoint { date: date(2), value: None },
            ],
        };
        let mut table = align(&[buybacks, price]);

        let policies = HashMap::from([
            ("buybacks".to_string(), FillPolicy::CumulativeReconstruct),
            ("price".to_string(), FillPolicy::None),
        ]);
        resolve(&mut table, &policies).unwrap();

        // 8, 3 is not monotonic, so it is summed as deltas
        assert_eq!(table.column("buybacks").unwrap(), &[Some(8.0), Some(11.0)]);
        assert_eq!(table.column("price").unwrap(), &[Some(1.0), None]);
    }

    #[test]
    fn resolve_unknown_column_is_an_error() {
        let mut table = Table::new(vec![date(1)]);
        let policies = HashMap::from([("nope".to_string(), FillPolicy::CarryForward)]);
        assert!(resolve(&mut table, &policies).is_err());
    }

    #[test]
    fn reindex_fills_calendar_gaps_and_carries_forward() {
        let series = CanonicalSeries {
            name: "supply".to_string(),
            points: vec![
                CanonicalPoint { date: date(1), value: Some(100.0) },
                CanonicalPoint { date: date(4), value: Some(120.0) },
            ],
        };
        let dense = reindex_daily(&align(&[series])).unwrap();
        assert_eq!(dense.dates(), &[date(1), date(2), date(3), date(4)]);
        assert_eq!(
            dense.column("supply").unwrap(),
            &[Some(100.0), Some(100.0), Some(100.0), Some(120.0)]
        );
    }

    #[test]
    fn reindex_of_empty_table_is_empty() {
        let dense = reindex_daily(&Table::new(Vec::new())).unwrap();
        assert!(dense.is_empty());
    }
}

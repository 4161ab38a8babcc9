use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

use crate::types::{CanonicalSeries, Table};

/// Full outer join of canonical series on the date key. The output axis is
/// the sorted union of all input dates; each series contributes one column,
/// with `None` where it has no observation for a date.
pub fn align(series: &[CanonicalSeries]) -> Table {
    align_from(series, None)
}

/// As [`align`], but drops rows before the inclusive cutoff date. Used when
/// a feed has unstable history before a known-good start.
pub fn align_from(series: &[CanonicalSeries], cutoff: Option<NaiveDate>) -> Table {
    let mut axis: BTreeSet<NaiveDate> = BTreeSet::new();
    for s in series {
        for point in &s.points {
            if cutoff.map_or(true, |c| point.date >= c) {
                axis.insert(point.date);
            }
        }
    }
    let dates: Vec<NaiveDate> = axis.into_iter().collect();

    let mut table = Table::new(dates);
    for s in series {
        let by_date: HashMap<NaiveDate, Option<f64>> =
            s.points.iter().map(|p| (p.date, p.value)).collect();
        let values = table
            .dates()
            .iter()
            .map(|d| by_date.get(d).copied().flatten())
            .collect();
        // lengths match by construction
        let _ = table.push_column(&s.name, values);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CanonicalPoint;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn series(name: &str, points: &[(u32, Option<f64>)]) -> CanonicalSeries {
        CanonicalSeries {
            name: name.to_string(),
            points: points
                .iter()
                .map(|(d, v)| CanonicalPoint {
                    date: date(*d),
                    value: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn single_series_round_trips() {
        let s = series("price", &[(1, Some(1.0)), (2, None), (3, Some(3.0))]);
        let table = align(&[s.clone()]);
        assert_eq!(table.dates(), &[date(1), date(2), date(3)]);
        assert_eq!(
            table.column("price").unwrap(),
            &[Some(1.0), None, Some(3.0)]
        );
    }

    #[test]
    fn outer_join_unions_disjoint_dates() {
        let a = series("price", &[(1, Some(1.0)), (3, Some(3.0))]);
        let b = series("fees", &[(2, Some(20.0)), (4, Some(40.0))]);
        let table = align(&[a, b]);
        assert_eq!(table.dates(), &[date(1), date(2), date(3), date(4)]);
        assert_eq!(
            table.column("price").unwrap(),
            &[Some(1.0), None, Some(3.0), None]
        );
        assert_eq!(
            table.column("fees").unwrap(),
            &[None, Some(20.0), None, Some(40.0)]
        );
    }

    #[test]
    fn empty_series_contributes_all_missing_column() {
        let a = series("price", &[(1, Some(1.0))]);
        let b = CanonicalSeries::empty("fees");
        let table = align(&[a, b]);
        assert_eq!(table.column("fees").unwrap(), &[None]);
    }

    #[test]
    fn cutoff_drops_earlier_rows() {
        let a = series("price", &[(1, Some(1.0)), (2, Some(2.0)), (3, Some(3.0))]);
        let table = align_from(&[a], Some(date(2)));
        assert_eq!(table.dates(), &[date(2), date(3)]);
    }
}

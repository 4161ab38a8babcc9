use crate::error::Result;
use crate::types::Table;

/// Add a ratio column `name = numerator / denominator`. The result is
/// missing whenever either operand is missing, the denominator is exactly
/// zero, or the quotient is non-finite. Never panics, never yields infinity.
pub fn ratio(table: &mut Table, name: &str, numerator: &str, denominator: &str) -> Result<()> {
    let num = table.require_column(numerator)?;
    let den = table.require_column(denominator)?;
    let values: Vec<Option<f64>> = num
        .iter()
        .zip(den.iter())
        .map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) if *d != 0.0 => Some(n / d).filter(|v| v.is_finite()),
            _ => None,
        })
        .collect();
    table.push_column(name, values)
}

/// Add a product column `name = left * right`, missing whenever either
/// operand is missing.
pub fn product(table: &mut Table, name: &str, left: &str, right: &str) -> Result<()> {
    let a = table.require_column(left)?;
    let b = table.require_column(right)?;
    let values: Vec<Option<f64>> = a
        .iter()
        .zip(b.iter())
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some(a * b).filter(|v| v.is_finite()),
            _ => None,
        })
        .collect();
    table.push_column(name, values)
}

/// Fill gaps in a direct market-cap column from `price x circulating supply`.
/// A present direct value is never overwritten; the fallback only applies on
/// dates where the direct series is missing and a price is available. With no
/// supply configured this is a no-op.
pub fn reconcile_mcap(
    table: &mut Table,
    mcap_col: &str,
    price_col: &str,
    circulating_supply: Option<f64>,
) -> Result<()> {
    let supply = match circulating_supply {
        Some(s) => s,
        None => return Ok(()),
    };
    let fallback: Vec<Option<f64>> = table
        .require_column(price_col)?
        .iter()
        .map(|p| p.map(|p| p * supply))
        .collect();

    table.require_column(mcap_col)?;
    if let Some(values) = table.column_mut(mcap_col) {
        for (slot, computed) in values.iter_mut().zip(fallback) {
            if slot.is_none() {
                *slot = computed;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(columns: &[(&str, &[Option<f64>])]) -> Table {
        let len = columns[0].1.len();
        let dates = (1..=len as u32)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        let mut t = Table::new(dates);
        for (name, values) in columns {
            t.push_column(name, values.to_vec()).unwrap();
        }
        t
    }

    #[test]
    fn ratio_divides_where_defined() {
        let mut t = table(&[
            ("cum", &[Some(10.0), Some(20.0)]),
            ("mcap", &[Some(100.0), Some(400.0)]),
        ]);
        ratio(&mut t, "pct", "cum", "mcap").unwrap();
        assert_eq!(t.column("pct").unwrap(), &[Some(0.1), Some(0.05)]);
    }

    #[test]
    fn ratio_degeneracy_yields_missing() {
        let mut t = table(&[
            ("num", &[Some(1.0), None, Some(3.0)]),
            ("den", &[Some(0.0), Some(2.0), None]),
        ]);
        ratio(&mut t, "r", "num", "den").unwrap();
        assert_eq!(t.column("r").unwrap(), &[None, None, None]);
    }

    #[test]
    fn ratio_on_missing_column_is_an_error() {
        let mut t = table(&[("num", &[Some(1.0)])]);
        assert!(ratio(&mut t, "r", "num", "nope").is_err());
    }

    #[test]
    fn product_propagates_missing() {
        let mut t = table(&[
            ("native", &[Some(100.0), Some(100.0), None]),
            ("price", &[Some(1.0), None, Some(2.0)]),
        ]);
        product(&mut t, "usd", "native", "price").unwrap();
        assert_eq!(t.column("usd").unwrap(), &[Some(100.0), None, None]);
    }

    #[test]
    fn mcap_fallback_never_overwrites_direct_values() {
        let mut t = table(&[
            ("mcap", &[Some(1000.0), None]),
            ("price", &[Some(1.0), Some(2.4)]),
        ]);
        reconcile_mcap(&mut t, "mcap", "price", Some(500.0)).unwrap();
        assert_eq!(t.column("mcap").unwrap(), &[Some(1000.0), Some(1200.0)]);
    }

    #[test]
    fn mcap_fallback_without_supply_is_a_no_op() {
        let mut t = table(&[("mcap", &[None]), ("price", &[Some(2.0)])]);
        reconcile_mcap(&mut t, "mcap", "price", None).unwrap();
        assert_eq!(t.column("mcap").unwrap(), &[None]);
    }
}

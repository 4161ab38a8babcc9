use crate::error::{ChartsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw metric rows as returned by the vendor API, before normalization.
/// Usually an array of objects, sometimes wrapped in a `{"rows": [...]}`
/// envelope; the row normalizer handles both.
pub type RawRows = serde_json::Value;

/// One daily observation for one metric. `value` is `None` whenever the
/// source value was absent or non-numeric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// A deduplicated, date-sorted series for one metric. Dates are unique and
/// strictly increasing by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSeries {
    pub name: String,
    pub points: Vec<CanonicalPoint>,
}

impl CanonicalSeries {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A date-keyed table: the outer join of one or more canonical series.
/// Every column holds exactly one value slot per date, `None` marking a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Table {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Add a column. The value vector must be as long as the date axis.
    pub fn push_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.dates.len() {
            return Err(ChartsError::Api {
                message: format!(
                    "column '{}' has {} values for {} dates",
                    name,
                    values.len(),
                    self.dates.len()
                ),
            });
        }
        self.columns.push(Column {
            name: name.to_string(),
            values,
        });
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Vec<Option<f64>>> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.values)
    }

    /// Column lookup that fails with a named error when the column is absent.
    pub fn require_column(&self, name: &str) -> Result<&[Option<f64>]> {
        self.column(name)
            .ok_or_else(|| ChartsError::MissingField(format!("column '{name}' not in table")))
    }
}

/// Core trait for the vendor market-data boundary. The one implementation
/// talks to the Artemis HTTP API; tests substitute a stub.
#[async_trait::async_trait]
pub trait MetricsApi: Send + Sync {
    /// Fetch the named metrics for one symbol over an inclusive date range.
    /// Returns the per-symbol payload: an object mapping each metric name to
    /// its raw rows.
    async fn fetch_metrics(
        &self,
        metric_names: &str,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<serde_json::Value>;
}

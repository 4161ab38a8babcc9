use crate::artifacts::ChartArtifact;
use crate::config::Config;
use crate::constants::{PRICE_FEES_ARTIFACT, PRICE_FEES_FILE};
use crate::error::Result;
use crate::output::SeriesDoc;
use crate::pipeline::{align::align, normalize::normalize};
use crate::types::MetricsApi;
use serde_json::Value;
use tracing::info;

/// Daily price and fees, outer-joined on date with no gap filling.
pub struct PriceFees;

#[async_trait::async_trait]
impl ChartArtifact for PriceFees {
    fn artifact_name(&self) -> &'static str {
        PRICE_FEES_ARTIFACT
    }

    fn output_file(&self) -> &'static str {
        PRICE_FEES_FILE
    }

    async fn build(&self, api: &dyn MetricsApi, config: &Config) -> Result<SeriesDoc> {
        let (start, end) = config.date_window();
        let payload = api
            .fetch_metrics("price,fees", &config.asset, start, end)
            .await?;

        let price = normalize(payload.get("price").unwrap_or(&Value::Null), "price");
        let fees = normalize(payload.get("fees").unwrap_or(&Value::Null), "fees");
        info!(
            "Normalized {} price and {} fees point(s)",
            price.len(),
            fees.len()
        );

        let table = align(&[price, fees]);
        SeriesDoc::from_table(&table, &["price", "fees"])
    }
}

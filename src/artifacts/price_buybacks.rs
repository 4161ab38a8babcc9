use crate::artifacts::ChartArtifact;
use crate::config::Config;
use crate::constants::{PRICE_BUYBACKS_ARTIFACT, PRICE_BUYBACKS_FILE};
use crate::error::Result;
use crate::output::SeriesDoc;
use crate::pipeline::{
    align::align,
    derive::product,
    normalize::normalize,
    resolve::{resolve, FillPolicy},
};
use crate::types::MetricsApi;
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

/// Daily price and buybacks in USD. The vendor reports buybacks in native
/// units on the days they happen; the native balance is carried forward over
/// the joined axis and converted at that day's price.
pub struct PriceBuybacksUsd;

#[async_trait::async_trait]
impl ChartArtifact for PriceBuybacksUsd {
    fn artifact_name(&self) -> &'static str {
        PRICE_BUYBACKS_ARTIFACT
    }

    fn output_file(&self) -> &'static str {
        PRICE_BUYBACKS_FILE
    }

    async fn build(&self, api: &dyn MetricsApi, config: &Config) -> Result<SeriesDoc> {
        let (start, end) = config.date_window();
        let payload = api
            .fetch_metrics("price,buybacks_native", &config.asset, start, end)
            .await?;

        let price = normalize(payload.get("price").unwrap_or(&Value::Null), "price");
        let native = normalize(
            payload.get("buybacks_native").unwrap_or(&Value::Null),
            "buybacks_native",
        );
        info!(
            "Normalized {} price and {} buyback point(s)",
            price.len(),
            native.len()
        );

        let mut table = align(&[price, native]);
        let policies = HashMap::from([(
            "buybacks_native".to_string(),
            FillPolicy::CarryForward,
        )]);
        resolve(&mut table, &policies)?;
        product(&mut table, "buybacks_usd", "buybacks_native", "price")?;

        SeriesDoc::from_table(&table, &["price", "buybacks_usd"])
    }
}

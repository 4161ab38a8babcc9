use crate::artifacts::ChartArtifact;
use crate::config::Config;
use crate::constants::{BUYBACKS_VS_MCAP_ARTIFACT, BUYBACKS_VS_MCAP_FILE};
use crate::error::Result;
use crate::output::SeriesDoc;
use crate::pipeline::{
    align::align,
    derive::reconcile_mcap,
    normalize::normalize,
    resolve::{carry_forward, cumulative_reconstruct},
};
use crate::types::{CanonicalPoint, CanonicalSeries, MetricsApi};
use serde_json::Value;
use tracing::info;

/// Cumulative buybacks (USD) against market capitalization. Buybacks are
/// reconstructed into a running total on their own axis before the join, so
/// dates the market-cap feed adds later do not dilute the summation; market
/// cap is carried forward where sparse and falls back to price x supply when
/// a price column and configured supply are available.
pub struct BuybacksVsMcap;

#[async_trait::async_trait]
impl ChartArtifact for BuybacksVsMcap {
    fn artifact_name(&self) -> &'static str {
        BUYBACKS_VS_MCAP_ARTIFACT
    }

    fn output_file(&self) -> &'static str {
        BUYBACKS_VS_MCAP_FILE
    }

    async fn build(&self, api: &dyn MetricsApi, config: &Config) -> Result<SeriesDoc> {
        let (start, end) = config.date_window();
        let payload = api
            .fetch_metrics("mc,buybacks,price", &config.asset, start, end)
            .await?;

        let mcap = normalize(payload.get("mc").unwrap_or(&Value::Null), "mcap_usd");
        let price = normalize(payload.get("price").unwrap_or(&Value::Null), "price");
        let buybacks = normalize(payload.get("buybacks").unwrap_or(&Value::Null), "buybacks_usd");
        info!(
            "Normalized {} mcap and {} buyback point(s)",
            mcap.len(),
            buybacks.len()
        );

        // running total on the buyback series' own axis, then join
        let values: Vec<Option<f64>> = buybacks.points.iter().map(|p| p.value).collect();
        let cum = CanonicalSeries {
            name: "cum_buybacks_usd".to_string(),
            points: buybacks
                .points
                .iter()
                .zip(cumulative_reconstruct(&values))
                .map(|(p, value)| CanonicalPoint { date: p.date, value })
                .collect(),
        };

        let mut table = align(&[mcap, price, cum]);
        // fallback fills gaps first; carry-forward only covers what remains
        reconcile_mcap(&mut table, "mcap_usd", "price", config.circulating_supply)?;
        if let Some(values) = table.column_mut("mcap_usd") {
            carry_forward(values);
        }

        SeriesDoc::from_table(&table, &["cum_buybacks_usd", "mcap_usd"])
    }
}

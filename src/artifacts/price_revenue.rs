use crate::artifacts::ChartArtifact;
use crate::config::Config;
use crate::constants::{PRICE_REVENUE_ARTIFACT, PRICE_REVENUE_FILE};
use crate::error::Result;
use crate::output::SeriesDoc;
use crate::pipeline::{align::align, normalize::normalize};
use crate::types::MetricsApi;
use crate::vendor::{resolve_first_metric, MetricCandidate};
use serde_json::Value;
use tracing::info;

/// The asset exposes its revenue under different metric names depending on
/// vendor catalog version; fees is the last-resort stand-in.
const REVENUE_CANDIDATES: [MetricCandidate; 4] = [
    MetricCandidate { query: "price,revenue", key: "revenue" },
    MetricCandidate { query: "price,protocol_revenue", key: "protocol_revenue" },
    MetricCandidate { query: "price,revenue_usd", key: "revenue_usd" },
    MetricCandidate { query: "price,fees", key: "fees" },
];

/// Daily price and revenue, resolving the revenue metric through the ordered
/// candidate list. The output column is always named `revenue` regardless of
/// which vendor metric supplied it.
pub struct PriceRevenue;

#[async_trait::async_trait]
impl ChartArtifact for PriceRevenue {
    fn artifact_name(&self) -> &'static str {
        PRICE_REVENUE_ARTIFACT
    }

    fn output_file(&self) -> &'static str {
        PRICE_REVENUE_FILE
    }

    async fn build(&self, api: &dyn MetricsApi, config: &Config) -> Result<SeriesDoc> {
        let (start, end) = config.date_window();
        let (payload, used_key) =
            resolve_first_metric(api, &config.asset, start, end, &REVENUE_CANDIDATES).await?;
        info!("Using '{}' as the revenue metric", used_key);

        let price = normalize(payload.get("price").unwrap_or(&Value::Null), "price");
        let revenue = normalize(payload.get(used_key).unwrap_or(&Value::Null), "revenue");

        let table = align(&[price, revenue]);
        SeriesDoc::from_table(&table, &["price", "revenue"])
    }
}

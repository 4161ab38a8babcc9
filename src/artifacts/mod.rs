pub mod buybacks_vs_mcap;
pub mod mcap_rebuild;
pub mod price_buybacks;
pub mod price_fees;
pub mod price_revenue;

use crate::config::Config;
use crate::constants;
use crate::error::Result;
use crate::output::SeriesDoc;
use crate::types::MetricsApi;
use serde::Serialize;

/// Summary of one successfully built artifact
#[derive(Debug, Serialize)]
pub struct ArtifactReport {
    pub artifact: String,
    pub rows: usize,
    pub output_file: String,
}

/// Core trait every networked chart artifact implements: fetch its metrics,
/// run them through the pipeline stages, and hand back a chart-ready
/// document. Writing the document is the runner's job.
#[async_trait::async_trait]
pub trait ChartArtifact: Send + Sync {
    /// Unique identifier for this artifact (CLI name)
    fn artifact_name(&self) -> &'static str;

    /// File name written under the configured output directory
    fn output_file(&self) -> &'static str;

    /// Build the chart document for this artifact
    async fn build(&self, api: &dyn MetricsApi, config: &Config) -> Result<SeriesDoc>;
}

pub fn create_artifact(name: &str) -> Option<Box<dyn ChartArtifact>> {
    match name {
        constants::PRICE_FEES_ARTIFACT => Some(Box::new(price_fees::PriceFees)),
        constants::PRICE_REVENUE_ARTIFACT => Some(Box::new(price_revenue::PriceRevenue)),
        constants::PRICE_BUYBACKS_ARTIFACT => Some(Box::new(price_buybacks::PriceBuybacksUsd)),
        constants::BUYBACKS_VS_MCAP_ARTIFACT => Some(Box::new(buybacks_vs_mcap::BuybacksVsMcap)),
        _ => None,
    }
}

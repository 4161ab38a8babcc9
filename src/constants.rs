/// Artifact name constants to ensure consistency across the codebase
/// These constants define the mapping between CLI artifact names and output files

// Artifact names (used in CLI)
pub const PRICE_FEES_ARTIFACT: &str = "price_fees";
pub const PRICE_REVENUE_ARTIFACT: &str = "price_revenue";
pub const PRICE_BUYBACKS_ARTIFACT: &str = "price_buybacks_usd";
pub const BUYBACKS_VS_MCAP_ARTIFACT: &str = "buybacks_vs_mcap";
pub const MCAP_REBUILD_ARTIFACT: &str = "mcap_rebuild";

// Output file names (written under the configured output directory)
pub const PRICE_FEES_FILE: &str = "pump.json";
pub const PRICE_REVENUE_FILE: &str = "pump_price_revenue.json";
pub const PRICE_BUYBACKS_FILE: &str = "pump_price_buybacks_usd.json";
pub const BUYBACKS_VS_MCAP_FILE: &str = "pump_buybacks_vs_mcap.json";
pub const MCAP_REBUILD_FILE: &str = "pump_mcap_buybacks.json";

/// Get all fetch artifact names (the networked ones; mcap_rebuild is local)
pub fn get_fetch_artifacts() -> Vec<&'static str> {
    vec![
        PRICE_FEES_ARTIFACT,
        PRICE_REVENUE_ARTIFACT,
        PRICE_BUYBACKS_ARTIFACT,
        BUYBACKS_VS_MCAP_ARTIFACT,
    ]
}

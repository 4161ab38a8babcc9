use crate::config::Config;
use crate::error::{ChartsError, Result};
use crate::types::MetricsApi;
use chrono::NaiveDate;
use serde_json::Value;
use std::env;
use tracing::{debug, info, instrument, warn};

/// Vendor client for the Artemis market-data API.
#[derive(Debug)]
pub struct ArtemisClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ArtemisClient {
    /// Build a client from run configuration, reading the API key from the
    /// environment variable the config names (ARTEMIS_API_KEY by default).
    pub fn from_env(config: &Config) -> Result<Self> {
        let api_key = env::var(&config.api_key_env).map_err(|_| {
            ChartsError::Config(format!("{} must be set", config.api_key_env))
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl MetricsApi for ArtemisClient {
    #[instrument(skip(self))]
    async fn fetch_metrics(
        &self,
        metric_names: &str,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Value> {
        let url = format!("{}/data/{}", self.base_url, metric_names);
        let start = start_date.format("%Y-%m-%d").to_string();
        let end = end_date.format("%Y-%m-%d").to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbols", symbol),
                ("startDate", start.as_str()),
                ("endDate", end.as_str()),
                ("APIKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChartsError::Api {
                message: format!("vendor returned {} for metrics '{metric_names}'", status),
            });
        }

        let body: Value = response.json().await?;
        let payload = body
            .get("data")
            .and_then(|d| d.get("symbols"))
            .and_then(|s| s.get(symbol))
            .ok_or_else(|| {
                ChartsError::MissingField(format!("data.symbols.{symbol} not in response"))
            })?;

        debug!("Fetched symbol payload for '{}'", metric_names);
        Ok(payload.clone())
    }
}

/// One fallback candidate for metric discovery: the metric set to query and
/// the payload key whose presence marks a hit.
#[derive(Debug, Clone, Copy)]
pub struct MetricCandidate {
    pub query: &'static str,
    pub key: &'static str,
}

/// Try fallback candidates in order and return the first symbol payload that
/// contains the candidate's key, along with which key matched. Individual
/// query failures are logged and treated as misses; exhausting the list is a
/// fatal, named error carrying every candidate tried.
pub async fn resolve_first_metric(
    api: &dyn MetricsApi,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    candidates: &[MetricCandidate],
) -> Result<(Value, &'static str)> {
    for candidate in candidates {
        match api
            .fetch_metrics(candidate.query, symbol, start_date, end_date)
            .await
        {
            Ok(payload) => {
                if payload.get(candidate.key).is_some() {
                    info!("Resolved metric via candidate '{}'", candidate.key);
                    return Ok((payload, candidate.key));
                }
                debug!("Candidate '{}' absent from payload", candidate.key);
            }
            Err(e) => {
                warn!("Candidate query '{}' failed: {}", candidate.query, e);
            }
        }
    }
    Err(ChartsError::MissingMetric {
        tried: candidates.iter().map(|c| c.key.to_string()).collect(),
    })
}

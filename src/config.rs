use crate::error::{ChartsError, Result};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

const DEFAULT_ASSET: &str = "pump";
const DEFAULT_WINDOW_DAYS: i64 = 120;
const DEFAULT_OUTPUT_DIR: &str = "data";
const DEFAULT_BASE_URL: &str = "https://api.artemisxyz.com";
const DEFAULT_API_KEY_ENV: &str = "ARTEMIS_API_KEY";

/// Run configuration for one invocation. Everything the pipeline needs is
/// carried here explicitly; there is no module-level mutable state.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Asset symbol queried from the vendor API
    #[serde(default = "default_asset")]
    pub asset: String,
    /// Rolling window size used when no explicit dates are given
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    /// Inclusive start date; overrides the rolling window when set
    pub start_date: Option<NaiveDate>,
    /// Inclusive end date; defaults to today (UTC)
    pub end_date: Option<NaiveDate>,
    /// Directory the JSON artifacts are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Vendor API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the vendor API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Circulating supply used for the market-cap fallback (price x supply).
    /// Overridable via the CIRC_SUPPLY environment variable.
    pub circulating_supply: Option<f64>,
}

fn default_asset() -> String {
    DEFAULT_ASSET.to_string()
}

fn default_window_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            asset: default_asset(),
            window_days: default_window_days(),
            start_date: None,
            end_date: None,
            output_dir: default_output_dir(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            circulating_supply: None,
        }
    }
}

impl Config {
    /// Load configuration from `config.toml` when present, falling back to
    /// defaults, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let mut config = if Path::new(config_path).exists() {
            let config_content = fs::read_to_string(config_path).map_err(|e| {
                ChartsError::Config(format!("Failed to read config file '{config_path}': {e}"))
            })?;
            toml::from_str(&config_content)?
        } else {
            Config::default()
        };

        if let Ok(supply) = env::var("CIRC_SUPPLY") {
            let parsed = supply.trim().parse::<f64>().map_err(|e| {
                ChartsError::Config(format!("CIRC_SUPPLY is not a number ('{supply}'): {e}"))
            })?;
            config.circulating_supply = Some(parsed);
        }

        if config.window_days <= 0 {
            return Err(ChartsError::Config(format!(
                "window_days must be positive, got {}",
                config.window_days
            )));
        }

        Ok(config)
    }

    /// The inclusive (start, end) date window for vendor queries. Explicit
    /// dates win; otherwise the window is the last `window_days` days ending
    /// today (UTC).
    pub fn date_window(&self) -> (NaiveDate, NaiveDate) {
        let today = Utc::now().date_naive();
        let end = self.end_date.unwrap_or(today);
        let start = self
            .start_date
            .unwrap_or_else(|| end - Duration::days(self.window_days));
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_window_uses_rolling_default() {
        let config = Config::default();
        let (start, end) = config.date_window();
        assert_eq!(end - start, Duration::days(DEFAULT_WINDOW_DAYS));
    }

    #[test]
    fn explicit_dates_win_over_window() {
        let config = Config {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Config::default()
        };
        let (start, end) = config.date_window();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}

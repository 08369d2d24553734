use anyhow::Context;
use risk_monitor::{infrastructure, LayerRefresh, Settings};

/// Config is how riskctl reaches the risk API, and how it monitors it.
#[derive(Debug, Clone, clap::Args, serde::Serialize)]
pub struct Config {
    /// Base URL of the risk API.
    #[clap(
        long = "api-url",
        env = "RISKCTL_API_URL",
        default_value = risk_client::DEFAULT_API_URL,
        global = true
    )]
    pub api_url: url::Url,
    /// Interval between polls of the simulation feed.
    #[clap(
        long = "poll-interval",
        env = "RISKCTL_POLL_INTERVAL",
        default_value = "12s",
        global = true
    )]
    #[serde(with = "humantime_serde")]
    #[arg(value_parser = humantime::parse_duration)]
    pub poll_interval: std::time::Duration,
    /// Timeout of each request made of the risk API.
    #[clap(
        long = "request-timeout",
        env = "RISKCTL_REQUEST_TIMEOUT",
        default_value = "30s",
        global = true
    )]
    #[serde(with = "humantime_serde")]
    #[arg(value_parser = humantime::parse_duration)]
    pub request_timeout: std::time::Duration,
    /// When map layers are fetched: once at "startup", or on "every-poll" of the simulation feed.
    #[clap(
        long = "layer-refresh",
        env = "RISKCTL_LAYER_REFRESH",
        default_value = "startup",
        global = true
    )]
    pub layer_refresh: LayerRefresh,
    /// District of which map layers are requested. May be repeated.
    #[clap(
        long = "district",
        env = "RISKCTL_DISTRICTS",
        default_value = risk_models::ALL_DISTRICTS,
        value_delimiter = ',',
        global = true
    )]
    pub districts: Vec<String>,
    /// GeoJSON file of critical infrastructure routes.
    /// When omitted, the bundled dataset is used.
    #[clap(long = "infrastructure", env = "RISKCTL_INFRASTRUCTURE", global = true)]
    pub infrastructure: Option<std::path::PathBuf>,
}

impl Config {
    pub fn settings(&self) -> Settings {
        Settings {
            poll_interval: self.poll_interval,
            layer_refresh: self.layer_refresh,
            districts: self.districts.clone(),
        }
    }

    pub fn client(&self) -> anyhow::Result<risk_client::Client> {
        risk_client::Client::new(self.api_url.clone(), self.request_timeout)
            .with_context(|| format!("creating client of {}", self.api_url))
    }

    /// Load and style the infrastructure routes.
    pub async fn routes(&self) -> anyhow::Result<Vec<infrastructure::Route>> {
        let collection = match &self.infrastructure {
            Some(path) => infrastructure::load(path).await?,
            None => infrastructure::bundled()?,
        };
        Ok(infrastructure::routes(&collection))
    }
}

//! HTTP client of the risk API, and the monitor's production Sources.

use anyhow::Context;
use risk_models::{HistoryRecord, MapLayerRequest, MapLayerResponse, SimulationRecord};

/// Base URL of a risk API served from the local machine.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1/";

/// Client of the risk API.
#[derive(Clone, Debug)]
pub struct Client {
    // Base URL against which API paths are resolved. Always ends in '/'.
    api_url: url::Url,
    // HTTP client to use for REST requests.
    http_client: reqwest::Client,
}

impl Client {
    /// Build a Client of the API at `api_url`, with requests that time out
    /// after `timeout`.
    pub fn new(api_url: url::Url, timeout: std::time::Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            api_url: directory_url(api_url),
            http_client,
        })
    }

    pub fn api_url(&self) -> &url::Url {
        &self.api_url
    }

    /// Performs a GET request of `path` and returns the deserialized response.
    pub async fn api_get<T: serde::de::DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let request = self.http_client.get(self.api_url.join(path)?).build()?;
        tracing::debug!(url = %request.url(), method = "GET", "sending request");

        let response = self.http_client.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            decode(path, response).await
        } else {
            let body = response.text().await?;
            anyhow::bail!("GET {path}: {status}: {body}");
        }
    }

    /// Performs a POST request of `path` having a JSON `body`,
    /// and returns the deserialized response.
    pub async fn api_post<Request, Response>(
        &self,
        path: &str,
        body: &Request,
    ) -> anyhow::Result<Response>
    where
        Request: serde::Serialize,
        Response: serde::de::DeserializeOwned,
    {
        let request = self
            .http_client
            .post(self.api_url.join(path)?)
            .json(body)
            .build()?;
        tracing::debug!(url = %request.url(), method = "POST", "sending request");

        let response = self.http_client.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            decode(path, response).await
        } else {
            let body = response.text().await?;
            anyhow::bail!("POST {path}: {status}: {body}");
        }
    }
}

impl risk_monitor::Sources for Client {
    async fn history(&self) -> anyhow::Result<Vec<HistoryRecord>> {
        self.api_get("history").await
    }

    async fn simulate(&self) -> anyhow::Result<Vec<SimulationRecord>> {
        self.api_get("simulate").await
    }

    async fn map_layer(&self, request: MapLayerRequest) -> anyhow::Result<MapLayerResponse> {
        self.api_post("map-layer", &request).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    path: &str,
    response: reqwest::Response,
) -> anyhow::Result<T> {
    let body = response.bytes().await?;
    tracing::trace!(%path, len = body.len(), "got successful response");

    serde_json::from_slice(&body).with_context(|| format!("deserializing {path} response body"))
}

// Relative paths resolve against the last '/' of a URL, so make sure
// the base is a directory: "/api/v1" resolves "history" as "/api/history".
fn directory_url(mut url: url::Url) -> url::Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

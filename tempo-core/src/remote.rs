use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

use crate::model::{SearchLocation, WeatherResponse};

/// Production endpoint; tests point the client at a local mock server.
pub const BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Seam between the view-model and the remote API.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, query: &str) -> Result<WeatherResponse>;
    async fn forecast(&self, query: &str, days: u8) -> Result<WeatherResponse>;
    async fn search(&self, query: &str) -> Result<Vec<SearchLocation>>;
}

/// Thin client over the three read-only WeatherAPI.com endpoints.
#[derive(Debug, Clone)]
pub struct WeatherApi {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApi {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }

    /// Issue one GET and hand back the body, with non-2xx statuses mapped
    /// to errors carrying the (truncated) response body.
    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI.com ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read WeatherAPI {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherSource for WeatherApi {
    async fn current(&self, query: &str) -> Result<WeatherResponse> {
        let body = self.get("current.json", &[("q", query), ("aqi", "yes")]).await?;

        serde_json::from_str(&body).context("Failed to parse WeatherAPI current JSON")
    }

    async fn forecast(&self, query: &str, days: u8) -> Result<WeatherResponse> {
        let days = days.to_string();
        let body = self
            .get(
                "forecast.json",
                &[("q", query), ("days", days.as_str()), ("aqi", "yes"), ("alerts", "no")],
            )
            .await?;

        serde_json::from_str(&body).context("Failed to parse WeatherAPI forecast JSON")
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchLocation>> {
        let body = self.get("search.json", &[("q", query)]).await?;

        serde_json::from_str(&body).context("Failed to parse WeatherAPI search JSON")
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // Walk back to a char boundary so multibyte bodies cannot panic.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &body[..end])
}

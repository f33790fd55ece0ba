//! Best-effort "where am I" lookup.
//!
//! A terminal has no fused-location client, so the coordinates come from a
//! public-IP geolocation service. Every failure mode collapses into `None`;
//! callers fall back to their default city.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use std::time::Duration;

const IP_API_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Seam between the view-model and the location lookup.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    /// Current coordinates as `(lat, lon)`, or `None` when unavailable.
    async fn coordinates(&self) -> Option<(f64, f64)>;
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct IpLocationProvider {
    http: Client,
    endpoint: String,
}

impl IpLocationProvider {
    pub fn new() -> Self {
        Self::with_endpoint(IP_API_URL.to_string())
    }

    pub fn with_endpoint(endpoint: String) -> Self {
        Self { http: Client::new(), endpoint }
    }
}

impl Default for IpLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationSource for IpLocationProvider {
    async fn coordinates(&self) -> Option<(f64, f64)> {
        let response = match self
            .http
            .get(&self.endpoint)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("IP location request failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("IP location returned status {}", response.status());
            return None;
        }

        let body: IpApiResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("IP location parse error: {e}");
                return None;
            }
        };

        if body.status != "success" {
            tracing::debug!("IP location lookup unsuccessful: {}", body.status);
            return None;
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                tracing::info!("Located via IP at {lat},{lon}");
                Some((lat, lon))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn successful_lookup_yields_coordinates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"status":"success","lat":-23.55,"lon":-46.63,"city":"São Paulo"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let provider = IpLocationProvider::with_endpoint(server.uri());
        assert_eq!(provider.coordinates().await, Some((-23.55, -46.63)));
    }

    #[tokio::test]
    async fn failed_lookup_yields_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"status":"fail","message":"private range"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let provider = IpLocationProvider::with_endpoint(server.uri());
        assert_eq!(provider.coordinates().await, None);
    }

    #[tokio::test]
    async fn server_error_yields_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

        let provider = IpLocationProvider::with_endpoint(server.uri());
        assert_eq!(provider.coordinates().await, None);
    }
}

use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

use crate::{
    config::{Settings, mask_secret},
    model::{ApiResponse, CurrentWeatherRequest},
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// DNS, connect, TLS or body read failure.
    #[error("Request to Weatherstack failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Response body is not the expected JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

/// Thin client for the Weatherstack `current` endpoint.
///
/// Every call is a single GET with no retries and no timeout of its own.
#[derive(Debug, Clone)]
pub struct WeatherstackClient {
    settings: Settings,
    http: Client,
}

impl WeatherstackClient {
    pub fn new(settings: Settings) -> Self {
        Self { settings, http: Client::new() }
    }

    /// A client that sends `api_key` instead of the configured key.
    /// The connection pool is shared, `self` is left untouched.
    pub fn with_access_key(&self, api_key: impl Into<String>) -> Self {
        Self { settings: self.settings.with_api_key(api_key), http: self.http.clone() }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn current_endpoint(&self) -> String {
        join_endpoint(self.settings.base_url(), "current")
    }

    pub async fn get_current_weather(
        &self,
        request: &CurrentWeatherRequest,
    ) -> Result<ApiResponse, ClientError> {
        let endpoint = self.current_endpoint();
        let params = request.query_pairs();

        debug!(
            endpoint = %endpoint,
            access_key = %mask_secret(self.settings.api_key()),
            ?params,
            "Making GET request"
        );

        let res = self
            .http
            .get(&endpoint)
            .query(&[("access_key", self.settings.api_key())])
            .query(&params)
            .send()
            .await?;

        let status = res.status();
        let headers = res.headers().clone();
        let body = res.text().await?;

        debug!(status = status.as_u16(), body_len = body.len(), "Received response");

        Ok(ApiResponse { status, headers, body })
    }
}

fn join_endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> WeatherstackClient {
        WeatherstackClient::new(Settings::new(base_url, "KEY").unwrap())
    }

    #[test]
    fn endpoint_joins_with_single_slash() {
        assert_eq!(
            client("http://api.weatherstack.com/").current_endpoint(),
            "http://api.weatherstack.com/current"
        );
        assert_eq!(
            client("http://api.weatherstack.com").current_endpoint(),
            "http://api.weatherstack.com/current"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        assert_eq!(
            client("http://localhost:9000/v1/").current_endpoint(),
            "http://localhost:9000/v1/current"
        );
    }

    #[test]
    fn with_access_key_does_not_touch_original() {
        let original = client("http://localhost/");
        let bad = original.with_access_key("invalid_key_123");

        assert_eq!(original.settings().api_key(), "KEY");
        assert_eq!(bad.settings().api_key(), "invalid_key_123");
        assert_eq!(bad.current_endpoint(), original.current_endpoint());
    }

    #[tokio::test]
    async fn connection_refused_surfaces_as_transport_error() {
        // Port 9 (discard) is almost never listening locally.
        let result = client("http://127.0.0.1:9/")
            .get_current_weather(&CurrentWeatherRequest::new("London"))
            .await;

        assert!(matches!(result, Err(ClientError::Transport(_))), "got {result:?}");
    }
}

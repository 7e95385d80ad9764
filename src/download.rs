//! Downloads provider payloads over HTTP.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::Config;

const USER_AGENT: &str = concat!("weather-feed/", env!("CARGO_PKG_VERSION"));

/// Errors from fetching a payload. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("could not decode payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    rate_limit_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Fetcher {
            client,
            rate_limit_delay: Duration::from_secs(config.rate_limit_delay_secs),
        })
    }

    /// Fetches `url` with `query` and decodes the JSON body as `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, FetchError> {
        let bytes = self.get_bytes(url, query).await?;

        serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn get_bytes(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<Vec<u8>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        log::debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }

    /// Waits out the provider's rate limit before the next request.
    pub async fn pause(&self) {
        if !self.rate_limit_delay.is_zero() {
            log::debug!("Waiting {:?} for rate limit", self.rate_limit_delay);
            tokio::time::sleep(self.rate_limit_delay).await;
        }
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn fetcher() -> Fetcher {
        let config = Config {
            rate_limit_delay_secs: 0,
            request_timeout_secs: 5,
            ..Config::default()
        };
        Fetcher::new(&config).unwrap()
    }

    #[tokio::test]
    async fn should_decode_json_with_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/forecast")
                    .query_param("lat_lon", "48.1,16.4");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"timestamps": ["T0"]}));
            })
            .await;

        let query = vec![("lat_lon".to_string(), "48.1,16.4".to_string())];
        let body: serde_json::Value = fetcher()
            .get_json(&server.url("/forecast"), &query)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(body, json!({"timestamps": ["T0"]}));
    }

    #[tokio::test]
    async fn should_report_http_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/forecast");
                then.status(422).body("invalid parameter");
            })
            .await;

        let result: Result<serde_json::Value, _> =
            fetcher().get_json(&server.url("/forecast"), &[]).await;

        match result {
            Err(FetchError::Status { status, .. }) => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY)
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn should_report_undecodable_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/forecast");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let result: Result<serde_json::Value, _> =
            fetcher().get_json(&server.url("/forecast"), &[]).await;

        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[tokio::test]
    async fn should_report_transport_failure() {
        // Nothing listens on port 9 of localhost.
        let result: Result<serde_json::Value, _> =
            fetcher().get_json("http://127.0.0.1:9/forecast", &[]).await;

        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }

    #[tokio::test]
    async fn should_not_wait_without_delay() {
        let start = std::time::Instant::now();
        fetcher().pause().await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

//! HTTP transport backed by reqwest.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::{RetryConfig, ServerConfig};
use crate::observability::metrics;
use crate::resilience::retry_delay;
use crate::rollups::{Finish, FinishEnvelope, FinishStatus, Output, RollupRequest};
use crate::transport::{RollupTransport, TransportError};

#[derive(Debug, Deserialize)]
struct IndexResponse {
    index: u64,
}

/// Talks to the rollup node's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
    output_timeout: Option<Duration>,
}

impl HttpTransport {
    /// Build from configuration, falling back to `ROLLUP_HTTP_SERVER_URL`.
    pub fn from_config(server: &ServerConfig, retry: RetryConfig) -> Result<Self, TransportError> {
        let url = server.resolve_url().ok_or(TransportError::MissingUrl)?;
        let transport = Self::new(&url, retry)?;
        Ok(match server.output_timeout_secs {
            0 => transport,
            secs => transport.with_output_timeout(Duration::from_secs(secs)),
        })
    }

    pub fn new(url: &str, retry: RetryConfig) -> Result<Self, TransportError> {
        url::Url::parse(url).map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: url.trim_end_matches('/').to_string(),
            retry,
            output_timeout: None,
        })
    }

    /// Deadline for output calls. `finish` is a long-poll and never times out.
    pub fn with_output_timeout(mut self, timeout: Duration) -> Self {
        self.output_timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to `endpoint`, retrying connection failures with backoff.
    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, TransportError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let mut request = self.client.post(&url).json(body);
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && attempt + 1 < max_attempts => {
                    attempt += 1;
                    let delay = retry_delay(attempt, &self.retry);
                    tracing::warn!(
                        endpoint,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Rollup node unreachable, retrying"
                    );
                    metrics::record_retry(endpoint);
                    tokio::time::sleep(delay).await;
                }
                Err(source) => return Err(TransportError::Http { endpoint, source }),
            }
        }
    }

    async fn check_status(
        endpoint: &'static str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            endpoint,
            status: status.as_u16(),
            body,
        })
    }
}

impl RollupTransport for HttpTransport {
    fn finish(
        &self,
        status: FinishStatus,
    ) -> impl Future<Output = Result<Option<RollupRequest>, TransportError>> + Send {
        async move {
            tracing::debug!(status = status.as_str(), "Sending finish");
            let response = self.post("finish", &Finish { status }, None).await?;
            if response.status() == StatusCode::ACCEPTED {
                return Ok(None);
            }
            let response = Self::check_status("finish", response).await?;
            let envelope: FinishEnvelope = response.json().await.map_err(|e| TransportError::Decode {
                endpoint: "finish",
                reason: e.to_string(),
            })?;

            let request_type = envelope.request_type.clone();
            let request = envelope.into_request().map_err(|e| TransportError::Decode {
                endpoint: "finish",
                reason: e.to_string(),
            })?;
            if request.is_none() {
                tracing::warn!(request_type = %request_type, "Ignoring unknown request type");
            }
            Ok(request)
        }
    }

    fn send_output(
        &self,
        output: &Output,
    ) -> impl Future<Output = Result<Option<u64>, TransportError>> + Send {
        async move {
            let endpoint = output.endpoint();
            let body = output.to_json().map_err(|e| TransportError::Decode {
                endpoint,
                reason: e.to_string(),
            })?;
            let response = self.post(endpoint, &body, self.output_timeout).await?;
            let response = Self::check_status(endpoint, response).await?;

            match output {
                Output::Notice(_) | Output::Voucher(_) => {
                    let text = response.text().await.unwrap_or_default();
                    let index = serde_json::from_str::<IndexResponse>(&text).ok().map(|r| r.index);
                    tracing::debug!(endpoint, index, "Output accepted");
                    Ok(index)
                }
                Output::Report(_) | Output::Exception(_) => {
                    tracing::debug!(endpoint, "Output accepted");
                    Ok(None)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_handling() {
        let transport = HttpTransport::new("http://127.0.0.1:5004/", RetryConfig::default()).unwrap();
        assert_eq!(transport.base_url(), "http://127.0.0.1:5004");

        assert!(matches!(
            HttpTransport::new("not a url", RetryConfig::default()),
            Err(TransportError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_from_config_requires_url() {
        let server = ServerConfig {
            url: "http://localhost:5004".into(),
            output_timeout_secs: 0,
        };
        let transport = HttpTransport::from_config(&server, RetryConfig::default()).unwrap();
        assert!(transport.output_timeout.is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_after_retries() {
        let retry = RetryConfig {
            max_attempts: 2,
            base_delay_ms: 1,
            max_delay_ms: 2,
        };
        // port 9 (discard) is normally closed on test machines
        let transport = HttpTransport::new("http://127.0.0.1:9", retry).unwrap();
        let err = transport.finish(FinishStatus::Accept).await.unwrap_err();
        assert!(matches!(err, TransportError::Http { endpoint: "finish", .. }));
    }
}

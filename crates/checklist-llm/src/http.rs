//! Shared JSON-over-HTTP plumbing for the REST backends.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use checklist_core::error::{ChecklistError, ChecklistResult};
use checklist_core::traits::RetryPolicy;

/// Per-request ceiling. The extraction deadline is enforced above this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// A reqwest client with fixed headers and a same-model retry policy.
pub(crate) struct JsonClient {
    client: Client,
    retry: RetryPolicy,
    provider: &'static str,
}

impl JsonClient {
    pub(crate) fn new(
        provider: &'static str,
        headers: HeaderMap,
        retry: RetryPolicy,
    ) -> ChecklistResult<Self> {
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                ChecklistError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            retry,
            provider,
        })
    }

    /// POST `body` and decode the JSON reply.
    ///
    /// Network failures and 5xx responses are retried on the same model.
    /// Rate limits, missing models and credential errors return at once.
    pub(crate) async fn post<B, R>(&self, url: &str, body: &B) -> ChecklistResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let attempt = || self.post_once(url, body);
        attempt
            .retry(
                ExponentialBuilder::default()
                    .with_max_times(self.retry.max_retries)
                    .with_min_delay(Duration::from_millis(self.retry.min_delay_ms))
                    .with_max_delay(Duration::from_millis(self.retry.max_delay_ms)),
            )
            .when(is_retryable)
            .notify(|err, dur| {
                warn!(
                    provider = self.provider,
                    error = %err,
                    "Request failed, retrying in {:?}",
                    dur
                );
            })
            .await
    }

    async fn post_once<B, R>(&self, url: &str, body: &B) -> ChecklistResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                ChecklistError::network(format!("{} request failed: {}", self.provider, e))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ChecklistError::network(format!("Failed to read {} response body: {}", self.provider, e))
        })?;

        if !status.is_success() {
            debug!(provider = self.provider, %status, "Backend returned an error status");
            return Err(ChecklistError::from_http_status(
                status.as_u16(),
                &error_message(&text),
            ));
        }

        serde_json::from_str(&text).map_err(|e| {
            ChecklistError::backend(format!(
                "Failed to parse {} response: {}",
                self.provider, e
            ))
        })
    }
}

fn is_retryable(error: &ChecklistError) -> bool {
    matches!(
        error,
        ChecklistError::Network { .. } | ChecklistError::Backend { .. }
    )
}

/// Pull `error.message` out of a JSON error body, or keep the body as is.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Build a header map, rejecting values that are not valid header text.
pub(crate) fn headers(pairs: &[(&'static str, &str)]) -> ChecklistResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        let value = HeaderValue::from_str(value).map_err(|_| {
            ChecklistError::Configuration(format!("Invalid value for header {}", name))
        })?;
        map.insert(HeaderName::from_static(name), value);
    }
    Ok(map)
}

/// Resolve an API key from config or the environment.
pub(crate) fn api_key(configured: Option<&str>, env_var: &str, provider: &str) -> ChecklistResult<String> {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            ChecklistError::Configuration(format!(
                "{} API key not found. Set {} environment variable or provide api_key in config.",
                provider, env_var
            ))
        })
}

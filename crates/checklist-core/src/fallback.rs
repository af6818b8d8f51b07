//! Model fallback chain.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::config::FallbackConfig;
use crate::error::{ChecklistError, ChecklistResult};
use crate::traits::{Completion, CompletionRequest, CompletionResponse};

/// Tries an ordered list of models on one backend until one answers.
///
/// Transient failures move on to the next model, pausing first after a
/// rate-limit or model-unavailable response. Fatal failures stop the chain:
/// every model shares the same credentials.
pub struct FallbackCompletion {
    inner: Arc<dyn Completion>,
    models: Vec<String>,
    backoff: Duration,
}

impl FallbackCompletion {
    /// Chain the backend's own model followed by the configured fallbacks.
    pub fn new(inner: Arc<dyn Completion>, config: &FallbackConfig) -> Self {
        let primary = inner.model_name().to_string();
        let models = std::iter::once(primary)
            .chain(config.models.iter().cloned())
            .collect();
        Self::with_models(inner, models, Duration::from_millis(config.backoff_ms))
    }

    /// Chain an explicit model list. Blank and repeated names are dropped.
    pub fn with_models(inner: Arc<dyn Completion>, models: Vec<String>, backoff: Duration) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(models.len());
        for model in models {
            let model = model.trim().to_string();
            if !model.is_empty() && !unique.contains(&model) {
                unique.push(model);
            }
        }
        Self {
            inner,
            models: unique,
            backoff,
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }
}

#[async_trait]
impl Completion for FallbackCompletion {
    async fn complete(&self, request: &CompletionRequest) -> ChecklistResult<CompletionResponse> {
        if self.models.is_empty() {
            return self.inner.complete(request).await;
        }

        let mut tried = Vec::with_capacity(self.models.len());
        let mut all_rate_limited = true;

        for (index, model) in self.models.iter().enumerate() {
            let attempt = request.clone().with_model(model.clone());
            match self.inner.complete(&attempt).await {
                Ok(response) => {
                    if index > 0 {
                        info!(model = %model, attempts = index + 1, "Fallback model succeeded");
                    }
                    return Ok(response);
                }
                Err(e) if !e.is_transient() => {
                    error!(model = %model, error = %e, "Fatal backend error, stopping fallback chain");
                    return Err(e);
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "Model failed, trying next");
                    tried.push(model.clone());
                    all_rate_limited &= e.is_rate_limit();
                    let more = index + 1 < self.models.len();
                    if more && e.wants_backoff() && !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        error!(tried = ?tried, "All models in the fallback chain failed");
        Err(ChecklistError::AllModelsFailed {
            tried,
            rate_limited: all_rate_limited,
        })
    }

    fn model_name(&self) -> &str {
        self.models
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.inner.model_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockCompletion;
    use crate::types::Message;
    use std::sync::Mutex;

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![Message::user("hi")])
    }

    fn chain(mock: MockCompletion, models: &[&str], backoff_ms: u64) -> FallbackCompletion {
        FallbackCompletion::with_models(
            Arc::new(mock),
            models.iter().map(|m| m.to_string()).collect(),
            Duration::from_millis(backoff_ms),
        )
    }

    #[tokio::test]
    async fn test_advances_on_transient_errors() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let mut mock = MockCompletion::new();
        mock.expect_complete().returning(move |req| {
            let model = req.model.clone().unwrap_or_default();
            log.lock().unwrap().push(model.clone());
            match model.as_str() {
                "a" => Err(ChecklistError::rate_limit("busy")),
                "b" => Err(ChecklistError::backend("500")),
                _ => Ok(CompletionResponse::new("ok", model)),
            }
        });

        let response = chain(mock, &["a", "b", "c"], 0).complete(&request()).await.unwrap();
        assert_eq!(response.model, "c");
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_fatal_error_stops_chain() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .times(1)
            .returning(|_| Err(ChecklistError::authentication("bad key")));
        let result = chain(mock, &["a", "b"], 0).complete(&request()).await;
        assert!(matches!(result, Err(ChecklistError::Authentication { .. })));
    }

    #[tokio::test]
    async fn test_exhaustion_reports_tried_models() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .returning(|_| Err(ChecklistError::rate_limit("busy")));
        let err = chain(mock, &["a", "b"], 0).complete(&request()).await.unwrap_err();
        match err {
            ChecklistError::AllModelsFailed { tried, rate_limited } => {
                assert_eq!(tried, vec!["a", "b"]);
                assert!(rate_limited);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_mixed_failures_are_not_rate_limited() {
        let mut mock = MockCompletion::new();
        mock.expect_complete().returning(|req| match req.model.as_deref() {
            Some("a") => Err(ChecklistError::rate_limit("busy")),
            _ => Err(ChecklistError::network("reset")),
        });
        let err = chain(mock, &["a", "b"], 0).complete(&request()).await.unwrap_err();
        assert!(!err.is_rate_limit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_only_after_rate_limit() {
        let mut mock = MockCompletion::new();
        mock.expect_complete().returning(|req| match req.model.as_deref() {
            Some("a") => Err(ChecklistError::network("reset")),
            Some("b") => Err(ChecklistError::rate_limit("busy")),
            _ => Ok(CompletionResponse::new("ok", "c")),
        });

        let start = tokio::time::Instant::now();
        chain(mock, &["a", "b", "c"], 2_000).complete(&request()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_backoff_after_last_model() {
        let mut mock = MockCompletion::new();
        mock.expect_complete()
            .returning(|_| Err(ChecklistError::rate_limit("busy")));
        let start = tokio::time::Instant::now();
        let _ = chain(mock, &["a", "b"], 2_000).complete(&request()).await;
        assert_eq!(start.elapsed(), Duration::from_millis(2_000));
    }

    #[test]
    fn test_model_list_dedup() {
        let fallback = chain(MockCompletion::new(), &["a", " ", "b", "a"], 0);
        assert_eq!(fallback.models(), &["a".to_string(), "b".to_string()]);
        assert_eq!(fallback.model_name(), "a");
    }
}

//! AI classifier client
//!
//! Rates the relevance of a (milestone, content unit) pair on a 0-5 integer
//! scale with a free-text reasoning string. Each call has a bounded timeout
//! and at most one retry on a transient failure; calls are rate limited to
//! respect the provider's limits.

use crate::models::{ContentUnit, Milestone};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

const USER_AGENT: &str = "Cradle-Curation/0.1.0";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const RATE_LIMIT_MS: u64 = 250; // 4 requests per second across the worker pool

/// Classifier client errors
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Network communication error (transient, retried once)
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out (transient, retried once)
    #[error("Classifier request timed out")]
    Timeout,

    /// Classifier returned an error response
    #[error("Classifier API error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse classifier response
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClassifierError {
    /// Transient failures are worth a single retry
    pub fn is_transient(&self) -> bool {
        matches!(self, ClassifierError::Network(_) | ClassifierError::Timeout)
    }
}

/// What the classifier sees for one pair
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest {
    pub milestone_title: String,
    pub milestone_description: String,
    pub milestone_category: String,
    pub content_text: String,
    pub content_domain: String,
    pub content_week: i64,
}

impl ClassifyRequest {
    pub fn for_pair(milestone: &Milestone, unit: &ContentUnit) -> Self {
        Self {
            milestone_title: milestone.title.clone(),
            milestone_description: milestone.description.clone(),
            milestone_category: milestone.category.as_str().to_string(),
            content_text: unit.text.clone(),
            content_domain: unit.domain.clone(),
            content_week: unit.week,
        }
    }
}

/// Classifier verdict for one pair
#[derive(Debug, Clone, Deserialize)]
pub struct RelevanceRating {
    /// Integer relevance in [0, 5]; 0 means "not relevant"
    pub score: i64,
    pub reasoning: String,
}

/// Classifier seam, so the scorer can run against a stub in tests
#[async_trait]
pub trait Classify: Send + Sync {
    async fn classify(&self, request: &ClassifyRequest) -> Result<RelevanceRating, ClassifierError>;
}

/// Minimum-interval rate limiter shared by the scorer's workers
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Classifier rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// HTTP client for the external AI classifier
pub struct ClassifierClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: Arc<RateLimiter>,
}

impl ClassifierClient {
    /// Create a new classifier client
    pub fn new(base_url: String, api_key: Option<String>) -> Result<Self, ClassifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
        })
    }

    async fn classify_once(
        &self,
        request: &ClassifyRequest,
    ) -> Result<RelevanceRating, ClassifierError> {
        self.rate_limiter.wait().await;

        let url = format!("{}/classify", self.base_url);

        let mut builder = self.http_client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout
            } else {
                ClassifierError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(status.as_u16(), error_text));
        }

        let rating: RelevanceRating = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        if !(0..=5).contains(&rating.score) {
            return Err(ClassifierError::Parse(format!(
                "Classifier score out of range [0,5]: {}",
                rating.score
            )));
        }

        Ok(rating)
    }
}

#[async_trait]
impl Classify for ClassifierClient {
    /// Classify one pair, retrying once on a transient failure
    async fn classify(&self, request: &ClassifyRequest) -> Result<RelevanceRating, ClassifierError> {
        match self.classify_once(request).await {
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Classifier call failed, retrying once");
                self.classify_once(request).await
            }
            other => other,
        }
    }
}

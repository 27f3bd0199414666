//! Review submission to the REST API.
//!
//! One POST per review, bounded by a timeout, never retried. Every call
//! produces exactly one [`ForwardOutcome`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::common::error::ForwardError;
use crate::config::Config;
use crate::review::payload::ReviewPayload;

/// Path of the review endpoint under the API root.
pub const REVIEW_ENDPOINT: &str = "avis";

/// Detail shown when an error response has an empty body.
pub const NO_DETAILS: &str = "Pas de détails";

/// Maximum number of characters of an error body relayed to the user.
const ERROR_DETAIL_LIMIT: usize = 200;

/// Classified result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The API answered with a 2xx status.
    Success(u16),
    /// The API answered with any other status.
    ApiError { status: u16, detail: String },
    ConnectionFailure,
    Timeout,
    UnexpectedFailure(String),
}

impl From<ForwardError> for ForwardOutcome {
    fn from(error: ForwardError) -> Self {
        match error {
            ForwardError::Connection(_) => ForwardOutcome::ConnectionFailure,
            ForwardError::Timeout(_) => ForwardOutcome::Timeout,
            ForwardError::Unexpected(e) => ForwardOutcome::UnexpectedFailure(e.to_string()),
        }
    }
}

/// Something that accepts reviews.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Submit one review. Calling twice submits twice.
    async fn submit(&self, payload: &ReviewPayload) -> ForwardOutcome;
}

/// [`ReviewApi`] backed by the REST API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpReviewApi {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpReviewApi {
    /// Create a client posting to `{base_url}/avis`.
    ///
    /// `base_url` must not end with a slash.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        // Same bound on the connect phase, so a hung connect is reported
        // as a connection failure rather than a timeout.
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/{}", base_url, REVIEW_ENDPOINT),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
        )
    }

    /// Full URL reviews are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, payload: &ReviewPayload) -> Result<ForwardOutcome, ForwardError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(ForwardError::classify)?;

        let status = response.status();
        if status.is_success() {
            return Ok(ForwardOutcome::Success(status.as_u16()));
        }

        let body = response.text().await.map_err(ForwardError::classify)?;
        Ok(ForwardOutcome::ApiError {
            status: status.as_u16(),
            detail: error_detail(&body),
        })
    }
}

#[async_trait]
impl ReviewApi for HttpReviewApi {
    async fn submit(&self, payload: &ReviewPayload) -> ForwardOutcome {
        debug!("POST {} for {}", self.endpoint, payload.course_id);

        let outcome = match self.post(payload).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    ForwardError::Connection(_) => warn!("API unreachable at {}: {}", self.endpoint, e),
                    ForwardError::Timeout(_) => warn!("API timed out at {}", self.endpoint),
                    ForwardError::Unexpected(_) => error!("Unexpected error posting review: {}", e),
                }
                ForwardOutcome::from(e)
            }
        };

        match &outcome {
            ForwardOutcome::Success(status) => info!("Review for {} accepted ({})", payload.course_id, status),
            ForwardOutcome::ApiError { status, .. } => warn!("API rejected review for {}: {}", payload.course_id, status),
            _ => {}
        }

        outcome
    }
}

/// First characters of an error body, or a placeholder if it is empty.
pub fn error_detail(body: &str) -> String {
    if body.is_empty() {
        NO_DETAILS.to_string()
    } else {
        body.chars().take(ERROR_DETAIL_LIMIT).collect()
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::store::{ProblemStore, StoreError};
use crate::types::TestCase;

/// Fetches problems from `GET {base_url}/problems/{id}`
#[derive(Debug, Clone)]
pub struct HttpProblemStore {
    client: reqwest::Client,
    base_url: Url,
}

/// The part of a problem document we care about
#[derive(Debug, Deserialize)]
struct ProblemDocument {
    #[serde(default)]
    test_cases: Vec<TestCase>,
}

impl HttpProblemStore {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, StoreError> {
        let invalid = |reason: String| StoreError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason,
        };

        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".to_owned()));
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// URL of one problem; the identifier is percent-encoded as a path segment
    fn problem_url(&self, problem_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("problems").push(problem_id);
        }
        url
    }
}

#[async_trait]
impl ProblemStore for HttpProblemStore {
    #[instrument(skip(self))]
    async fn test_cases(&self, problem_id: &str) -> Result<Vec<TestCase>, StoreError> {
        let url = self.problem_url(problem_id);
        debug!(%url, "fetching problem");

        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(StoreError::NotFound(problem_id.to_owned())),
            status => {
                return Err(StoreError::Status {
                    problem_id: problem_id.to_owned(),
                    status,
                });
            }
        }

        let document: ProblemDocument = response.json().await?;
        debug!(count = document.test_cases.len(), "fetched test cases");
        Ok(document.test_cases)
    }
}

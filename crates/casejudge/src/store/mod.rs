//! Problem store: where test cases for a problem identifier come from

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use crate::store::cache::CachedProblemStore;
pub use crate::store::http::HttpProblemStore;
pub use crate::store::memory::InMemoryProblemStore;

mod cache;
mod http;
mod memory;

use crate::config::ProblemStoreConfig;
use crate::types::TestCase;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("problem '{0}' not found")]
    NotFound(String),

    #[error("invalid problem store URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("problem store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("problem store answered {status} for problem '{problem_id}'")]
    Status {
        problem_id: String,
        status: reqwest::StatusCode,
    },
}

/// Source of test cases keyed by problem identifier
#[async_trait]
pub trait ProblemStore: std::fmt::Debug + Send + Sync {
    /// Ordered test cases of a problem
    async fn test_cases(&self, problem_id: &str) -> Result<Vec<TestCase>, StoreError>;
}

/// Build the store described by the configuration.
///
/// A configured base URL gives a cached HTTP store; without one every
/// problem is unknown.
pub fn from_config(config: &ProblemStoreConfig) -> Result<Arc<dyn ProblemStore>, StoreError> {
    match config.base_url {
        Some(ref url) => {
            let http = HttpProblemStore::new(url, config.request_timeout())?;
            Ok(Arc::new(CachedProblemStore::new(Arc::new(http))))
        }
        None => Ok(Arc::new(InMemoryProblemStore::new())),
    }
}

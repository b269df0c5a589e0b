use std::collections::HashMap;

use async_trait::async_trait;

use crate::store::{ProblemStore, StoreError};
use crate::types::TestCase;

/// Fixed set of problems held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryProblemStore {
    problems: HashMap<String, Vec<TestCase>>,
}

impl InMemoryProblemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a problem
    pub fn with_problem(mut self, problem_id: impl Into<String>, cases: Vec<TestCase>) -> Self {
        self.problems.insert(problem_id.into(), cases);
        self
    }
}

#[async_trait]
impl ProblemStore for InMemoryProblemStore {
    async fn test_cases(&self, problem_id: &str) -> Result<Vec<TestCase>, StoreError> {
        self.problems
            .get(problem_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(problem_id.to_owned()))
    }
}

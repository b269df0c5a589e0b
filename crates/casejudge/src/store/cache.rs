use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::store::{ProblemStore, StoreError};
use crate::types::TestCase;

type Slot = Arc<OnceCell<Vec<TestCase>>>;

/// Read-through cache in front of another store.
///
/// Test cases never change while the process runs, so entries are never
/// evicted. Concurrent misses on one problem share a single upstream fetch.
/// Failed fetches are not cached and leave no entry behind.
#[derive(Debug)]
pub struct CachedProblemStore {
    inner: Arc<dyn ProblemStore>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl CachedProblemStore {
    pub fn new(inner: Arc<dyn ProblemStore>) -> Self {
        Self {
            inner,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        // The map only holds Arcs, so a poisoned lock still has usable data
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, problem_id: &str) -> Slot {
        self.lock_slots()
            .entry(problem_id.to_owned())
            .or_default()
            .clone()
    }

    /// Drop the entry for `problem_id` if it is still `slot` and was never filled
    fn forget(&self, problem_id: &str, slot: &Slot) {
        let mut slots = self.lock_slots();
        if let Some(current) = slots.get(problem_id)
            && Arc::ptr_eq(current, slot)
            && !current.initialized()
        {
            slots.remove(problem_id);
        }
    }
}

#[async_trait]
impl ProblemStore for CachedProblemStore {
    async fn test_cases(&self, problem_id: &str) -> Result<Vec<TestCase>, StoreError> {
        let slot = self.slot(problem_id);
        if let Some(cases) = slot.get() {
            debug!(problem_id, "test cases served from cache");
            return Ok(cases.clone());
        }

        match slot
            .get_or_try_init(|| self.inner.test_cases(problem_id))
            .await
        {
            Ok(cases) => Ok(cases.clone()),
            Err(e) => {
                self.forget(problem_id, &slot);
                Err(e)
            }
        }
    }
}

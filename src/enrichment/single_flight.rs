//! Per-batch lookup deduplication
//!
//! The first caller for a key runs the lookup; concurrent and later callers
//! for the same key wait for and share that result. A `SingleFlight` lives
//! for one enrichment call and is dropped with it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

pub struct SingleFlight<V> {
    cells: Mutex<HashMap<String, Arc<OnceCell<V>>>>,
}

impl<V: Clone> SingleFlight<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `key` once. `resolve` only runs if no other caller has
    /// started resolving the same key.
    pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        // the map lock is never held across an await
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cells.entry(key.to_string()).or_default())
        };
        cell.get_or_init(resolve).await.clone()
    }

    /// Number of distinct keys seen so far
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<V: Clone> Default for SingleFlight<V> {
    fn default() -> Self {
        Self::new()
    }
}

use crate::parser_config::IdStrategy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier generator scoped to one parse call.
#[derive(Debug)]
pub(crate) struct IdSource {
    strategy: IdStrategy,
    counter: AtomicU64,
}

impl IdSource {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            counter: AtomicU64::new(0),
        }
    }

    /// A fresh identifier; `kind` prefixes sequential identifiers (`slide-3`, `text-12`).
    pub fn next(&self, kind: &str) -> String {
        match self.strategy {
            IdStrategy::Uuid => uuid::Uuid::new_v4().to_string(),
            IdStrategy::Sequential => {
                let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
                format!("{}-{}", kind, n)
            }
        }
    }
}

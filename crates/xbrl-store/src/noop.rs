//! No-op fact store.

use async_trait::async_trait;
use tracing::trace;
use xbrl_core::{FactSet, FactStore, Result};

/// A store that keeps nothing.
///
/// `put` and `clear` succeed, lookups return nothing. Useful for dry runs of
/// the batch driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFactStore;

impl NoopFactStore {
    /// Create a new no-op store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FactStore for NoopFactStore {
    fn name(&self) -> &str {
        "noop"
    }

    async fn put(&self, facts: &FactSet) -> Result<()> {
        trace!(doc_id = %facts.doc_id, "NoopFactStore: put called, doing nothing");
        Ok(())
    }

    async fn get(&self, _doc_id: &str) -> Result<Option<FactSet>> {
        trace!("NoopFactStore: get called, returning None");
        Ok(None)
    }

    async fn find_by_security_code(&self, _security_code: &str) -> Result<Vec<FactSet>> {
        trace!("NoopFactStore: find_by_security_code called, returning nothing");
        Ok(Vec::new())
    }

    async fn len(&self) -> Result<usize> {
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopFactStore: clear called, doing nothing");
        Ok(())
    }
}

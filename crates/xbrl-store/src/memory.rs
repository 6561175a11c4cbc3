//! In-memory fact store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use xbrl_core::{FactSet, FactStore, Result};

/// Fact store backed by a `RwLock`-protected `HashMap` keyed by document id.
///
/// Contents are lost when the store is dropped. Fact sets are cloned on
/// get/put.
#[derive(Debug, Default)]
pub struct InMemoryFactStore {
    entries: RwLock<HashMap<String, FactSet>>,
}

impl InMemoryFactStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FactStore for InMemoryFactStore {
    fn name(&self) -> &str {
        "memory"
    }

    #[instrument(skip(self, facts), fields(doc_id = %facts.doc_id))]
    async fn put(&self, facts: &FactSet) -> Result<()> {
        let mut entries = self.entries.write().await;
        if entries
            .insert(facts.doc_id.clone(), facts.clone())
            .is_some()
        {
            debug!("Replaced stored fact set");
        } else {
            debug!("Stored fact set");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, doc_id: &str) -> Result<Option<FactSet>> {
        let entries = self.entries.read().await;
        match entries.get(doc_id) {
            Some(facts) => {
                debug!("Store hit");
                Ok(Some(facts.clone()))
            }
            None => {
                debug!("Store miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn find_by_security_code(&self, security_code: &str) -> Result<Vec<FactSet>> {
        let entries = self.entries.read().await;
        let mut found: Vec<FactSet> = entries
            .values()
            .filter(|f| f.security_code.as_deref() == Some(security_code))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.fiscal_year_end
                .cmp(&b.fiscal_year_end)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        debug!("Found {} fact sets", found.len());
        Ok(found)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        debug!("Cleared all fact sets");
        Ok(())
    }
}

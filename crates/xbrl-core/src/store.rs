//! Store trait for canonical fact sets.
//!
//! This module defines the [`FactStore`] trait, the seam through which the
//! batch driver hands finished [`FactSet`]s to downstream consumers.

use async_trait::async_trait;

use crate::{error::Result, types::FactSet};

/// Trait for storing canonical fact sets.
///
/// Implementations can keep facts in memory, forward them to a dataset writer,
/// or discard them.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Returns a short name for logging.
    fn name(&self) -> &str;

    /// Stores a fact set, replacing any earlier one with the same document id.
    async fn put(&self, facts: &FactSet) -> Result<()>;

    /// Retrieves the fact set of a document.
    ///
    /// Returns `Ok(None)` if nothing is stored for `doc_id`.
    async fn get(&self, doc_id: &str) -> Result<Option<FactSet>>;

    /// Retrieves every stored fact set for a security code.
    async fn find_by_security_code(&self, security_code: &str) -> Result<Vec<FactSet>>;

    /// Returns the number of stored fact sets.
    async fn len(&self) -> Result<usize>;

    /// Returns true if nothing is stored.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Removes all stored fact sets.
    async fn clear(&self) -> Result<()>;
}

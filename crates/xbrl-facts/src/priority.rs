//! Priority resolution over synonym keys.

use tracing::trace;

use xbrl_core::{CanonicalKeys, FactValue, SectionValues};

/// Returns the first non-null value among `candidates`, in order.
///
/// Values are never merged or summed; `None` when every candidate is absent
/// or null.
#[must_use]
pub fn resolve_by_priority<S: AsRef<str>>(
    values: &SectionValues,
    candidates: &[S],
) -> Option<FactValue> {
    candidates.iter().find_map(|key| {
        let key = key.as_ref();
        let value = values.get(key).copied().flatten();
        if value.is_some() {
            trace!(key, "Priority candidate selected");
        }
        value
    })
}

/// Resolves canonical keys that carry a priority list.
#[derive(Clone, Copy, Debug)]
pub struct PriorityEngine<'a> {
    keys: &'a CanonicalKeys,
}

impl<'a> PriorityEngine<'a> {
    /// Creates an engine over a canonical vocabulary.
    #[must_use]
    pub const fn new(keys: &'a CanonicalKeys) -> Self {
        Self { keys }
    }

    /// Resolves one key. Returns `None` when the key has no priority list.
    #[must_use]
    pub fn resolve(&self, key: &str, values: &SectionValues) -> Option<Option<FactValue>> {
        let spec = self.keys.spec(key)?;
        let candidates = spec.resolution.as_deref()?;
        Some(resolve_by_priority(values, candidates))
    }
}

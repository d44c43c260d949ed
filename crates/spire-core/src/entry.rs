//! Registration entry record

use serde::{Deserialize, Serialize};

use crate::identity::SpiffeId;
use crate::selector::{Selector, SelectorSet};

/// A registration entry: SPIFFE ID, parent ID and selectors
///
/// - `id` is `None` until the registry assigns one, unless the caller
///   supplies it up front.
/// - `parent_id` is required when managing an entry; read-only lookups carry
///   whatever the registry returns.
///
/// Once persisted, `id` is stable. Every other field may drift from the
/// registry and is refreshed on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub spiffe_id: SpiffeId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SpiffeId>,

    #[serde(default)]
    pub selectors: SelectorSet,
}

impl Entry {
    /// Create a desired entry for a SPIFFE ID
    pub fn new(spiffe_id: SpiffeId) -> Self {
        Self {
            id: None,
            spiffe_id,
            parent_id: None,
            selectors: SelectorSet::new(),
        }
    }

    /// Set the entry id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the parent ID
    pub fn with_parent(mut self, parent_id: SpiffeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Replace the selector set
    pub fn with_selectors(mut self, selectors: SelectorSet) -> Self {
        self.selectors = selectors;
        self
    }

    /// Add one selector
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selectors.insert(selector);
        self
    }

    /// The id, treating an empty string as unassigned
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether the registry has assigned (or confirmed) an id
    pub fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spiffe(path: &str) -> SpiffeId {
        SpiffeId::new("example.org", path).unwrap()
    }

    #[test]
    fn test_desired_entry() {
        let entry = Entry::new(spiffe("/svc"))
            .with_parent(spiffe("/path"))
            .with_selector("unix:uid:501".parse().unwrap());

        assert!(!entry.is_persisted());
        assert_eq!(entry.parent_id, Some(spiffe("/path")));
        assert_eq!(entry.selectors.len(), 1);
    }

    #[test]
    fn test_empty_id_is_unassigned() {
        let entry = Entry::new(spiffe("/svc")).with_id("");
        assert_eq!(entry.id(), None);
        assert!(!entry.is_persisted());

        let entry = entry.with_id("abc-123");
        assert_eq!(entry.id(), Some("abc-123"));
    }
}

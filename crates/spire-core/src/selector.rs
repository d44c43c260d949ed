//! Attestation selectors

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// A `(type, value)` attestation criterion, e.g. `unix:uid:501`
///
/// `type` names the attestor plugin and may not be empty or contain `:`.
/// `value` is attestor specific and opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSelector")]
pub struct Selector {
    #[serde(rename = "type")]
    selector_type: String,
    value: String,
}

#[derive(Deserialize)]
struct RawSelector {
    #[serde(rename = "type")]
    selector_type: String,
    value: String,
}

impl TryFrom<RawSelector> for Selector {
    type Error = CoreError;

    fn try_from(raw: RawSelector) -> Result<Self> {
        Selector::new(raw.selector_type, raw.value)
    }
}

impl Selector {
    /// Create a selector
    pub fn new(selector_type: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let selector_type = selector_type.into();
        let value = value.into();

        if selector_type.is_empty() || selector_type.contains(':') {
            return Err(CoreError::InvalidSelector(format!("{}:{}", selector_type, value)));
        }

        Ok(Self {
            selector_type,
            value,
        })
    }

    /// Attestor plugin name
    pub fn selector_type(&self) -> &str {
        &self.selector_type
    }

    /// Attestor specific value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.selector_type, self.value)
    }
}

/// Parses `type:value`, splitting on the first colon only.
impl FromStr for Selector {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let (selector_type, value) = s
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidSelector(s.to_string()))?;
        Self::new(selector_type, value)
    }
}

/// An unordered set of selectors
///
/// Equality is set equality. Iteration is sorted, so two sets holding the
/// same selectors always iterate identically regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorSet(BTreeSet<Selector>);

impl SelectorSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a selector, returning false if it was already present
    pub fn insert(&mut self, selector: Selector) -> bool {
        self.0.insert(selector)
    }

    /// Check membership
    pub fn contains(&self, selector: &Selector) -> bool {
        self.0.contains(selector)
    }

    /// Number of distinct selectors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate selectors in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.0.iter()
    }

    /// Parse a list of `type:value` strings
    pub fn parse_all<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        items.into_iter().map(|s| s.as_ref().parse()).collect()
    }
}

impl FromIterator<Selector> for SelectorSet {
    fn from_iter<T: IntoIterator<Item = Selector>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SelectorSet {
    type Item = Selector;
    type IntoIter = std::collections::btree_set::IntoIter<Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SelectorSet {
    type Item = &'a Selector;
    type IntoIter = std::collections::btree_set::Iter<'a, Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for SelectorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for selector in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}", selector)?;
            first = false;
        }
        Ok(())
    }
}

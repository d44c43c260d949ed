//! SPIFFE ID value type

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

const SCHEME: &str = "spiffe://";

/// A workload identity: trust domain plus hierarchical path
///
/// Equality is structural over both fields. Values are immutable once
/// constructed; every constructor validates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSpiffeId")]
pub struct SpiffeId {
    trust_domain: String,
    path: String,
}

#[derive(Deserialize)]
struct RawSpiffeId {
    trust_domain: String,
    #[serde(default)]
    path: String,
}

impl TryFrom<RawSpiffeId> for SpiffeId {
    type Error = CoreError;

    fn try_from(raw: RawSpiffeId) -> Result<Self> {
        SpiffeId::new(raw.trust_domain, raw.path)
    }
}

impl SpiffeId {
    /// Create a SPIFFE ID from its two components
    ///
    /// The trust domain must be non-empty and use only lowercase letters,
    /// digits, `.`, `-` and `_`. The path is either empty or starts with `/`,
    /// with no empty, `.` or `..` segments and no trailing slash.
    pub fn new(trust_domain: impl Into<String>, path: impl Into<String>) -> Result<Self> {
        let trust_domain = trust_domain.into();
        let path = path.into();
        validate_trust_domain(&trust_domain)?;
        validate_path(&path)?;
        Ok(Self { trust_domain, path })
    }

    /// The trust domain (authority) component
    pub fn trust_domain(&self) -> &str {
        &self.trust_domain
    }

    /// The path component, possibly empty
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this ID names the trust domain itself
    pub fn is_trust_domain_id(&self) -> bool {
        self.path.is_empty()
    }

    /// Return a copy with a different path in the same trust domain
    pub fn with_path(&self, path: impl Into<String>) -> Result<Self> {
        Self::new(self.trust_domain.clone(), path)
    }
}

fn validate_trust_domain(trust_domain: &str) -> Result<()> {
    let valid = !trust_domain.is_empty()
        && trust_domain
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidTrustDomain(trust_domain.to_string()))
    }
}

fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Ok(());
    }

    let invalid = |reason| CoreError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    let Some(rest) = path.strip_prefix('/') else {
        return Err(invalid("must start with '/'"));
    };

    for segment in rest.split('/') {
        match segment {
            "" => return Err(invalid("empty segment or trailing '/'")),
            "." | ".." => return Err(invalid("dot segment")),
            _ => {}
        }
    }

    Ok(())
}

impl fmt::Display for SpiffeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", SCHEME, self.trust_domain, self.path)
    }
}

impl FromStr for SpiffeId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| CoreError::InvalidSpiffeId(s.to_string()))?;

        let (trust_domain, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        Self::new(trust_domain, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spiffe_id_components() {
        let id = SpiffeId::new("example.org", "/some/service").unwrap();

        assert_eq!(id.trust_domain(), "example.org");
        assert_eq!(id.path(), "/some/service");
        assert!(!id.is_trust_domain_id());
        assert_eq!(id.to_string(), "spiffe://example.org/some/service");
    }

    #[test]
    fn test_structural_equality() {
        let a = SpiffeId::new("example.org", "/svc").unwrap();
        let b = SpiffeId::new("example.org", "/svc").unwrap();
        let c = SpiffeId::new("example.org", "/svc2").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_trust_domain_only() {
        let id: SpiffeId = "spiffe://example.org".parse().unwrap();
        assert!(id.is_trust_domain_id());
        assert_eq!(id.path(), "");
    }

    #[test]
    fn test_invalid_trust_domain() {
        assert!(matches!(
            SpiffeId::new("", "/svc"),
            Err(CoreError::InvalidTrustDomain(_))
        ));
        assert!(matches!(
            SpiffeId::new("Example.org", "/svc"),
            Err(CoreError::InvalidTrustDomain(_))
        ));
    }

    #[test]
    fn test_invalid_paths() {
        for path in ["svc", "/svc/", "//svc", "/a/../b", "/./a"] {
            assert!(
                matches!(SpiffeId::new("example.org", path), Err(CoreError::InvalidPath { .. })),
                "path {path:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(matches!(
            "https://example.org/svc".parse::<SpiffeId>(),
            Err(CoreError::InvalidSpiffeId(_))
        ));
    }

    #[test]
    fn test_with_path() {
        let id = SpiffeId::new("example.org", "/svc").unwrap();
        let moved = id.with_path("/svc2").unwrap();

        assert_eq!(moved.trust_domain(), "example.org");
        assert_eq!(moved.path(), "/svc2");
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: SpiffeId =
            serde_json::from_str(r#"{"trust_domain":"example.org","path":"/svc"}"#).unwrap();
        assert_eq!(ok.path(), "/svc");

        let bad = serde_json::from_str::<SpiffeId>(r#"{"trust_domain":"","path":"/svc"}"#);
        assert!(bad.is_err());
    }
}

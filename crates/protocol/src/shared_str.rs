use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An immutable, reference-counted string.
///
/// Band ids and style classes are emitted into every render pass; cloning
/// one is a refcount bump rather than a fresh allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedStr(Arc<str>);

impl SharedStr {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SharedStr {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SharedStr {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl std::ops::Deref for SharedStr {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedStr {
    fn from(s: &str) -> Self {
        SharedStr(Arc::from(s))
    }
}

impl From<String> for SharedStr {
    fn from(s: String) -> Self {
        SharedStr(Arc::from(s))
    }
}

impl std::fmt::Display for SharedStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Hand-rolled so serde's `rc` feature is not needed.
impl Serialize for SharedStr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SharedStr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SharedStr::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_with_str() {
        let s = SharedStr::from("band gneg");
        assert_eq!(s, "band gneg");
        assert_eq!(s.as_str(), "band gneg");
    }

    #[test]
    fn clones_share_one_allocation() {
        let a = SharedStr::from(String::from("q21.1"));
        let b = a.clone();
        assert!(std::ptr::eq(a.as_str(), b.as_str()));
        assert_eq!(b.len(), 5);
    }

    #[test]
    fn serializes_as_plain_string() {
        let s = SharedStr::from("p11.2");
        let json = serde_json::to_string(&s).unwrap_or_default();
        assert_eq!(json, "\"p11.2\"");
        let back: SharedStr = serde_json::from_str("\"with \\\"escape\\\"\"")
            .unwrap_or_else(|_| SharedStr::from(""));
        assert_eq!(back, "with \"escape\"");
    }
}

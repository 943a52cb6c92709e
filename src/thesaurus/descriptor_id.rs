use core::fmt::Debug;
use std::borrow::Borrow;
use std::fmt::Display;

/// The unique identifier of a [`ThesaurusNode`](crate::ThesaurusNode)
///
/// For regular MeSH descriptors this is the descriptor UI, e.g. `D000001`.
/// Synthetic nodes use their category code (`C`, `D`, ...) or the
/// generic root id [`GENERIC_ROOT_ID`](crate::GENERIC_ROOT_ID).
#[derive(Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DescriptorId {
    inner: String,
}

impl DescriptorId {
    /// Returns the id as string slice
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for DescriptorId {
    fn from(s: &str) -> Self {
        DescriptorId {
            inner: s.to_string(),
        }
    }
}

impl From<String> for DescriptorId {
    fn from(inner: String) -> Self {
        DescriptorId { inner }
    }
}

impl Borrow<str> for DescriptorId {
    fn borrow(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for DescriptorId {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Debug for DescriptorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DescriptorId({})", self.inner)
    }
}

impl Display for DescriptorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for DescriptorId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for DescriptorId {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

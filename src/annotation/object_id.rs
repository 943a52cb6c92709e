use std::cmp::Ordering;
use std::fmt::{Debug, Display};

/// A unique identifier of an annotated object, usually an OMIM MIM number
///
/// Objects are ordered numerically when both ids consist only of digits.
/// All-digit ids sort before any other id, which are ordered
/// lexicographically.
///
/// # Examples
///
/// ```
/// use meshsim::ObjectId;
///
/// let mut ids: Vec<ObjectId> = ["612460", "99", "PS1", "100100"]
///     .into_iter()
///     .map(ObjectId::from)
///     .collect();
/// ids.sort();
/// let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
/// assert_eq!(ids, vec!["99", "100100", "612460", "PS1"]);
/// ```
#[derive(Clone, Default, Hash, PartialEq, Eq)]
pub struct ObjectId {
    inner: String,
}

impl ObjectId {
    /// Returns the id as string slice
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    fn is_numeric(&self) -> bool {
        !self.inner.is_empty() && self.inner.bytes().all(|b| b.is_ascii_digit())
    }
}

impl Ord for ObjectId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_numeric(), other.is_numeric()) {
            (true, true) => {
                let a = self.inner.trim_start_matches('0');
                let b = other.inner.trim_start_matches('0');
                a.len()
                    .cmp(&b.len())
                    .then_with(|| a.cmp(b))
                    .then_with(|| self.inner.cmp(&other.inner))
            }
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.inner.cmp(&other.inner),
        }
    }
}

impl PartialOrd for ObjectId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        ObjectId {
            inner: s.to_string(),
        }
    }
}

impl From<String> for ObjectId {
    fn from(inner: String) -> Self {
        ObjectId { inner }
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.inner)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for ObjectId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for ObjectId {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

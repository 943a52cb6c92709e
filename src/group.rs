//! A sorted set of arena or matrix indices
use std::ops::{BitAnd, BitOr};

/// A set of indices, kept sorted and unique
///
/// The group is used for parent/child relations inside the
/// [`Thesaurus`](crate::Thesaurus) arena and for the ancestor and
/// annotation sets of the similarity [`Universe`](crate::Universe).
/// Set operations merge the sorted vectors in linear time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexGroup {
    ids: Vec<usize>,
}

impl IndexGroup {
    /// Constructs a new, empty [`IndexGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty [`IndexGroup`] with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Returns `true` if the group contains no indices
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the number of indices in the group
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Adds an index to the group
    ///
    /// Returns whether the index was newly inserted.
    pub fn insert(&mut self, id: usize) -> bool {
        match self.ids.binary_search(&id) {
            Ok(_) => false,
            Err(idx) => {
                self.ids.insert(idx, id);
                true
            }
        }
    }

    /// Returns `true` if the group contains the index
    pub fn contains(&self, id: usize) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Returns an iterator of the indices in ascending order
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, usize>> {
        self.ids.iter().copied()
    }

    /// Returns the indices as sorted slice
    pub fn as_slice(&self) -> &[usize] {
        &self.ids
    }

    /// Returns the number of indices present in both groups
    ///
    /// Same as `(a & b).len()`, without allocating
    pub fn intersection_len(&self, other: &IndexGroup) -> usize {
        let mut count = 0;
        merge(&self.ids, &other.ids, |_, in_self, in_other| {
            if in_self && in_other {
                count += 1;
            }
        });
        count
    }
}

/// Walks two sorted slices in lockstep and reports every distinct value
/// together with its membership in `a` and `b`
fn merge<F: FnMut(usize, bool, bool)>(a: &[usize], b: &[usize], mut f: F) {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                f(a[i], true, false);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                f(b[j], false, true);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                f(a[i], true, true);
                i += 1;
                j += 1;
            }
        }
    }
    for &id in &a[i..] {
        f(id, true, false);
    }
    for &id in &b[j..] {
        f(id, false, true);
    }
}

impl From<Vec<usize>> for IndexGroup {
    fn from(mut ids: Vec<usize>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }
}

impl FromIterator<usize> for IndexGroup {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        IndexGroup::from(iter.into_iter().collect::<Vec<usize>>())
    }
}

impl<'a> IntoIterator for &'a IndexGroup {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl BitOr for &IndexGroup {
    type Output = IndexGroup;

    fn bitor(self, rhs: &IndexGroup) -> IndexGroup {
        let mut group = IndexGroup::with_capacity(self.len() + rhs.len());
        merge(&self.ids, &rhs.ids, |id, _, _| group.ids.push(id));
        group
    }
}

impl BitAnd for &IndexGroup {
    type Output = IndexGroup;

    fn bitand(self, rhs: &IndexGroup) -> IndexGroup {
        let mut group = IndexGroup::with_capacity(self.len().min(rhs.len()));
        merge(&self.ids, &rhs.ids, |id, in_self, in_rhs| {
            if in_self && in_rhs {
                group.ids.push(id);
            }
        });
        group
    }
}

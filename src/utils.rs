//! Utility structs and methods

/// Iterator of all index pairs `(i, j)` with `i <= j < n`
///
/// The upper triangle of a square matrix, including the diagonal.
/// Used to compute each cell of a symmetric matrix exactly once.
///
/// # Examples
/// ```
/// use meshsim::utils::TrianglePairs;
///
/// let mut pairs = TrianglePairs::new(3);
/// assert_eq!(pairs.next(), Some((0, 0)));
/// assert_eq!(pairs.next(), Some((0, 1)));
/// assert_eq!(pairs.next(), Some((0, 2)));
/// assert_eq!(pairs.next(), Some((1, 1)));
/// assert_eq!(pairs.next(), Some((1, 2)));
/// assert_eq!(pairs.next(), Some((2, 2)));
/// assert!(pairs.next().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct TrianglePairs {
    n: usize,
    idx1: usize,
    idx2: usize,
}

impl TrianglePairs {
    /// Creates a new iterator for a square matrix of size `n`
    pub fn new(n: usize) -> Self {
        Self {
            n,
            idx1: 0,
            idx2: 0,
        }
    }
}

impl Iterator for TrianglePairs {
    type Item = (usize, usize);
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx1 >= self.n {
            return None;
        }
        let pair = (self.idx1, self.idx2);
        self.idx2 += 1;
        if self.idx2 == self.n {
            self.idx1 += 1;
            self.idx2 = self.idx1;
        }
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.idx1 >= self.n {
            return (0, Some(0));
        }
        let rows_left = self.n - self.idx1 - 1;
        let remaining = (self.n - self.idx2) + rows_left * (rows_left + 1) / 2;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TrianglePairs {}

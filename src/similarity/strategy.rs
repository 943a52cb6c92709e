use std::fmt::Display;
use std::str::FromStr;

use ndarray::{ArrayView2, Axis};
use statrs::statistics::{Data, Median, Statistics};

use crate::MeshError;

/// Reduces a descriptor-by-descriptor submatrix into a single
/// object-to-object similarity score
///
/// The rows of the submatrix are the direct annotations of the first
/// object, the columns the direct annotations of the second object.
/// An empty submatrix always yields `0`.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use meshsim::SelectionStrategy;
///
/// let m = array![[1.0, 0.0], [0.5, 0.5]];
/// assert_eq!(SelectionStrategy::Max.select(m.view()), 1.0);
/// assert_eq!(SelectionStrategy::Avg.select(m.view()), 0.5);
/// assert_eq!(SelectionStrategy::Med.select(m.view()), 0.5);
/// // mean of [1.0, 0.5] and [1.0, 0.5]
/// assert_eq!(SelectionStrategy::Alfonso.select(m.view()), 0.75);
///
/// let strategy: SelectionStrategy = "alfonso".parse().unwrap();
/// assert_eq!(strategy, SelectionStrategy::Alfonso);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionStrategy {
    /// Maximum of all cells
    #[default]
    Max,
    /// Mean of all cells
    Avg,
    /// Median of all cells
    Med,
    /// Mean of the row maxima and the column maxima, taken together
    Alfonso,
}

impl SelectionStrategy {
    /// Calculates the score of the submatrix
    pub fn select(&self, m: ArrayView2<f64>) -> f64 {
        if m.is_empty() {
            return 0.0;
        }
        match self {
            SelectionStrategy::Max => Statistics::max(m.iter()),
            SelectionStrategy::Avg => m.iter().mean(),
            SelectionStrategy::Med => Data::new(m.iter().copied().collect::<Vec<f64>>()).median(),
            SelectionStrategy::Alfonso => {
                let row_maxes = m.axis_iter(Axis(0)).map(|row| Statistics::max(row.iter()));
                let col_maxes = m.axis_iter(Axis(1)).map(|col| Statistics::max(col.iter()));
                row_maxes.chain(col_maxes).collect::<Vec<f64>>().mean()
            }
        }
    }
}

impl FromStr for SelectionStrategy {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MAX" => Ok(SelectionStrategy::Max),
            "AVG" => Ok(SelectionStrategy::Avg),
            "MED" => Ok(SelectionStrategy::Med),
            "ALFONSO" => Ok(SelectionStrategy::Alfonso),
            _ => Err(MeshError::UnknownStrategy(s.to_string())),
        }
    }
}

impl Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SelectionStrategy::Max => "MAX",
            SelectionStrategy::Avg => "AVG",
            SelectionStrategy::Med => "MED",
            SelectionStrategy::Alfonso => "ALFONSO",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn empty_submatrix() {
        let m = Array2::<f64>::zeros((0, 3));
        for strategy in [
            SelectionStrategy::Max,
            SelectionStrategy::Avg,
            SelectionStrategy::Med,
            SelectionStrategy::Alfonso,
        ] {
            assert_eq!(strategy.select(m.view()), 0.0);
        }
    }

    #[test]
    fn median_even() {
        let m = array![[4.0, 1.0], [3.0, 2.0]];
        assert!((SelectionStrategy::Med.select(m.view()) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn alfonso_rectangular() {
        let m = array![[0.2, 0.9, 0.1]];
        // row maxes: [0.9], col maxes: [0.2, 0.9, 0.1]
        let expected = (0.9 + 0.2 + 0.9 + 0.1) / 4.0;
        assert!((SelectionStrategy::Alfonso.select(m.view()) - expected).abs() < 1e-12);
    }

    #[test]
    fn unknown_strategy() {
        assert!(matches!(
            "min".parse::<SelectionStrategy>(),
            Err(MeshError::UnknownStrategy(name)) if name == "min"
        ));
        assert_eq!("Med".parse::<SelectionStrategy>().unwrap().to_string(), "MED");
    }
}

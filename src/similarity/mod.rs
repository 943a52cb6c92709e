//! Methods to calculate the similarity between two descriptors or
//! between two annotated objects
//!
//! Two families of measures exist:
//!
//! - **Termwise** measures ([`termwise`]) score a pair of descriptors based on
//!   the information content of their most informative common ancestor.
//!   An object-to-object score is then obtained by reducing the submatrix
//!   of the direct annotations with a [`SelectionStrategy`].
//! - **Objectwise** measures ([`objectwise`]) directly compare the
//!   annotation sets of two objects, either the propagated or the direct
//!   annotations.
//!
//! [`SemanticSimilarity`] runs either family over a whole [`Universe`].
use std::fmt::Display;
use std::str::FromStr;

use ndarray::Array2;

use crate::group::IndexGroup;
use crate::{MeshError, MeshResult};

mod engine;
pub mod objectwise;
mod strategy;
pub mod termwise;
mod universe;

pub use engine::{
    DescriptorSimilarity, MeasureResult, ObjectSimilarity, PairDistribution, Provenance,
    SemanticSimilarity,
};
pub use strategy::SelectionStrategy;
pub use universe::Universe;

use objectwise::{Dice, Jaccard, NumCommon, Overlap, SimGic, SimUi};
use termwise::{Jiang, Lin, Resnik, Schlicker};

/// Trait for similarity score calculation between two descriptors
///
/// Descriptors are addressed by their index in the [`Universe`].
pub trait TermwiseSimilarity: Sync {
    /// Returns the index of the selected common ancestor and the
    /// similarity score of the descriptors `d1` and `d2`
    ///
    /// # Errors
    ///
    /// [`MeshError::NoCommonAncestor`] if the descriptors do not share
    /// an annotated ancestor
    fn pairwise_similarity(
        &self,
        universe: &Universe,
        d1: usize,
        d2: usize,
    ) -> MeshResult<(usize, f64)>;

    /// Post-processes the complete descriptor-by-descriptor matrix
    ///
    /// Called exactly once after all cells are calculated. Does nothing
    /// by default.
    fn normalize(&self, _matrix: &mut Array2<f64>) {}
}

/// Trait for similarity score calculation between two annotated objects
///
/// The annotation sets are index groups of descriptors of the [`Universe`].
pub trait ObjectwiseSimilarity: Sync {
    /// Calculates the similarity of two annotation sets
    ///
    /// # Errors
    ///
    /// [`MeshError::DegenerateStatistic`] if the score is not defined,
    /// e.g. both sets are empty
    fn similarity(&self, universe: &Universe, a: &IndexGroup, b: &IndexGroup) -> MeshResult<f64>;

    /// Returns `true` if the measure compares the direct annotations of
    /// the objects instead of the propagated ones
    fn uses_direct_annotations(&self) -> bool {
        false
    }
}

/// The available termwise measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermMeasure {
    /// See [`Resnik`]
    Resnik,
    /// See [`Lin`]
    Lin,
    /// See [`Jiang`]
    Jiang,
    /// See [`Schlicker`]
    Schlicker,
}

impl TermwiseSimilarity for TermMeasure {
    fn pairwise_similarity(
        &self,
        universe: &Universe,
        d1: usize,
        d2: usize,
    ) -> MeshResult<(usize, f64)> {
        match self {
            TermMeasure::Resnik => Resnik.pairwise_similarity(universe, d1, d2),
            TermMeasure::Lin => Lin.pairwise_similarity(universe, d1, d2),
            TermMeasure::Jiang => Jiang.pairwise_similarity(universe, d1, d2),
            TermMeasure::Schlicker => Schlicker.pairwise_similarity(universe, d1, d2),
        }
    }

    fn normalize(&self, matrix: &mut Array2<f64>) {
        match self {
            TermMeasure::Resnik => Resnik.normalize(matrix),
            TermMeasure::Lin => Lin.normalize(matrix),
            TermMeasure::Jiang => Jiang.normalize(matrix),
            TermMeasure::Schlicker => Schlicker.normalize(matrix),
        }
    }
}

/// The available objectwise measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectMeasure {
    /// See [`SimUi`]
    SimUi,
    /// See [`SimGic`]
    SimGic,
    /// See [`Jaccard`]
    Jaccard,
    /// See [`Dice`]
    Dice,
    /// See [`Overlap`]
    Overlap,
    /// See [`NumCommon`]
    NumCommon,
}

impl ObjectwiseSimilarity for ObjectMeasure {
    fn similarity(&self, universe: &Universe, a: &IndexGroup, b: &IndexGroup) -> MeshResult<f64> {
        match self {
            ObjectMeasure::SimUi => SimUi.similarity(universe, a, b),
            ObjectMeasure::SimGic => SimGic.similarity(universe, a, b),
            ObjectMeasure::Jaccard => Jaccard.similarity(universe, a, b),
            ObjectMeasure::Dice => Dice.similarity(universe, a, b),
            ObjectMeasure::Overlap => Overlap.similarity(universe, a, b),
            ObjectMeasure::NumCommon => NumCommon.similarity(universe, a, b),
        }
    }

    fn uses_direct_annotations(&self) -> bool {
        match self {
            ObjectMeasure::SimUi => SimUi.uses_direct_annotations(),
            ObjectMeasure::SimGic => SimGic.uses_direct_annotations(),
            ObjectMeasure::Jaccard => Jaccard.uses_direct_annotations(),
            ObjectMeasure::Dice => Dice.uses_direct_annotations(),
            ObjectMeasure::Overlap => Overlap.uses_direct_annotations(),
            ObjectMeasure::NumCommon => NumCommon.uses_direct_annotations(),
        }
    }
}

/// A similarity measure, selected by name
///
/// Termwise measures carry the [`SelectionStrategy`] that reduces the
/// descriptor scores of two objects. The strategy defaults to
/// [`SelectionStrategy::Max`] and can be appended to the name,
/// separated by a dash.
///
/// # Examples
///
/// ```
/// use meshsim::Measure;
/// use meshsim::SelectionStrategy;
/// use meshsim::similarity::{ObjectMeasure, TermMeasure};
///
/// let measure: Measure = "lin".parse().unwrap();
/// assert_eq!(measure, Measure::Termwise(TermMeasure::Lin, SelectionStrategy::Max));
/// assert_eq!(measure.name(), "LIN");
///
/// let measure: Measure = "Jiang-alfonso".parse().unwrap();
/// assert_eq!(measure.to_string(), "JIANG-ALFONSO");
///
/// let measure: Measure = "SIMGIC".parse().unwrap();
/// assert_eq!(measure, Measure::Objectwise(ObjectMeasure::SimGic));
///
/// assert!("cosine".parse::<Measure>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    /// A descriptor measure with its selection strategy
    Termwise(TermMeasure, SelectionStrategy),
    /// A measure on the annotation sets of objects
    Objectwise(ObjectMeasure),
}

impl Measure {
    /// The upper-case name of the measure, without the strategy
    pub fn name(&self) -> &'static str {
        match self {
            Measure::Termwise(TermMeasure::Resnik, _) => "RESNIK",
            Measure::Termwise(TermMeasure::Lin, _) => "LIN",
            Measure::Termwise(TermMeasure::Jiang, _) => "JIANG",
            Measure::Termwise(TermMeasure::Schlicker, _) => "SCHLICKER",
            Measure::Objectwise(ObjectMeasure::SimUi) => "SIMUI",
            Measure::Objectwise(ObjectMeasure::SimGic) => "SIMGIC",
            Measure::Objectwise(ObjectMeasure::Jaccard) => "JACCARD",
            Measure::Objectwise(ObjectMeasure::Dice) => "DICE",
            Measure::Objectwise(ObjectMeasure::Overlap) => "OVERLAP",
            Measure::Objectwise(ObjectMeasure::NumCommon) => "NUM_COMMON",
        }
    }

    /// Returns `true` for Resnik, Lin, Jiang and Schlicker
    pub fn is_termwise(&self) -> bool {
        matches!(self, Measure::Termwise(..))
    }

    /// Replaces the selection strategy of a termwise measure
    ///
    /// Objectwise measures are returned unchanged.
    #[must_use]
    pub fn with_strategy(self, strategy: SelectionStrategy) -> Self {
        match self {
            Measure::Termwise(measure, _) => Measure::Termwise(measure, strategy),
            other => other,
        }
    }
}

impl FromStr for Measure {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, strategy) = match s.split_once('-') {
            Some((name, strategy)) => (name, Some(strategy.parse::<SelectionStrategy>()?)),
            None => (s, None),
        };
        let strategy = strategy.unwrap_or_default();
        let measure = match name.to_uppercase().as_str() {
            "RESNIK" => Measure::Termwise(TermMeasure::Resnik, strategy),
            "LIN" => Measure::Termwise(TermMeasure::Lin, strategy),
            "JIANG" => Measure::Termwise(TermMeasure::Jiang, strategy),
            "SCHLICKER" => Measure::Termwise(TermMeasure::Schlicker, strategy),
            "SIMUI" => Measure::Objectwise(ObjectMeasure::SimUi),
            "SIMGIC" => Measure::Objectwise(ObjectMeasure::SimGic),
            "JACCARD" => Measure::Objectwise(ObjectMeasure::Jaccard),
            "DICE" => Measure::Objectwise(ObjectMeasure::Dice),
            "OVERLAP" => Measure::Objectwise(ObjectMeasure::Overlap),
            "NUM_COMMON" => Measure::Objectwise(ObjectMeasure::NumCommon),
            _ => return Err(MeshError::UnknownMeasure(s.to_string())),
        };
        Ok(measure)
    }
}

impl Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Measure::Termwise(_, strategy) => write!(f, "{}-{}", self.name(), strategy),
            Measure::Objectwise(_) => write!(f, "{}", self.name()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_all_names() {
        for name in [
            "RESNIK",
            "LIN",
            "JIANG",
            "SCHLICKER",
            "SIMUI",
            "SIMGIC",
            "JACCARD",
            "DICE",
            "OVERLAP",
            "NUM_COMMON",
        ] {
            let measure: Measure = name.to_lowercase().parse().unwrap();
            assert_eq!(measure.name(), name);
        }
    }

    #[test]
    fn display_round_trip() {
        let measure = Measure::Termwise(TermMeasure::Schlicker, SelectionStrategy::Med);
        assert_eq!(measure.to_string().parse::<Measure>().unwrap(), measure);
        let measure = Measure::Objectwise(ObjectMeasure::SimUi);
        assert_eq!(measure.to_string(), "SIMUI");
    }

    #[test]
    fn set_overlaps_use_direct_annotations() {
        for name in ["jaccard", "dice", "overlap", "num_common"] {
            match name.parse::<Measure>().unwrap() {
                Measure::Objectwise(measure) => assert!(measure.uses_direct_annotations()),
                other => panic!("{} is not objectwise", other),
            }
        }
        assert!(!ObjectMeasure::SimUi.uses_direct_annotations());
    }

    #[test]
    fn unknown_strategy_suffix() {
        assert!(matches!(
            "LIN-MIN".parse::<Measure>(),
            Err(MeshError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn strategy_replacement() {
        let measure: Measure = "resnik".parse().unwrap();
        assert!(measure.is_termwise());
        assert_eq!(
            measure.with_strategy(SelectionStrategy::Avg),
            Measure::Termwise(TermMeasure::Resnik, SelectionStrategy::Avg)
        );
        let measure = Measure::Objectwise(ObjectMeasure::SimGic);
        assert_eq!(measure.with_strategy(SelectionStrategy::Avg), measure);
    }
}

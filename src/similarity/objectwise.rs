//! Similarity measures between two objects, based on their annotation sets
//!
//! [`SimUi`] and [`SimGic`] compare the propagated annotations. The plain
//! set overlaps [`Jaccard`], [`Dice`], [`Overlap`] and [`NumCommon`] only
//! count shared direct annotations and score `0` for empty sets.
use crate::group::IndexGroup;
use crate::similarity::{ObjectwiseSimilarity, Universe};
use crate::{count_to_f64, MeshError, MeshResult};

/// Jaccard index of the propagated annotations
///
/// `|A ∩ B| / |A ∪ B|`
#[derive(Debug, Default, Clone, Copy)]
pub struct SimUi;

impl ObjectwiseSimilarity for SimUi {
    fn similarity(&self, _universe: &Universe, a: &IndexGroup, b: &IndexGroup) -> MeshResult<f64> {
        let intersection = a.intersection_len(b);
        let union = a.len() + b.len() - intersection;
        if union == 0 {
            return Err(MeshError::DegenerateStatistic(
                "SimUI of two empty annotation sets".to_string(),
            ));
        }
        Ok(count_to_f64(intersection) / count_to_f64(union))
    }
}

/// Weighted Jaccard index of the propagated annotations
///
/// Every descriptor is weighted by its number of annotated objects:
/// `Σ count(A ∩ B) / Σ count(A ∪ B)`
#[derive(Debug, Default, Clone, Copy)]
pub struct SimGic;

impl ObjectwiseSimilarity for SimGic {
    fn similarity(&self, universe: &Universe, a: &IndexGroup, b: &IndexGroup) -> MeshResult<f64> {
        let weight = |group: &IndexGroup| -> usize { group.iter().map(|d| universe.count(d)).sum() };
        let union = weight(&(a | b));
        if union == 0 {
            return Err(MeshError::DegenerateStatistic(
                "SimGIC of two empty annotation sets".to_string(),
            ));
        }
        Ok(count_to_f64(weight(&(a & b))) / count_to_f64(union))
    }
}

/// Jaccard index of the direct annotations
///
/// `|A ∩ B| / |A ∪ B|`
#[derive(Debug, Default, Clone, Copy)]
pub struct Jaccard;

impl ObjectwiseSimilarity for Jaccard {
    fn similarity(&self, _universe: &Universe, a: &IndexGroup, b: &IndexGroup) -> MeshResult<f64> {
        let intersection = a.intersection_len(b);
        Ok(ratio(intersection, a.len() + b.len() - intersection))
    }

    fn uses_direct_annotations(&self) -> bool {
        true
    }
}

/// Sørensen-Dice coefficient of the direct annotations
///
/// `2 |A ∩ B| / (|A| + |B|)`
#[derive(Debug, Default, Clone, Copy)]
pub struct Dice;

impl ObjectwiseSimilarity for Dice {
    fn similarity(&self, _universe: &Universe, a: &IndexGroup, b: &IndexGroup) -> MeshResult<f64> {
        Ok(ratio(2 * a.intersection_len(b), a.len() + b.len()))
    }

    fn uses_direct_annotations(&self) -> bool {
        true
    }
}

/// Overlap coefficient of the direct annotations
///
/// `|A ∩ B| / min(|A|, |B|)`
#[derive(Debug, Default, Clone, Copy)]
pub struct Overlap;

impl ObjectwiseSimilarity for Overlap {
    fn similarity(&self, _universe: &Universe, a: &IndexGroup, b: &IndexGroup) -> MeshResult<f64> {
        Ok(ratio(a.intersection_len(b), a.len().min(b.len())))
    }

    fn uses_direct_annotations(&self) -> bool {
        true
    }
}

/// Number of shared direct annotations
///
/// Not normalized, the score is `|A ∩ B|`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumCommon;

impl ObjectwiseSimilarity for NumCommon {
    fn similarity(&self, _universe: &Universe, a: &IndexGroup, b: &IndexGroup) -> MeshResult<f64> {
        Ok(count_to_f64(a.intersection_len(b)))
    }

    fn uses_direct_annotations(&self) -> bool {
        true
    }
}

/// `numerator / denominator`, or `0` if the denominator is `0`
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    count_to_f64(numerator) / count_to_f64(denominator)
}

//! Similarity measures between two descriptors
//!
//! All measures are based on the information content of the most
//! informative common ancestor, as selected by [`Resnik`].
use ndarray::Array2;
use statrs::statistics::Statistics;

use crate::similarity::{TermwiseSimilarity, Universe};
use crate::{MeshError, MeshResult};

/// Similarity score from Resnik
///
/// The information content of the common ancestor with the fewest
/// annotated objects. Ties are broken by the lowest descriptor id.
///
/// For a detailed description see [Resnik P, Proceedings of the 14th IJCAI, (1995)](https://www.ijcai.org/Proceedings/95-1/Papers/059.pdf)
#[derive(Debug, Default, Clone, Copy)]
pub struct Resnik;

impl Resnik {
    /// Returns the index of the most informative common ancestor and its
    /// information content
    ///
    /// # Errors
    ///
    /// [`MeshError::NoCommonAncestor`] if the descriptors have no annotated
    /// ancestor in common
    pub fn most_informative_ancestor(
        &self,
        universe: &Universe,
        d1: usize,
        d2: usize,
    ) -> MeshResult<(usize, f64)> {
        let common = universe.ancestors(d1) & universe.ancestors(d2);
        // indices are sorted by descriptor id, so the first minimum wins ties
        let selected = common
            .iter()
            .fold(None, |best: Option<usize>, idx| match best {
                Some(b) if universe.count(b) <= universe.count(idx) => Some(b),
                _ => Some(idx),
            })
            .ok_or_else(|| {
                MeshError::NoCommonAncestor(
                    universe.descriptor(d1).to_string(),
                    universe.descriptor(d2).to_string(),
                )
            })?;
        Ok((selected, universe.information_content(selected)))
    }
}

impl TermwiseSimilarity for Resnik {
    fn pairwise_similarity(
        &self,
        universe: &Universe,
        d1: usize,
        d2: usize,
    ) -> MeshResult<(usize, f64)> {
        self.most_informative_ancestor(universe, d1, d2)
    }
}

/// Similarity score from Lin
///
/// `-2 * resnik / (log10 p1 + log10 p2)`, or `0` if both descriptors
/// annotate every object.
///
/// For a detailed description see [Lin D, Proceedings of the 15th ICML, (1998)](https://dl.acm.org/doi/10.5555/645527.657297)
#[derive(Debug, Default, Clone, Copy)]
pub struct Lin;

impl Lin {
    fn from_resnik(universe: &Universe, d1: usize, d2: usize, resnik: f64) -> f64 {
        let denominator = universe.log_probability(d1) + universe.log_probability(d2);
        if denominator == 0.0 {
            return 0.0;
        }
        -2.0 * resnik / denominator
    }
}

impl TermwiseSimilarity for Lin {
    fn pairwise_similarity(
        &self,
        universe: &Universe,
        d1: usize,
        d2: usize,
    ) -> MeshResult<(usize, f64)> {
        let (ancestor, resnik) = Resnik.most_informative_ancestor(universe, d1, d2)?;
        Ok((ancestor, Lin::from_resnik(universe, d1, d2, resnik)))
    }
}

/// Similarity score from Jiang & Conrath
///
/// The raw distance `-2 * resnik - log10 p1 - log10 p2` is turned into a
/// similarity by normalizing the full matrix once: `1 - raw / max(raw)`.
///
/// For a detailed description see [Jiang J, Conrath D, ROCLING X, (1997)](https://aclanthology.org/O97-1002.pdf)
#[derive(Debug, Default, Clone, Copy)]
pub struct Jiang;

impl TermwiseSimilarity for Jiang {
    fn pairwise_similarity(
        &self,
        universe: &Universe,
        d1: usize,
        d2: usize,
    ) -> MeshResult<(usize, f64)> {
        let (ancestor, resnik) = Resnik.most_informative_ancestor(universe, d1, d2)?;
        let raw = -2.0 * resnik - universe.log_probability(d1) - universe.log_probability(d2);
        Ok((ancestor, raw))
    }

    fn normalize(&self, matrix: &mut Array2<f64>) {
        if matrix.is_empty() {
            return;
        }
        let max = Statistics::max(matrix.iter());
        if max == 0.0 {
            matrix.fill(1.0);
        } else {
            matrix.mapv_inplace(|raw| 1.0 - raw / max);
        }
    }
}

/// Similarity score from Schlicker
///
/// `lin * (1 - e^(-resnik))`
///
/// For a detailed description see [Schlicker A, et. al., BMC Bioinf (2006)](https://pubmed.ncbi.nlm.nih.gov/16776819/)
#[derive(Debug, Default, Clone, Copy)]
pub struct Schlicker;

impl TermwiseSimilarity for Schlicker {
    fn pairwise_similarity(
        &self,
        universe: &Universe,
        d1: usize,
        d2: usize,
    ) -> MeshResult<(usize, f64)> {
        let (ancestor, resnik) = Resnik.most_informative_ancestor(universe, d1, d2)?;
        let lin = Lin::from_resnik(universe, d1, d2, resnik);
        Ok((ancestor, lin * (1.0 - (-resnik).exp())))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures;
    use crate::{Annotation, Thesaurus};

    fn chain() -> Universe {
        let thesaurus = fixtures::chain();
        let annotation = fixtures::chain_annotation(&thesaurus);
        Universe::new(&thesaurus, &annotation).unwrap()
    }

    fn dag() -> Universe {
        let thesaurus = fixtures::dag();
        let annotation = fixtures::dag_annotation(&thesaurus);
        Universe::new(&thesaurus, &annotation).unwrap()
    }

    fn idx(universe: &Universe, id: &str) -> usize {
        universe.descriptor_index(id).unwrap()
    }

    #[test]
    fn resnik_picks_min_count_ancestor() {
        let universe = chain();
        let (l1, l2) = (idx(&universe, "L1"), idx(&universe, "L2"));
        let (ancestor, value) = Resnik.pairwise_similarity(&universe, l1, l2).unwrap();
        // A and R are both annotated by X and Y, A has the lower id
        assert_eq!(universe.descriptor(ancestor), "A");
        assert!(value.abs() < 1e-12);

        let (ancestor, value) = Resnik.pairwise_similarity(&universe, l1, l1).unwrap();
        assert_eq!(universe.descriptor(ancestor), "L1");
        assert!((value - 2f64.log10()).abs() < 1e-12);
    }

    #[test]
    fn resnik_multi_parent() {
        let universe = dag();
        let (d3, d4) = (idx(&universe, "D3"), idx(&universe, "D4"));
        // common ancestors: D1 (3), T1 (3), C (3), GEN (4)
        let (ancestor, value) = Resnik.pairwise_similarity(&universe, d3, d4).unwrap();
        assert_eq!(universe.descriptor(ancestor), "C");
        assert!((value - (4f64 / 3.0).log10()).abs() < 1e-12);
    }

    #[test]
    fn resnik_is_symmetric() {
        let universe = dag();
        for i in 0..universe.num_descriptors() {
            for j in 0..universe.num_descriptors() {
                let a = Resnik.pairwise_similarity(&universe, i, j).unwrap();
                let b = Resnik.pairwise_similarity(&universe, j, i).unwrap();
                assert_eq!(a.0, b.0);
                assert!((a.1 - b.1).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn no_common_ancestor() {
        let mut thesaurus = Thesaurus::default();
        thesaurus.add_node(crate::ThesaurusNode::new("P", "P", &[]));
        thesaurus.add_node(crate::ThesaurusNode::new("Q", "Q", &[]));
        let mut annotation = Annotation::default();
        annotation.annotate(&thesaurus, "1", "P").unwrap();
        annotation.annotate(&thesaurus, "2", "Q").unwrap();
        let universe = Universe::new(&thesaurus, &annotation).unwrap();

        let result = Lin.pairwise_similarity(&universe, 0, 1);
        assert!(matches!(
            result,
            Err(MeshError::NoCommonAncestor(a, b)) if a == "P" && b == "Q"
        ));
    }

    #[test]
    fn lin_with_full_probability_is_zero() {
        let universe = chain();
        let (a, r) = (idx(&universe, "A"), idx(&universe, "R"));
        let (_, value) = Lin.pairwise_similarity(&universe, a, r).unwrap();
        assert!(value.abs() < f64::EPSILON);
    }

    #[test]
    fn lin_self_similarity() {
        let universe = chain();
        let l1 = idx(&universe, "L1");
        let (_, value) = Lin.pairwise_similarity(&universe, l1, l1).unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn schlicker() {
        let universe = chain();
        let l1 = idx(&universe, "L1");
        let (_, value) = Schlicker.pairwise_similarity(&universe, l1, l1).unwrap();
        let ic = 2f64.log10();
        assert!((value - (1.0 - (-ic).exp())).abs() < 1e-12);
    }

    #[test]
    fn jiang_raw_and_normalized() {
        let universe = chain();
        let (l1, l2) = (idx(&universe, "L1"), idx(&universe, "L2"));
        let (_, raw) = Jiang.pairwise_similarity(&universe, l1, l2).unwrap();
        assert!((raw - 2.0 * 2f64.log10()).abs() < 1e-12);

        let mut m = Array2::from_shape_vec((2, 2), vec![0.0, raw, raw, 0.0]).unwrap();
        Jiang.normalize(&mut m);
        assert!((m[[0, 0]] - 1.0).abs() < 1e-12);
        assert!(m[[0, 1]].abs() < 1e-12);
    }

    #[test]
    fn jiang_zero_max() {
        let mut m = Array2::<f64>::zeros((3, 3));
        Jiang.normalize(&mut m);
        assert!(m.iter().all(|v| (*v - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn other_measures_do_not_normalize() {
        let mut m = Array2::from_shape_vec((1, 2), vec![0.5, 2.0]).unwrap();
        Lin.normalize(&mut m);
        Resnik.normalize(&mut m);
        Schlicker.normalize(&mut m);
        assert_eq!(m[[0, 1]], 2.0);
    }
}

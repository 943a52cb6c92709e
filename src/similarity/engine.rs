use ndarray::{Array2, Axis};
use rayon::prelude::*;
use statrs::statistics::{Data, Median, Statistics};
use tracing::{debug, warn};

use crate::similarity::{
    Measure, ObjectwiseSimilarity, SelectionStrategy, TermwiseSimilarity, Universe,
};
use crate::utils::TrianglePairs;
use crate::{Annotation, DescriptorId, MeshError, MeshResult, ObjectId, Thesaurus};

/// The common ancestor that was selected for a pair of descriptors
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    /// First descriptor of the pair
    pub descriptor1: DescriptorId,
    /// Second descriptor of the pair
    pub descriptor2: DescriptorId,
    /// The most informative common ancestor
    pub ancestor: DescriptorId,
    /// Final similarity score of the pair
    pub value: f64,
}

/// Summary statistics of all descriptor scores of two objects
///
/// Only recorded for object pairs where both objects have at least
/// one direct annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct PairDistribution {
    /// First object of the pair
    pub object1: ObjectId,
    /// Second object of the pair
    pub object2: ObjectId,
    /// Maximum score
    pub max: f64,
    /// Minimum score
    pub min: f64,
    /// Mean score
    pub mean: f64,
    /// Median score
    pub median: f64,
    /// Population standard deviation of the scores
    pub std_dev: f64,
}

impl PairDistribution {
    fn new(object1: &ObjectId, object2: &ObjectId, values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let max = Statistics::max(values.iter());
        let min = Statistics::min(values.iter());
        let mean = values.iter().mean();
        let std_dev = values.iter().population_std_dev();
        let median = Data::new(values).median();
        Some(Self {
            object1: object1.clone(),
            object2: object2.clone(),
            max,
            min,
            mean,
            median,
            std_dev,
        })
    }
}

/// Similarity scores of all pairs of annotated descriptors
#[derive(Debug, Clone)]
pub struct DescriptorSimilarity {
    matrix: Array2<f64>,
    provenance: Option<Vec<Provenance>>,
}

impl DescriptorSimilarity {
    pub(crate) fn new(matrix: Array2<f64>, provenance: Option<Vec<Provenance>>) -> Self {
        Self { matrix, provenance }
    }

    /// The symmetric descriptor-by-descriptor matrix, in [`Universe`] order
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// The selected common ancestor of every pair `i <= j`
    ///
    /// `None` if the matrix was restored from a cache.
    pub fn provenance(&self) -> Option<&[Provenance]> {
        self.provenance.as_deref()
    }
}

/// Similarity scores of all pairs of annotated objects
#[derive(Debug, Clone)]
pub struct ObjectSimilarity {
    matrix: Array2<f64>,
    objects: Vec<ObjectId>,
    degenerate: Vec<(usize, usize)>,
    distribution: Option<Vec<PairDistribution>>,
}

impl ObjectSimilarity {
    pub(crate) fn new(
        matrix: Array2<f64>,
        objects: Vec<ObjectId>,
        degenerate: Vec<(usize, usize)>,
        distribution: Option<Vec<PairDistribution>>,
    ) -> Self {
        Self {
            matrix,
            objects,
            degenerate,
            distribution,
        }
    }

    /// The symmetric object-by-object matrix
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// The objects in row/column order
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Cells `(i, j)` with `i <= j` whose score is not defined
    ///
    /// These cells hold `NaN`.
    pub fn degenerate(&self) -> &[(usize, usize)] {
        &self.degenerate
    }

    /// Score statistics of each object pair, only for termwise measures
    pub fn distribution(&self) -> Option<&[PairDistribution]> {
        self.distribution.as_deref()
    }

    /// The similarity of two objects
    pub fn get(&self, object1: &str, object2: &str) -> Option<f64> {
        let i = self.position(object1)?;
        let j = self.position(object2)?;
        Some(self.matrix[[i, j]])
    }

    /// Iterates all pairs `(o_i, o_j, score)` with `i <= j` and a non-zero
    /// score, in ascending object order
    ///
    /// Undefined scores are kept as `NaN`, see [`ObjectSimilarity::degenerate`].
    pub fn triples(&self) -> impl Iterator<Item = (&ObjectId, &ObjectId, f64)> + '_ {
        TrianglePairs::new(self.objects.len()).filter_map(|(i, j)| {
            let value = self.matrix[[i, j]];
            if value == 0.0 {
                None
            } else {
                Some((&self.objects[i], &self.objects[j], value))
            }
        })
    }

    fn position(&self, id: &str) -> Option<usize> {
        let id = ObjectId::from(id);
        self.objects.binary_search(&id).ok()
    }
}

/// The matrices of one similarity run
#[derive(Debug, Clone)]
pub struct MeasureResult {
    descriptors: Option<DescriptorSimilarity>,
    objects: ObjectSimilarity,
}

impl MeasureResult {
    pub(crate) fn new(descriptors: Option<DescriptorSimilarity>, objects: ObjectSimilarity) -> Self {
        Self {
            descriptors,
            objects,
        }
    }

    /// The descriptor matrix, only for termwise measures
    pub fn descriptors(&self) -> Option<&DescriptorSimilarity> {
        self.descriptors.as_ref()
    }

    /// The object matrix
    pub fn objects(&self) -> &ObjectSimilarity {
        &self.objects
    }

    /// Consumes the result and returns the object matrix
    pub fn into_objects(self) -> ObjectSimilarity {
        self.objects
    }
}

/// Calculates similarity matrices for all descriptors or objects
/// of an [`Annotation`]
///
/// # Examples
///
/// ```
/// use meshsim::{Annotation, Measure, SemanticSimilarity, Thesaurus, ThesaurusNode};
///
/// let mut thesaurus = Thesaurus::default();
/// for id in ["R", "A", "L1", "L2"] {
///     thesaurus.add_node(ThesaurusNode::new(id, id, &[]));
/// }
/// thesaurus.add_parent("R", "A").unwrap();
/// thesaurus.add_parent("A", "L1").unwrap();
/// thesaurus.add_parent("A", "L2").unwrap();
///
/// let mut annotation = Annotation::default();
/// annotation.annotate(&thesaurus, "X", "L1").unwrap();
/// annotation.annotate(&thesaurus, "Y", "L2").unwrap();
///
/// let engine = SemanticSimilarity::new(&thesaurus, &annotation).unwrap();
/// let result = engine.compute(&"simui".parse::<Measure>().unwrap()).unwrap();
/// assert_eq!(result.objects().get("X", "Y"), Some(0.5));
/// assert_eq!(result.objects().get("X", "X"), Some(1.0));
/// ```
#[derive(Debug, Clone)]
pub struct SemanticSimilarity {
    universe: Universe,
}

impl SemanticSimilarity {
    /// Indexes the annotation
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if an annotated descriptor is not part of
    /// the thesaurus
    pub fn new(thesaurus: &Thesaurus, annotation: &Annotation) -> MeshResult<Self> {
        Ok(Self::from_universe(Universe::new(thesaurus, annotation)?))
    }

    /// Uses an existing [`Universe`]
    pub fn from_universe(universe: Universe) -> Self {
        Self { universe }
    }

    /// The indexed descriptors and objects
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Calculates the similarity of every pair of annotated descriptors
    ///
    /// The upper triangle is calculated in parallel and mirrored, then the
    /// measure normalizes the full matrix once.
    ///
    /// # Errors
    ///
    /// [`MeshError::NoCommonAncestor`] if any two descriptors do not share
    /// an annotated ancestor
    pub fn per_descriptor<M: TermwiseSimilarity>(
        &self,
        measure: &M,
    ) -> MeshResult<DescriptorSimilarity> {
        let n = self.universe.num_descriptors();
        debug!("Calculating descriptor similarity of {} descriptors", n);
        let mut cells = TrianglePairs::new(n)
            .par_bridge()
            .map(|(i, j)| {
                measure
                    .pairwise_similarity(&self.universe, i, j)
                    .map(|(ancestor, value)| (i, j, ancestor, value))
            })
            .collect::<MeshResult<Vec<(usize, usize, usize, f64)>>>()?;
        cells.sort_unstable_by_key(|cell| (cell.0, cell.1));

        let mut matrix = Array2::<f64>::zeros((n, n));
        for (i, j, _, value) in &cells {
            matrix[[*i, *j]] = *value;
            matrix[[*j, *i]] = *value;
        }
        measure.normalize(&mut matrix);

        let provenance = cells
            .into_iter()
            .map(|(i, j, ancestor, _)| Provenance {
                descriptor1: self.universe.descriptor(i).clone(),
                descriptor2: self.universe.descriptor(j).clone(),
                ancestor: self.universe.descriptor(ancestor).clone(),
                value: matrix[[i, j]],
            })
            .collect();

        Ok(DescriptorSimilarity::new(matrix, Some(provenance)))
    }

    /// Reduces the descriptor matrix to an object matrix
    ///
    /// For each pair of objects, the submatrix of their direct annotations
    /// is reduced with the `strategy`.
    ///
    /// # Errors
    ///
    /// [`MeshError::DimensionMismatch`] if the descriptor matrix does not
    /// match the number of descriptors of the universe
    pub fn per_object_termwise(
        &self,
        descriptors: &DescriptorSimilarity,
        strategy: SelectionStrategy,
    ) -> MeshResult<ObjectSimilarity> {
        let matrix = descriptors.matrix();
        let expected = self.universe.num_descriptors();
        if matrix.nrows() != expected || matrix.ncols() != expected {
            return Err(MeshError::DimensionMismatch {
                expected,
                found: matrix.nrows().max(matrix.ncols()),
            });
        }

        let n = self.universe.num_objects();
        debug!("Reducing descriptor similarity of {} objects with {}", n, strategy);
        let mut cells: Vec<(usize, usize, f64, Option<PairDistribution>)> = TrianglePairs::new(n)
            .par_bridge()
            .map(|(i, j)| {
                let rows = self.universe.direct_annotations(i).as_slice();
                let cols = self.universe.direct_annotations(j).as_slice();
                let submatrix = matrix.select(Axis(0), rows).select(Axis(1), cols);
                let value = strategy.select(submatrix.view());
                let distribution = PairDistribution::new(
                    self.universe.object(i),
                    self.universe.object(j),
                    submatrix.iter().copied().collect(),
                );
                (i, j, value, distribution)
            })
            .collect();
        cells.sort_unstable_by_key(|cell| (cell.0, cell.1));

        let mut result = Array2::<f64>::zeros((n, n));
        let mut distribution = Vec::with_capacity(cells.len());
        for (i, j, value, pair) in cells {
            result[[i, j]] = value;
            result[[j, i]] = value;
            distribution.extend(pair);
        }

        Ok(ObjectSimilarity::new(
            result,
            self.universe.objects().to_vec(),
            Vec::new(),
            Some(distribution),
        ))
    }

    /// Calculates the similarity of every pair of objects based on their
    /// annotation sets
    ///
    /// The measure compares the propagated annotations, or the direct
    /// annotations if [`ObjectwiseSimilarity::uses_direct_annotations`].
    ///
    /// Undefined scores are stored as `NaN` and listed in
    /// [`ObjectSimilarity::degenerate`].
    ///
    /// # Errors
    ///
    /// Any error of the measure other than [`MeshError::DegenerateStatistic`]
    pub fn per_object_objectwise<M: ObjectwiseSimilarity>(
        &self,
        measure: &M,
    ) -> MeshResult<ObjectSimilarity> {
        let n = self.universe.num_objects();
        debug!("Calculating object similarity of {} objects", n);
        let direct = measure.uses_direct_annotations();
        let mut cells: Vec<(usize, usize, MeshResult<f64>)> = TrianglePairs::new(n)
            .par_bridge()
            .map(|(i, j)| {
                let value = if direct {
                    measure.similarity(
                        &self.universe,
                        self.universe.direct_annotations(i),
                        self.universe.direct_annotations(j),
                    )
                } else {
                    measure.similarity(
                        &self.universe,
                        self.universe.propagated_annotations(i),
                        self.universe.propagated_annotations(j),
                    )
                };
                (i, j, value)
            })
            .collect();
        cells.sort_unstable_by_key(|cell| (cell.0, cell.1));

        let mut matrix = Array2::<f64>::zeros((n, n));
        let mut degenerate = Vec::new();
        for (i, j, value) in cells {
            let value = match value {
                Ok(value) => value,
                Err(MeshError::DegenerateStatistic(reason)) => {
                    warn!(
                        "Undefined similarity of {} and {}: {}",
                        self.universe.object(i),
                        self.universe.object(j),
                        reason
                    );
                    degenerate.push((i, j));
                    f64::NAN
                }
                Err(err) => return Err(err),
            };
            matrix[[i, j]] = value;
            matrix[[j, i]] = value;
        }

        Ok(ObjectSimilarity::new(
            matrix,
            self.universe.objects().to_vec(),
            degenerate,
            None,
        ))
    }

    /// Runs the full pipeline of a [`Measure`]
    ///
    /// # Errors
    ///
    /// See [`SemanticSimilarity::per_descriptor`] and
    /// [`SemanticSimilarity::per_object_objectwise`]
    pub fn compute(&self, measure: &Measure) -> MeshResult<MeasureResult> {
        match measure {
            Measure::Termwise(term_measure, strategy) => {
                let descriptors = self.per_descriptor(term_measure)?;
                let objects = self.per_object_termwise(&descriptors, *strategy)?;
                Ok(MeasureResult::new(Some(descriptors), objects))
            }
            Measure::Objectwise(object_measure) => {
                let objects = self.per_object_objectwise(object_measure)?;
                Ok(MeasureResult::new(None, objects))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures;
    use crate::similarity::objectwise::SimUi;
    use crate::similarity::termwise::{Jiang, Lin, Resnik};
    use crate::similarity::TermMeasure;

    fn chain() -> SemanticSimilarity {
        let thesaurus = fixtures::chain();
        let annotation = fixtures::chain_annotation(&thesaurus);
        SemanticSimilarity::new(&thesaurus, &annotation).unwrap()
    }

    fn dag() -> SemanticSimilarity {
        let thesaurus = fixtures::dag();
        let annotation = fixtures::dag_annotation(&thesaurus);
        SemanticSimilarity::new(&thesaurus, &annotation).unwrap()
    }

    fn is_symmetric(m: &Array2<f64>) -> bool {
        m.indexed_iter().all(|((i, j), v)| v.to_bits() == m[[j, i]].to_bits())
    }

    #[test]
    fn descriptor_matrix_is_symmetric() {
        let engine = dag();
        for measure in [TermMeasure::Resnik, TermMeasure::Lin, TermMeasure::Jiang, TermMeasure::Schlicker] {
            let result = engine.per_descriptor(&measure).unwrap();
            assert!(is_symmetric(result.matrix()));
        }
    }

    #[test]
    fn provenance_of_upper_triangle() {
        let engine = chain();
        let result = engine.per_descriptor(&Resnik).unwrap();
        let provenance = result.provenance().unwrap();
        // 4 descriptors
        assert_eq!(provenance.len(), 10);
        let pair = provenance
            .iter()
            .find(|p| p.descriptor1 == "L1" && p.descriptor2 == "L2")
            .unwrap();
        assert_eq!(pair.ancestor, "A");
        assert!(pair.value.abs() < 1e-12);
    }

    #[test]
    fn jiang_is_normalized_once() {
        let engine = chain();
        let result = engine.per_descriptor(&Jiang).unwrap();
        let m = result.matrix();
        assert!(m.iter().all(|v| (0.0..=1.0).contains(v)));
        let l1 = engine.universe().descriptor_index("L1").unwrap();
        let l2 = engine.universe().descriptor_index("L2").unwrap();
        // L1/L2 hold the maximum raw distance
        assert!(m[[l1, l2]].abs() < 1e-12);
        assert!((m[[l1, l1]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn termwise_objects() {
        let engine = chain();
        let descriptors = engine.per_descriptor(&Lin).unwrap();
        let objects = engine
            .per_object_termwise(&descriptors, SelectionStrategy::Max)
            .unwrap();
        assert!((objects.get("X", "X").unwrap() - 1.0).abs() < 1e-12);
        assert!(objects.get("X", "Y").unwrap().abs() < 1e-12);
        // only X/X and Y/Y are non-zero
        assert_eq!(objects.triples().count(), 2);

        let distribution = objects.distribution().unwrap();
        assert_eq!(distribution.len(), 3);
        assert_eq!(distribution[0].object1, "X");
        assert_eq!(distribution[0].object2, "X");
        assert!(distribution[1].std_dev.abs() < 1e-12);
    }

    #[test]
    fn termwise_dimension_mismatch() {
        let engine = chain();
        let descriptors = DescriptorSimilarity::new(Array2::zeros((2, 2)), None);
        assert!(matches!(
            engine.per_object_termwise(&descriptors, SelectionStrategy::Avg),
            Err(MeshError::DimensionMismatch { expected: 4, found: 2 })
        ));
    }

    #[test]
    fn objectwise_scenario() {
        let engine = chain();
        let result = engine.per_object_objectwise(&SimUi).unwrap();
        assert!((result.get("X", "Y").unwrap() - 0.5).abs() < f64::EPSILON);
        assert!(result.degenerate().is_empty());
        assert!(result.distribution().is_none());
        assert!(is_symmetric(result.matrix()));
    }

    #[test]
    fn degenerate_cells_are_flagged() {
        let engine = chain();
        let result = engine.per_object_objectwise(&EmptySet).unwrap();
        assert_eq!(result.degenerate(), &[(0, 0), (0, 1), (1, 1)]);
        assert!(result.matrix()[[1, 0]].is_nan());
        assert_eq!(result.triples().count(), 3);
        assert!(result.triples().all(|(_, _, value)| value.is_nan()));
    }

    /// Compares two empty sets for every pair
    struct EmptySet;

    impl ObjectwiseSimilarity for EmptySet {
        fn similarity(
            &self,
            universe: &Universe,
            _a: &crate::IndexGroup,
            _b: &crate::IndexGroup,
        ) -> MeshResult<f64> {
            SimUi.similarity(universe, &crate::IndexGroup::new(), &crate::IndexGroup::new())
        }
    }

    #[test]
    fn set_overlap_of_direct_annotations() {
        let engine = dag();
        let measure: Measure = "jaccard".parse().unwrap();
        let objects = engine.compute(&measure).unwrap().into_objects();
        assert!((objects.get("100100", "100300").unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!((objects.get("100100", "100400").unwrap() - 0.5).abs() < f64::EPSILON);
        // D4 and D3 share ancestors, but no direct annotation
        assert_eq!(objects.get("100100", "100200"), Some(0.0));
        assert_eq!(objects.get("100200", "100200"), Some(1.0));
        assert!(objects.degenerate().is_empty());
    }

    #[test]
    fn set_overlap_within_category() {
        let thesaurus = fixtures::dag();
        let mut annotation = Annotation::default();
        annotation.set_valid_descriptors(thesaurus.nodes_by_category("A").cloned());
        for (object, descriptor) in [
            ("100100", "D3"),
            ("100100", "D5"),
            ("100200", "D4"),
            ("100400", "D5"),
        ] {
            annotation.annotate(&thesaurus, object, descriptor).unwrap();
        }
        let engine = SemanticSimilarity::new(&thesaurus, &annotation).unwrap();
        let objects = engine
            .per_object_objectwise(&crate::similarity::objectwise::Dice)
            .unwrap();
        assert_eq!(objects.objects().len(), 2);
        assert_eq!(objects.get("100100", "100400"), Some(1.0));
        assert!(objects.get("100200", "100400").is_none());
    }

    #[test]
    fn compute_dispatch() {
        let engine = dag();
        let measure: Measure = "lin-avg".parse().unwrap();
        let result = engine.compute(&measure).unwrap();
        assert!(result.descriptors().is_some());
        assert_eq!(result.objects().objects().len(), 4);

        let measure: Measure = "simgic".parse().unwrap();
        let result = engine.compute(&measure).unwrap();
        assert!(result.descriptors().is_none());
        let objects = result.into_objects();
        assert!(objects.triples().all(|(a, b, _)| a <= b));
    }
}

use std::collections::{BTreeSet, HashMap};

use crate::group::IndexGroup;
use crate::{count_to_f64, Annotation, DescriptorId, MeshResult, ObjectId, Thesaurus};

/// An indexed, read-only view of all annotated descriptors and objects
///
/// Descriptors and objects are sorted and receive a stable index that is
/// used as row/column index of all similarity matrices. Only descriptors
/// with at least one annotated object are part of the universe, so the
/// information content is always defined.
///
/// # Examples
///
/// ```
/// use meshsim::{Annotation, Thesaurus, ThesaurusNode, Universe};
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
///
/// let universe = Universe::new(&thesaurus, &annotation).unwrap();
/// assert_eq!(universe.num_objects(), 1);
/// // L2 is not annotated
/// assert_eq!(universe.num_descriptors(), 3);
/// assert!(universe.descriptor_index("L2").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Universe {
    descriptors: Vec<DescriptorId>,
    descriptor_index: HashMap<DescriptorId, usize>,
    objects: Vec<ObjectId>,
    object_index: HashMap<ObjectId, usize>,
    counts: Vec<usize>,
    ancestors: Vec<IndexGroup>,
    annotated_objects: Vec<IndexGroup>,
    direct: Vec<IndexGroup>,
    propagated: Vec<IndexGroup>,
}

impl Universe {
    /// Indexes all annotated descriptors and objects
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`](crate::MeshError::NotFound) if an annotated
    /// descriptor is not part of the thesaurus
    pub fn new(thesaurus: &Thesaurus, annotation: &Annotation) -> MeshResult<Self> {
        let mut descriptors: Vec<DescriptorId> = annotation
            .descriptors()
            .filter(|id| annotation.num_annotations(id.as_str()) > 0)
            .cloned()
            .collect();
        descriptors.sort_unstable();
        let descriptor_index: HashMap<DescriptorId, usize> = descriptors
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        let mut objects: Vec<ObjectId> = annotation.objects().cloned().collect();
        objects.sort_unstable();
        let object_index: HashMap<ObjectId, usize> = objects
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        let counts: Vec<usize> = descriptors
            .iter()
            .map(|id| annotation.num_annotations(id.as_str()))
            .collect();

        let mut ancestors = Vec::with_capacity(descriptors.len());
        for id in &descriptors {
            let group: IndexGroup = thesaurus
                .ancestors(id.as_str())?
                .ids()
                .filter_map(|ancestor| descriptor_index.get(ancestor).copied())
                .collect();
            ancestors.push(group);
        }

        let annotated_objects: Vec<IndexGroup> = descriptors
            .iter()
            .map(|id| {
                annotation
                    .objects_of(id.as_str())
                    .iter()
                    .filter_map(|object| object_index.get(object).copied())
                    .collect::<IndexGroup>()
            })
            .collect();

        let index_descriptors = |set: &BTreeSet<DescriptorId>| -> IndexGroup {
            set.iter()
                .filter_map(|id| descriptor_index.get(id).copied())
                .collect()
        };
        let direct: Vec<IndexGroup> = objects
            .iter()
            .map(|object| index_descriptors(annotation.direct_annotations(object.as_str())))
            .collect();
        let propagated: Vec<IndexGroup> = objects
            .iter()
            .map(|object| index_descriptors(annotation.descriptors_of(object.as_str())))
            .collect();

        Ok(Self {
            descriptors,
            descriptor_index,
            objects,
            object_index,
            counts,
            ancestors,
            annotated_objects,
            direct,
            propagated,
        })
    }

    /// Number of annotated descriptors
    pub fn num_descriptors(&self) -> usize {
        self.descriptors.len()
    }

    /// Number of annotated objects, `N`
    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    /// All descriptors in index order
    pub fn descriptors(&self) -> &[DescriptorId] {
        &self.descriptors
    }

    /// All objects in index order
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// The descriptor at index `idx`
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds
    pub fn descriptor(&self, idx: usize) -> &DescriptorId {
        &self.descriptors[idx]
    }

    /// The object at index `idx`
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds
    pub fn object(&self, idx: usize) -> &ObjectId {
        &self.objects[idx]
    }

    /// The index of a descriptor, if it is annotated
    pub fn descriptor_index(&self, id: &str) -> Option<usize> {
        self.descriptor_index.get(id).copied()
    }

    /// The index of an object
    pub fn object_index(&self, id: &str) -> Option<usize> {
        self.object_index.get(&ObjectId::from(id)).copied()
    }

    /// Number of objects annotated to the descriptor at `idx`
    pub fn count(&self, idx: usize) -> usize {
        self.counts[idx]
    }

    /// `log10(count / N)` of the descriptor at `idx`
    pub fn log_probability(&self, idx: usize) -> f64 {
        (count_to_f64(self.counts[idx]) / count_to_f64(self.num_objects())).log10()
    }

    /// Information content `-log10(count / N)` of the descriptor at `idx`
    pub fn information_content(&self, idx: usize) -> f64 {
        -self.log_probability(idx)
    }

    /// Annotated ancestors of the descriptor at `idx`, including itself
    pub fn ancestors(&self, idx: usize) -> &IndexGroup {
        &self.ancestors[idx]
    }

    /// Indices of the objects annotated to the descriptor at `idx`
    pub fn annotated_objects(&self, idx: usize) -> &IndexGroup {
        &self.annotated_objects[idx]
    }

    /// Descriptor indices of the direct annotations of the object at `idx`
    pub fn direct_annotations(&self, idx: usize) -> &IndexGroup {
        &self.direct[idx]
    }

    /// Descriptor indices of the propagated annotations of the object at `idx`
    pub fn propagated_annotations(&self, idx: usize) -> &IndexGroup {
        &self.propagated[idx]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures;

    #[test]
    fn chain_universe() {
        let thesaurus = fixtures::chain();
        let annotation = fixtures::chain_annotation(&thesaurus);
        let universe = Universe::new(&thesaurus, &annotation).unwrap();

        assert_eq!(universe.num_objects(), 2);
        assert_eq!(universe.num_descriptors(), 4);
        let ids: Vec<&str> = universe.descriptors().iter().map(|d| d.as_str()).collect();
        assert_eq!(ids, vec!["A", "L1", "L2", "R"]);

        let a = universe.descriptor_index("A").unwrap();
        let l1 = universe.descriptor_index("L1").unwrap();
        assert_eq!(universe.count(a), 2);
        assert_eq!(universe.count(l1), 1);
        assert!(universe.information_content(a).abs() < f64::EPSILON);
        assert!((universe.information_content(l1) - 2f64.log10()).abs() < 1e-12);

        let ancestors: Vec<usize> = universe.ancestors(l1).iter().collect();
        assert_eq!(ancestors, vec![0, 1, 3]);
    }

    #[test]
    fn objects_are_sorted_numerically() {
        let thesaurus = fixtures::dag();
        let mut annotation = fixtures::dag_annotation(&thesaurus);
        annotation.annotate(&thesaurus, "99", "D5").unwrap();
        let universe = Universe::new(&thesaurus, &annotation).unwrap();
        let ids: Vec<&str> = universe.objects().iter().map(|o| o.as_str()).collect();
        assert_eq!(ids, vec!["99", "100100", "100200", "100300", "100400"]);
        assert_eq!(universe.object_index("100300"), Some(3));
    }

    #[test]
    fn annotation_groups() {
        let thesaurus = fixtures::dag();
        let annotation = fixtures::dag_annotation(&thesaurus);
        let universe = Universe::new(&thesaurus, &annotation).unwrap();

        let obj = universe.object_index("100300").unwrap();
        let direct: Vec<&str> = universe
            .direct_annotations(obj)
            .iter()
            .map(|d| universe.descriptor(d).as_str())
            .collect();
        assert_eq!(direct, vec!["D2", "D3"]);
        // D2, D3, D1, T1, C, GEN
        assert_eq!(universe.propagated_annotations(obj).len(), 6);

        let d1 = universe.descriptor_index("D1").unwrap();
        assert_eq!(universe.annotated_objects(d1).len(), 3);
        assert_eq!(universe.count(d1), 3);
    }
}

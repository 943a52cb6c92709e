//! Objects (diseases) annotated with MeSH descriptors
//!
//! Annotations follow the true path rule: an object annotated to a
//! descriptor is also annotated to every ancestor of that descriptor.
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use crate::thesaurus::DescriptorId;
use crate::{parser, MeshResult, Thesaurus};

mod object_id;
pub use object_id::ObjectId;

static EMPTY_DESCRIPTORS: BTreeSet<DescriptorId> = BTreeSet::new();
static EMPTY_OBJECTS: BTreeSet<ObjectId> = BTreeSet::new();

/// The mapping between objects and descriptors
///
/// `Annotation` keeps three indices:
/// - the direct annotations of every object
/// - the propagated annotations of every object (direct annotations
///   and all their ancestors)
/// - the reverse index from a descriptor to all objects annotated
///   directly or via one of its descendants
///
/// An optional set of valid descriptors restricts which descriptors
/// can be annotated, both directly and through propagation.
///
/// # Examples
///
/// ```
/// use meshsim::{Annotation, Thesaurus, ThesaurusNode};
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
/// assert_eq!(annotation.num_annotations("A"), 2);
/// assert_eq!(annotation.num_annotations("L1"), 1);
/// assert_eq!(annotation.descriptors_of("X").len(), 3);
/// assert_eq!(annotation.direct_annotations("X").len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Annotation {
    direct: HashMap<ObjectId, BTreeSet<DescriptorId>>,
    objects: HashMap<ObjectId, BTreeSet<DescriptorId>>,
    descriptors: HashMap<DescriptorId, BTreeSet<ObjectId>>,
    valid: Option<HashSet<DescriptorId>>,
}

impl Annotation {
    /// Reads an annotation file and annotates all objects
    ///
    /// See [`parser::annotation_file`] for the file format. If `categories`
    /// is given, only descriptors of those categories are valid.
    ///
    /// # Errors
    ///
    /// - The file cannot be read: [`MeshError::CannotOpenFile`](crate::MeshError::CannotOpenFile)
    /// - A category has no nodes: [`MeshError::UnknownCategory`](crate::MeshError::UnknownCategory)
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        thesaurus: &Thesaurus,
        categories: Option<&[&str]>,
    ) -> MeshResult<Self> {
        parser::annotation_file::load(path, thesaurus, categories)
    }

    /// Restricts all future annotations to the given descriptors
    pub fn set_valid_descriptors<I: IntoIterator<Item = DescriptorId>>(&mut self, valid: I) {
        self.valid = Some(valid.into_iter().collect());
    }

    /// Returns `true` if the descriptor passes the valid-descriptor filter
    pub fn is_valid(&self, descriptor: &str) -> bool {
        self.valid
            .as_ref()
            .map_or(true, |valid| valid.contains(descriptor))
    }

    /// Annotates `object` to `descriptor` and all its ancestors
    ///
    /// Returns `false` if the descriptor does not pass the
    /// valid-descriptor filter. Ancestors that don't pass the filter
    /// are skipped. Annotating the same pair twice has no effect.
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`](crate::MeshError::NotFound) if the descriptor
    /// is not part of the thesaurus
    pub fn annotate(
        &mut self,
        thesaurus: &Thesaurus,
        object: &str,
        descriptor: &str,
    ) -> MeshResult<bool> {
        if !self.is_valid(descriptor) {
            return Ok(false);
        }
        let ancestors = thesaurus.ancestors(descriptor)?;

        let object = ObjectId::from(object);
        self.direct
            .entry(object.clone())
            .or_default()
            .insert(DescriptorId::from(descriptor));

        for ancestor in ancestors.ids() {
            if !self.is_valid(ancestor.as_str()) {
                continue;
            }
            self.descriptors
                .entry(ancestor.clone())
                .or_default()
                .insert(object.clone());
            self.objects
                .entry(object.clone())
                .or_default()
                .insert(ancestor.clone());
        }
        Ok(true)
    }

    /// Number of objects annotated to the descriptor, directly or propagated
    pub fn num_annotations(&self, descriptor: &str) -> usize {
        self.descriptors.get(descriptor).map_or(0, BTreeSet::len)
    }

    /// Number of annotated objects
    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if no object is annotated
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates all annotated objects in arbitrary order
    pub fn objects(&self) -> impl Iterator<Item = &ObjectId> {
        self.objects.keys()
    }

    /// Iterates all descriptors with at least one annotation in arbitrary order
    pub fn descriptors(&self) -> impl Iterator<Item = &DescriptorId> {
        self.descriptors
            .iter()
            .filter(|(_, objects)| !objects.is_empty())
            .map(|(id, _)| id)
    }

    /// The descriptors that `object` was annotated to directly
    pub fn direct_annotations(&self, object: &str) -> &BTreeSet<DescriptorId> {
        self.direct
            .get(&ObjectId::from(object))
            .unwrap_or(&EMPTY_DESCRIPTORS)
    }

    /// The propagated descriptors of `object`
    pub fn descriptors_of(&self, object: &str) -> &BTreeSet<DescriptorId> {
        self.objects
            .get(&ObjectId::from(object))
            .unwrap_or(&EMPTY_DESCRIPTORS)
    }

    /// All objects annotated to `descriptor` or any of its descendants
    pub fn objects_of(&self, descriptor: &str) -> &BTreeSet<ObjectId> {
        self.descriptors.get(descriptor).unwrap_or(&EMPTY_OBJECTS)
    }
}

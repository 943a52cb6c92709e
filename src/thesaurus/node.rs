use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::group::IndexGroup;
use crate::thesaurus::DescriptorId;
use crate::{DEFAULT_NUM_PARENTS, DEFAULT_NUM_SYNONYMS};

/// A single concept of the [`Thesaurus`](crate::Thesaurus)
///
/// Regular nodes are MeSH descriptors. Category nodes (`A`, `C`, ...),
/// top-level tree nodes (positions without a `.`, e.g. `C01`) and the
/// generic root are flagged as `dummy`.
///
/// Categories and trees are derived from the tree positions: the tree is
/// the first dotted segment of a position, the category is its first letter.
///
/// # Examples
///
/// ```
/// use meshsim::ThesaurusNode;
///
/// let node = ThesaurusNode::new("D003920", "Diabetes Mellitus", &["C18.452.394.750", "C19.246"]);
/// assert_eq!(node.id(), "D003920");
/// assert!(node.categories().contains("C"));
/// assert!(node.trees().contains("C18"));
/// assert!(node.trees().contains("C19"));
/// assert!(!node.is_dummy());
/// ```
#[derive(Debug, Clone)]
pub struct ThesaurusNode {
    id: DescriptorId,
    name: String,
    synonyms: Vec<String>,
    tree_positions: SmallVec<[String; 2]>,
    categories: BTreeSet<String>,
    trees: BTreeSet<String>,
    dummy: bool,
    parents: IndexGroup,
    children: IndexGroup,
}

impl ThesaurusNode {
    /// Constructs a new regular node from its id, name and tree positions
    pub fn new<I: Into<DescriptorId>>(id: I, name: &str, tree_positions: &[&str]) -> Self {
        let mut node = Self {
            id: id.into(),
            name: name.to_string(),
            synonyms: Vec::with_capacity(DEFAULT_NUM_SYNONYMS),
            tree_positions: SmallVec::new(),
            categories: BTreeSet::new(),
            trees: BTreeSet::new(),
            dummy: false,
            parents: IndexGroup::with_capacity(DEFAULT_NUM_PARENTS),
            children: IndexGroup::with_capacity(DEFAULT_NUM_PARENTS),
        };
        for position in tree_positions {
            node.add_tree_position(position);
        }
        node
    }

    /// Constructs a synthetic node, e.g. a category or the generic root
    pub fn new_dummy<I: Into<DescriptorId>>(id: I, name: &str, tree_positions: &[&str]) -> Self {
        let mut node = Self::new(id, name, tree_positions);
        node.dummy = true;
        node
    }

    /// The unique id of the node
    pub fn id(&self) -> &DescriptorId {
        &self.id
    }

    /// The display name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names of the node
    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }

    /// All positions of the node in the MeSH trees, e.g. `C01.150.252`
    pub fn tree_positions(&self) -> &[String] {
        &self.tree_positions
    }

    /// The category codes of the node, e.g. `C`
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// The trees of the node, e.g. `C01`
    pub fn trees(&self) -> &BTreeSet<String> {
        &self.trees
    }

    /// Returns `true` for synthetic category, tree or root nodes
    pub fn is_dummy(&self) -> bool {
        self.dummy
    }

    /// Returns `true` if the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Arena indices of the direct parents
    pub fn parent_indices(&self) -> &IndexGroup {
        &self.parents
    }

    /// Arena indices of the direct children
    pub fn children_indices(&self) -> &IndexGroup {
        &self.children
    }

    /// Adds a tree position and updates categories and trees
    pub fn add_tree_position(&mut self, position: &str) {
        let position = position.trim();
        if position.is_empty() || self.tree_positions.iter().any(|p| p == position) {
            return;
        }
        let tree = position.split('.').next().unwrap_or(position);
        self.trees.insert(tree.to_string());
        if let Some(category) = tree.chars().next() {
            self.categories.insert(category.to_string());
        }
        self.tree_positions.push(position.to_string());
    }

    /// Adds a synonym, ignoring duplicates
    pub fn add_synonym(&mut self, synonym: &str) {
        if !self.synonyms.iter().any(|s| s == synonym) {
            self.synonyms.push(synonym.to_string());
        }
    }

    /// Flags the node as synthetic
    pub fn set_dummy(&mut self, dummy: bool) {
        self.dummy = dummy;
    }

    /// Removes all tree positions that don't pass the `keep` check
    ///
    /// Categories and trees are recalculated afterwards.
    pub(crate) fn retain_positions<F: Fn(&str) -> bool>(&mut self, keep: F) {
        let positions: Vec<String> = self.tree_positions.drain(..).collect();
        self.categories.clear();
        self.trees.clear();
        for position in positions.iter().filter(|p| keep(p)) {
            self.add_tree_position(position);
        }
    }

    pub(crate) fn add_parent(&mut self, idx: usize) {
        self.parents.insert(idx);
    }

    pub(crate) fn add_child(&mut self, idx: usize) {
        self.children.insert(idx);
    }

    /// Replaces the descriptive data with the one of `other`, keeping the edges
    pub(crate) fn replace_data(&mut self, other: ThesaurusNode) {
        self.name = other.name;
        self.synonyms = other.synonyms;
        self.tree_positions = other.tree_positions;
        self.categories = other.categories;
        self.trees = other.trees;
        self.dummy = other.dummy;
    }
}

impl PartialEq for ThesaurusNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ThesaurusNode {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn categories_from_positions() {
        let node = ThesaurusNode::new("D1", "Foo", &["C01.1", "A02.3.4", "C04"]);
        let categories: Vec<&str> = node.categories().iter().map(String::as_str).collect();
        assert_eq!(categories, vec!["A", "C"]);
        let trees: Vec<&str> = node.trees().iter().map(String::as_str).collect();
        assert_eq!(trees, vec!["A02", "C01", "C04"]);
    }

    #[test]
    fn duplicate_positions_are_ignored() {
        let mut node = ThesaurusNode::new("D1", "Foo", &["C01.1"]);
        node.add_tree_position("C01.1");
        node.add_tree_position(" ");
        assert_eq!(node.tree_positions().len(), 1);
    }

    #[test]
    fn retain_positions() {
        let mut node = ThesaurusNode::new("D1", "Foo", &["C01.1", "B02.3"]);
        node.retain_positions(|p| p.starts_with('C'));
        assert_eq!(node.tree_positions(), &["C01.1".to_string()]);
        assert!(!node.categories().contains("B"));
        assert!(!node.trees().contains("B02"));
    }

    #[test]
    fn synonyms() {
        let mut node = ThesaurusNode::new("D1", "Foo", &[]);
        node.add_synonym("Bar");
        node.add_synonym("Bar");
        node.add_synonym("Baz");
        assert_eq!(node.synonyms(), &["Bar".to_string(), "Baz".to_string()]);
    }

    #[test]
    fn replace_keeps_edges() {
        let mut node = ThesaurusNode::new("D1", "Foo", &["C01.1"]);
        node.add_parent(3);
        node.add_child(7);
        node.replace_data(ThesaurusNode::new("D1", "Bar", &["C02.1"]));
        assert_eq!(node.name(), "Bar");
        assert!(node.parent_indices().contains(3));
        assert!(node.children_indices().contains(7));
        assert!(node.trees().contains("C02"));
    }
}

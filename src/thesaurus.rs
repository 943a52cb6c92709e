//! The MeSH thesaurus graph
use core::fmt::Debug;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::ops::BitAnd;
use std::path::Path;

use crate::group::IndexGroup;
use crate::{parser, MeshError, MeshResult};

mod arena;
pub mod builder;
pub mod category;
mod descriptor_id;
mod node;

use arena::Arena;
pub use builder::Builder;
pub use category::{category_name, CategorySubset, MESH_CATEGORIES};
pub use descriptor_id::DescriptorId;
pub use node::ThesaurusNode;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Thesaurus` holds all MeSH descriptors and their hierarchy
///
/// The thesaurus is a directed acyclic graph. Every descriptor can have
/// multiple parents, one for each of its tree positions. Tree positions
/// are resolved into edges by the [`Builder`]: a descriptor at `C01.150.252`
/// is a child of the descriptor at `C01.150`, top-level trees (`C01`) are
/// children of their category node (`C`) and categories are children
/// of the optional generic root.
///
/// # Examples
///
/// ```
/// use meshsim::thesaurus::Builder;
///
/// let mut builder = Builder::new(&["C"]).unwrap();
/// builder.add_descriptor("D007239", "Infections", &["C01"]);
/// builder.add_descriptor("D001424", "Bacterial Infections", &["C01.150"]);
/// builder.add_descriptor("D016905", "Gram-Negative Bacterial Infections", &["C01.150.252"]);
/// let thesaurus = builder.terms_complete().connect_positions().unwrap().build();
///
/// let ancestors = thesaurus.ancestors("D016905").unwrap();
/// assert!(ancestors.contains("D001424"));
/// assert!(ancestors.contains("D007239"));
/// assert!(ancestors.contains("C"));
///
/// assert!(thesaurus.is_leaf("D016905").unwrap());
/// assert_eq!(thesaurus.tree_name("C01"), Some("Infections"));
/// ```
///
/// # Layout
///
/// ```mermaid
/// graph TD
/// GEN["GEN<br>generic root (optional)"]
/// GEN --> A["A<br>Anatomy"]
/// GEN --> C["C<br>Diseases"]
/// C --> C01["C01<br>Infections"]
/// C01 --> C01.150["C01.150<br>Bacterial Infections"]
/// C01.150 --> C01.150.252["C01.150.252<br>Gram-Negative Bacterial Infections"]
/// ```
#[derive(Default, Clone)]
pub struct Thesaurus {
    nodes: Arena,
    categories: BTreeMap<String, String>,
    trees: BTreeMap<String, String>,
    positions: HashMap<String, usize>,
    nodes_by_category: BTreeMap<String, BTreeSet<DescriptorId>>,
}

impl Debug for Thesaurus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thesaurus with {} nodes", self.nodes.len())
    }
}

impl Thesaurus {
    /// Parses the MeSH ASCII descriptor file and builds the thesaurus
    ///
    /// Only descriptors of the given `categories` are kept. If
    /// `generic_root` is set, all categories are connected to an
    /// additional synthetic root node.
    ///
    /// # Errors
    ///
    /// - The file cannot be read: [`MeshError::CannotOpenFile`]
    /// - A category code is unknown: [`MeshError::UnknownCategory`]
    /// - A tree position has no parent: [`MeshError::OntologyInconsistency`]
    ///
    /// # Examples
    ///
    /// ```
    /// use meshsim::Thesaurus;
    ///
    /// let thesaurus = Thesaurus::from_mesh_ascii("tests/small_mesh.bin", &["A", "C"], true).unwrap();
    /// assert_eq!(thesaurus.get_node("D003920").unwrap().name(), "Diabetes Mellitus");
    /// ```
    pub fn from_mesh_ascii<P: AsRef<Path>>(
        path: P,
        categories: &[&str],
        generic_root: bool,
    ) -> MeshResult<Self> {
        parser::mesh_ascii::load(path, categories, generic_root)
    }

    /// Returns the number of nodes, including synthetic nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the thesaurus does not contain any node
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// Adds a node to the thesaurus and returns its index
    ///
    /// The node is registered with all its tree positions and categories.
    /// It is not connected to any parent or child. If a node with the same
    /// id exists, its data is replaced but the existing edges are kept.
    /// The tree positions and categories of the replaced data are
    /// unregistered.
    pub fn add_node(&mut self, node: ThesaurusNode) -> usize {
        let positions: Vec<String> = node.tree_positions().to_vec();
        let categories: Vec<String> = node.categories().iter().cloned().collect();
        let id = node.id().clone();

        if let Some(old) = self.nodes.index_of(id.as_str()) {
            self.unregister(old);
        }
        let idx = self.nodes.insert(node);
        for position in positions {
            self.positions.insert(position, idx);
        }
        for category in categories {
            self.nodes_by_category
                .entry(category)
                .or_default()
                .insert(id.clone());
        }
        idx
    }

    /// Removes the tree positions and categories of the node at `idx`
    /// from the lookup registries
    fn unregister(&mut self, idx: usize) {
        let node = self.nodes.get_unchecked(idx);
        for position in node.tree_positions() {
            if self.positions.get(position) == Some(&idx) {
                self.positions.remove(position);
            }
        }
        for category in node.categories() {
            if let Some(ids) = self.nodes_by_category.get_mut(category) {
                ids.remove(node.id());
                if ids.is_empty() {
                    self.nodes_by_category.remove(category);
                }
            }
        }
    }

    /// Returns the node with the given id
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if the node does not exist
    pub fn get_node(&self, id: &str) -> MeshResult<&ThesaurusNode> {
        let idx = self.node_index(id)?;
        Ok(self.nodes.get_unchecked(idx))
    }

    /// Returns the arena index of the node with the given id
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if the node does not exist
    pub fn node_index(&self, id: &str) -> MeshResult<usize> {
        self.nodes
            .index_of(id)
            .ok_or_else(|| MeshError::NotFound(id.to_string()))
    }

    /// Returns the node at the arena index
    pub fn node_at(&self, idx: usize) -> Option<&ThesaurusNode> {
        self.nodes.get(idx)
    }

    /// Connects `child` to `parent`, updating both nodes
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if one of the nodes does not exist
    ///
    /// # Examples
    ///
    /// ```
    /// use meshsim::{Thesaurus, ThesaurusNode};
    ///
    /// let mut thesaurus = Thesaurus::default();
    /// thesaurus.add_node(ThesaurusNode::new("R", "Root", &[]));
    /// thesaurus.add_node(ThesaurusNode::new("A", "Child", &[]));
    /// thesaurus.add_parent("R", "A").unwrap();
    ///
    /// assert!(!thesaurus.is_leaf("R").unwrap());
    /// assert!(thesaurus.add_parent("R", "X").is_err());
    /// ```
    pub fn add_parent(&mut self, parent: &str, child: &str) -> MeshResult<()> {
        let parent_idx = self.node_index(parent)?;
        let child_idx = self.node_index(child)?;
        self.add_parent_index(parent_idx, child_idx);
        Ok(())
    }

    pub(crate) fn add_parent_index(&mut self, parent: usize, child: usize) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.add_child(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.add_parent(parent);
        }
    }

    /// Returns the node and all its direct and indirect parents
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if the node does not exist
    pub fn ancestors(&self, id: &str) -> MeshResult<NodeSet<'_>> {
        let idx = self.node_index(id)?;
        Ok(NodeSet::new(self.ancestor_indices(idx), self))
    }

    /// Returns the node and all its direct and indirect children
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if the node does not exist
    pub fn descendants(&self, id: &str) -> MeshResult<NodeSet<'_>> {
        let idx = self.node_index(id)?;
        Ok(NodeSet::new(self.descendant_indices(idx), self))
    }

    /// Returns all nodes that are ancestors of both `id1` and `id2`
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if one of the nodes does not exist
    ///
    /// # Examples
    ///
    /// ```
    /// use meshsim::{Thesaurus, ThesaurusNode};
    ///
    /// let mut thesaurus = Thesaurus::default();
    /// for id in ["R", "A", "L1", "L2"] {
    ///     thesaurus.add_node(ThesaurusNode::new(id, id, &[]));
    /// }
    /// thesaurus.add_parent("R", "A").unwrap();
    /// thesaurus.add_parent("A", "L1").unwrap();
    /// thesaurus.add_parent("A", "L2").unwrap();
    ///
    /// let common = thesaurus.common_ancestors("L1", "L2").unwrap();
    /// let mut ids: Vec<&str> = common.ids().map(|id| id.as_str()).collect();
    /// ids.sort_unstable();
    /// assert_eq!(ids, vec!["A", "R"]);
    /// ```
    pub fn common_ancestors(&self, id1: &str, id2: &str) -> MeshResult<NodeSet<'_>> {
        let a = self.ancestors(id1)?;
        let b = self.ancestors(id2)?;
        Ok(&a & &b)
    }

    /// Breadth first search towards the roots, including `idx` itself
    pub(crate) fn ancestor_indices(&self, idx: usize) -> IndexGroup {
        self.walk(idx, ThesaurusNode::parent_indices)
    }

    /// Breadth first search towards the leaves, including `idx` itself
    pub(crate) fn descendant_indices(&self, idx: usize) -> IndexGroup {
        self.walk(idx, ThesaurusNode::children_indices)
    }

    fn walk<F: Fn(&ThesaurusNode) -> &IndexGroup>(&self, start: usize, next: F) -> IndexGroup {
        let mut visited = vec![false; self.nodes.len()];
        let mut found = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(idx) = queue.pop_front() {
            if visited.get(idx).copied().unwrap_or(true) {
                continue;
            }
            visited[idx] = true;
            found.push(idx);
            if let Some(node) = self.nodes.get(idx) {
                queue.extend(next(node).iter().filter(|i| !visited[*i]));
            }
        }
        IndexGroup::from(found)
    }

    /// Returns `true` if the node has no children
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if the node does not exist
    pub fn is_leaf(&self, id: &str) -> MeshResult<bool> {
        Ok(self.get_node(id)?.is_leaf())
    }

    /// Iterates all nodes without children
    pub fn leaves(&self) -> impl Iterator<Item = &ThesaurusNode> {
        self.nodes.values().filter(|node| node.is_leaf())
    }

    /// Iterates all nodes
    pub fn iter(&self) -> std::slice::Iter<'_, ThesaurusNode> {
        self.nodes.values()
    }

    /// Registers a category with its name
    pub fn add_category(&mut self, code: &str, name: &str) {
        self.categories.insert(code.to_string(), name.to_string());
    }

    /// Returns the name of a registered category
    pub fn category_name(&self, code: &str) -> Option<&str> {
        self.categories.get(code).map(String::as_str)
    }

    /// Iterates the codes of all registered categories
    pub fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Registers a top-level tree, e.g. `C01`, with its name
    pub fn add_tree(&mut self, tree: &str, name: &str) {
        self.trees.insert(tree.to_string(), name.to_string());
    }

    /// Returns the name of a registered tree
    pub fn tree_name(&self, tree: &str) -> Option<&str> {
        self.trees.get(tree).map(String::as_str)
    }

    /// Iterates the ids of all registered trees
    pub fn tree_ids(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Returns the category of a registered tree
    ///
    /// # Examples
    ///
    /// ```
    /// use meshsim::Thesaurus;
    ///
    /// let mut thesaurus = Thesaurus::default();
    /// thesaurus.add_category("C", "Diseases");
    /// thesaurus.add_tree("C01", "Infections");
    /// assert_eq!(thesaurus.category_of_tree("C01"), Some("C"));
    /// assert_eq!(thesaurus.category_of_tree("C02"), None);
    /// ```
    pub fn category_of_tree(&self, tree: &str) -> Option<&str> {
        if !self.trees.contains_key(tree) {
            return None;
        }
        let code = tree.get(..1)?;
        self.categories
            .get_key_value(code)
            .map(|(code, _)| code.as_str())
    }

    /// Returns the node at the given tree position
    pub fn node_by_position(&self, position: &str) -> Option<&ThesaurusNode> {
        self.positions
            .get(position)
            .and_then(|idx| self.nodes.get(*idx))
    }

    pub(crate) fn index_by_position(&self, position: &str) -> Option<usize> {
        self.positions.get(position).copied()
    }

    /// Iterates the ids of all nodes that belong to the category
    pub fn nodes_by_category(&self, code: &str) -> impl Iterator<Item = &DescriptorId> {
        self.nodes_by_category.get(code).into_iter().flatten()
    }

    /// Returns the code to crate a `Mermaid` flow diagram
    ///
    /// This is meant to be used with small thesauri only
    pub fn as_mermaid(&self) -> String {
        let mut code = String::from("graph TD\n");
        for node in self {
            code.push_str(&format!("{}[\"{}<br>{}\"]\n", node.id(), node.id(), node.name()));
            for child in node.children_indices() {
                if let Some(child) = self.node_at(child) {
                    code.push_str(&format!("{} --> {}\n", node.id(), child.id()));
                }
            }
        }
        code
    }
}

impl<'a> IntoIterator for &'a Thesaurus {
    type Item = &'a ThesaurusNode;
    type IntoIter = std::slice::Iter<'a, ThesaurusNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A set of nodes of one [`Thesaurus`], e.g. all ancestors of a node
pub struct NodeSet<'a> {
    group: IndexGroup,
    thesaurus: &'a Thesaurus,
}

impl<'a> NodeSet<'a> {
    fn new(group: IndexGroup, thesaurus: &'a Thesaurus) -> Self {
        Self { group, thesaurus }
    }

    /// Number of nodes in the set
    pub fn len(&self) -> usize {
        self.group.len()
    }

    /// Returns `true` if the set is empty
    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    /// Returns `true` if the node with the id is part of the set
    pub fn contains(&self, id: &str) -> bool {
        self.thesaurus
            .node_index(id)
            .map_or(false, |idx| self.group.contains(idx))
    }

    /// The arena indices of the nodes
    pub fn indices(&self) -> &IndexGroup {
        &self.group
    }

    /// Iterates the nodes
    pub fn iter(&self) -> impl Iterator<Item = &'a ThesaurusNode> + '_ {
        let thesaurus = self.thesaurus;
        self.group.iter().filter_map(move |idx| thesaurus.node_at(idx))
    }

    /// Iterates the ids of the nodes
    pub fn ids(&self) -> impl Iterator<Item = &'a DescriptorId> + '_ {
        self.iter().map(ThesaurusNode::id)
    }
}

impl Debug for NodeSet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.ids()).finish()
    }
}

impl<'a> BitAnd for &NodeSet<'a> {
    type Output = NodeSet<'a>;

    fn bitand(self, rhs: Self) -> NodeSet<'a> {
        NodeSet::new(&self.group & &rhs.group, self.thesaurus)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures;

    fn sorted(set: &NodeSet) -> Vec<String> {
        let mut ids: Vec<String> = set.ids().map(ToString::to_string).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn ancestors_are_reflexive() {
        let thesaurus = fixtures::chain();
        let ancestors = thesaurus.ancestors("L1").unwrap();
        assert_eq!(sorted(&ancestors), vec!["A", "L1", "R"]);
    }

    #[test]
    fn descendants_are_reflexive() {
        let thesaurus = fixtures::chain();
        let descendants = thesaurus.descendants("A").unwrap();
        assert_eq!(sorted(&descendants), vec!["A", "L1", "L2"]);
    }

    #[test]
    fn common_ancestors_of_siblings() {
        let thesaurus = fixtures::chain();
        let common = thesaurus.common_ancestors("L1", "L2").unwrap();
        assert_eq!(sorted(&common), vec!["A", "R"]);
    }

    #[test]
    fn missing_node() {
        let thesaurus = fixtures::chain();
        assert!(matches!(
            thesaurus.ancestors("X"),
            Err(MeshError::NotFound(id)) if id == "X"
        ));
        assert!(thesaurus.common_ancestors("L1", "X").is_err());
    }

    #[test]
    fn parent_child_mutual() {
        let thesaurus = fixtures::dag();
        for node in &thesaurus {
            let idx = thesaurus.node_index(node.id().as_str()).unwrap();
            for parent in node.parent_indices() {
                let parent = thesaurus.node_at(parent).unwrap();
                assert!(parent.children_indices().contains(idx));
            }
            for child in node.children_indices() {
                let child = thesaurus.node_at(child).unwrap();
                assert!(child.parent_indices().contains(idx));
            }
        }
    }

    #[test]
    fn multi_parent_ancestors() {
        let thesaurus = fixtures::dag();
        let ancestors = thesaurus.ancestors("D4").unwrap();
        assert_eq!(
            sorted(&ancestors),
            vec!["C", "D1", "D2", "D4", "GEN", "T1"]
        );
    }

    #[test]
    fn leaves() {
        let thesaurus = fixtures::dag();
        let mut leaves: Vec<&str> = thesaurus.leaves().map(|n| n.id().as_str()).collect();
        leaves.sort_unstable();
        assert_eq!(leaves, vec!["D3", "D4", "D5"]);
        assert!(!thesaurus.is_leaf("D1").unwrap());
    }

    #[test]
    fn cycles_terminate() {
        let mut thesaurus = Thesaurus::default();
        thesaurus.add_node(ThesaurusNode::new("A", "A", &[]));
        thesaurus.add_node(ThesaurusNode::new("B", "B", &[]));
        thesaurus.add_parent("A", "B").unwrap();
        thesaurus.add_parent("B", "A").unwrap();
        assert_eq!(thesaurus.ancestors("A").unwrap().len(), 2);
        assert_eq!(thesaurus.descendants("B").unwrap().len(), 2);
    }

    #[test]
    fn duplicate_node_keeps_edges() {
        let mut thesaurus = fixtures::chain();
        thesaurus.add_node(ThesaurusNode::new("A", "Renamed", &["C01.1"]));
        assert_eq!(thesaurus.get_node("A").unwrap().name(), "Renamed");
        assert_eq!(sorted(&thesaurus.ancestors("L1").unwrap()), vec!["A", "L1", "R"]);
    }

    #[test]
    fn duplicate_node_replaces_registries() {
        let mut thesaurus = fixtures::chain();
        thesaurus.add_node(ThesaurusNode::new("A", "Inner", &["C01.1"]));
        assert_eq!(thesaurus.node_by_position("C01.1").unwrap().id(), "A");
        assert_eq!(thesaurus.nodes_by_category("C").count(), 1);

        thesaurus.add_node(ThesaurusNode::new("A", "Moved", &["A01.1"]));
        assert!(thesaurus.node_by_position("C01.1").is_none());
        assert_eq!(thesaurus.node_by_position("A01.1").unwrap().name(), "Moved");
        assert_eq!(thesaurus.nodes_by_category("C").count(), 0);
        let anatomy: Vec<&str> = thesaurus
            .nodes_by_category("A")
            .map(DescriptorId::as_str)
            .collect();
        assert_eq!(anatomy, vec!["A"]);
        assert_eq!(sorted(&thesaurus.ancestors("L2").unwrap()), vec!["A", "L2", "R"]);
    }

    #[test]
    fn registries() {
        let thesaurus = fixtures::dag();
        assert_eq!(thesaurus.category_name("C"), Some("Diseases"));
        assert_eq!(thesaurus.tree_name("C01"), Some("Tree one"));
        assert_eq!(thesaurus.category_of_tree("A01"), Some("A"));
        assert_eq!(thesaurus.node_by_position("C01.2.1").unwrap().id(), "D4");
        assert_eq!(thesaurus.node_by_position("C01.1.2").unwrap().id(), "D4");
        assert!(thesaurus.node_by_position("C09").is_none());

        let mut anatomy: Vec<&str> = thesaurus
            .nodes_by_category("A")
            .map(DescriptorId::as_str)
            .collect();
        anatomy.sort_unstable();
        assert_eq!(anatomy, vec!["A", "D5", "T2"]);
        assert_eq!(thesaurus.nodes_by_category("Z").count(), 0);
    }

    #[test]
    fn mermaid() {
        let thesaurus = fixtures::chain();
        let code = thesaurus.as_mermaid();
        assert!(code.starts_with("graph TD\n"));
        assert!(code.contains("A --> L1\n"));
    }
}

use std::collections::HashMap;

use tracing::warn;

use crate::thesaurus::{DescriptorId, ThesaurusNode};

/// Owns all nodes of a thesaurus, addressed by a stable index
#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    nodes: Vec<ThesaurusNode>,
    ids: HashMap<DescriptorId, usize>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts the node and returns its index
    ///
    /// If a node with the same id exists already, its data is replaced
    /// but all parent and child edges are kept, so that they stay mutual.
    pub fn insert(&mut self, node: ThesaurusNode) -> usize {
        if let Some(&idx) = self.ids.get(node.id()) {
            warn!("Duplicate node {}, replacing its data", node.id());
            self.nodes[idx].replace_data(node);
            return idx;
        }
        let idx = self.nodes.len();
        self.ids.insert(node.id().clone(), idx);
        self.nodes.push(node);
        idx
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.get(id).copied()
    }

    pub fn get(&self, idx: usize) -> Option<&ThesaurusNode> {
        self.nodes.get(idx)
    }

    /// # Panics
    ///
    /// Panics if `idx` was not handed out by this arena
    pub fn get_unchecked(&self, idx: usize) -> &ThesaurusNode {
        &self.nodes[idx]
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut ThesaurusNode> {
        self.nodes.get_mut(idx)
    }

    pub fn values(&self) -> std::slice::Iter<'_, ThesaurusNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut arena = Arena::default();
        let a = arena.insert(ThesaurusNode::new("A", "Foo", &["C01"]));
        let b = arena.insert(ThesaurusNode::new("B", "Bar", &["C01.1"]));
        assert_eq!((a, b), (0, 1));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.index_of("B"), Some(1));
        assert_eq!(arena.get_unchecked(b).name(), "Bar");
        assert!(arena.get(2).is_none());
    }

    #[test]
    fn duplicate_keeps_index() {
        let mut arena = Arena::default();
        arena.insert(ThesaurusNode::new("A", "Foo", &["C01"]));
        let idx = arena.insert(ThesaurusNode::new("A", "Bar", &["C02"]));
        assert_eq!(idx, 0);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get_unchecked(0).name(), "Bar");
    }
}

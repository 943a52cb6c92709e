//! Step-wise construction of a [`Thesaurus`]
//!
//! ```text
//! Builder<LooseCollection>
//! |
//! add_descriptor() / add_node()
//! |
//! terms_complete()
//! |
//! V
//! Builder<AllTerms>
//! |
//! connect_positions()
//! |
//! V
//! Builder<ConnectedTerms>
//! |
//! build()
//! |
//! V
//! Thesaurus
//! ```
use std::collections::BTreeSet;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::thesaurus::{category_name, Thesaurus, ThesaurusNode};
use crate::{MeshError, MeshResult, GENERIC_ROOT_ID};

/// All descriptors can still be added
pub struct LooseCollection;
/// All descriptors are present, edges can be created
pub struct AllTerms;
/// All tree positions are resolved into edges
pub struct ConnectedTerms;

fn transition_state<TX, TY>(builder: Builder<TX>) -> Builder<TY> {
    Builder::<TY> {
        thesaurus: builder.thesaurus,
        categories: builder.categories,
        generic_root: builder.generic_root,
        state: PhantomData,
    }
}

/// Builds a [`Thesaurus`] restricted to a set of MeSH categories
///
/// The builder creates one synthetic node per category and, optionally,
/// a generic root node that connects all categories.
pub struct Builder<T> {
    thesaurus: Thesaurus,
    categories: BTreeSet<String>,
    generic_root: bool,
    state: PhantomData<T>,
}

impl Builder<LooseCollection> {
    /// Creates a builder for the given MeSH category codes
    ///
    /// # Errors
    ///
    /// [`MeshError::UnknownCategory`] if a code is not a MeSH category
    pub fn new(categories: &[&str]) -> MeshResult<Builder<LooseCollection>> {
        let mut builder = Builder::<LooseCollection> {
            thesaurus: Thesaurus::default(),
            categories: BTreeSet::new(),
            generic_root: false,
            state: PhantomData,
        };
        for code in categories {
            let name =
                category_name(code).ok_or_else(|| MeshError::UnknownCategory(code.to_string()))?;
            builder.thesaurus.add_category(code, name);
            builder
                .thesaurus
                .add_node(ThesaurusNode::new_dummy(*code, name, &[*code]));
            builder.categories.insert(code.to_string());
        }
        Ok(builder)
    }

    /// Creates a builder with an additional generic root above all categories
    ///
    /// # Errors
    ///
    /// [`MeshError::UnknownCategory`] if a code is not a MeSH category
    pub fn with_generic_root(categories: &[&str]) -> MeshResult<Builder<LooseCollection>> {
        let mut builder = Self::new(categories)?;
        builder.thesaurus.add_node(ThesaurusNode::new_dummy(
            GENERIC_ROOT_ID,
            GENERIC_ROOT_ID,
            &[],
        ));
        builder.generic_root = true;
        Ok(builder)
    }

    /// Adds a descriptor with its tree positions
    ///
    /// See [`Builder::add_node`]
    pub fn add_descriptor(&mut self, id: &str, name: &str, tree_positions: &[&str]) -> bool {
        self.add_node(ThesaurusNode::new(id, name, tree_positions))
    }

    /// Adds a node, keeping only the tree positions of the selected categories
    ///
    /// Nodes without any remaining position are skipped and `false` is
    /// returned. Nodes with a top-level position (no `.`, e.g. `C01`)
    /// are registered as trees and flagged as dummy.
    pub fn add_node(&mut self, mut node: ThesaurusNode) -> bool {
        let categories = &self.categories;
        node.retain_positions(|position| {
            position
                .get(..1)
                .map_or(false, |code| categories.contains(code))
        });
        if node.tree_positions().is_empty() {
            trace!("Skipping {}, not part of the selected categories", node.id());
            return false;
        }

        let trees: Vec<String> = node
            .tree_positions()
            .iter()
            .filter(|position| !position.contains('.'))
            .cloned()
            .collect();
        if !trees.is_empty() {
            node.set_dummy(true);
            for tree in trees {
                self.thesaurus.add_tree(&tree, node.name());
            }
        }
        self.thesaurus.add_node(node);
        true
    }

    /// Marks the end of adding nodes
    #[must_use]
    pub fn terms_complete(self) -> Builder<AllTerms> {
        transition_state(self)
    }
}

impl Builder<AllTerms> {
    /// Connects `child` to `parent` manually
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if one of the nodes does not exist
    pub fn add_parent(&mut self, parent: &str, child: &str) -> MeshResult<()> {
        self.thesaurus.add_parent(parent, child)
    }

    /// Resolves all tree positions into parent/child edges
    ///
    /// - categories are children of the generic root, if present
    /// - top-level positions (`C01`) are children of their category node
    /// - every other position is a child of the node at its prefix position
    ///   (`C01.150.252` -> `C01.150`)
    ///
    /// # Errors
    ///
    /// [`MeshError::OntologyInconsistency`] if a prefix position does not exist
    pub fn connect_positions(mut self) -> MeshResult<Builder<ConnectedTerms>> {
        let category_indices: Vec<(String, usize)> = self
            .categories
            .iter()
            .map(|code| Ok((code.clone(), self.thesaurus.node_index(code)?)))
            .collect::<MeshResult<_>>()?;

        if self.generic_root {
            let root = self.thesaurus.node_index(GENERIC_ROOT_ID)?;
            for (_, idx) in &category_indices {
                self.thesaurus.add_parent_index(root, *idx);
            }
        }

        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (child_idx, node) in self.thesaurus.iter().enumerate() {
            if self.categories.contains(node.id().as_str()) || node.id() == GENERIC_ROOT_ID {
                continue;
            }
            for position in node.tree_positions() {
                let parent_idx = match position.rsplit_once('.') {
                    Some((parent_position, _)) => self
                        .thesaurus
                        .index_by_position(parent_position)
                        .ok_or_else(|| {
                            MeshError::OntologyInconsistency(format!(
                                "{}: parent position {} of {} does not exist",
                                node.id(),
                                parent_position,
                                position
                            ))
                        })?,
                    None => category_indices
                        .iter()
                        .find(|(code, _)| position.starts_with(code.as_str()))
                        .map(|(_, idx)| *idx)
                        .ok_or_else(|| {
                            MeshError::OntologyInconsistency(format!(
                                "{}: no category for tree {}",
                                node.id(),
                                position
                            ))
                        })?,
                };
                edges.push((parent_idx, child_idx));
            }
        }
        debug!("Connecting {} parent-child edges", edges.len());
        for (parent, child) in edges {
            self.thesaurus.add_parent_index(parent, child);
        }
        Ok(transition_state(self))
    }
}

impl Builder<ConnectedTerms> {
    /// Returns the finished [`Thesaurus`]
    pub fn build(self) -> Thesaurus {
        self.thesaurus
    }
}

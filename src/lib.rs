#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use core::fmt::Debug;
use std::num::ParseFloatError;
use thiserror::Error;

pub mod annotation;
pub mod cache;
pub mod ism;
pub mod output;
pub mod parser;
pub mod similarity;
pub mod thesaurus;
pub mod utils;

mod group;

pub use annotation::{Annotation, ObjectId};
pub use group::IndexGroup;
pub use ism::{Ism, IsmConfig, IsmResult};
pub use similarity::{Measure, SelectionStrategy, SemanticSimilarity, Universe};
pub use thesaurus::{DescriptorId, Thesaurus, ThesaurusNode};

const DEFAULT_NUM_PARENTS: usize = 4;
const DEFAULT_NUM_SYNONYMS: usize = 8;

/// Convergence threshold of the ISM power iteration
pub const DEFAULT_EPSILON: f64 = 0.001;

/// Upper bound of power iterations before the ISM walk gives up
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Identifier of the synthetic node that connects all categories
pub const GENERIC_ROOT_ID: &str = "GEN";

/// Errors of the `meshsim` crate
#[derive(Error, Debug)]
pub enum MeshError {
    /// A descriptor, tree position or node is not part of the thesaurus
    #[error("descriptor does not exist: {0}")]
    NotFound(String),
    /// The thesaurus graph is malformed, e.g. a parent position is missing
    #[error("ontology inconsistency: {0}")]
    OntologyInconsistency(String),
    /// A ratio with a zero denominator
    #[error("degenerate statistic: {0}")]
    DegenerateStatistic(String),
    /// Two descriptors do not share any annotated ancestor
    #[error("no common ancestor between {0} and {1}")]
    NoCommonAncestor(String, String),
    /// The ISM random walk did not reach the convergence threshold
    #[error("random walk did not converge after {iterations} iterations")]
    NonConvergence {
        /// Number of performed iterations
        iterations: usize,
    },
    /// Two matrices or a matrix and an index do not match in size
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected number of rows/columns
        expected: usize,
        /// Actual number of rows/columns
        found: usize,
    },
    /// The name of a similarity measure is not known
    #[error("unknown similarity measure: {0}")]
    UnknownMeasure(String),
    /// The name of a selection strategy is not known
    #[error("unknown selection strategy: {0}")]
    UnknownStrategy(String),
    /// The name of a category or category subset is not known
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    /// A file could not be opened, read or written
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// Malformed input data
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A cached value could not be parsed as a float
    #[error("unable to parse float")]
    ParseFloatError,
}

impl From<ParseFloatError> for MeshError {
    fn from(_: ParseFloatError) -> Self {
        MeshError::ParseFloatError
    }
}

/// Shortcut for `Result<T, MeshError>`
pub type MeshResult<T> = Result<T, MeshError>;

/// Converts a count into a float for the statistics
///
/// Counts in this crate are set sizes, far below the 2^52 limit
/// of exact integer representation in `f64`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn count_to_f64(n: usize) -> f64 {
    n as f64
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small hand-made thesauri used throughout the unit tests
    use crate::thesaurus::Builder;
    use crate::{Annotation, Thesaurus, ThesaurusNode};

    /// `R -> A -> {L1, L2}`
    ///
    /// ```text
    /// R
    /// └── A
    ///     ├── L1
    ///     └── L2
    /// ```
    pub fn chain() -> Thesaurus {
        let mut thesaurus = Thesaurus::default();
        for (id, name) in [("R", "Root"), ("A", "Inner"), ("L1", "Leaf one"), ("L2", "Leaf two")] {
            thesaurus.add_node(ThesaurusNode::new(id, name, &[]));
        }
        thesaurus.add_parent("R", "A").unwrap();
        thesaurus.add_parent("A", "L1").unwrap();
        thesaurus.add_parent("A", "L2").unwrap();
        thesaurus
    }

    /// `X -> L1`, `Y -> L2`
    pub fn chain_annotation(thesaurus: &Thesaurus) -> Annotation {
        let mut annotation = Annotation::default();
        annotation.annotate(thesaurus, "X", "L1").unwrap();
        annotation.annotate(thesaurus, "Y", "L2").unwrap();
        annotation
    }

    /// `R -> {A, B}`, `A -> {A1, A2}`, `B -> {B1, B2}`
    pub fn two_branches() -> Thesaurus {
        let mut thesaurus = Thesaurus::default();
        for id in ["R", "A", "B", "A1", "A2", "B1", "B2"] {
            thesaurus.add_node(ThesaurusNode::new(id, id, &[]));
        }
        for (parent, child) in [
            ("R", "A"),
            ("R", "B"),
            ("A", "A1"),
            ("A", "A2"),
            ("B", "B1"),
            ("B", "B2"),
        ] {
            thesaurus.add_parent(parent, child).unwrap();
        }
        thesaurus
    }

    /// One object per leaf of `two_branches`
    pub fn two_branches_annotation(thesaurus: &Thesaurus) -> Annotation {
        let mut annotation = Annotation::default();
        for (object, leaf) in [("1", "A1"), ("2", "A2"), ("3", "B1"), ("4", "B2")] {
            annotation.annotate(thesaurus, object, leaf).unwrap();
        }
        annotation
    }

    /// A wider DAG with a multi-parent node, spanning two categories
    /// below a generic root
    ///
    /// ```text
    /// GEN
    /// ├── C
    /// │   └── T1 (C01, tree)
    /// │       ├── D1 C01.1
    /// │       │   ├── D3 C01.1.1
    /// │       │   └── D4 C01.1.2, C01.2.1   (two parents)
    /// │       └── D2 C01.2
    /// │           └── D4
    /// └── A
    ///     └── T2 (A01, tree)
    ///         └── D5 A01.1
    /// ```
    pub fn dag() -> Thesaurus {
        let mut builder = Builder::with_generic_root(&["A", "C"]).expect("categories exist");
        builder.add_descriptor("T1", "Tree one", &["C01"]);
        builder.add_descriptor("T2", "Tree two", &["A01"]);
        builder.add_descriptor("D1", "Inner one", &["C01.1"]);
        builder.add_descriptor("D2", "Inner two", &["C01.2"]);
        builder.add_descriptor("D3", "Leaf three", &["C01.1.1"]);
        builder.add_descriptor("D4", "Leaf four", &["C01.1.2", "C01.2.1"]);
        builder.add_descriptor("D5", "Leaf five", &["A01.1"]);
        builder
            .terms_complete()
            .connect_positions()
            .expect("all positions are present")
            .build()
    }

    /// Four diseases annotated to the `dag` thesaurus
    pub fn dag_annotation(thesaurus: &Thesaurus) -> Annotation {
        let mut annotation = Annotation::default();
        for (object, descriptor) in [
            ("100100", "D3"),
            ("100100", "D5"),
            ("100200", "D4"),
            ("100300", "D2"),
            ("100300", "D3"),
            ("100400", "D5"),
        ] {
            annotation.annotate(thesaurus, object, descriptor).unwrap();
        }
        annotation
    }
}

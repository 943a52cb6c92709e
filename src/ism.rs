//! Information-theoretic Semantic Measure (ISM)
//!
//! The ISM blends a semantic similarity matrix of objects (the HSM, usually
//! the result of a [`Measure`](crate::Measure)) with a random walk
//! contribution (RWC) that follows the annotations of each object down the
//! thesaurus to the leaves.
//!
//! The computation runs in five steps:
//!
//! 1. A transition matrix `P` between annotated descriptors. A walker moves
//!    from a descriptor to one of its annotated children proportional to the
//!    number of objects annotated to the child. Leaves absorb the walker.
//! 2. The walk `W = P^k`, iterated from the identity until the Frobenius
//!    norm of `W' - W` drops below `epsilon`.
//! 3. The annotation matrix `A`, distributing every direct annotation of an
//!    object evenly over the leaves below the descriptor.
//! 4. `B = W[leaves] · A`, the probability of each object to end in a leaf.
//! 5. The RWC of two objects, a Jaccard-like overlap of their `B` columns.
//!
//! For a detailed description see [Mistry M, Pavlidis P, BMC Bioinf (2008)](https://pubmed.ncbi.nlm.nih.gov/18844976/)
//!
//! # Examples
//!
//! ```
//! use meshsim::{Annotation, Ism, Thesaurus, ThesaurusNode, Universe};
//!
//! let mut thesaurus = Thesaurus::default();
//! for id in ["R", "A", "L1", "L2"] {
//!     thesaurus.add_node(ThesaurusNode::new(id, id, &[]));
//! }
//! thesaurus.add_parent("R", "A").unwrap();
//! thesaurus.add_parent("A", "L1").unwrap();
//! thesaurus.add_parent("A", "L2").unwrap();
//!
//! let mut annotation = Annotation::default();
//! annotation.annotate(&thesaurus, "X", "L1").unwrap();
//! annotation.annotate(&thesaurus, "Y", "L2").unwrap();
//!
//! let universe = Universe::new(&thesaurus, &annotation).unwrap();
//! let result = Ism::new(&thesaurus, &universe).compute(None).unwrap();
//! assert!(result.converged());
//! assert_eq!(result.matrix()[[0, 0]], 1.0);
//! assert_eq!(result.matrix()[[0, 1]], 0.0);
//! ```
use ndarray::{Array2, Axis};
use tracing::{debug, trace, warn};

use crate::group::IndexGroup;
use crate::similarity::{ObjectSimilarity, Universe};
use crate::utils::TrianglePairs;
use crate::{
    count_to_f64, MeshError, MeshResult, ObjectId, Thesaurus, ThesaurusNode, DEFAULT_EPSILON,
    DEFAULT_MAX_ITERATIONS,
};

/// Parameters of the random walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsmConfig {
    /// The walk stops once the Frobenius norm of two consecutive
    /// iterations differs by at most `epsilon`
    pub epsilon: f64,
    /// Upper bound of iterations
    pub max_iterations: usize,
}

impl Default for IsmConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// The result of the power iteration
#[derive(Debug, Clone)]
pub struct Walk {
    matrix: Array2<f64>,
    iterations: usize,
    converged: bool,
}

impl Walk {
    /// The walk matrix `W`
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Number of performed multiplications
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// `false` if the walk stopped at the iteration limit
    pub fn converged(&self) -> bool {
        self.converged
    }
}

/// The ISM and RWC matrices of all annotated objects
#[derive(Debug, Clone)]
pub struct IsmResult {
    matrix: Array2<f64>,
    rwc: Array2<f64>,
    objects: Vec<ObjectId>,
    degenerate: Vec<(usize, usize)>,
    iterations: usize,
    converged: bool,
}

impl IsmResult {
    /// The final ISM matrix
    ///
    /// Equal to the RWC matrix if no HSM was provided.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// The random walk contribution
    pub fn rwc(&self) -> &Array2<f64> {
        &self.rwc
    }

    /// The objects in row/column order
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Cells `(i, j)` with `i <= j` that hold `NaN`, either from a zero
    /// RWC denominator or from the HSM
    pub fn degenerate(&self) -> &[(usize, usize)] {
        &self.degenerate
    }

    /// Number of iterations of the random walk
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// `false` if the random walk stopped at the iteration limit
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Turns a non-converged walk into an error
    ///
    /// # Errors
    ///
    /// [`MeshError::NonConvergence`] if the walk did not converge
    pub fn ensure_converged(&self) -> MeshResult<()> {
        if self.converged {
            Ok(())
        } else {
            Err(MeshError::NonConvergence {
                iterations: self.iterations,
            })
        }
    }

    /// Converts the ISM matrix into an [`ObjectSimilarity`]
    pub fn into_similarity(self) -> ObjectSimilarity {
        ObjectSimilarity::new(self.matrix, self.objects, self.degenerate, None)
    }
}

/// Calculates the ISM of all objects of a [`Universe`]
pub struct Ism<'a> {
    thesaurus: &'a Thesaurus,
    universe: &'a Universe,
    config: IsmConfig,
}

impl<'a> Ism<'a> {
    /// Constructs a new `Ism` with the default [`IsmConfig`]
    pub fn new(thesaurus: &'a Thesaurus, universe: &'a Universe) -> Self {
        Self::with_config(thesaurus, universe, IsmConfig::default())
    }

    /// Constructs a new `Ism` with custom walk parameters
    pub fn with_config(thesaurus: &'a Thesaurus, universe: &'a Universe, config: IsmConfig) -> Self {
        Self {
            thesaurus,
            universe,
            config,
        }
    }

    fn node(&self, descriptor: usize) -> MeshResult<&'a ThesaurusNode> {
        self.thesaurus
            .get_node(self.universe.descriptor(descriptor).as_str())
    }

    /// Universe indices of all annotated descriptors without children
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if a descriptor is missing from the thesaurus
    pub fn leaves(&self) -> MeshResult<Vec<usize>> {
        let mut leaves = Vec::new();
        for idx in 0..self.universe.num_descriptors() {
            if self.node(idx)?.is_leaf() {
                leaves.push(idx);
            }
        }
        Ok(leaves)
    }

    /// The column-wise transition matrix `P[child, parent]`
    ///
    /// `P[c, v] = (1 - |N_v*| / N_v) · N_c / N_u` where `N_v*` are the
    /// objects of `v` not annotated to any of its annotated children and
    /// `N_u` is the sum of the counts of those children.
    ///
    /// Every column is the outgoing mass of one descriptor and sums to at
    /// most `1`. Rows are not bounded: a leaf keeps its own mass and
    /// receives the mass of its parents.
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if a descriptor is missing from the thesaurus
    pub fn transition_matrix(&self) -> MeshResult<Array2<f64>> {
        let n = self.universe.num_descriptors();
        let mut p = Array2::<f64>::zeros((n, n));
        for v in 0..n {
            let node = self.node(v)?;
            if node.is_leaf() {
                p[[v, v]] = 1.0;
                continue;
            }
            let children: Vec<usize> = node
                .children_indices()
                .iter()
                .filter_map(|idx| self.thesaurus.node_at(idx))
                .filter_map(|child| self.universe.descriptor_index(child.id().as_str()))
                .collect();
            if children.is_empty() {
                trace!("{} has no annotated children", node.id());
                continue;
            }

            let objects = self.universe.annotated_objects(v);
            let covered = children.iter().fold(IndexGroup::new(), |acc, c| {
                &acc | self.universe.annotated_objects(*c)
            });
            let n_v = self.universe.count(v);
            let n_v_star = n_v - covered.intersection_len(objects);
            let leave = 1.0 - count_to_f64(n_v_star) / count_to_f64(n_v);
            let n_u: usize = children.iter().map(|c| self.universe.count(*c)).sum();

            for c in children {
                p[[c, v]] = leave * count_to_f64(self.universe.count(c)) / count_to_f64(n_u);
            }
        }
        Ok(p)
    }

    /// Iterates `W ← P · W`, starting from the identity
    pub fn walk(&self, p: &Array2<f64>) -> Walk {
        let mut w = Array2::<f64>::eye(p.nrows());
        for iteration in 1..=self.config.max_iterations {
            let next = p.dot(&w);
            let diff = (&next - &w).mapv(|x| x * x).sum().sqrt();
            w = next;
            trace!("Iteration {}: {}/{}", iteration, diff, self.config.epsilon);
            if diff <= self.config.epsilon {
                debug!("Random walk converged after {} iterations", iteration);
                return Walk {
                    matrix: w,
                    iterations: iteration,
                    converged: true,
                };
            }
        }
        warn!(
            "Random walk did not converge after {} iterations",
            self.config.max_iterations
        );
        Walk {
            matrix: w,
            iterations: self.config.max_iterations,
            converged: false,
        }
    }

    /// The descriptor-by-object matrix `A[v, i] = 1 / |S_v|`
    ///
    /// `v` is a direct annotation of object `i` and `S_v` are all leaves
    /// below `v` in the thesaurus, `v` itself if it is a leaf.
    ///
    /// # Errors
    ///
    /// [`MeshError::NotFound`] if a descriptor is missing from the thesaurus
    pub fn annotation_matrix(&self) -> MeshResult<Array2<f64>> {
        let mut a =
            Array2::<f64>::zeros((self.universe.num_descriptors(), self.universe.num_objects()));
        for i in 0..self.universe.num_objects() {
            for v in self.universe.direct_annotations(i) {
                let idx = self
                    .thesaurus
                    .node_index(self.universe.descriptor(v).as_str())?;
                let leaves = self
                    .thesaurus
                    .descendant_indices(idx)
                    .iter()
                    .filter(|d| self.thesaurus.node_at(*d).map_or(false, ThesaurusNode::is_leaf))
                    .count();
                a[[v, i]] = 1.0 / count_to_f64(leaves.max(1));
            }
        }
        Ok(a)
    }

    /// The random walk contribution of every pair of objects
    ///
    /// `RWC(i, j) = b_i·b_j / (Σ b_i + Σ b_j - b_i·b_j)` with `b_i` the
    /// `i`-th column of `B`. Cells with a zero denominator hold `NaN` and
    /// are returned as second value.
    pub fn random_walk_contribution(&self, b: &Array2<f64>) -> (Array2<f64>, Vec<(usize, usize)>) {
        let n = b.ncols();
        let colsum = b.sum_axis(Axis(0));
        let mut rwc = Array2::<f64>::zeros((n, n));
        let mut degenerate = Vec::new();
        for (i, j) in TrianglePairs::new(n) {
            let shared = b.column(i).dot(&b.column(j));
            let denominator = colsum[i] + colsum[j] - shared;
            let value = if denominator == 0.0 {
                warn!(
                    "Undefined random walk contribution of {} and {}",
                    self.universe.object(i),
                    self.universe.object(j)
                );
                degenerate.push((i, j));
                f64::NAN
            } else {
                shared / denominator
            };
            rwc[[i, j]] = value;
            rwc[[j, i]] = value;
        }
        (rwc, degenerate)
    }

    /// Runs all steps and blends the RWC with the `hsm`
    ///
    /// `ISM = 0.5 · (RWC + HSM)`. Without `hsm`, the ISM is the RWC.
    /// A walk that hits the iteration limit is not an error, check
    /// [`IsmResult::converged`] or [`IsmResult::ensure_converged`].
    ///
    /// # Errors
    ///
    /// - [`MeshError::DimensionMismatch`] if `hsm` is not a square matrix
    ///   of the number of objects
    /// - [`MeshError::NotFound`] if a descriptor is missing from the thesaurus
    pub fn compute(&self, hsm: Option<&Array2<f64>>) -> MeshResult<IsmResult> {
        let n = self.universe.num_objects();
        if let Some(hsm) = hsm {
            let (rows, cols) = hsm.dim();
            if rows != n || cols != n {
                return Err(MeshError::DimensionMismatch {
                    expected: n,
                    found: if rows == n { cols } else { rows },
                });
            }
        }

        let p = self.transition_matrix()?;
        let walk = self.walk(&p);
        let leaves = self.leaves()?;
        let a = self.annotation_matrix()?;
        let b = walk.matrix.select(Axis(0), &leaves).dot(&a);
        let (rwc, mut degenerate) = self.random_walk_contribution(&b);

        let matrix = match hsm {
            Some(hsm) => {
                degenerate.extend(TrianglePairs::new(n).filter(|(i, j)| hsm[[*i, *j]].is_nan()));
                degenerate.sort_unstable();
                degenerate.dedup();
                (&rwc + hsm) * 0.5
            }
            None => rwc.clone(),
        };

        Ok(IsmResult {
            matrix,
            rwc,
            objects: self.universe.objects().to_vec(),
            degenerate,
            iterations: walk.iterations,
            converged: walk.converged,
        })
    }
}

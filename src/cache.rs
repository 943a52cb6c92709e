//! Reuse of similarity matrices across runs
//!
//! A [`MatrixCache`] stores the descriptor and object matrices of a
//! [`Measure`] for one [`CategorySubset`]. [`CachedSimilarity`] wraps a
//! [`SemanticSimilarity`] and only calculates the matrices that are
//! missing from the cache.
//!
//! Matrices restored from a cache carry no provenance and no
//! similarity distribution.
use std::collections::HashMap;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::{debug, info};

use crate::similarity::{DescriptorSimilarity, MeasureResult, ObjectSimilarity};
use crate::thesaurus::CategorySubset;
use crate::utils::TrianglePairs;
use crate::{Measure, MeshError, MeshResult, SemanticSimilarity};

/// The two kinds of cached matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    /// Descriptor by descriptor
    PerDescriptor,
    /// Object by object
    PerObject,
}

impl Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixKind::PerDescriptor => write!(f, "per_descriptor"),
            MatrixKind::PerObject => write!(f, "per_object"),
        }
    }
}

/// Identifies a cached matrix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    measure: String,
    kind: MatrixKind,
    subset: String,
}

impl CacheKey {
    /// Constructs a new key
    ///
    /// The descriptor matrix of a termwise measure does not depend on the
    /// selection strategy, so it is keyed by the measure name only.
    pub fn new(measure: &Measure, kind: MatrixKind, subset: &CategorySubset) -> Self {
        let measure = match kind {
            MatrixKind::PerDescriptor => measure.name().to_string(),
            MatrixKind::PerObject => measure.to_string(),
        };
        Self {
            measure,
            kind,
            subset: subset.to_string(),
        }
    }

    /// The kind of the cached matrix
    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    /// A file name that is unique for the key, e.g. `LIN_TWO_per_descriptor.tsv`
    pub fn file_name(&self) -> String {
        format!("{}_{}_{}.tsv", self.measure, self.subset, self.kind)
    }
}

/// Storage of similarity matrices
pub trait MatrixCache {
    /// Returns the matrix of the `key`, if present
    ///
    /// # Errors
    ///
    /// If the storage cannot be read or holds invalid data
    fn load(&self, key: &CacheKey) -> MeshResult<Option<Array2<f64>>>;

    /// Stores the matrix of the `key`, replacing an existing one
    ///
    /// # Errors
    ///
    /// If the storage cannot be written
    fn store(&mut self, key: &CacheKey, matrix: &Array2<f64>) -> MeshResult<()>;
}

/// An in-memory [`MatrixCache`]
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    matrices: HashMap<CacheKey, Array2<f64>>,
}

impl MemoryCache {
    /// Constructs an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached matrices
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// Returns `true` if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

impl MatrixCache for MemoryCache {
    fn load(&self, key: &CacheKey) -> MeshResult<Option<Array2<f64>>> {
        Ok(self.matrices.get(key).cloned())
    }

    fn store(&mut self, key: &CacheKey, matrix: &Array2<f64>) -> MeshResult<()> {
        self.matrices.insert(key.clone(), matrix.clone());
        Ok(())
    }
}

/// A [`MatrixCache`] of tab-separated text files in one directory
///
/// Every matrix row is one line.
#[derive(Debug, Clone)]
pub struct TsvCache {
    dir: PathBuf,
}

impl TsvCache {
    /// Uses `dir` for all cache files. The directory is created on the
    /// first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The path of the file of the `key`
    pub fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> MeshError {
    MeshError::CannotOpenFile(format!("{}: {}", path.display(), err))
}

impl MatrixCache for TsvCache {
    fn load(&self, key: &CacheKey) -> MeshResult<Option<Array2<f64>>> {
        let path = self.path(key);
        if !path.is_file() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(&path).map_err(|err| io_error(&path, &err))?);

        let mut values = Vec::new();
        let mut rows = 0;
        let mut cols = None;
        for line in reader.lines() {
            let line = line.map_err(|err| io_error(&path, &err))?;
            if line.is_empty() {
                continue;
            }
            let row = line
                .split('\t')
                .map(str::parse::<f64>)
                .collect::<Result<Vec<f64>, _>>()?;
            match cols {
                Some(n) if n != row.len() => {
                    return Err(MeshError::InvalidInput(format!(
                        "{}: row {} has {} columns instead of {}",
                        path.display(),
                        rows + 1,
                        row.len(),
                        n
                    )))
                }
                _ => cols = Some(row.len()),
            }
            values.extend(row);
            rows += 1;
        }
        debug!("Loaded {} rows from {}", rows, path.display());
        let matrix = Array2::from_shape_vec((rows, cols.unwrap_or(0)), values)
            .map_err(|err| MeshError::InvalidInput(err.to_string()))?;
        Ok(Some(matrix))
    }

    fn store(&mut self, key: &CacheKey, matrix: &Array2<f64>) -> MeshResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|err| io_error(&self.dir, &err))?;
        let path = self.path(key);
        let file = File::create(&path).map_err(|err| io_error(&path, &err))?;
        let mut writer = BufWriter::new(file);
        for row in matrix.rows() {
            let line = row
                .iter()
                .map(f64::to_string)
                .collect::<Vec<String>>()
                .join("\t");
            writeln!(writer, "{line}").map_err(|err| io_error(&path, &err))?;
        }
        writer.flush().map_err(|err| io_error(&path, &err))?;
        debug!("Stored {} rows in {}", matrix.nrows(), path.display());
        Ok(())
    }
}

/// Runs a [`SemanticSimilarity`] through a [`MatrixCache`]
///
/// # Examples
///
/// ```
/// use meshsim::{Annotation, Measure, SemanticSimilarity, Thesaurus, ThesaurusNode};
/// use meshsim::cache::{CachedSimilarity, MemoryCache};
/// use meshsim::thesaurus::CategorySubset;
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
/// let mut cached = CachedSimilarity::new(&engine, MemoryCache::new(), CategorySubset::Two);
/// let measure: Measure = "resnik".parse().unwrap();
///
/// let first = cached.compute(&measure).unwrap();
/// assert!(first.descriptors().unwrap().provenance().is_some());
/// assert_eq!(cached.cache().len(), 2);
///
/// let second = cached.compute(&measure).unwrap();
/// assert!(second.descriptors().unwrap().provenance().is_none());
/// assert_eq!(first.objects().matrix(), second.objects().matrix());
/// ```
pub struct CachedSimilarity<'a, C: MatrixCache> {
    engine: &'a SemanticSimilarity,
    cache: C,
    subset: CategorySubset,
}

impl<'a, C: MatrixCache> CachedSimilarity<'a, C> {
    /// Constructs a new `CachedSimilarity`
    pub fn new(engine: &'a SemanticSimilarity, cache: C, subset: CategorySubset) -> Self {
        Self {
            engine,
            cache,
            subset,
        }
    }

    /// The underlying cache
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Consumes `self` and returns the cache
    pub fn into_cache(self) -> C {
        self.cache
    }

    fn load_checked(&self, key: &CacheKey, expected: usize) -> MeshResult<Option<Array2<f64>>> {
        match self.cache.load(key)? {
            Some(matrix) => {
                let (rows, cols) = matrix.dim();
                if rows != expected || cols != expected {
                    return Err(MeshError::DimensionMismatch {
                        expected,
                        found: if rows == expected { cols } else { rows },
                    });
                }
                info!("Using cached {}", key.file_name());
                Ok(Some(matrix))
            }
            None => Ok(None),
        }
    }

    /// Returns the matrices of the `measure`, calculating and storing
    /// only the ones missing from the cache
    ///
    /// # Errors
    ///
    /// - Any error of the cache
    /// - [`MeshError::DimensionMismatch`] if a cached matrix does not match
    ///   the universe
    /// - Any error of [`SemanticSimilarity::compute`]
    pub fn compute(&mut self, measure: &Measure) -> MeshResult<MeasureResult> {
        let universe = self.engine.universe();
        let object_key = CacheKey::new(measure, MatrixKind::PerObject, &self.subset);

        let descriptors = match measure {
            Measure::Termwise(term_measure, _) => {
                let key = CacheKey::new(measure, MatrixKind::PerDescriptor, &self.subset);
                match self.load_checked(&key, universe.num_descriptors())? {
                    Some(matrix) => Some(DescriptorSimilarity::new(matrix, None)),
                    None => {
                        let result = self.engine.per_descriptor(term_measure)?;
                        self.cache.store(&key, result.matrix())?;
                        Some(result)
                    }
                }
            }
            Measure::Objectwise(_) => None,
        };

        if let Some(matrix) = self.load_checked(&object_key, universe.num_objects())? {
            let degenerate = TrianglePairs::new(matrix.nrows())
                .filter(|(i, j)| matrix[[*i, *j]].is_nan())
                .collect();
            let objects =
                ObjectSimilarity::new(matrix, universe.objects().to_vec(), degenerate, None);
            return Ok(MeasureResult::new(descriptors, objects));
        }

        let objects = match (measure, &descriptors) {
            (Measure::Termwise(_, strategy), Some(descriptors)) => {
                self.engine.per_object_termwise(descriptors, *strategy)?
            }
            (Measure::Objectwise(object_measure), _) => {
                self.engine.per_object_objectwise(object_measure)?
            }
            (Measure::Termwise(term_measure, strategy), None) => {
                let descriptors = self.engine.per_descriptor(term_measure)?;
                self.engine.per_object_termwise(&descriptors, *strategy)?
            }
        };
        self.cache.store(&object_key, objects.matrix())?;
        Ok(MeasureResult::new(descriptors, objects))
    }
}

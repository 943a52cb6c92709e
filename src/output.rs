//! Tab-separated writers for similarity results
//!
//! ```
//! use meshsim::{Annotation, Measure, SemanticSimilarity, Thesaurus, ThesaurusNode};
//! use meshsim::output::write_triples;
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
//! let engine = SemanticSimilarity::new(&thesaurus, &annotation).unwrap();
//! let result = engine.compute(&"simui".parse::<Measure>().unwrap()).unwrap();
//!
//! let mut buffer = Vec::new();
//! write_triples(&mut buffer, result.objects()).unwrap();
//! assert_eq!(String::from_utf8(buffer).unwrap(), "X\tX\t1\nX\tY\t0.5\nY\tY\t1\n");
//! ```
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::similarity::{ObjectSimilarity, PairDistribution, Provenance};
use crate::{MeshError, MeshResult};

/// Header line of [`write_distribution`]
pub const DISTRIBUTION_HEADER: &str = "#disease A\tdisease B\tmax_similarity\tmin_similarity\tmean_similarity\tmedian_similarity\tstandard_deviation";

fn io_error(err: &std::io::Error) -> MeshError {
    MeshError::CannotOpenFile(err.to_string())
}

/// Creates (or truncates) a file for one of the writers
///
/// # Errors
///
/// [`MeshError::CannotOpenFile`] if the file cannot be created
pub fn create<P: AsRef<Path>>(path: P) -> MeshResult<BufWriter<File>> {
    let path = path.as_ref();
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| MeshError::CannotOpenFile(format!("{}: {}", path.display(), err)))
}

/// Writes `object1 <TAB> object2 <TAB> score` for every pair `i <= j`
/// with a non-zero score
///
/// Undefined scores are written as `NaN`.
///
/// # Errors
///
/// [`MeshError::CannotOpenFile`] if writing fails
pub fn write_triples<W: Write>(mut writer: W, similarity: &ObjectSimilarity) -> MeshResult<()> {
    for (object1, object2, value) in similarity.triples() {
        writeln!(writer, "{object1}\t{object2}\t{value}").map_err(|err| io_error(&err))?;
    }
    writer.flush().map_err(|err| io_error(&err))
}

/// Writes `descriptor1 <TAB> descriptor2 <TAB> ancestor <TAB> score`
/// for every descriptor pair
///
/// # Errors
///
/// [`MeshError::CannotOpenFile`] if writing fails
pub fn write_provenance<W: Write>(mut writer: W, provenance: &[Provenance]) -> MeshResult<()> {
    for record in provenance {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            record.descriptor1, record.descriptor2, record.ancestor, record.value
        )
        .map_err(|err| io_error(&err))?;
    }
    writer.flush().map_err(|err| io_error(&err))
}

/// Writes the score statistics of every object pair, preceded by
/// [`DISTRIBUTION_HEADER`]
///
/// # Errors
///
/// [`MeshError::CannotOpenFile`] if writing fails
pub fn write_distribution<W: Write>(
    mut writer: W,
    distribution: &[PairDistribution],
) -> MeshResult<()> {
    writeln!(writer, "{DISTRIBUTION_HEADER}").map_err(|err| io_error(&err))?;
    for pair in distribution {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            pair.object1, pair.object2, pair.max, pair.min, pair.mean, pair.median, pair.std_dev
        )
        .map_err(|err| io_error(&err))?;
    }
    writer.flush().map_err(|err| io_error(&err))
}

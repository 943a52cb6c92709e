//! Computes the plain set overlaps of the direct annotations of all diseases
//!
//! ```bash
//! cargo run --release --example simple_similarities -- \
//!     d2024.bin annotations.tsv ./simple/
//! ```
//!
//! Arguments:
//! 1. MeSH ASCII descriptor file
//! 2. Annotation file (`OMIM_ID DESCRIPTOR ...`)
//! 3. Output folder
//!
//! Every measure (`JACCARD`, `DICE`, `OVERLAP`, `NUM_COMMON`) is calculated
//! once per MeSH category, written to `<code>_<measure>`, and once for the
//! five main categories and for all categories combined, written to
//! `5categories_<measure>` and `combinedCategories_<measure>`.
//! Only pairs of two different diseases with a positive score are written.
//! Set `RUST_LOG=debug` for detailed logging.
use std::env;
use std::io::Write;
use std::path::Path;
use std::process;

use meshsim::similarity::{ObjectMeasure, ObjectSimilarity};
use meshsim::thesaurus::{CategorySubset, MESH_CATEGORIES};
use meshsim::{output, Annotation, MeshError, MeshResult, SemanticSimilarity, Thesaurus};

const MEASURES: [ObjectMeasure; 4] = [
    ObjectMeasure::Jaccard,
    ObjectMeasure::Dice,
    ObjectMeasure::Overlap,
    ObjectMeasure::NumCommon,
];

fn usage() -> ! {
    println!("Usage:");
    println!("simple_similarities <descriptors_file> <annotation_file> <output_folder>");
    process::exit(1)
}

/// Writes `object1 <TAB> object2 <TAB> score` for all pairs of two
/// different objects with a positive score
fn write_pairs(path: &Path, similarity: &ObjectSimilarity) -> MeshResult<()> {
    let mut writer = output::create(path)?;
    let mut written = 0usize;
    for (object1, object2, value) in similarity.triples() {
        if object1 == object2 || value.is_nan() || value <= 0.0 {
            continue;
        }
        writeln!(writer, "{object1}\t{object2}\t{value:.6}")
            .map_err(|err| MeshError::CannotOpenFile(err.to_string()))?;
        written += 1;
    }
    writer
        .flush()
        .map_err(|err| MeshError::CannotOpenFile(err.to_string()))?;
    println!("\t- {} pairs in {}", written, path.display());
    Ok(())
}

/// Runs all measures on the annotations restricted to `categories`
fn compute(
    thesaurus: &Thesaurus,
    annotation_file: &str,
    out_dir: &Path,
    prefix: &str,
    categories: &[&str],
) -> MeshResult<()> {
    let annotation = Annotation::from_file(annotation_file, thesaurus, Some(categories))?;
    let engine = SemanticSimilarity::new(thesaurus, &annotation)?;
    for measure in MEASURES {
        let similarity = engine.per_object_objectwise(&measure)?;
        let name = meshsim::Measure::Objectwise(measure).name().to_lowercase();
        write_pairs(&out_dir.join(format!("{prefix}_{name}")), &similarity)?;
    }
    Ok(())
}

fn run(args: &[String]) -> MeshResult<()> {
    let out_dir = Path::new(&args[3]);
    std::fs::create_dir_all(out_dir).map_err(|err| MeshError::CannotOpenFile(err.to_string()))?;

    println!("\t- Loading thesaurus");
    let thesaurus = Thesaurus::from_mesh_ascii(&args[1], &CategorySubset::All.codes(), true)?;

    println!("Per category");
    for (code, name) in MESH_CATEGORIES {
        println!("\t- {code} ({name})");
        match compute(&thesaurus, &args[2], out_dir, code, &[code]) {
            Err(MeshError::UnknownCategory(code)) => {
                println!("\t- Skipping {code}, no descriptors in this MeSH version");
            }
            other => other?,
        }
    }

    println!("Combined");
    for (prefix, subset) in [
        ("5categories", CategorySubset::Five),
        ("combinedCategories", CategorySubset::All),
    ] {
        let present: Vec<&str> = subset
            .codes()
            .into_iter()
            .filter(|code| thesaurus.category_name(code).is_some())
            .collect();
        compute(&thesaurus, &args[2], out_dir, prefix, &present)?;
    }
    Ok(())
}

fn main() {
    simple_logger::init_with_env().unwrap();
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        usage();
    }
    if let Err(err) = run(&args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

//! Computes the similarity of all annotated diseases
//!
//! ```bash
//! cargo run --release --example combined_similarity -- \
//!     d2024.bin annotations.tsv lin yes two [suffix]
//! ```
//!
//! Arguments:
//! 1. MeSH ASCII descriptor file
//! 2. Annotation file (`OMIM_ID DESCRIPTOR ...`)
//! 3. Measure (`RESNIK`, `LIN`, `JIANG`, `SCHLICKER`, `SIMUI`, `SIMGIC`),
//!    termwise measures accept a strategy suffix, e.g. `LIN-ALFONSO`
//! 4. `YES` to additionally compute the ISM
//! 5. Category subset (`TWO`, `FIVE`, `ALL` or a comma separated list)
//! 6. Optional suffix of the output file
//!
//! Matrices are cached in `./Cache`, all results are written to `./localStore`.
//! Set `RUST_LOG=debug` for detailed logging.
use std::env;
use std::path::Path;
use std::process;
use std::time::SystemTime;

use meshsim::cache::{CachedSimilarity, TsvCache};
use meshsim::output;
use meshsim::thesaurus::CategorySubset;
use meshsim::{Annotation, Ism, Measure, MeshResult, SemanticSimilarity, Thesaurus};

fn usage() -> ! {
    println!("Usage:");
    println!("combined_similarity <descriptors_file> <annotation_file> <measure> <ism: yes|no> <subset: TWO|FIVE|ALL> [suffix]");
    process::exit(1)
}

fn run(args: &[String]) -> MeshResult<()> {
    let measure: Measure = args[3].parse()?;
    let compute_ism = args[4].eq_ignore_ascii_case("yes");
    let subset: CategorySubset = args[5].parse()?;
    let suffix = args.get(6).map_or("", String::as_str);

    let out_dir = Path::new("./localStore");
    std::fs::create_dir_all(out_dir)
        .map_err(|err| meshsim::MeshError::CannotOpenFile(err.to_string()))?;

    let start = SystemTime::now();
    println!("\t- Loading thesaurus with categories {subset}");
    let thesaurus = Thesaurus::from_mesh_ascii(&args[1], &subset.codes(), true)?;

    println!("\t- Obtaining annotation");
    let annotation = Annotation::from_file(&args[2], &thesaurus, None)?;

    println!("\t- Computing {measure}");
    let engine = SemanticSimilarity::new(&thesaurus, &annotation)?;
    let mut cached = CachedSimilarity::new(&engine, TsvCache::new("./Cache"), subset.clone());
    let result = cached.compute(&measure)?;

    let file_name = format!("combined_similarity-{}_{}{}", subset, measure.name(), suffix);
    println!("\t- Writing {file_name}");
    output::write_triples(output::create(out_dir.join(&file_name))?, result.objects())?;

    if let Some(provenance) = result.descriptors().and_then(|d| d.provenance()) {
        output::write_provenance(
            output::create(out_dir.join(format!("{file_name}-LCA")))?,
            provenance,
        )?;
    }
    if let Some(distribution) = result.objects().distribution() {
        output::write_distribution(output::create(out_dir.join("sim_distribution"))?, distribution)?;
    }
    if !result.objects().degenerate().is_empty() {
        println!(
            "\t- {} pairs without a defined similarity",
            result.objects().degenerate().len()
        );
    }

    if compute_ism {
        println!("\t- Computing ISM for {measure}");
        let ism = Ism::new(&thesaurus, engine.universe()).compute(Some(result.objects().matrix()))?;
        if let Err(err) = ism.ensure_converged() {
            println!("\t- Warning: {err}");
        }
        let file_name = format!("ISM-combined_similarity-{}", measure.name());
        println!("\t- Writing {file_name}");
        output::write_triples(
            output::create(out_dir.join(file_name))?,
            &ism.into_similarity(),
        )?;
    }

    if let Ok(duration) = SystemTime::now().duration_since(start) {
        println!("Done in {} sec", duration.as_secs());
    }
    Ok(())
}

fn main() {
    simple_logger::init_with_env().unwrap();
    let args: Vec<String> = env::args().collect();
    if args.len() < 6 {
        usage();
    }
    if let Err(err) = run(&args) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

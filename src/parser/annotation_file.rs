//! Every line holds an object id followed by its descriptor ids, separated
//! by whitespace:
//!
//! ```text
//! 222100	D003922	D003930
//! 125853	D003924	D010179
//! ```
//!
//! If an object occurs on multiple lines, only the last line is used.
//! Descriptors that are not part of the thesaurus are skipped.
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, trace};

use crate::{Annotation, DescriptorId, MeshError, MeshResult, Thesaurus};

/// Parses annotation lines from `reader`
///
/// If `categories` is given, only descriptors of these categories are
/// annotated, directly or by propagation.
///
/// # Errors
///
/// - [`MeshError::UnknownCategory`] if a category is not part of the thesaurus
/// - [`MeshError::InvalidInput`] if the reader fails
pub fn parse<R: BufRead>(
    reader: R,
    thesaurus: &Thesaurus,
    categories: Option<&[&str]>,
) -> MeshResult<Annotation> {
    let mut annotation = Annotation::default();
    if let Some(categories) = categories {
        let mut valid: HashSet<DescriptorId> = HashSet::new();
        for category in categories {
            if thesaurus.category_name(category).is_none() {
                return Err(MeshError::UnknownCategory((*category).to_string()));
            }
            valid.extend(thesaurus.nodes_by_category(category).cloned());
        }
        debug!("Restricting annotations to {} descriptors", valid.len());
        annotation.set_valid_descriptors(valid);
    }

    let mut data: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in reader.lines() {
        let line = line.map_err(|err| MeshError::InvalidInput(err.to_string()))?;
        let mut fields = line.split_whitespace();
        let Some(object) = fields.next() else {
            continue;
        };
        if object.starts_with('#') {
            continue;
        }
        let descriptors = fields.map(str::to_string).collect();
        if data.insert(object.to_string(), descriptors).is_some() {
            debug!("Replacing previous annotations of {}", object);
        }
    }

    for (object, descriptors) in &data {
        let mut annotated = false;
        for descriptor in descriptors {
            if thesaurus.node_index(descriptor).is_err() {
                trace!("Skipping {} of {}, not in the thesaurus", descriptor, object);
                continue;
            }
            if annotation.annotate(thesaurus, object, descriptor)? {
                annotated = true;
            } else {
                trace!("Skipping {} of {}, not a valid descriptor", descriptor, object);
            }
        }
        if !annotated {
            debug!("Skipping {}, no valid annotations", object);
        }
    }
    Ok(annotation)
}

/// Reads the annotation file at `path`
///
/// See [`parse`]
///
/// # Errors
///
/// [`MeshError::CannotOpenFile`] if the file cannot be opened, otherwise see [`parse`]
pub fn load<P: AsRef<Path>>(
    path: P,
    thesaurus: &Thesaurus,
    categories: Option<&[&str]>,
) -> MeshResult<Annotation> {
    let filename = path.as_ref().display().to_string();
    let file = File::open(path).map_err(|_| MeshError::CannotOpenFile(filename))?;
    parse(BufReader::new(file), thesaurus, categories)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures;

    #[test]
    fn last_line_wins() {
        let thesaurus = fixtures::dag();
        let data = "100100\tD3\n100100\tD5\n100200 D4 D9\n";
        let annotation = parse(data.as_bytes(), &thesaurus, None).unwrap();
        assert_eq!(annotation.num_objects(), 2);
        let direct: Vec<&str> = annotation
            .direct_annotations("100100")
            .iter()
            .map(DescriptorId::as_str)
            .collect();
        assert_eq!(direct, vec!["D5"]);
        // D9 is unknown
        assert_eq!(annotation.direct_annotations("100200").len(), 1);
    }

    #[test]
    fn category_filter() {
        let thesaurus = fixtures::dag();
        let data = "100100\tD3\tD5\n100400\tD5\n";
        let annotation = parse(data.as_bytes(), &thesaurus, Some(&["C"])).unwrap();
        assert_eq!(annotation.num_objects(), 1);
        assert_eq!(annotation.num_annotations("D5"), 0);
        assert_eq!(annotation.num_annotations("C"), 1);
        assert_eq!(annotation.num_annotations("GEN"), 0);
    }

    #[test]
    fn unknown_category() {
        let thesaurus = fixtures::dag();
        assert!(matches!(
            parse("".as_bytes(), &thesaurus, Some(&["Z"])),
            Err(MeshError::UnknownCategory(code)) if code == "Z"
        ));
    }

    #[test]
    fn fixture_files() {
        let thesaurus = Thesaurus::from_mesh_ascii("tests/small_mesh.bin", &["A", "C"], true).unwrap();
        let annotation = load("tests/annotations.tsv", &thesaurus, None).unwrap();
        // 168600 is only annotated to a chemical
        assert_eq!(annotation.num_objects(), 5);
        assert_eq!(annotation.num_annotations("D003920"), 5);
        assert_eq!(annotation.direct_annotations("604367").len(), 2);
        assert_eq!(annotation.num_annotations("GEN"), 5);

        let restricted = load("tests/annotations.tsv", &thesaurus, Some(&["C"])).unwrap();
        assert_eq!(restricted.num_annotations("D010179"), 0);
        assert_eq!(restricted.direct_annotations("601283").len(), 1);
        assert_eq!(restricted.num_annotations("GEN"), 0);
    }
}

//! The ASCII descriptor file consists of records separated by blank lines.
//! Every line of a record is a `KEY = value` pair. Only the following keys
//! are used:
//!
//! ```text
//! *NEWRECORD
//! RECTYPE = D
//! MH = Diabetes Mellitus
//! PRINT ENTRY = Diabetes Mellitus, Insulin-Dependent|T047|NON|EQV|||ABX|
//! ENTRY = IDDM
//! MN = C18.452.394.750
//! MN = C19.246
//! UI = D003920
//! ```
//!
//! - `UI`: the descriptor id
//! - `MH`: the main heading, used as name
//! - `MN`: a tree position, can occur multiple times
//! - `ENTRY` / `PRINT ENTRY`: a synonym, everything after the first `|` is dropped
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::thesaurus::builder::LooseCollection;
use crate::thesaurus::Builder;
use crate::{MeshError, MeshResult, Thesaurus, ThesaurusNode};

#[derive(Debug, Default)]
struct Record {
    id: Option<String>,
    name: String,
    positions: Vec<String>,
    synonyms: Vec<String>,
}

impl Record {
    fn is_empty(&self) -> bool {
        self.id.is_none() && self.positions.is_empty()
    }

    fn parse_line(&mut self, line: &str) {
        if let Some(id) = line.strip_prefix("UI = ") {
            self.id = Some(id.trim().to_string());
        } else if let Some(name) = line.strip_prefix("MH = ") {
            self.name = name.trim().to_string();
        } else if let Some(position) = line.strip_prefix("MN = ") {
            self.positions.push(position.trim().to_string());
        } else if let Some(entry) = line
            .strip_prefix("ENTRY = ")
            .or_else(|| line.strip_prefix("PRINT ENTRY = "))
        {
            let synonym = entry.split('|').next().unwrap_or(entry).trim();
            if !synonym.is_empty() {
                self.synonyms.push(synonym.to_string());
            }
        }
    }

    fn into_node(self) -> Option<ThesaurusNode> {
        let Some(id) = self.id else {
            warn!("Skipping record without UI: {}", self.name);
            return None;
        };
        let positions: Vec<&str> = self.positions.iter().map(String::as_str).collect();
        let mut node = ThesaurusNode::new(id.as_str(), &self.name, &positions);
        for synonym in &self.synonyms {
            node.add_synonym(synonym);
        }
        Some(node)
    }
}

fn add_record(builder: &mut Builder<LooseCollection>, record: Record) -> usize {
    match record.into_node() {
        Some(node) => usize::from(builder.add_node(node)),
        None => 0,
    }
}

/// Parses MeSH records from `reader` and builds the thesaurus
///
/// # Errors
///
/// - [`MeshError::UnknownCategory`] if a category code is unknown
/// - [`MeshError::InvalidInput`] if the reader fails
/// - [`MeshError::OntologyInconsistency`] if a tree position has no parent
pub fn parse<R: BufRead>(
    reader: R,
    categories: &[&str],
    generic_root: bool,
) -> MeshResult<Thesaurus> {
    let mut builder = if generic_root {
        Builder::with_generic_root(categories)?
    } else {
        Builder::new(categories)?
    };

    let mut record = Record::default();
    let mut added = 0;
    let mut skipped = 0;
    for line in reader.lines() {
        let line = line.map_err(|err| MeshError::InvalidInput(err.to_string()))?;
        let line = line.trim();
        if line.is_empty() {
            if !record.is_empty() {
                let n = add_record(&mut builder, std::mem::take(&mut record));
                added += n;
                skipped += 1 - n;
            }
            continue;
        }
        record.parse_line(line);
    }
    if !record.is_empty() {
        let n = add_record(&mut builder, record);
        added += n;
        skipped += 1 - n;
    }
    debug!("Added {} descriptors, skipped {}", added, skipped);

    Ok(builder.terms_complete().connect_positions()?.build())
}

/// Reads the MeSH file at `path` and builds the thesaurus
///
/// See [`parse`]
///
/// # Errors
///
/// [`MeshError::CannotOpenFile`] if the file cannot be opened, otherwise see [`parse`]
pub fn load<P: AsRef<Path>>(
    path: P,
    categories: &[&str],
    generic_root: bool,
) -> MeshResult<Thesaurus> {
    let filename = path.as_ref().display().to_string();
    let file = File::open(path).map_err(|_| MeshError::CannotOpenFile(filename))?;
    parse(BufReader::new(file), categories, generic_root)
}

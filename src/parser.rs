//! Parsing the MeSH descriptor dump and disease annotation files

/// Module to parse the ASCII MeSH descriptor file (`d20xx.bin`)
pub mod mesh_ascii;

/// Module to parse `OBJECT DESCRIPTOR DESCRIPTOR ...` annotation files
pub mod annotation_file;

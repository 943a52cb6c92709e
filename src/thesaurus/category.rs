//! The top level categories of MeSH and presets of category subsets
use std::fmt::Display;
use std::str::FromStr;

use crate::MeshError;

/// All MeSH categories with their codes
pub const MESH_CATEGORIES: [(&str, &str); 16] = [
    ("A", "Anatomy"),
    ("B", "Organisms"),
    ("C", "Diseases"),
    ("D", "Chemicals and Drugs"),
    (
        "E",
        "Analytical, Diagnostic and Therapeutic Techniques and Equipment",
    ),
    ("F", "Psychiatry and Psychology"),
    ("G", "Phenomena and Processes"),
    ("H", "Disciplines and Occupations"),
    (
        "I",
        "Anthropology, Education, Sociology and Social Phenomena",
    ),
    ("J", "Technology, Industry, Agriculture"),
    ("K", "Humanities"),
    ("L", "Information Science"),
    ("M", "Named Groups"),
    ("N", "Health Care"),
    ("V", "Publication Characteristics"),
    ("Z", "Geographicals"),
];

/// Returns the name of the MeSH category `code`
///
/// # Examples
///
/// ```
/// use meshsim::thesaurus::category_name;
///
/// assert_eq!(category_name("C"), Some("Diseases"));
/// assert_eq!(category_name("X"), None);
/// ```
pub fn category_name(code: &str) -> Option<&'static str> {
    MESH_CATEGORIES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// A selection of MeSH categories used to build the thesaurus
///
/// # Examples
///
/// ```
/// use meshsim::thesaurus::CategorySubset;
///
/// let subset: CategorySubset = "five".parse().unwrap();
/// assert_eq!(subset.codes(), vec!["A", "C", "D", "E", "G"]);
/// assert_eq!(subset.to_string(), "FIVE");
///
/// let custom: CategorySubset = "C,D".parse().unwrap();
/// assert_eq!(custom.codes(), vec!["C", "D"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CategorySubset {
    /// Anatomy and Diseases
    Two,
    /// Anatomy, Diseases, Chemicals and Drugs, Techniques and Equipment,
    /// Phenomena and Processes
    Five,
    /// Every MeSH category
    #[default]
    All,
    /// A custom list of category codes
    Custom(Vec<String>),
}

impl CategorySubset {
    /// The category codes of the subset
    pub fn codes(&self) -> Vec<&str> {
        match self {
            CategorySubset::Two => vec!["A", "C"],
            CategorySubset::Five => vec!["A", "C", "D", "E", "G"],
            CategorySubset::All => MESH_CATEGORIES.iter().map(|(code, _)| *code).collect(),
            CategorySubset::Custom(codes) => codes.iter().map(String::as_str).collect(),
        }
    }
}

impl FromStr for CategorySubset {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TWO" => Ok(CategorySubset::Two),
            "FIVE" => Ok(CategorySubset::Five),
            "ALL" => Ok(CategorySubset::All),
            other => {
                let codes: Vec<String> = other
                    .split(',')
                    .map(|code| code.trim().to_string())
                    .collect();
                for code in &codes {
                    if category_name(code).is_none() {
                        return Err(MeshError::UnknownCategory(code.to_string()));
                    }
                }
                Ok(CategorySubset::Custom(codes))
            }
        }
    }
}

impl Display for CategorySubset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategorySubset::Two => write!(f, "TWO"),
            CategorySubset::Five => write!(f, "FIVE"),
            CategorySubset::All => write!(f, "ALL"),
            CategorySubset::Custom(codes) => write!(f, "{}", codes.join("")),
        }
    }
}

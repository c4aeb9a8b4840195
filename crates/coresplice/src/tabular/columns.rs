//! Column identities and header-name matching.
//!
//! Input files name their columns inconsistently ("Core Type", "Tool",
//! "Type"; "Top Depth CSF-A (m)", "TopDepth"). Each logical column is described
//! once as a [`ColumnIdentity`] with its accepted synonyms, and headers are
//! matched after unit suffixes, whitespace and case are stripped.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SpliceError;

static UNIT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid unit regex"));

static CASE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid case boundary regex"));

/// Expected datatype of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDatatype {
    Text,
    Numeric,
}

/// Naming scheme used for output headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputVocabulary {
    /// Internal canonical names, e.g. `TopDepthCSF`.
    Canonical,
    /// IODP names where defined, e.g. `Top Depth CSF-A`, `Core type`.
    #[default]
    Iodp,
    /// LacCore names where defined, e.g. `Tool`.
    LacCore,
}

impl FromStr for OutputVocabulary {
    type Err = SpliceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "canonical" | "internal" => Ok(OutputVocabulary::Canonical),
            "iodp" => Ok(OutputVocabulary::Iodp),
            "laccore" => Ok(OutputVocabulary::LacCore),
            _ => Err(SpliceError::Config(format!(
                "Unknown vocabulary: {}. Use canonical, iodp or laccore.",
                s
            ))),
        }
    }
}

impl fmt::Display for OutputVocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputVocabulary::Canonical => write!(f, "canonical"),
            OutputVocabulary::Iodp => write!(f, "iodp"),
            OutputVocabulary::LacCore => write!(f, "laccore"),
        }
    }
}

/// A logical column: canonical name plus everything it may be called in a file.
#[derive(Debug, Clone, Copy)]
pub struct ColumnIdentity {
    /// Canonical name, used as the key once a table is loaded.
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
    pub iodp_name: Option<&'static str>,
    pub laccore_name: Option<&'static str>,
    pub description: &'static str,
    pub datatype: ColumnDatatype,
    pub unit: Option<&'static str>,
    pub optional: bool,
}

impl ColumnIdentity {
    /// A required text column.
    pub const fn text(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            synonyms: &[],
            iodp_name: None,
            laccore_name: None,
            description,
            datatype: ColumnDatatype::Text,
            unit: None,
            optional: false,
        }
    }

    /// A required numeric column in the given unit.
    pub const fn numeric(name: &'static str, unit: &'static str, description: &'static str) -> Self {
        Self {
            datatype: ColumnDatatype::Numeric,
            unit: Some(unit),
            ..Self::text(name, description)
        }
    }

    pub const fn with_synonyms(self, synonyms: &'static [&'static str]) -> Self {
        Self { synonyms, ..self }
    }

    pub const fn with_iodp_name(self, name: &'static str) -> Self {
        Self {
            iodp_name: Some(name),
            ..self
        }
    }

    pub const fn with_laccore_name(self, name: &'static str) -> Self {
        Self {
            laccore_name: Some(name),
            ..self
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            optional: true,
            ..self
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.datatype == ColumnDatatype::Numeric
    }

    /// Does a raw header name this column? Organisation names count, so
    /// written files read back under any vocabulary.
    pub fn matches(&self, header: &str) -> bool {
        let normalized = normalize(header);
        std::iter::once(self.name)
            .chain(self.synonyms.iter().copied())
            .chain(self.iodp_name)
            .chain(self.laccore_name)
            .any(|name| normalize(name) == normalized)
    }

    /// Header to write for this column.
    ///
    /// Falls back to the IODP name, then to the canonical name split at case
    /// boundaries, when the vocabulary has no name of its own.
    pub fn output_name(&self, vocabulary: OutputVocabulary) -> String {
        let preferred = match vocabulary {
            OutputVocabulary::Canonical => return self.name.to_string(),
            OutputVocabulary::Iodp => self.iodp_name,
            OutputVocabulary::LacCore => self.laccore_name.or(self.iodp_name),
        };
        preferred
            .map(str::to_string)
            .unwrap_or_else(|| space_caps(self.name))
    }
}

/// Remove parenthesized substrings, e.g. units: `"Depth (m)"` → `"Depth "`.
pub fn strip_unit(name: &str) -> String {
    UNIT_SUFFIX.replace_all(name, "").into_owned()
}

/// Remove all whitespace and lower-case.
pub fn lowerstrip(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Comparison form of a header: units, whitespace and case removed.
pub fn normalize(name: &str) -> String {
    lowerstrip(&strip_unit(name))
}

/// Collapse spaces, then put one space at each lower→upper boundary:
/// `"TopDepthCSF"` → `"Top Depth CSF"`.
pub fn space_caps(name: &str) -> String {
    let collapsed: String = name.chars().filter(|c| *c != ' ').collect();
    CASE_BOUNDARY.replace_all(&collapsed, "$1 $2").into_owned()
}

/// Position of the first header matching each column, keyed by canonical name.
pub fn map_columns(
    columns: &[ColumnIdentity],
    headers: &[String],
) -> indexmap::IndexMap<&'static str, usize> {
    columns
        .iter()
        .filter_map(|column| {
            headers
                .iter()
                .position(|header| column.matches(header))
                .map(|index| (column.name, index))
        })
        .collect()
}

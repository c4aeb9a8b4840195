//! Core and section identities.
//!
//! A physical core is addressed by site, hole, core number and tool (core
//! type). Matching across tables uses [`CoreKey`], which drops the tool: core
//! numbers are unique within a hole, and tool codes are not always recorded
//! consistently between files.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpliceError};

/// Site + hole token, e.g. `1B` or `U1363B`.
static SITE_HOLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(U?[0-9]+)([A-Za-z]+)$").expect("valid site/hole regex"));

/// Core + tool token, e.g. `23H`. The tool may be absent.
static CORE_TOOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)([A-Za-z]*)$").expect("valid core/tool regex"));

/// Site, hole and core number: the key used to match a core across tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoreKey {
    pub site: String,
    pub hole: String,
    pub core: String,
}

impl CoreKey {
    pub fn new(site: impl Into<String>, hole: impl Into<String>, core: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            hole: hole.into(),
            core: core.into(),
        }
    }

    /// Key for a section of this core.
    pub fn section(&self, section: impl Into<String>) -> SectionKey {
        SectionKey {
            core: self.clone(),
            section: section.into(),
        }
    }

    /// Hole and core concatenated, e.g. `B13`. Used for the fixed-core column.
    pub fn hole_core(&self) -> String {
        format!("{}{}", self.hole, self.core)
    }
}

impl fmt::Display for CoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", self.site, self.hole, self.core)
    }
}

/// Full identity of a physical core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoreIdentity {
    pub site: String,
    pub hole: String,
    pub core: String,
    pub tool: String,
}

impl CoreIdentity {
    pub fn new(
        site: impl Into<String>,
        hole: impl Into<String>,
        core: impl Into<String>,
        tool: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into(),
            hole: hole.into(),
            core: core.into(),
            tool: tool.into(),
        }
    }

    /// Matching key without the tool.
    pub fn key(&self) -> CoreKey {
        CoreKey::new(self.site.clone(), self.hole.clone(), self.core.clone())
    }

    /// Key for a section of this core.
    pub fn section(&self, section: impl Into<String>) -> SectionKey {
        self.key().section(section)
    }
}

impl fmt::Display for CoreIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}{}", self.site, self.hole, self.core, self.tool)
    }
}

/// Four-part key of a Section Summary row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionKey {
    pub core: CoreKey,
    pub section: String,
}

impl SectionKey {
    pub fn new(
        site: impl Into<String>,
        hole: impl Into<String>,
        core: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        CoreKey::new(site, hole, core).section(section)
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.core, self.section)
    }
}

/// Half of a split section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    Archive,
    Working,
    WholeRound,
}

impl Half {
    pub fn code(&self) -> &'static str {
        match self {
            Half::Archive => "A",
            Half::Working => "W",
            Half::WholeRound => "WR",
        }
    }
}

impl FromStr for Half {
    type Err = SpliceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(Half::Archive),
            "W" => Ok(Half::Working),
            "WR" => Ok(Half::WholeRound),
            other => Err(SpliceError::Format(format!(
                "Invalid half '{}', expected A, W or WR",
                other
            ))),
        }
    }
}

/// A section ID as printed on a core label.
///
/// Accepts LacCore names (`TDP-TOW15-1B-23H-2`), IODP names
/// (`327-U1363B-2H-5-A`) and the bare `1B-23H-2` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionIdentity {
    /// Project/expedition prefix, if any.
    pub name: Option<String>,
    pub core: CoreIdentity,
    pub section: String,
    pub half: Option<Half>,
}

impl SectionIdentity {
    /// Section Summary key for this section.
    pub fn key(&self) -> SectionKey {
        self.core.section(self.section.clone())
    }
}

impl FromStr for SectionIdentity {
    type Err = SpliceError;

    fn from_str(s: &str) -> Result<Self> {
        let tokens: Vec<&str> = s.trim().split('-').collect();
        let malformed = || SpliceError::Format(format!("Malformed section ID '{}'", s.trim()));

        // The site/hole token is the first one followed by a core/tool token.
        let anchor = (0..tokens.len().saturating_sub(2))
            .find(|&i| SITE_HOLE.is_match(tokens[i]) && CORE_TOOL.is_match(tokens[i + 1]))
            .ok_or_else(malformed)?;

        let site_hole = SITE_HOLE.captures(tokens[anchor]).ok_or_else(malformed)?;
        let core_tool = CORE_TOOL.captures(tokens[anchor + 1]).ok_or_else(malformed)?;

        let section = tokens[anchor + 2];
        if section.is_empty() {
            return Err(malformed());
        }

        let half = match &tokens[anchor + 3..] {
            [] => None,
            [half] => Some(half.parse::<Half>()?),
            _ => return Err(malformed()),
        };

        let name = if anchor == 0 {
            None
        } else {
            Some(tokens[..anchor].join("-"))
        };

        Ok(SectionIdentity {
            name,
            core: CoreIdentity::new(&site_hole[1], &site_hole[2], &core_tool[1], &core_tool[2]),
            section: section.to_string(),
            half,
        })
    }
}

impl fmt::Display for SectionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref name) = self.name {
            write!(f, "{}-", name)?;
        }
        write!(f, "{}-{}", self.core, self.section)?;
        if let Some(half) = self.half {
            write!(f, "-{}", half.code())?;
        }
        Ok(())
    }
}

//! Logical schemas of every table the tool reads or writes.

use super::columns::ColumnIdentity;

/// Column definitions shared between formats.
pub mod col {
    use super::ColumnIdentity;

    pub const SITE: ColumnIdentity =
        ColumnIdentity::text("Site", "Location of core collection").with_synonyms(&["Location"]);
    pub const HOLE: ColumnIdentity = ColumnIdentity::text(
        "Hole",
        "Penetration from which one or more cores are collected",
    )
    .with_synonyms(&["Track"]);
    pub const CORE: ColumnIdentity =
        ColumnIdentity::text("Core", "Material collected in a single drive").with_synonyms(&["Drive"]);
    pub const TOOL: ColumnIdentity =
        ColumnIdentity::text("Tool", "Identifier of tool used to collect a core")
            .with_synonyms(&["Core Type", "Type"])
            .with_iodp_name("Core type")
            .with_laccore_name("Tool");
    pub const SECTION: ColumnIdentity =
        ColumnIdentity::text("Section", "Subdivision of core performed post-extraction");
    pub const TOP_SECTION: ColumnIdentity =
        ColumnIdentity::text("TopSection", "Top section of an interval");
    pub const BOTTOM_SECTION: ColumnIdentity =
        ColumnIdentity::text("BottomSection", "Bottom section of an interval");
    pub const TOP_OFFSET: ColumnIdentity =
        ColumnIdentity::numeric("TopOffset", "cm", "Section depth at the top of an interval");
    pub const BOTTOM_OFFSET: ColumnIdentity =
        ColumnIdentity::numeric("BottomOffset", "cm", "Section depth at the bottom of an interval");
    pub const COMMENT: ColumnIdentity = ColumnIdentity::text("Comment", "Comments")
        .with_synonyms(&["Quality Comment", "Quality Comments", "Comments", "Notes", "Remarks"])
        .with_iodp_name("Quality comment")
        .optional();
    pub const DATA_USED: ColumnIdentity =
        ColumnIdentity::text("DataUsed", "Datatype used to determine e.g. a tie point")
            .with_synonyms(&["Data"])
            .with_iodp_name("Data used")
            .optional();

    // Section Summary
    pub const TOP_DEPTH: ColumnIdentity =
        ColumnIdentity::numeric("TopDepth", "m", "Top drilled depth of a section (CSF-A)")
            .with_synonyms(&["TopDepthUnscaled", "Top Depth CSF-A"])
            .with_iodp_name("Top Depth CSF-A");
    pub const BOTTOM_DEPTH: ColumnIdentity =
        ColumnIdentity::numeric("BottomDepth", "m", "Bottom drilled depth of a section (CSF-A)")
            .with_synonyms(&["BottomDepthUnscaled", "Bottom Depth CSF-A"])
            .with_iodp_name("Bottom Depth CSF-A");
    pub const TOP_DEPTH_SCALED: ColumnIdentity =
        ColumnIdentity::numeric("TopDepthScaled", "m", "Top drilled depth of a section, scaled (CSF-B)")
            .with_synonyms(&["Top Depth CSF-B"])
            .with_iodp_name("Top Depth CSF-B")
            .optional();
    pub const BOTTOM_DEPTH_SCALED: ColumnIdentity = ColumnIdentity::numeric(
        "BottomDepthScaled",
        "m",
        "Bottom drilled depth of a section, scaled (CSF-B)",
    )
    .with_synonyms(&["Bottom Depth CSF-B"])
    .with_iodp_name("Bottom Depth CSF-B")
    .optional();
    pub const CURATED_LENGTH: ColumnIdentity =
        ColumnIdentity::numeric("CuratedLength", "m", "Length of section as measured post-extraction")
            .with_synonyms(&["Length"]);
    pub const GAPS: ColumnIdentity = ColumnIdentity::text(
        "Gaps",
        "Section intervals treated as gaps: space-delimited top-bottom pairs in cm",
    )
    .optional();

    // Sparse splice / SIT
    pub const SPLICE_TYPE: ColumnIdentity =
        ColumnIdentity::text("SpliceType", "Type of splice operation: TIE or APPEND");
    pub const GAP: ColumnIdentity =
        ColumnIdentity::numeric("Gap", "m", "Space added before an APPEND of the interval")
            .optional();
    pub const TOP_DEPTH_CSF: ColumnIdentity =
        ColumnIdentity::numeric("TopDepthCSF", "m", "Depth of splice interval top")
            .with_synonyms(&["Top Depth CSF-A"])
            .with_iodp_name("Top Depth CSF-A");
    pub const TOP_DEPTH_CCSF: ColumnIdentity =
        ColumnIdentity::numeric("TopDepthCCSF", "m", "Composite depth of splice interval top")
            .with_synonyms(&["Top Depth CCSF-A"])
            .with_iodp_name("Top Depth CCSF-A");
    pub const BOTTOM_DEPTH_CSF: ColumnIdentity =
        ColumnIdentity::numeric("BottomDepthCSF", "m", "Depth of splice interval bottom")
            .with_synonyms(&["Bottom Depth CSF-A"])
            .with_iodp_name("Bottom Depth CSF-A");
    pub const BOTTOM_DEPTH_CCSF: ColumnIdentity =
        ColumnIdentity::numeric("BottomDepthCCSF", "m", "Composite depth of splice interval bottom")
            .with_synonyms(&["Bottom Depth CCSF-A"])
            .with_iodp_name("Bottom Depth CCSF-A");

    // Affine table
    pub const DEPTH_CSF: ColumnIdentity =
        ColumnIdentity::numeric("DepthCSF", "m", "Depth below sea floor")
            .with_synonyms(&["Depth CSF-A", "Depth MBSF", "Depth MBLF"])
            .with_iodp_name("Depth CSF-A");
    pub const DEPTH_CCSF: ColumnIdentity =
        ColumnIdentity::numeric("DepthCCSF", "m", "Composite depth below sea floor")
            .with_synonyms(&["Depth CCSF-A", "Depth MCD"])
            .with_iodp_name("Depth CCSF-A");
    pub const OFFSET: ColumnIdentity =
        ColumnIdentity::numeric("Offset", "m", "Difference between a core's CSF-A and CCSF-A depth")
            .with_synonyms(&["Cumulative Offset", "Total Offset"])
            .with_iodp_name("Cumulative offset");
    pub const DIFFERENTIAL_OFFSET: ColumnIdentity = ColumnIdentity::numeric(
        "DifferentialOffset",
        "m",
        "Difference between offset of current core and preceding core in hole",
    )
    .with_iodp_name("Differential offset")
    .optional();
    pub const GROWTH_RATE: ColumnIdentity =
        ColumnIdentity::numeric("GrowthRate", "", "Ratio of core's CSF-A : CCSF-A depths")
            .with_iodp_name("Growth rate")
            .optional();
    pub const SHIFT_TYPE: ColumnIdentity =
        ColumnIdentity::text("ShiftType", "Core's affine shift type: TIE, SET, REL or ANCHOR")
            .with_synonyms(&["Affine Type", "Shift"])
            .with_iodp_name("Shift type");
    pub const FIXED_CORE: ColumnIdentity = ColumnIdentity::text(
        "FixedCore",
        "For a core shifted by a TIE, the Hole + Core (e.g. B13) of the fixed core",
    )
    .with_iodp_name("Fixed core")
    .optional();
    pub const FIXED_TIE_CSF: ColumnIdentity =
        ColumnIdentity::numeric("FixedTieCSF", "m", "CSF depth of the TIE point on the fixed core")
            .with_synonyms(&["Fixed Tie CSF-A"])
            .with_iodp_name("Fixed tie CSF-A")
            .optional();
    pub const SHIFTED_TIE_CSF: ColumnIdentity =
        ColumnIdentity::numeric("ShiftedTieCSF", "m", "CSF depth of the TIE point on the shifted core")
            .with_synonyms(&["Shifted Tie CSF-A"])
            .with_iodp_name("Shifted tie CSF-A")
            .optional();

    // Manual correlation, tie-point variant
    pub const SITE1: ColumnIdentity = ColumnIdentity::text("Site1", "Site of off-splice core");
    pub const HOLE1: ColumnIdentity = ColumnIdentity::text("Hole1", "Hole of off-splice core");
    pub const CORE1: ColumnIdentity = ColumnIdentity::text("Core1", "Core of off-splice core");
    pub const TOOL1: ColumnIdentity = ColumnIdentity::text("Tool1", "Tool of off-splice core");
    pub const SECTION1: ColumnIdentity =
        ColumnIdentity::text("Section1", "Section of off-splice core");
    pub const SECTION_DEPTH1: ColumnIdentity = ColumnIdentity::numeric(
        "SectionDepth1",
        "cm",
        "Section depth of correlation point on off-splice core",
    );
    pub const SITE2: ColumnIdentity = ColumnIdentity::text("Site2", "Site of on-splice core");
    pub const HOLE2: ColumnIdentity = ColumnIdentity::text("Hole2", "Hole of on-splice core");
    pub const CORE2: ColumnIdentity = ColumnIdentity::text("Core2", "Core of on-splice core");
    pub const TOOL2: ColumnIdentity = ColumnIdentity::text("Tool2", "Tool of on-splice core");
    pub const SECTION2: ColumnIdentity =
        ColumnIdentity::text("Section2", "Section of on-splice core");
    pub const SECTION_DEPTH2: ColumnIdentity = ColumnIdentity::numeric(
        "SectionDepth2",
        "cm",
        "Section depth of correlation point on on-splice core",
    );
}

/// A named, ordered set of columns.
#[derive(Debug, Clone, Copy)]
pub struct TableFormat {
    pub name: &'static str,
    pub columns: &'static [ColumnIdentity],
}

impl TableFormat {
    pub fn column(&self, name: &str) -> Option<&ColumnIdentity> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Canonical names of the required columns.
    pub fn required(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().filter(|c| !c.optional).map(|c| c.name)
    }
}

pub const SECTION_SUMMARY: TableFormat = TableFormat {
    name: "Section Summary",
    columns: &[
        col::SITE,
        col::HOLE,
        col::CORE,
        col::TOOL,
        col::SECTION,
        col::TOP_DEPTH,
        col::BOTTOM_DEPTH,
        col::TOP_DEPTH_SCALED,
        col::BOTTOM_DEPTH_SCALED,
        col::CURATED_LENGTH,
        col::GAPS,
    ],
};

pub const SPARSE_SPLICE: TableFormat = TableFormat {
    name: "Sparse Splice",
    columns: &[
        col::SITE,
        col::HOLE,
        col::CORE,
        col::TOOL,
        col::TOP_SECTION,
        col::TOP_OFFSET,
        col::BOTTOM_SECTION,
        col::BOTTOM_OFFSET,
        col::SPLICE_TYPE,
        col::GAP,
        col::DATA_USED,
        col::COMMENT,
    ],
};

/// Sparse splice columns with the four resolved depths at fixed positions.
pub const SPLICE_INTERVAL_TABLE: TableFormat = TableFormat {
    name: "Splice Interval Table",
    columns: &[
        col::SITE,
        col::HOLE,
        col::CORE,
        col::TOOL,
        col::TOP_SECTION,
        col::TOP_OFFSET,
        col::TOP_DEPTH_CSF,
        col::TOP_DEPTH_CCSF,
        col::BOTTOM_SECTION,
        col::BOTTOM_OFFSET,
        col::BOTTOM_DEPTH_CSF,
        col::BOTTOM_DEPTH_CCSF,
        col::SPLICE_TYPE,
        col::GAP,
        col::DATA_USED,
        col::COMMENT,
    ],
};

pub const AFFINE_TABLE: TableFormat = TableFormat {
    name: "Affine Table",
    columns: &[
        col::SITE,
        col::HOLE,
        col::CORE,
        col::TOOL,
        col::DEPTH_CSF,
        col::DEPTH_CCSF,
        col::OFFSET,
        col::DIFFERENTIAL_OFFSET,
        col::GROWTH_RATE,
        col::SHIFT_TYPE,
        col::FIXED_CORE,
        col::FIXED_TIE_CSF,
        col::SHIFTED_TIE_CSF,
        col::DATA_USED,
        col::COMMENT,
    ],
};

pub const TIE_POINT_CORRELATION: TableFormat = TableFormat {
    name: "Manual Correlation Table",
    columns: &[
        col::SITE1,
        col::HOLE1,
        col::CORE1,
        col::TOOL1,
        col::SECTION1,
        col::SECTION_DEPTH1,
        col::SITE2,
        col::HOLE2,
        col::CORE2,
        col::TOOL2,
        col::SECTION2,
        col::SECTION_DEPTH2,
    ],
};

pub const EXPLICIT_OFFSET_CORRELATION: TableFormat = TableFormat {
    name: "Manual Offset Table",
    columns: &[
        col::SITE,
        col::HOLE,
        col::CORE,
        col::TOOL.optional(),
        col::OFFSET,
    ],
};

/// Identity columns every measurement file must carry; the depth column is
/// chosen per export.
pub const MEASUREMENT: TableFormat = TableFormat {
    name: "Measurement Data",
    columns: &[col::SITE, col::HOLE, col::CORE, col::TOOL, col::SECTION],
};

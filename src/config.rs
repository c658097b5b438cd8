/// Printed/exported title when the main paper has none
pub const MAIN_TITLE_SENTINEL: &str = "Unknown";

/// Printed/exported title when a reference has none
pub const REFERENCE_TITLE_SENTINEL: &str = "No title";

/// GROBID bibliography entry ids: `b` followed by digits
pub const REFERENCE_ID_PATTERN: &str = r"^b[0-9]+$";

/// Deepest element nesting the loader accepts (lxml's default limit)
pub const MAX_ELEMENT_DEPTH: usize = 256;

/// File written next to the input by `teiref extract`
pub const DEFAULT_OUTPUT_FILE: &str = "parsed_references.json";

/// Extension of TEI files picked up by discovery and batch runs
pub const TEI_EXTENSION: &str = "xml";

/// Main-paper authors shown in the summary before "+ N more"
pub const SUMMARY_MAX_AUTHORS: usize = 5;

/// Authors shown per reference in the summary
pub const SUMMARY_MAX_REFERENCE_AUTHORS: usize = 3;

/// References listed in the summary
pub const DEFAULT_PREVIEW_REFERENCES: usize = 5;

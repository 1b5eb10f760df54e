//! Application constants for vcfquery
//!
//! This module contains format markers, sentinels, fixed column names and
//! default values used throughout the application.

// =============================================================================
// Format Markers and Sentinels
// =============================================================================

/// Prefix of metadata declaration lines (`##source=...`)
pub const METADATA_PREFIX: &str = "##";

/// Prefix of the column-header line (`#CHROM	POS	...`)
pub const COLUMN_HEADER_PREFIX: &str = "#";

/// First column name on the column-header line, without the marker
pub const COLUMN_HEADER_TOKEN: &str = "CHROM";

/// Missing value sentinel used by ID, QUAL and sample fields
pub const MISSING_SENTINEL: &str = ".";

/// FILTER value meaning every quality-control check passed
pub const FILTER_PASS: &str = "PASS";

/// Field delimiter of data rows
pub const FIELD_DELIMITER: char = '\t';

/// Entry delimiter within the INFO column
pub const INFO_DELIMITER: char = ';';

/// Key delimiter within the FORMAT column and sample columns
pub const FORMAT_DELIMITER: char = ':';

// =============================================================================
// Column Schema
// =============================================================================

/// The nine fixed columns, in file order
pub const FIXED_COLUMNS: &[&str] = &[
    "CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT",
];

/// Number of fixed columns preceding the sample columns
pub const FIXED_COLUMN_COUNT: usize = 9;

/// Column index of each fixed field within a data row
pub mod columns {
    pub const CHROM: usize = 0;
    pub const POS: usize = 1;
    pub const ID: usize = 2;
    pub const REF: usize = 3;
    pub const ALT: usize = 4;
    pub const QUAL: usize = 5;
    pub const FILTER: usize = 6;
    pub const INFO: usize = 7;
    pub const FORMAT: usize = 8;
}

/// Genotype key within FORMAT, the only one this tool decodes
pub const GENOTYPE_KEY: &str = "GT";

// =============================================================================
// Output Defaults
// =============================================================================

/// Delimiter name for native tab-separated output
pub const DELIMITER_TAB: &str = "tab";

/// Delimiter name for comma-separated export
pub const DELIMITER_COMMA: &str = "comma";

/// Default output delimiter when neither flag nor config specifies one
pub const DEFAULT_OUTPUT_DELIMITER: &str = DELIMITER_TAB;

// =============================================================================
// Configuration Defaults
// =============================================================================

/// Config directory name under the platform config root
pub const CONFIG_DIR_NAME: &str = "vcfquery";

/// Config file name within the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default malformed-record policy: abort on first error
pub const DEFAULT_SKIP_MALFORMED: bool = false;

/// Default log level before verbosity flags are applied
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// =============================================================================
// Progress Reporting
// =============================================================================

/// Progress spinner update interval (number of processed records)
pub const PROGRESS_UPDATE_INTERVAL: usize = 1000;

// =============================================================================
// Helper Functions
// =============================================================================

/// Resolve a delimiter name to its character
pub fn delimiter_char(name: &str) -> Option<char> {
    match name {
        DELIMITER_TAB => Some('\t'),
        DELIMITER_COMMA => Some(','),
        _ => None,
    }
}

/// Check whether a raw field value is the missing sentinel
pub fn is_missing(value: &str) -> bool {
    value == MISSING_SENTINEL
}

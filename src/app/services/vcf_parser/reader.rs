//! Line classification for VCF input streams
//!
//! Classifies each input line as metadata, column header or data. The
//! rules apply in order: a `##` prefix is metadata, a single `#` followed
//! by the literal `CHROM` token is the column header, any other non-empty
//! line is data. Fully blank lines are skipped by callers.

use crate::constants::{COLUMN_HEADER_PREFIX, COLUMN_HEADER_TOKEN, METADATA_PREFIX};

/// Classification of one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `##key=value` metadata declaration
    Metadata,
    /// The `#CHROM ...` column-header line
    ColumnHeader,
    /// A tab-delimited data row
    Data,
}

/// Classify a single line; `None` for fully blank lines.
///
/// Pure classification: no parsing, no side effects.
pub fn classify(line: &str) -> Option<LineKind> {
    if line.trim().is_empty() {
        return None;
    }
    if line.starts_with(METADATA_PREFIX) {
        return Some(LineKind::Metadata);
    }
    if let Some(rest) = line.strip_prefix(COLUMN_HEADER_PREFIX) {
        if rest.starts_with(COLUMN_HEADER_TOKEN) {
            return Some(LineKind::ColumnHeader);
        }
    }
    Some(LineKind::Data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_lines() {
        assert_eq!(classify("##fileformat=VCFv4.2"), Some(LineKind::Metadata));
        assert_eq!(
            classify("##INFO=<ID=DP,Number=1,Type=Integer>"),
            Some(LineKind::Metadata)
        );
    }

    #[test]
    fn test_column_header_line() {
        assert_eq!(
            classify("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001"),
            Some(LineKind::ColumnHeader)
        );
    }

    #[test]
    fn test_data_lines() {
        assert_eq!(
            classify("chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1"),
            Some(LineKind::Data)
        );
        // A single-# line that is not the CHROM header is, per the
        // classification rules, an (almost certainly malformed) data line.
        assert_eq!(classify("#comment"), Some(LineKind::Data));
    }

    #[test]
    fn test_blank_lines_skipped() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   "), None);
        assert_eq!(classify("\t"), None);
    }
}

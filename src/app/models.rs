//! Core data structures for VCF processing.
//!
//! Defines the record model, header model, filter status and genotype
//! types used throughout the library.

use crate::constants::{FILTER_PASS, FIELD_DELIMITER, GENOTYPE_KEY, MISSING_SENTINEL};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One parsed metadata declaration from a `##key=value` header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaLine {
    /// Declaration key (`fileformat`, `INFO`, `FORMAT`, `contig`, ...)
    pub key: String,

    /// Raw attribute blob after the first `=`, uninterpreted
    pub value: String,
}

/// Process-wide metadata built from the leading header lines.
///
/// Built once while consuming the input prefix and immutable afterward;
/// the record parser needs it to know how many sample columns follow the
/// nine fixed fields.
#[derive(Debug, Clone)]
pub struct VcfHeader {
    /// Parsed `##` declarations, in file order
    pub meta: Vec<MetaLine>,

    /// Raw `##` lines, byte-identical for pass-through output
    pub raw_meta_lines: Vec<String>,

    /// Raw `#CHROM ...` column-header line
    pub column_line: String,

    /// Sample names from the column-header line, in declared order
    pub samples: Vec<String>,
}

impl VcfHeader {
    /// Number of tab-delimited fields every data row must have
    pub fn expected_field_count(&self) -> usize {
        crate::constants::FIXED_COLUMN_COUNT + self.samples.len()
    }

    /// Position of a sample name in the declared sample list
    pub fn sample_index(&self, name: &str) -> Option<usize> {
        self.samples.iter().position(|s| s == name)
    }

    /// All header lines in original order, for pass-through output
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.raw_meta_lines
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.column_line.as_str()))
    }
}

/// Quality-control status of a record's FILTER column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterStatus {
    /// Every check passed
    Pass,
    /// Not evaluated (`.`)
    Missing,
    /// Named failure reasons, semicolon-separated in the file
    Fail(Vec<String>),
}

impl FilterStatus {
    /// Decode the raw FILTER column value
    pub fn parse(raw: &str) -> Self {
        match raw {
            FILTER_PASS => FilterStatus::Pass,
            MISSING_SENTINEL => FilterStatus::Missing,
            other => FilterStatus::Fail(other.split(';').map(str::to_string).collect()),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, FilterStatus::Pass)
    }
}

/// Per-sample genotype decoded from the GT field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genotype {
    /// Homozygous reference (0/0)
    HomRef,
    /// Heterozygous (0/1 or 1/0)
    Het,
    /// Homozygous alternate (1/1)
    HomAlt,
    /// Missing genotype (./.)
    Missing,
    /// Anything else (multi-allelic calls, half calls)
    Other(String),
}

impl Genotype {
    /// Decode a raw GT value, accepting both phased and unphased separators
    pub fn from_gt(gt: &str) -> Self {
        match gt {
            "0/0" | "0|0" => Genotype::HomRef,
            "0/1" | "1/0" | "0|1" | "1|0" => Genotype::Het,
            "1/1" | "1|1" => Genotype::HomAlt,
            "./." | ".|." | "." => Genotype::Missing,
            other => Genotype::Other(other.to_string()),
        }
    }

    /// Stable label used in reports
    pub fn label(&self) -> &str {
        match self {
            Genotype::HomRef => "hom_ref",
            Genotype::Het => "het",
            Genotype::HomAlt => "hom_alt",
            Genotype::Missing => "missing",
            Genotype::Other(_) => "other",
        }
    }
}

/// One data row: a single genomic position where an observed sequence
/// differs from the reference.
///
/// Typed fields are decoded eagerly; `fields` keeps the raw tab-separated
/// tokens so native re-serialization reproduces the input byte-for-byte.
#[derive(Debug, Clone)]
pub struct VcfRecord {
    /// Chromosome token, non-empty
    pub chrom: String,

    /// 1-based coordinate
    pub pos: u64,

    /// Record identifier; `None` encodes the `.` sentinel
    pub id: Option<String>,

    /// Reference allele
    pub reference: String,

    /// Alternative allele
    pub alternative: String,

    /// Confidence score; `None` encodes the `.` sentinel
    pub qual: Option<f64>,

    /// Quality-control status
    pub filter: FilterStatus,

    /// INFO entries in file order; `None` values are bare flags
    pub info: IndexMap<String, Option<String>>,

    /// FORMAT field names, in declared order
    pub format: Vec<String>,

    /// Per-sample field maps, zipped against `format`, one per declared sample
    pub samples: Vec<IndexMap<String, String>>,

    /// Raw tab-separated tokens of the source line
    pub fields: Vec<String>,

    /// 1-based line number in the source stream
    pub line_number: usize,
}

impl VcfRecord {
    /// Re-serialize in native tab-delimited form.
    ///
    /// Joins the raw tokens, so well-formed input round-trips
    /// byte-for-byte.
    pub fn to_line(&self) -> String {
        self.fields.join(&FIELD_DELIMITER.to_string())
    }

    /// Textual INFO value for a key: the value for `key=value` entries,
    /// `"1"` for bare flags, `None` when the key is absent.
    pub fn info_text(&self, key: &str) -> Option<&str> {
        self.info
            .get(key)
            .map(|v| v.as_deref().unwrap_or("1"))
    }

    /// A sample's raw value for one FORMAT key
    pub fn sample_field(&self, sample_index: usize, key: &str) -> Option<&str> {
        self.samples
            .get(sample_index)
            .and_then(|fields| fields.get(key))
            .map(String::as_str)
    }

    /// A sample's decoded genotype, when a GT field is declared
    pub fn genotype(&self, sample_index: usize) -> Option<Genotype> {
        self.sample_field(sample_index, GENOTYPE_KEY)
            .map(Genotype::from_gt)
    }

    /// True when both alleles are exactly one base long
    pub fn is_snv(&self) -> bool {
        self.reference.len() == 1 && self.alternative.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_status_parse() {
        assert_eq!(FilterStatus::parse("PASS"), FilterStatus::Pass);
        assert_eq!(FilterStatus::parse("."), FilterStatus::Missing);
        assert_eq!(
            FilterStatus::parse("LOWQUAL;DEPTH"),
            FilterStatus::Fail(vec!["LOWQUAL".to_string(), "DEPTH".to_string()])
        );
    }

    #[test]
    fn test_genotype_decode() {
        assert_eq!(Genotype::from_gt("0/0"), Genotype::HomRef);
        assert_eq!(Genotype::from_gt("0|1"), Genotype::Het);
        assert_eq!(Genotype::from_gt("1/1"), Genotype::HomAlt);
        assert_eq!(Genotype::from_gt("./."), Genotype::Missing);
        assert_eq!(
            Genotype::from_gt("1/2"),
            Genotype::Other("1/2".to_string())
        );
    }

    #[test]
    fn test_header_field_count() {
        let header = VcfHeader {
            meta: vec![],
            raw_meta_lines: vec![],
            column_line: String::new(),
            samples: vec!["NA001".to_string(), "NA002".to_string()],
        };
        assert_eq!(header.expected_field_count(), 11);
        assert_eq!(header.sample_index("NA002"), Some(1));
        assert_eq!(header.sample_index("NA003"), None);
    }
}

//! Field references for predicates, projections and grouping keys
//!
//! A `FieldRef` names one addressable value on a record: a fixed column,
//! an INFO key, or a per-sample FORMAT key. References are parsed from
//! user text, validated ("bound") once against the header before any
//! record is pulled, and then evaluated per record.

use crate::app::models::{VcfHeader, VcfRecord};
use crate::constants::columns;
use crate::{Error, Result};
use std::fmt;

/// Which sample a `sample.*` reference addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSelector {
    /// By declared name, resolved to an index at bind time
    Name(String),
    /// By zero-based position in the declared sample list
    Index(usize),
}

/// One addressable field on a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    Chrom,
    Pos,
    Id,
    Ref,
    Alt,
    Qual,
    Filter,
    Format,
    /// An INFO key, e.g. `info.DP`
    Info(String),
    /// A per-sample FORMAT key, e.g. `sample.NA001.GT` or `sample[0].GT`
    Sample {
        selector: SampleSelector,
        key: String,
    },
}

impl FieldRef {
    /// Parse a field reference from user text.
    ///
    /// Fixed column names are case-insensitive; INFO and FORMAT keys keep
    /// their case. Syntax errors are `UnknownField` configuration errors.
    pub fn parse(text: &str) -> Result<FieldRef> {
        let lower = text.to_ascii_lowercase();
        match lower.as_str() {
            "chrom" => return Ok(FieldRef::Chrom),
            "pos" => return Ok(FieldRef::Pos),
            "id" => return Ok(FieldRef::Id),
            "ref" => return Ok(FieldRef::Ref),
            "alt" => return Ok(FieldRef::Alt),
            "qual" => return Ok(FieldRef::Qual),
            "filter" => return Ok(FieldRef::Filter),
            "format" => return Ok(FieldRef::Format),
            _ => {}
        }

        if let Some(key) = strip_prefix_ci(text, "info.") {
            if key.is_empty() {
                return Err(Error::unknown_field(text, "empty INFO key"));
            }
            return Ok(FieldRef::Info(key.to_string()));
        }

        if let Some(rest) = strip_prefix_ci(text, "sample") {
            return parse_sample_ref(text, rest);
        }

        Err(Error::unknown_field(
            text,
            "expected one of chrom, pos, id, ref, alt, qual, filter, format, \
             info.<KEY>, sample.<NAME>.<KEY> or sample[<index>].<KEY>",
        ))
    }

    /// Resolve sample names to indexes and validate against the header.
    ///
    /// This is the fail-fast schema check: unknown sample names and
    /// out-of-range indexes are rejected here, before stream processing
    /// begins.
    pub fn bind(self, header: &VcfHeader) -> Result<FieldRef> {
        match self {
            FieldRef::Sample { selector, key } => {
                let index = match selector {
                    SampleSelector::Index(index) => {
                        if index >= header.samples.len() {
                            return Err(Error::unknown_field(
                                format!("sample[{}].{}", index, key),
                                format!(
                                    "sample index out of range: {} samples declared",
                                    header.samples.len()
                                ),
                            ));
                        }
                        index
                    }
                    SampleSelector::Name(name) => header.sample_index(&name).ok_or_else(|| {
                        Error::unknown_field(
                            format!("sample.{}.{}", name, key),
                            format!(
                                "unknown sample '{}' (declared: {})",
                                name,
                                header.samples.join(", ")
                            ),
                        )
                    })?,
                };
                Ok(FieldRef::Sample {
                    selector: SampleSelector::Index(index),
                    key,
                })
            }
            other => Ok(other),
        }
    }

    /// Raw textual value of this field on a record.
    ///
    /// Fixed columns return the raw file token (so sentinels stay `.`);
    /// INFO flags read as `"1"`; `None` means the key is absent on this
    /// record or the reference is unbound.
    pub fn text<'a>(&self, record: &'a VcfRecord) -> Option<&'a str> {
        match self {
            FieldRef::Chrom => record.fields.get(columns::CHROM).map(String::as_str),
            FieldRef::Pos => record.fields.get(columns::POS).map(String::as_str),
            FieldRef::Id => record.fields.get(columns::ID).map(String::as_str),
            FieldRef::Ref => record.fields.get(columns::REF).map(String::as_str),
            FieldRef::Alt => record.fields.get(columns::ALT).map(String::as_str),
            FieldRef::Qual => record.fields.get(columns::QUAL).map(String::as_str),
            FieldRef::Filter => record.fields.get(columns::FILTER).map(String::as_str),
            FieldRef::Format => record.fields.get(columns::FORMAT).map(String::as_str),
            FieldRef::Info(key) => record.info_text(key),
            FieldRef::Sample { selector, key } => match selector {
                SampleSelector::Index(index) => record.sample_field(*index, key),
                SampleSelector::Name(_) => None,
            },
        }
    }

    /// Numeric value of this field on a record.
    ///
    /// The missing sentinel and non-numeric values yield `None`, which
    /// every comparison treats as false, never as an error.
    pub fn number(&self, record: &VcfRecord) -> Option<f64> {
        match self {
            FieldRef::Pos => Some(record.pos as f64),
            FieldRef::Qual => record.qual,
            other => other
                .text(record)
                .and_then(|raw| raw.parse::<f64>().ok()),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Chrom => write!(f, "CHROM"),
            FieldRef::Pos => write!(f, "POS"),
            FieldRef::Id => write!(f, "ID"),
            FieldRef::Ref => write!(f, "REF"),
            FieldRef::Alt => write!(f, "ALT"),
            FieldRef::Qual => write!(f, "QUAL"),
            FieldRef::Filter => write!(f, "FILTER"),
            FieldRef::Format => write!(f, "FORMAT"),
            FieldRef::Info(key) => write!(f, "INFO.{}", key),
            FieldRef::Sample { selector, key } => match selector {
                SampleSelector::Name(name) => write!(f, "sample.{}.{}", name, key),
                SampleSelector::Index(index) => write!(f, "sample[{}].{}", index, key),
            },
        }
    }
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => text.get(prefix.len()..),
        _ => None,
    }
}

/// Parse the tail of a `sample...` reference: `.NAME.KEY` or `[N].KEY`
fn parse_sample_ref(original: &str, rest: &str) -> Result<FieldRef> {
    if let Some(rest) = rest.strip_prefix('[') {
        let (index_text, tail) = rest
            .split_once(']')
            .ok_or_else(|| Error::unknown_field(original, "missing ']' in sample index"))?;
        let index: usize = index_text
            .parse()
            .map_err(|_| Error::unknown_field(original, "sample index must be an integer"))?;
        let key = tail
            .strip_prefix('.')
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::unknown_field(original, "expected '.<KEY>' after sample index"))?;
        return Ok(FieldRef::Sample {
            selector: SampleSelector::Index(index),
            key: key.to_string(),
        });
    }

    if let Some(rest) = rest.strip_prefix('.') {
        // Name and key split on the last dot so sample names containing
        // dots keep working.
        let (name, key) = rest
            .rsplit_once('.')
            .filter(|(name, key)| !name.is_empty() && !key.is_empty())
            .ok_or_else(|| {
                Error::unknown_field(original, "expected sample.<NAME>.<KEY>")
            })?;
        return Ok(FieldRef::Sample {
            selector: SampleSelector::Name(name.to_string()),
            key: key.to_string(),
        });
    }

    Err(Error::unknown_field(
        original,
        "expected sample.<NAME>.<KEY> or sample[<index>].<KEY>",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::vcf_parser::header::build_header;
    use crate::app::services::vcf_parser::record_parser::parse_record;

    fn header() -> VcfHeader {
        build_header(
            vec![],
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001\tNA002".to_string(),
        )
        .unwrap()
    }

    fn record() -> VcfRecord {
        parse_record(
            "chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14;DB\tGT:DP\t0/1:14\t1/1:9",
            1,
            &header(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_fixed_fields() {
        assert_eq!(FieldRef::parse("chrom").unwrap(), FieldRef::Chrom);
        assert_eq!(FieldRef::parse("QUAL").unwrap(), FieldRef::Qual);
        assert_eq!(
            FieldRef::parse("info.DP").unwrap(),
            FieldRef::Info("DP".to_string())
        );
        assert!(FieldRef::parse("position").is_err());
    }

    #[test]
    fn test_parse_sample_refs() {
        assert_eq!(
            FieldRef::parse("sample.NA001.GT").unwrap(),
            FieldRef::Sample {
                selector: SampleSelector::Name("NA001".to_string()),
                key: "GT".to_string(),
            }
        );
        assert_eq!(
            FieldRef::parse("sample[1].DP").unwrap(),
            FieldRef::Sample {
                selector: SampleSelector::Index(1),
                key: "DP".to_string(),
            }
        );
        assert!(FieldRef::parse("sample.").is_err());
        assert!(FieldRef::parse("sample[x].GT").is_err());
    }

    #[test]
    fn test_bind_validates_samples() {
        let header = header();

        let bound = FieldRef::parse("sample.NA002.GT")
            .unwrap()
            .bind(&header)
            .unwrap();
        assert_eq!(
            bound,
            FieldRef::Sample {
                selector: SampleSelector::Index(1),
                key: "GT".to_string(),
            }
        );

        // Unknown name and out-of-range index fail before streaming
        assert!(FieldRef::parse("sample.NA999.GT")
            .unwrap()
            .bind(&header)
            .is_err());
        assert!(FieldRef::parse("sample[2].GT")
            .unwrap()
            .bind(&header)
            .is_err());
    }

    #[test]
    fn test_text_extraction() {
        let header = header();
        let record = record();

        assert_eq!(FieldRef::Chrom.text(&record), Some("chr1"));
        assert_eq!(FieldRef::Id.text(&record), Some("."));
        assert_eq!(FieldRef::Info("DP".to_string()).text(&record), Some("14"));
        assert_eq!(FieldRef::Info("DB".to_string()).text(&record), Some("1"));
        assert_eq!(FieldRef::Info("MQ".to_string()).text(&record), None);

        let gt = FieldRef::parse("sample.NA002.GT")
            .unwrap()
            .bind(&header)
            .unwrap();
        assert_eq!(gt.text(&record), Some("1/1"));
    }

    #[test]
    fn test_number_extraction() {
        let record = record();
        assert_eq!(FieldRef::Pos.number(&record), Some(1000.0));
        assert_eq!(FieldRef::Qual.number(&record), Some(99.9));
        assert_eq!(FieldRef::Info("DP".to_string()).number(&record), Some(14.0));
        assert_eq!(FieldRef::Chrom.number(&record), None);
    }
}

//! Data-line decoding into typed records
//!
//! Splits a classified data line on the tab delimiter, enforces the
//! field-count invariant against the declared sample list, and decodes
//! the typed views: position, quality, filter status, INFO entries and
//! the FORMAT-zipped sample maps.

use crate::app::models::{FilterStatus, VcfHeader, VcfRecord};
use crate::constants::{
    FIELD_DELIMITER, FORMAT_DELIMITER, INFO_DELIMITER, columns, is_missing,
};
use crate::{Error, Result};
use indexmap::IndexMap;

/// Parse one data line into a record.
///
/// Every violation of the record invariants is a `MalformedRecord` error
/// carrying the line number and the offending line; nothing is silently
/// truncated.
pub fn parse_record(line: &str, line_number: usize, header: &VcfHeader) -> Result<VcfRecord> {
    let fields: Vec<String> = line
        .split(FIELD_DELIMITER)
        .map(str::to_string)
        .collect();

    let expected = header.expected_field_count();
    if fields.len() != expected {
        return Err(Error::malformed_record(
            line_number,
            line,
            format!(
                "expected {} tab-delimited fields ({} fixed + {} samples), found {}",
                expected,
                crate::constants::FIXED_COLUMN_COUNT,
                header.samples.len(),
                fields.len()
            ),
        ));
    }

    let chrom = require_token(&fields, columns::CHROM, "CHROM", line, line_number)?;
    let pos = parse_position(&fields[columns::POS], line, line_number)?;
    let id = parse_optional(&fields[columns::ID]);
    let reference = parse_allele(&fields[columns::REF], "REF", line, line_number)?;
    let alternative = parse_allele(&fields[columns::ALT], "ALT", line, line_number)?;
    let qual = parse_quality(&fields[columns::QUAL], line, line_number)?;
    let filter = FilterStatus::parse(&require_token(
        &fields,
        columns::FILTER,
        "FILTER",
        line,
        line_number,
    )?);
    let info = parse_info(&fields[columns::INFO]);
    let format = parse_format(&fields[columns::FORMAT]);
    let samples = parse_samples(&fields, &format, header, line, line_number)?;

    Ok(VcfRecord {
        chrom,
        pos,
        id,
        reference,
        alternative,
        qual,
        filter,
        info,
        format,
        samples,
        fields,
        line_number,
    })
}

fn require_token(
    fields: &[String],
    index: usize,
    name: &str,
    line: &str,
    line_number: usize,
) -> Result<String> {
    let value = &fields[index];
    if value.is_empty() {
        return Err(Error::malformed_record(
            line_number,
            line,
            format!("empty {} field", name),
        ));
    }
    Ok(value.clone())
}

/// POS must be an unsigned integer
fn parse_position(raw: &str, line: &str, line_number: usize) -> Result<u64> {
    raw.parse::<u64>().map_err(|_| {
        Error::malformed_record(
            line_number,
            line,
            format!("non-numeric position '{}'", raw),
        )
    })
}

/// `.` encodes an unnamed record
fn parse_optional(raw: &str) -> Option<String> {
    if is_missing(raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Alleles must be non-empty and alphabetic; comma-separated ALT lists
/// (multi-allelic records) are out of scope and rejected here.
fn parse_allele(raw: &str, name: &str, line: &str, line_number: usize) -> Result<String> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::malformed_record(
            line_number,
            line,
            format!("invalid {} allele '{}'", name, raw),
        ));
    }
    Ok(raw.to_string())
}

/// QUAL is floating-point or the `.` sentinel
fn parse_quality(raw: &str, line: &str, line_number: usize) -> Result<Option<f64>> {
    if is_missing(raw) {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| {
        Error::malformed_record(
            line_number,
            line,
            format!("non-numeric quality '{}'", raw),
        )
    })
}

/// INFO entries: `key=value` pairs and bare-key flags, semicolon-delimited
fn parse_info(raw: &str) -> IndexMap<String, Option<String>> {
    let mut info = IndexMap::new();
    if is_missing(raw) {
        return info;
    }

    for entry in raw.split(INFO_DELIMITER).filter(|e| !e.is_empty()) {
        match entry.split_once('=') {
            Some((key, value)) => info.insert(key.to_string(), Some(value.to_string())),
            None => info.insert(entry.to_string(), None),
        };
    }
    info
}

/// FORMAT declares how each sample column decodes
fn parse_format(raw: &str) -> Vec<String> {
    if is_missing(raw) {
        return Vec::new();
    }
    raw.split(FORMAT_DELIMITER).map(str::to_string).collect()
}

/// Decode each sample column against the FORMAT declaration; an arity
/// mismatch between a sample and FORMAT is malformed.
fn parse_samples(
    fields: &[String],
    format: &[String],
    header: &VcfHeader,
    line: &str,
    line_number: usize,
) -> Result<Vec<IndexMap<String, String>>> {
    let mut samples = Vec::with_capacity(header.samples.len());

    for (offset, name) in header.samples.iter().enumerate() {
        let raw = &fields[crate::constants::FIXED_COLUMN_COUNT + offset];
        let values: Vec<&str> = raw.split(FORMAT_DELIMITER).collect();

        if values.len() != format.len() {
            return Err(Error::malformed_record(
                line_number,
                line,
                format!(
                    "sample '{}' has {} fields but FORMAT declares {}",
                    name,
                    values.len(),
                    format.len()
                ),
            ));
        }

        let decoded: IndexMap<String, String> = format
            .iter()
            .cloned()
            .zip(values.into_iter().map(str::to_string))
            .collect();
        samples.push(decoded);
    }

    Ok(samples)
}

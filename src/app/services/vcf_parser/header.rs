//! VCF header parsing and metadata extraction
//!
//! Handles the `##` metadata declarations and the `#CHROM` column-header
//! line that together define the process-wide header: declaration order,
//! column schema and the declared sample list.

use crate::app::models::{MetaLine, VcfHeader};
use crate::constants::{
    COLUMN_HEADER_PREFIX, FIELD_DELIMITER, FIXED_COLUMNS, FIXED_COLUMN_COUNT, METADATA_PREFIX,
};
use crate::{Error, Result};

/// Parse one `##key=value` declaration.
///
/// Everything after the first `=` is kept as an uninterpreted attribute
/// blob; declarations without `=` get an empty value.
pub fn parse_meta_line(line: &str) -> MetaLine {
    let body = line.strip_prefix(METADATA_PREFIX).unwrap_or(line);
    match body.split_once('=') {
        Some((key, value)) => MetaLine {
            key: key.to_string(),
            value: value.to_string(),
        },
        None => MetaLine {
            key: body.to_string(),
            value: String::new(),
        },
    }
}

/// Parse the `#CHROM ...` column-header line into column names and the
/// declared sample list.
///
/// The nine fixed column names must match the schema exactly; everything
/// after FORMAT names a sample.
pub fn parse_column_line(line: &str) -> Result<(Vec<String>, Vec<String>)> {
    let body = line
        .strip_prefix(COLUMN_HEADER_PREFIX)
        .ok_or_else(|| Error::header("column-header line does not start with '#'"))?;

    let columns: Vec<String> = body
        .split(FIELD_DELIMITER)
        .map(str::to_string)
        .collect();

    if columns.len() < FIXED_COLUMN_COUNT {
        return Err(Error::header(format!(
            "column-header line has {} columns, expected at least the {} fixed columns",
            columns.len(),
            FIXED_COLUMN_COUNT
        )));
    }

    for (expected, found) in FIXED_COLUMNS.iter().zip(columns.iter()) {
        if found.as_str() != *expected {
            return Err(Error::header(format!(
                "unexpected column name '{}' where '{}' was required",
                found, expected
            )));
        }
    }

    let samples = columns[FIXED_COLUMN_COUNT..].to_vec();
    Ok((columns, samples))
}

/// Assemble the immutable header from the collected leading lines
pub fn build_header(meta_lines: Vec<String>, column_line: String) -> Result<VcfHeader> {
    let (_, samples) = parse_column_line(&column_line)?;
    let meta = meta_lines.iter().map(|l| parse_meta_line(l)).collect();

    Ok(VcfHeader {
        meta,
        raw_meta_lines: meta_lines,
        column_line,
        samples,
    })
}

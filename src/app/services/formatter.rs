//! Delimited text output
//!
//! Renders tuple streams as delimiter-separated rows with an optional
//! header row. Header emission is a one-time concern owned here, decoupled
//! from per-record logic: the header is written exactly once, before any
//! data, and still appears when the stream turns out to be empty, so
//! downstream tooling always sees consistent column counts.

use crate::{Error, Result};
use std::io::Write;

/// Writer for delimiter-separated rows with one-time header emission
#[derive(Debug)]
pub struct DelimitedWriter {
    delimiter: char,
    header: Option<Vec<String>>,
    header_written: bool,
}

impl DelimitedWriter {
    /// Writer without a header row
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            header: None,
            header_written: false,
        }
    }

    /// Writer that emits the given column labels once, before any data
    pub fn with_header(delimiter: char, labels: Vec<String>) -> Self {
        Self {
            delimiter,
            header: Some(labels),
            header_written: false,
        }
    }

    /// Write one data row, emitting the header first if still pending
    pub fn write_row<W: Write, S: AsRef<str>>(&mut self, out: &mut W, values: &[S]) -> Result<()> {
        self.ensure_header(out)?;
        let row = values
            .iter()
            .map(|v| v.as_ref())
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string());
        writeln!(out, "{}", row).map_err(|e| Error::io("failed to write output row", e))
    }

    /// Flush pending output; emits the header even when no rows were
    /// written (an empty stream still yields the header line).
    pub fn finish<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.ensure_header(out)?;
        out.flush()
            .map_err(|e| Error::io("failed to flush output", e))
    }

    fn ensure_header<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        self.header_written = true;
        if let Some(labels) = &self.header {
            let row = labels.join(&self.delimiter.to_string());
            writeln!(out, "{}", row).map_err(|e| Error::io("failed to write header row", e))?;
        }
        Ok(())
    }
}

/// Apply `OLD=NEW` header relabelings; labels without a mapping pass
/// through unchanged.
pub fn apply_relabels(labels: &[String], relabels: &[(String, String)]) -> Vec<String> {
    labels
        .iter()
        .map(|label| {
            relabels
                .iter()
                .find(|(old, _)| old == label)
                .map(|(_, new)| new.clone())
                .unwrap_or_else(|| label.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_rows_with_header_once() {
        let mut writer =
            DelimitedWriter::with_header(',', vec!["CHROM".to_string(), "POS".to_string()]);
        let mut out = Vec::new();

        writer.write_row(&mut out, &["chr1", "1000"]).unwrap();
        writer.write_row(&mut out, &["chr2", "3000"]).unwrap();
        writer.finish(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "CHROM,POS\nchr1,1000\nchr2,3000\n");
    }

    #[test]
    fn test_empty_stream_still_yields_header() {
        let mut writer =
            DelimitedWriter::with_header('\t', vec!["CHROM".to_string(), "POS".to_string()]);
        let mut out = Vec::new();

        writer.finish(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "CHROM\tPOS\n");
    }

    #[test]
    fn test_no_header_mode() {
        let mut writer = DelimitedWriter::new('\t');
        let mut out = Vec::new();

        writer.write_row(&mut out, &["chr1", "1000"]).unwrap();
        writer.finish(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "chr1\t1000\n");
    }

    #[test]
    fn test_relabeling() {
        let labels = vec!["CHROM".to_string(), "POS".to_string(), "QUAL".to_string()];
        let relabels = vec![
            ("CHROM".to_string(), "chromosome".to_string()),
            ("QUAL".to_string(), "quality".to_string()),
        ];
        assert_eq!(
            apply_relabels(&labels, &relabels),
            vec!["chromosome", "POS", "quality"]
        );
    }
}

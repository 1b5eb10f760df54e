//! Streaming VCF parser
//!
//! This module provides the main parser orchestration: header bootstrap
//! from the leading lines, then a lazy record stream over the data lines.
//!
//! The parser focuses on essential functionality:
//! - Strict header/data section handling
//! - Field-count and typing invariants enforced per record
//! - Abort-on-first-malformed by default, explicit skip-and-report mode
//! - Parse statistics for downstream reporting

pub mod header;
pub mod reader;
pub mod record_parser;
pub mod stats;

pub use stats::ParseStats;

use crate::app::models::{VcfHeader, VcfRecord};
use crate::{Error, Result};
use reader::{LineKind, classify};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Streaming reader over one VCF input.
///
/// Consumes the header prefix on construction, then yields
/// `Result<VcfRecord>` lazily: each record is pulled from the underlying
/// stream only when requested, so arbitrarily large inputs run in bounded
/// memory. Dropping the reader closes the underlying handle on every exit
/// path.
pub struct VcfReader<B: BufRead> {
    lines: std::io::Lines<B>,
    header: VcfHeader,
    stats: ParseStats,
    line_number: usize,
    skip_malformed: bool,
    finished: bool,
}

impl VcfReader<BufReader<File>> {
    /// Open a VCF file
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| Error::io(format!("failed to open {}", path.display()), e))?;
        Self::new(BufReader::new(file))
    }
}

impl<B: BufRead> VcfReader<B> {
    /// Build a reader, consuming the leading header lines.
    ///
    /// Fails when the input ends before a `#CHROM` line, when the column
    /// header is malformed, or when a data line precedes the column
    /// header.
    pub fn new(source: B) -> Result<Self> {
        let mut lines = source.lines();
        let mut line_number = 0usize;
        let mut meta_lines = Vec::new();

        let column_line = loop {
            let line = match lines.next() {
                Some(line) => line.map_err(|e| Error::io("failed to read input line", e))?,
                None => {
                    return Err(Error::header(
                        "input ended before a #CHROM column-header line",
                    ));
                }
            };
            line_number += 1;

            match classify(&line) {
                None => continue,
                Some(LineKind::Metadata) => meta_lines.push(line),
                Some(LineKind::ColumnHeader) => break line,
                Some(LineKind::Data) => {
                    return Err(Error::header(format!(
                        "data line at line {} precedes the #CHROM column-header line",
                        line_number
                    )));
                }
            }
        };

        let header = header::build_header(meta_lines, column_line)?;
        debug!(
            "Parsed header: {} metadata lines, {} samples",
            header.meta.len(),
            header.samples.len()
        );

        Ok(Self {
            lines,
            header,
            stats: ParseStats::new(),
            line_number,
            skip_malformed: false,
            finished: false,
        })
    }

    /// Enable skip-and-report mode: malformed records are counted and
    /// logged instead of aborting the stream. Never the default.
    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    /// The immutable header built from the leading lines
    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }
}

impl<B: BufRead> Iterator for VcfReader<B> {
    type Item = Result<VcfRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(Error::io("failed to read input line", e)));
                }
                None => return None,
            };
            self.line_number += 1;

            match classify(&line) {
                None => continue,
                Some(LineKind::Metadata) | Some(LineKind::ColumnHeader) => {
                    warn!(
                        "Skipping stray header line after data section at line {}",
                        self.line_number
                    );
                    continue;
                }
                Some(LineKind::Data) => {
                    self.stats.data_lines += 1;

                    match record_parser::parse_record(&line, self.line_number, &self.header) {
                        Ok(record) => {
                            self.stats.records_parsed += 1;
                            return Some(Ok(record));
                        }
                        Err(e) => {
                            if self.skip_malformed {
                                self.stats.records_skipped += 1;
                                self.stats.errors.push(e.to_string());
                                warn!("Skipped malformed record: {}", e);
                                continue;
                            }
                            // Default policy: abort the stream on the first
                            // malformed record rather than dropping it.
                            self.finished = true;
                            return Some(Err(e));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
##fileformat=VCFv4.2
##source=unit-test
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001
chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1
chr1\t2000\t.\tC\tT\t85.3\tPASS\tDP=11\tGT\t0/0

chr2\t3000\t.\tG\tA\t45.2\tPASS\tDP=7\tGT\t1/1
";

    fn reader_for(input: &str) -> VcfReader<Cursor<Vec<u8>>> {
        VcfReader::new(Cursor::new(input.as_bytes().to_vec())).unwrap()
    }

    #[test]
    fn test_streams_records_in_order() {
        let mut reader = reader_for(SAMPLE);
        assert_eq!(reader.header().samples, vec!["NA001"]);

        let positions: Vec<u64> = reader
            .by_ref()
            .map(|r| r.unwrap().pos)
            .collect();
        assert_eq!(positions, vec![1000, 2000, 3000]);
        assert_eq!(reader.stats().data_lines, 3);
        assert_eq!(reader.stats().records_parsed, 3);
        assert!(reader.stats().is_clean());
    }

    #[test]
    fn test_missing_column_header_is_error() {
        let result = VcfReader::new(Cursor::new(b"##fileformat=VCFv4.2\n".to_vec()));
        assert!(matches!(result, Err(Error::Header { .. })));
    }

    #[test]
    fn test_data_before_column_header_is_error() {
        let input = "chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1\n";
        let result = VcfReader::new(Cursor::new(input.as_bytes().to_vec()));
        assert!(matches!(result, Err(Error::Header { .. })));
    }

    #[test]
    fn test_default_mode_halts_on_malformed() {
        let input = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001
chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1
chr1\tbogus\t.\tC\tT\t85.3\tPASS\tDP=11\tGT\t0/0
chr2\t3000\t.\tG\tA\t45.2\tPASS\tDP=7\tGT\t1/1
";
        let mut reader = reader_for(input);
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        // Stream halts: the third (valid) record is never produced
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_skip_malformed_mode_reports_and_continues() {
        let input = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001
chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1
chr1\tbogus\t.\tC\tT\t85.3\tPASS\tDP=11\tGT\t0/0
chr2\t3000\t.\tG\tA\t45.2\tPASS\tDP=7\tGT\t1/1
";
        let mut reader = reader_for(input).with_skip_malformed(true);
        let positions: Vec<u64> = reader.by_ref().map(|r| r.unwrap().pos).collect();
        assert_eq!(positions, vec![1000, 3000]);
        assert_eq!(reader.stats().records_skipped, 1);
        assert_eq!(reader.stats().errors.len(), 1);
        // No silent drops: every data line is accounted for
        assert_eq!(
            reader.stats().data_lines,
            reader.stats().records_parsed + reader.stats().records_skipped
        );
    }

    #[test]
    fn test_stray_metadata_after_data_is_skipped() {
        let input = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001
chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1
##stray=declaration
chr2\t3000\t.\tG\tA\t45.2\tPASS\tDP=7\tGT\t1/1
";
        let reader = reader_for(input);
        let positions: Vec<u64> = reader.map(|r| r.unwrap().pos).collect();
        assert_eq!(positions, vec![1000, 3000]);
    }
}

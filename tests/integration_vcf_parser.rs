//! Integration tests for the VCF parser with on-disk files
//!
//! These tests write real files and drive the parser end-to-end through
//! the public API to verify header handling, streaming behaviour and the
//! malformed-record policies.

use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;
use vcfquery::app::services::vcf_parser::VcfReader;
use vcfquery::{Error, FilterStatus, Genotype};

const FIXTURE: &str = "\
##fileformat=VCFv4.2
##source=vcfquery-tests
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1
chr1\t1000\trs100\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1
chr1\t2000\trs101\tC\tT\t85.3\tPASS\tDP=11\tGT\t0/0
chr2\t3000\t.\tG\tA\t45.2\tPASS\tDP=7\tGT\t1/1
chr2\t4000\t.\tT\tC\t12.1\tLOWQUAL\tDP=3\tGT\t0/1
chrX\t5000\trs102\tA\tT\t78.9\tPASS\tDP=10\tGT\t1/1
";

fn fixture_file(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Purpose: verify end-to-end parsing of a complete well-formed file
/// Benefit: covers header bootstrap, typed decoding and stream statistics
#[test]
fn test_parse_fixture_file_end_to_end() -> Result<()> {
    let file = fixture_file(FIXTURE)?;
    let mut reader = VcfReader::from_path(file.path())?;

    let header = reader.header().clone();
    assert_eq!(header.samples, vec!["SAMPLE1"]);
    assert_eq!(header.meta.len(), 4);
    assert_eq!(header.meta[0].key, "fileformat");
    assert_eq!(header.expected_field_count(), 10);

    let records: Vec<_> = reader.by_ref().collect::<vcfquery::Result<Vec<_>>>()?;
    assert_eq!(records.len(), 5);

    // Every data line produced a record; nothing was silently dropped
    let stats = reader.stats();
    assert_eq!(stats.data_lines, 5);
    assert_eq!(stats.records_parsed, 5);
    assert!(stats.is_clean());

    let first = &records[0];
    assert_eq!(first.chrom, "chr1");
    assert_eq!(first.pos, 1000);
    assert_eq!(first.id.as_deref(), Some("rs100"));
    assert_eq!(first.qual, Some(99.9));
    assert!(first.filter.is_pass());
    assert_eq!(first.info_text("DP"), Some("14"));
    assert_eq!(first.genotype(0), Some(Genotype::Het));
    assert!(first.is_snv());

    let fourth = &records[3];
    assert_eq!(fourth.id, None);
    assert_eq!(
        fourth.filter,
        FilterStatus::Fail(vec!["LOWQUAL".to_string()])
    );

    Ok(())
}

/// Purpose: verify the byte-for-byte round-trip property on disk
/// Benefit: guards the native-output contract the filter command relies on
#[test]
fn test_round_trip_reproduces_every_line() -> Result<()> {
    let file = fixture_file(FIXTURE)?;
    let reader = VcfReader::from_path(file.path())?;

    let original_data_lines: Vec<&str> = FIXTURE
        .lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .collect();

    let round_tripped: Vec<String> = reader
        .map(|result| result.map(|record| record.to_line()))
        .collect::<vcfquery::Result<Vec<_>>>()?;

    assert_eq!(round_tripped, original_data_lines);
    Ok(())
}

/// Purpose: verify the default abort-on-first-malformed policy
/// Benefit: truncated rows must halt the stream, not emit partial records
#[test]
fn test_truncated_row_aborts_stream_by_default() -> Result<()> {
    let content = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1
chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1
chr1\t2000\t.\tC\tT\t85.3\tPASS
chrX\t5000\t.\tA\tT\t78.9\tPASS\tDP=10\tGT\t1/1
";
    let file = fixture_file(content)?;
    let mut reader = VcfReader::from_path(file.path())?;

    assert!(reader.next().unwrap().is_ok());
    let error = reader.next().unwrap().unwrap_err();
    match error {
        Error::MalformedRecord {
            line_number, line, ..
        } => {
            assert_eq!(line_number, 3);
            assert!(line.contains("85.3"));
        }
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
    // The stream halted: the valid third row is never reached
    assert!(reader.next().is_none());

    Ok(())
}

/// Purpose: verify the explicit skip-and-report mode
/// Benefit: every skipped line must be counted and described
#[test]
fn test_skip_malformed_mode_accounts_for_every_line() -> Result<()> {
    let content = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1
chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1
chr1\tnot-a-number\t.\tC\tT\t85.3\tPASS\tDP=11\tGT\t0/0
chr2\t3000\t.\tG\tA\t45.2\tPASS\tDP=7\tGT\t1/1\textra
chrX\t5000\t.\tA\tT\t78.9\tPASS\tDP=10\tGT\t1/1
";
    let file = fixture_file(content)?;
    let mut reader = VcfReader::from_path(file.path())?.with_skip_malformed(true);

    let positions: Vec<u64> = reader
        .by_ref()
        .map(|result| result.map(|record| record.pos))
        .collect::<vcfquery::Result<Vec<_>>>()?;
    assert_eq!(positions, vec![1000, 5000]);

    let stats = reader.stats();
    assert_eq!(stats.data_lines, 4);
    assert_eq!(stats.records_parsed, 2);
    assert_eq!(stats.records_skipped, 2);
    assert_eq!(stats.errors.len(), 2);
    assert_eq!(stats.data_lines, stats.records_parsed + stats.records_skipped);

    Ok(())
}

/// Purpose: verify header errors surface before any record is produced
#[test]
fn test_file_without_column_header_is_rejected() -> Result<()> {
    let file = fixture_file("##fileformat=VCFv4.2\n##source=broken\n")?;
    match VcfReader::from_path(file.path()) {
        Err(Error::Header { message }) => {
            assert!(message.contains("#CHROM"));
        }
        other => panic!("expected header error, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

/// Purpose: verify blank lines are skipped and never counted as data
#[test]
fn test_blank_lines_are_skipped() -> Result<()> {
    let content = "\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1

chr1\t1000\t.\tA\tG\t99.9\tPASS\tDP=14\tGT\t0/1

chrX\t5000\t.\tA\tT\t78.9\tPASS\tDP=10\tGT\t1/1
";
    let file = fixture_file(content)?;
    let mut reader = VcfReader::from_path(file.path())?;

    let count = reader.by_ref().filter(|r| r.is_ok()).count();
    assert_eq!(count, 2);
    assert_eq!(reader.stats().data_lines, 2);

    Ok(())
}

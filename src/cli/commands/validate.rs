//! Validate command implementation
//!
//! Scans the whole stream in skip-and-report mode, collecting structural
//! statistics: record and malformed-line tallies, per-chromosome counts,
//! filter status distribution and per-sample genotype distribution. Exits
//! non-zero when the file is malformed.

use super::shared::{create_spinner, load_configuration, open_reader, setup_logging};
use crate::app::models::FilterStatus;
use crate::app::services::vcf_parser::ParseStats;
use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::constants::PROGRESS_UPDATE_INTERVAL;
use crate::{Error, Result};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Full validation report, serializable for `--format json`
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub input: String,
    pub samples: Vec<String>,
    pub metadata_lines: usize,
    pub stats: ParseStats,
    pub chromosomes: BTreeMap<String, u64>,
    pub filter_status: FilterTally,
    pub genotypes: BTreeMap<String, u64>,
}

/// Pass/fail/missing tallies over the FILTER column
#[derive(Debug, Default, Serialize)]
pub struct FilterTally {
    pub pass: u64,
    pub fail: u64,
    pub missing: u64,
}

impl ValidationReport {
    /// True when every data line produced a record
    pub fn is_clean(&self) -> bool {
        self.stats.is_clean()
    }
}

/// Validate command runner
pub fn run_validate(args: ValidateArgs) -> Result<i32> {
    setup_logging(args.get_log_level())?;

    info!("Starting validate");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    load_configuration(args.config_file.as_deref())?;

    // Always scan the whole stream: the point of validate is a complete
    // report, not an abort at the first problem.
    let mut reader = open_reader(args.input.as_deref(), true)?;
    let header = reader.header().clone();

    let show_spinner =
        args.input.is_some() && !args.quiet && args.format == OutputFormat::Human;
    let spinner = show_spinner.then(|| create_spinner("Validating records..."));

    let mut chromosomes: BTreeMap<String, u64> = BTreeMap::new();
    let mut filter_status = FilterTally::default();
    let mut genotypes: BTreeMap<String, u64> = BTreeMap::new();
    let mut seen = 0usize;

    for result in reader.by_ref() {
        // Malformed records were already tallied by the reader
        let Ok(record) = result else { continue };

        *chromosomes.entry(record.chrom.clone()).or_insert(0) += 1;
        match record.filter {
            FilterStatus::Pass => filter_status.pass += 1,
            FilterStatus::Missing => filter_status.missing += 1,
            FilterStatus::Fail(_) => filter_status.fail += 1,
        }
        for sample_index in 0..header.samples.len() {
            if let Some(genotype) = record.genotype(sample_index) {
                *genotypes.entry(genotype.label().to_string()).or_insert(0) += 1;
            }
        }

        seen += 1;
        if seen % PROGRESS_UPDATE_INTERVAL == 0 {
            if let Some(spinner) = &spinner {
                spinner.set_message(format!("Validating records... {}", seen));
            }
        }
    }

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let report = ValidationReport {
        input: args
            .input
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdin>".to_string()),
        samples: header.samples.clone(),
        metadata_lines: header.meta.len(),
        stats: reader.stats().clone(),
        chromosomes,
        filter_status,
        genotypes,
    };

    match args.format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&report)
                .map_err(|e| Error::configuration(format!("failed to encode report: {}", e)))?;
            println!("{}", rendered);
        }
        _ => print_human_report(&report),
    }

    Ok(if report.is_clean() { 0 } else { 1 })
}

fn print_human_report(report: &ValidationReport) {
    println!("{}", "VCF validation report".bold());
    println!("  input:          {}", report.input);
    println!(
        "  samples:        {} ({})",
        report.samples.len(),
        report.samples.join(", ")
    );
    println!("  metadata lines: {}", report.metadata_lines);
    println!("  data lines:     {}", report.stats.data_lines);
    println!("  records parsed: {}", report.stats.records_parsed);

    println!("  chromosomes:");
    for (chromosome, count) in &report.chromosomes {
        println!("    {:<12} {}", chromosome, count);
    }

    println!(
        "  filter status:  {} pass / {} fail / {} missing",
        report.filter_status.pass, report.filter_status.fail, report.filter_status.missing
    );

    if !report.genotypes.is_empty() {
        println!("  genotypes:");
        for (label, count) in &report.genotypes {
            println!("    {:<12} {}", label, count);
        }
    }

    if report.is_clean() {
        println!("{}", "clean: every data line parsed".green());
    } else {
        println!(
            "{}",
            format!("{} malformed record(s):", report.stats.records_skipped).red()
        );
        for error in &report.stats.errors {
            println!("    {}", error.red());
        }
    }
}

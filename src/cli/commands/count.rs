//! Count command implementation
//!
//! Terminal aggregations over the record stream: `--by FIELD` groups by a
//! field's textual value, `--where LABEL=PREDICATE` keeps independent
//! labeled tallies. An optional `-e` pre-filter narrows the stream first.

use super::shared::{compile_predicates, load_configuration, open_reader, setup_logging};
use crate::app::services::formatter::DelimitedWriter;
use crate::app::services::query::{FieldRef, Predicate, count_by, count_where, filter_records};
use crate::cli::args::{CountArgs, OutputFormat};
use crate::{Error, Result};
use colored::Colorize;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use tracing::{debug, info};

/// Count command runner
pub fn run_count(args: CountArgs) -> Result<i32> {
    setup_logging(args.get_log_level())?;

    info!("Starting count");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(args.config_file.as_deref())?;

    let skip_malformed = args.skip_malformed || config.parsing.skip_malformed;
    let mut reader = open_reader(args.input.as_deref(), skip_malformed)?;
    let header = reader.header().clone();

    let prefilter = compile_predicates(&args.expressions, &header)?;

    // Group-by mode and labeled-tally mode both produce label -> count
    // pairs; grouping keys are sorted for deterministic output, tally
    // labels keep their declared order.
    let (key_label, counts): (String, Vec<(String, u64)>) = match &args.by {
        Some(by) => {
            let key = FieldRef::parse(by)?.bind(&header)?;
            let grouped = count_by(filter_records(reader.by_ref(), &prefilter), &key)?;
            (
                key.to_string(),
                grouped.into_iter().sorted().collect(),
            )
        }
        None => {
            let tallies: Vec<(String, Predicate)> = args
                .tallies
                .iter()
                .map(|tally| {
                    Ok((
                        tally.label.clone(),
                        Predicate::parse(&tally.expression)?.bind(&header)?,
                    ))
                })
                .collect::<Result<_>>()?;
            let tallied = count_where(filter_records(reader.by_ref(), &prefilter), &tallies)?;
            ("label".to_string(), tallied.into_iter().collect())
        }
    };

    write_counts(&args, &key_label, &counts)?;

    let stats = reader.stats();
    info!(
        "Count complete: {} records in {} groups ({} skipped)",
        stats.records_parsed,
        counts.len(),
        stats.records_skipped
    );

    Ok(0)
}

fn write_counts(args: &CountArgs, key_label: &str, counts: &[(String, u64)]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.format {
        OutputFormat::Human => {
            for (value, count) in counts {
                writeln!(out, "{}\t{}", value, count)
                    .map_err(|e| Error::io("failed to write counts", e))?;
            }
            out.flush()
                .map_err(|e| Error::io("failed to flush counts", e))?;

            if !args.quiet {
                let total: u64 = counts.iter().map(|(_, count)| count).sum();
                eprintln!(
                    "{} {} across {} groups",
                    "total:".bold(),
                    total,
                    counts.len()
                );
            }
        }
        OutputFormat::Json => {
            // BTreeMap keeps JSON key order stable
            let map: BTreeMap<&str, u64> = counts
                .iter()
                .map(|(value, count)| (value.as_str(), *count))
                .collect();
            let rendered = serde_json::to_string_pretty(&map)
                .map_err(|e| Error::configuration(format!("failed to encode counts: {}", e)))?;
            writeln!(out, "{}", rendered)
                .map_err(|e| Error::io("failed to write counts", e))?;
            out.flush()
                .map_err(|e| Error::io("failed to flush counts", e))?;
        }
        OutputFormat::Csv => {
            let mut writer = DelimitedWriter::with_header(
                ',',
                vec![key_label.to_string(), "count".to_string()],
            );
            for (value, count) in counts {
                writer.write_row(&mut out, &[value.clone(), count.to_string()])?;
            }
            writer.finish(&mut out)?;
        }
    }

    Ok(())
}

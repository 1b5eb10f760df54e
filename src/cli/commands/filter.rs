//! Filter command implementation
//!
//! Streams the input once, emitting records that match the AND-ed
//! predicate expressions: in native VCF form (header passed through) by
//! default, or projected onto an ordered field list with `--fields`.

use super::shared::{
    bind_fields, compile_predicates, load_configuration, open_reader, setup_logging,
};
use crate::app::services::formatter::DelimitedWriter;
use crate::app::services::query::{filter_records, project};
use crate::cli::args::FilterArgs;
use crate::constants::delimiter_char;
use crate::{Error, Result};
use std::io::{BufWriter, Write};
use tracing::{debug, info};

/// Filter command runner
///
/// Orchestration order matters for fail-fast semantics: the input is
/// opened (consuming only the header), then every predicate and
/// projection field is validated against the header, and only then are
/// records pulled. Invalid queries never produce partial output.
pub fn run_filter(args: FilterArgs) -> Result<i32> {
    setup_logging(args.get_log_level())?;

    info!("Starting filter");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(args.config_file.as_deref())?;

    let skip_malformed = args.skip_malformed || config.parsing.skip_malformed;
    let mut reader = open_reader(args.input.as_deref(), skip_malformed)?;
    let header = reader.header().clone();

    let predicate = compile_predicates(&args.expressions, &header)?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut matched = 0usize;

    match &args.fields {
        Some(list) => {
            let fields = bind_fields(&list.fields, &header)?;
            let delimiter = args
                .output_delimiter
                .map(|d| d.as_char())
                .or_else(|| delimiter_char(&config.output.delimiter))
                .unwrap_or('\t');

            let labels: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
            let mut writer = if args.no_header || !config.output.include_header {
                DelimitedWriter::new(delimiter)
            } else {
                DelimitedWriter::with_header(delimiter, labels)
            };

            for result in filter_records(reader.by_ref(), &predicate) {
                let record = result?;
                let tuple = project(&record, &fields)?;
                writer.write_row(&mut out, &tuple)?;
                matched += 1;
            }
            writer.finish(&mut out)?;
        }
        None => {
            // Native output: pass the original header through so the
            // filtered stream stays a valid VCF.
            for line in header.lines() {
                writeln!(out, "{}", line)
                    .map_err(|e| Error::io("failed to write output", e))?;
            }
            for result in filter_records(reader.by_ref(), &predicate) {
                let record = result?;
                writeln!(out, "{}", record.to_line())
                    .map_err(|e| Error::io("failed to write output", e))?;
                matched += 1;
            }
            out.flush()
                .map_err(|e| Error::io("failed to flush output", e))?;
        }
    }

    let stats = reader.stats();
    info!(
        "Filter complete: {} of {} records matched ({} skipped)",
        matched, stats.records_parsed, stats.records_skipped
    );

    // Zero matching records is still success
    Ok(0)
}

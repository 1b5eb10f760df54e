//! Convert command implementation
//!
//! Rewrites the record stream as delimiter-separated text: every column
//! by default, or a projected field list, with optional `OLD=NEW` header
//! relabeling. The header row is emitted exactly once, before any data,
//! even when the input holds no records.

use super::shared::{bind_fields, load_configuration, open_reader, setup_logging};
use crate::app::services::formatter::{DelimitedWriter, apply_relabels};
use crate::app::services::query::project;
use crate::cli::args::ConvertArgs;
use crate::constants::delimiter_char;
use crate::Result;
use std::io::BufWriter;
use tracing::{debug, info, warn};

/// Convert command runner
pub fn run_convert(args: ConvertArgs) -> Result<i32> {
    setup_logging(args.get_log_level())?;

    info!("Starting convert");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config = load_configuration(args.config_file.as_deref())?;

    let skip_malformed = args.skip_malformed || config.parsing.skip_malformed;
    let mut reader = open_reader(args.input.as_deref(), skip_malformed)?;
    let header = reader.header().clone();

    let delimiter = args
        .delimiter
        .map(|d| d.as_char())
        .or_else(|| delimiter_char(&config.output.delimiter))
        .unwrap_or('\t');

    let fields = match &args.fields {
        Some(list) => Some(bind_fields(&list.fields, &header)?),
        None => None,
    };

    // Column labels before relabeling: the projected field names, or the
    // full column-header schema (fixed columns plus sample names).
    let labels: Vec<String> = match &fields {
        Some(fields) => fields.iter().map(|f| f.to_string()).collect(),
        None => header
            .column_line
            .trim_start_matches('#')
            .split('\t')
            .map(str::to_string)
            .collect(),
    };

    let relabels: Vec<(String, String)> = args
        .relabels
        .iter()
        .map(|r| (r.from.clone(), r.to.clone()))
        .collect();
    for (from, _) in &relabels {
        if !labels.iter().any(|label| label == from) {
            warn!("Relabel '{}' matches no output column", from);
        }
    }
    let labels = apply_relabels(&labels, &relabels);

    let include_header = !args.no_header && config.output.include_header;
    let mut writer = if include_header {
        DelimitedWriter::with_header(delimiter, labels)
    } else {
        DelimitedWriter::new(delimiter)
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut written = 0usize;

    for result in reader.by_ref() {
        let record = result?;
        match &fields {
            Some(fields) => {
                let tuple = project(&record, fields)?;
                writer.write_row(&mut out, &tuple)?;
            }
            None => {
                writer.write_row(&mut out, &record.fields)?;
            }
        }
        written += 1;
    }
    writer.finish(&mut out)?;

    let stats = reader.stats();
    info!(
        "Convert complete: {} records written ({} skipped)",
        written, stats.records_skipped
    );

    Ok(0)
}

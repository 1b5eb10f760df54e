//! Shared components for CLI commands
//!
//! Common setup used across the command implementations: logging,
//! configuration loading, input opening and predicate compilation.

use crate::app::models::VcfHeader;
use crate::app::services::query::{FieldRef, Predicate};
use crate::app::services::vcf_parser::VcfReader;
use crate::config::Config;
use crate::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Set up structured logging on stderr
pub fn setup_logging(log_level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vcfquery={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (defaults -> file -> CLI)
pub fn load_configuration(config_file: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_file {
        info!("Using config file: {}", path.display());
    }
    Config::load_layered(config_file)
}

/// Open the input stream: a file when given, stdin otherwise.
///
/// The returned reader has already consumed the header prefix; dropping
/// it releases the underlying handle on every exit path.
pub fn open_reader(
    input: Option<&Path>,
    skip_malformed: bool,
) -> Result<VcfReader<Box<dyn BufRead>>> {
    let source: Box<dyn BufRead> = match input {
        Some(path) => {
            info!("Reading VCF input from {}", path.display());
            let file = std::fs::File::open(path)
                .map_err(|e| Error::io(format!("failed to open {}", path.display()), e))?;
            Box::new(std::io::BufReader::new(file))
        }
        None => {
            info!("Reading VCF input from stdin");
            Box::new(std::io::BufReader::new(std::io::stdin()))
        }
    };

    Ok(VcfReader::new(source)?.with_skip_malformed(skip_malformed))
}

/// Parse and bind the given expressions into one AND-ed predicate.
///
/// Fails fast: every syntax or schema problem surfaces here, before any
/// record is pulled. No expressions means match-everything.
pub fn compile_predicates(expressions: &[String], header: &VcfHeader) -> Result<Predicate> {
    if expressions.is_empty() {
        return Ok(Predicate::True);
    }

    let parts: Vec<Predicate> = expressions
        .iter()
        .map(|expr| Predicate::parse(expr)?.bind(header))
        .collect::<Result<_>>()?;

    Ok(if parts.len() == 1 {
        parts.into_iter().next().expect("non-empty")
    } else {
        Predicate::And(parts)
    })
}

/// Parse and bind a projection field list against the header
pub fn bind_fields(raw_fields: &[String], header: &VcfHeader) -> Result<Vec<FieldRef>> {
    raw_fields
        .iter()
        .map(|raw| FieldRef::parse(raw)?.bind(header))
        .collect()
}

/// Create a progress spinner for long-running scans
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::vcf_parser::header::build_header;

    fn header() -> VcfHeader {
        build_header(
            vec![],
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_compile_no_expressions_matches_everything() {
        let predicate = compile_predicates(&[], &header()).unwrap();
        assert!(matches!(predicate, Predicate::True));
    }

    #[test]
    fn test_compile_multiple_expressions_are_anded() {
        let predicate = compile_predicates(
            &["qual > 50".to_string(), "chrom == chr1".to_string()],
            &header(),
        )
        .unwrap();
        assert!(matches!(predicate, Predicate::And(parts) if parts.len() == 2));
    }

    #[test]
    fn test_compile_fails_fast_on_bad_schema() {
        let result = compile_predicates(&["sample.NA999.GT == \"0/1\"".to_string()], &header());
        assert!(result.is_err());
    }

    #[test]
    fn test_bind_fields_rejects_unknown_sample() {
        let result = bind_fields(&["chrom".to_string(), "sample[3].GT".to_string()], &header());
        assert!(result.is_err());
    }
}

//! Command-line argument definitions for vcfquery
//!
//! This module defines the complete CLI interface using the clap derive
//! API: filter, count, convert and validate subcommands.

use crate::app::services::query::FieldRef;
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the vcfquery VCF processor
///
/// Streams Variant Call Format (VCF) files from a file or stdin and
/// filters, counts, converts or validates the record stream.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vcfquery",
    version,
    about = "Filter, count and transform VCF variant records from the command line",
    long_about = "A streaming processor for Variant Call Format (VCF) files. Reads one \
                  input (file or stdin) in a single pass, so arbitrarily large files run \
                  in bounded memory. Filtering uses a small predicate language over the \
                  fixed columns, INFO keys and per-sample FORMAT keys; counting supports \
                  group-by keys and independent labeled tallies; converting rewrites \
                  delimiters and header labels."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands for vcfquery
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Filter records with predicate expressions
    Filter(FilterArgs),
    /// Count records by a grouping key or labeled tallies
    Count(CountArgs),
    /// Rewrite the record stream with a new delimiter or header labels
    Convert(ConvertArgs),
    /// Check well-formedness and report stream statistics
    Validate(ValidateArgs),
}

/// Arguments for the filter command
#[derive(Debug, Clone, Parser)]
pub struct FilterArgs {
    /// Input VCF file; reads stdin when omitted
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Predicate expression; repeat to AND several together
    ///
    /// Examples: 'qual > 50', 'chrom == "chr1" and qual > 80',
    /// 'pos in 1000..=5000', 'len(ref) == 1 and len(alt) == 1',
    /// 'id ~ "^rs[0-9]+$"', 'sample.NA001.GT == "0/1"'.
    #[arg(
        short = 'e',
        long = "expr",
        value_name = "PREDICATE",
        required = true,
        help = "Predicate expression (repeatable, AND-ed together)"
    )]
    pub expressions: Vec<String>,

    /// Project matching records onto these fields instead of emitting
    /// native VCF
    ///
    /// Comma-separated field list, e.g. 'chrom,pos,qual,info.DP'. Output
    /// column order follows the list order.
    #[arg(
        long = "fields",
        value_name = "LIST",
        help = "Comma-separated fields to project instead of native VCF output"
    )]
    pub fields: Option<FieldList>,

    /// Delimiter for projected output
    #[arg(
        long = "output-delimiter",
        value_enum,
        value_name = "DELIM",
        help = "Delimiter for projected output (default from config, tab)"
    )]
    pub output_delimiter: Option<DelimiterArg>,

    /// Suppress the header row of projected output
    #[arg(long = "no-header", help = "Suppress the projected-output header row")]
    pub no_header: bool,

    /// Skip malformed records and report them instead of aborting
    ///
    /// The default aborts on the first malformed record: silently dropping
    /// variant records is a correctness hazard.
    #[arg(long = "skip-malformed", help = "Skip malformed records instead of aborting")]
    pub skip_malformed: bool,

    /// Path to configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Arguments for the count command
#[derive(Debug, Clone, Parser)]
pub struct CountArgs {
    /// Input VCF file; reads stdin when omitted
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Group records by this field and count per distinct value
    #[arg(
        long = "by",
        value_name = "FIELD",
        help = "Grouping key, e.g. 'chrom' or 'filter'"
    )]
    pub by: Option<String>,

    /// Labeled tally: LABEL=PREDICATE, repeatable
    ///
    /// Every predicate is evaluated against every record independently, so
    /// a record may count toward several labels. Example:
    /// --where 'high=qual >= 50' --where 'low=qual < 50'.
    #[arg(
        long = "where",
        value_name = "LABEL=PREDICATE",
        help = "Labeled tally predicate (repeatable, tallies are independent)"
    )]
    pub tallies: Vec<TallySpec>,

    /// Pre-filter expression applied before counting; repeatable, AND-ed
    #[arg(short = 'e', long = "expr", value_name = "PREDICATE")]
    pub expressions: Vec<String>,

    /// Output format for the count mapping
    #[arg(long = "format", value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Skip malformed records and report them instead of aborting
    #[arg(long = "skip-malformed")]
    pub skip_malformed: bool,

    /// Path to configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Input VCF file; reads stdin when omitted
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output delimiter
    #[arg(
        long = "delimiter",
        value_enum,
        value_name = "DELIM",
        help = "Output delimiter (default from config, tab)"
    )]
    pub delimiter: Option<DelimiterArg>,

    /// Project onto these fields instead of emitting every column
    #[arg(long = "fields", value_name = "LIST")]
    pub fields: Option<FieldList>,

    /// Rename a header label: OLD=NEW, repeatable
    #[arg(
        long = "relabel",
        value_name = "OLD=NEW",
        help = "Rename a header column label (repeatable)"
    )]
    pub relabels: Vec<RelabelSpec>,

    /// Suppress the header row
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Skip malformed records and report them instead of aborting
    #[arg(long = "skip-malformed")]
    pub skip_malformed: bool,

    /// Path to configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Arguments for the validate command
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    /// Input VCF file; reads stdin when omitted
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output format for the validation report
    #[arg(long = "format", value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Path to configuration file (TOML format)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output format options for machine-readable results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
    /// CSV format for data analysis
    Csv,
}

/// Output delimiter choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DelimiterArg {
    Tab,
    Comma,
}

impl DelimiterArg {
    pub fn as_char(self) -> char {
        match self {
            DelimiterArg::Tab => '\t',
            DelimiterArg::Comma => ',',
        }
    }
}

/// Wrapper for parsing comma-separated field lists
#[derive(Debug, Clone)]
pub struct FieldList {
    pub fields: Vec<String>,
}

impl FromStr for FieldList {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<String> = s
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        if fields.is_empty() {
            return Err(Error::configuration("field list cannot be empty"));
        }

        // Syntax check up front; binding against the header happens once
        // the input is open.
        for field in &fields {
            FieldRef::parse(field)?;
        }

        Ok(FieldList { fields })
    }
}

/// Wrapper for parsing LABEL=PREDICATE tally specs
#[derive(Debug, Clone)]
pub struct TallySpec {
    pub label: String,
    pub expression: String,
}

impl FromStr for TallySpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (label, expression) = s.split_once('=').ok_or_else(|| {
            Error::configuration(format!("tally '{}' must be LABEL=PREDICATE", s))
        })?;

        let label = label.trim();
        let expression = expression.trim();
        if label.is_empty() || expression.is_empty() {
            return Err(Error::configuration(format!(
                "tally '{}' must have a non-empty label and predicate",
                s
            )));
        }

        Ok(TallySpec {
            label: label.to_string(),
            expression: expression.to_string(),
        })
    }
}

/// Wrapper for parsing OLD=NEW relabel specs
#[derive(Debug, Clone)]
pub struct RelabelSpec {
    pub from: String,
    pub to: String,
}

impl FromStr for RelabelSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (from, to) = s
            .split_once('=')
            .ok_or_else(|| Error::configuration(format!("relabel '{}' must be OLD=NEW", s)))?;

        if from.is_empty() || to.is_empty() {
            return Err(Error::configuration(format!(
                "relabel '{}' must have non-empty OLD and NEW labels",
                s
            )));
        }

        Ok(RelabelSpec {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Commands {
        self.command
            .clone()
            .expect("Command should be present when get_command() is called")
    }
}

fn validate_input_path(input: &Option<PathBuf>) -> Result<()> {
    if let Some(path) = input {
        if !path.exists() {
            return Err(Error::configuration(format!(
                "input file does not exist: {}",
                path.display()
            )));
        }
        if path.is_dir() {
            return Err(Error::configuration(format!(
                "input path is a directory: {}",
                path.display()
            )));
        }
    }
    Ok(())
}

fn log_level_for(quiet: bool, verbose: u8) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

impl FilterArgs {
    /// Validate the filter command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_input_path(&self.input)?;

        if self.no_header && self.fields.is_none() {
            return Err(Error::configuration(
                "--no-header only applies to projected output (--fields)",
            ));
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level_for(self.quiet, self.verbose)
    }
}

impl CountArgs {
    /// Validate the count command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_input_path(&self.input)?;

        match (self.by.is_some(), !self.tallies.is_empty()) {
            (true, true) => Err(Error::configuration(
                "--by and --where are mutually exclusive",
            )),
            (false, false) => Err(Error::configuration(
                "count requires either --by FIELD or at least one --where LABEL=PREDICATE",
            )),
            _ => {
                let mut seen = std::collections::HashSet::new();
                for tally in &self.tallies {
                    if !seen.insert(tally.label.as_str()) {
                        return Err(Error::configuration(format!(
                            "duplicate tally label '{}'",
                            tally.label
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level_for(self.quiet, self.verbose)
    }
}

impl ConvertArgs {
    /// Validate the convert command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_input_path(&self.input)
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level_for(self.quiet, self.verbose)
    }
}

impl ValidateArgs {
    /// Validate the validate command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        validate_input_path(&self.input)?;

        if self.format == OutputFormat::Csv {
            return Err(Error::configuration(
                "validate supports --format human or json",
            ));
        }
        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        log_level_for(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_field_list_parsing() {
        let list = FieldList::from_str("chrom, pos ,qual").unwrap();
        assert_eq!(list.fields, vec!["chrom", "pos", "qual"]);

        let list = FieldList::from_str("chrom,info.DP,sample.NA001.GT").unwrap();
        assert_eq!(list.fields.len(), 3);

        assert!(FieldList::from_str("").is_err());
        assert!(FieldList::from_str(",,,").is_err());
        assert!(FieldList::from_str("chrom,bogus").is_err());
    }

    #[test]
    fn test_tally_spec_parsing() {
        let tally = TallySpec::from_str("high=qual >= 50").unwrap();
        assert_eq!(tally.label, "high");
        assert_eq!(tally.expression, "qual >= 50");

        assert!(TallySpec::from_str("no-separator").is_err());
        assert!(TallySpec::from_str("=qual > 50").is_err());
        assert!(TallySpec::from_str("label=").is_err());
    }

    #[test]
    fn test_relabel_spec_parsing() {
        let relabel = RelabelSpec::from_str("CHROM=chromosome").unwrap();
        assert_eq!(relabel.from, "CHROM");
        assert_eq!(relabel.to, "chromosome");

        assert!(RelabelSpec::from_str("CHROM").is_err());
        assert!(RelabelSpec::from_str("=x").is_err());
    }

    #[test]
    fn test_count_args_require_exactly_one_mode() {
        let file = NamedTempFile::new().unwrap();
        let base = CountArgs {
            input: Some(file.path().to_path_buf()),
            by: None,
            tallies: vec![],
            expressions: vec![],
            format: OutputFormat::Human,
            skip_malformed: false,
            config_file: None,
            verbose: 0,
            quiet: false,
        };

        assert!(base.validate().is_err());

        let mut by_mode = base.clone();
        by_mode.by = Some("chrom".to_string());
        assert!(by_mode.validate().is_ok());

        let mut where_mode = base.clone();
        where_mode.tallies = vec![TallySpec::from_str("high=qual >= 50").unwrap()];
        assert!(where_mode.validate().is_ok());

        let mut both = by_mode.clone();
        both.tallies = where_mode.tallies.clone();
        assert!(both.validate().is_err());

        let mut duplicate = base;
        duplicate.tallies = vec![
            TallySpec::from_str("x=qual > 50").unwrap(),
            TallySpec::from_str("x=qual < 50").unwrap(),
        ];
        assert!(duplicate.validate().is_err());
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(log_level_for(false, 0), "warn");
        assert_eq!(log_level_for(false, 1), "info");
        assert_eq!(log_level_for(false, 2), "debug");
        assert_eq!(log_level_for(false, 5), "trace");
        assert_eq!(log_level_for(true, 0), "error");
    }

    #[test]
    fn test_filter_args_reject_missing_input() {
        let args = FilterArgs {
            input: Some(PathBuf::from("/nonexistent/input.vcf")),
            expressions: vec!["qual > 50".to_string()],
            fields: None,
            output_delimiter: None,
            no_header: false,
            skip_malformed: false,
            config_file: None,
            verbose: 0,
            quiet: false,
        };
        assert!(args.validate().is_err());
    }
}

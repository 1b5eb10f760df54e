//! vcfquery Library
//!
//! A Rust library for streaming inspection of Variant Call Format (VCF)
//! files: filtering with a small predicate language, count aggregations,
//! field projection and delimiter rewriting.
//!
//! This library provides tools for:
//! - Parsing VCF files with proper header/data section handling
//! - A typed record model over the 9 fixed columns plus per-sample fields
//! - Predicate filtering with fail-fast schema validation
//! - Count-by-key and labeled-tally aggregations
//! - Delimited text output with optional header relabeling
//! - Comprehensive error handling with per-line context

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod formatter;
        pub mod query;
        pub mod vcf_parser;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{FilterStatus, Genotype, VcfHeader, VcfRecord};
pub use config::Config;

/// Result type alias for vcfquery
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for VCF processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// VCF header error (missing or malformed `#CHROM` line, bad metadata)
    #[error("VCF header error: {message}")]
    Header { message: String },

    /// A data line that violates the record invariants
    #[error("malformed record at line {line_number}: {message}\n  offending line: {line}")]
    MalformedRecord {
        line_number: usize,
        line: String,
        message: String,
    },

    /// A predicate or projection references a field the schema does not have
    #[error("unknown field '{field}': {message}")]
    UnknownField { field: String, message: String },

    /// A projection references a key absent on a particular record
    #[error("field '{field}' is not present on record at line {line_number}")]
    UnknownFieldOnRecord { field: String, line_number: usize },

    /// Malformed predicate expression
    #[error("invalid predicate '{expr}': {message}")]
    InvalidPredicate { expr: String, message: String },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a header error
    pub fn header(message: impl Into<String>) -> Self {
        Self::Header {
            message: message.into(),
        }
    }

    /// Create a malformed record error with the offending line
    pub fn malformed_record(
        line_number: usize,
        line: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            line_number,
            line: line.into(),
            message: message.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a per-record unknown field error
    pub fn unknown_field_on_record(field: impl Into<String>, line_number: usize) -> Self {
        Self::UnknownFieldOnRecord {
            field: field.into(),
            line_number,
        }
    }

    /// Create an invalid predicate error
    pub fn invalid_predicate(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPredicate {
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Exit code reported by the CLI for this error
    pub fn exit_code(&self) -> i32 {
        // Every failure maps to 1 for now; kept as a method so usage
        // errors can diverge from data errors without touching main().
        1
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

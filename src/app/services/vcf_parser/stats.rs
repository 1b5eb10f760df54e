//! Parsing statistics for VCF stream processing
//!
//! Tracks how many data lines were seen, how many records parsed, and
//! what went wrong, for reporting by the CLI commands.

use serde::{Deserialize, Serialize};

/// Counters accumulated while consuming a record stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseStats {
    /// Data lines encountered (well-formed or not)
    pub data_lines: usize,

    /// Records successfully parsed
    pub records_parsed: usize,

    /// Records skipped in skip-malformed mode
    pub records_skipped: usize,

    /// Descriptions of malformed records, for reporting
    pub errors: Vec<String>,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Success rate as a percentage of data lines seen
    pub fn success_rate(&self) -> f64 {
        if self.data_lines == 0 {
            0.0
        } else {
            (self.records_parsed as f64 / self.data_lines as f64) * 100.0
        }
    }

    /// True when every data line produced a record
    pub fn is_clean(&self) -> bool {
        self.records_skipped == 0 && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = ParseStats::new();
        assert_eq!(stats.success_rate(), 0.0);

        stats.data_lines = 4;
        stats.records_parsed = 3;
        stats.records_skipped = 1;
        assert_eq!(stats.success_rate(), 75.0);
        assert!(!stats.is_clean());
    }
}

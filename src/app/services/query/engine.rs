//! Stream operations over parsed records
//!
//! Lazy predicate filtering, field projection, count-by-key and
//! independent labeled tallies. Filtering and projection
//! are iterator adapters that preserve input order and pass errors
//! through; the count operations are terminal and consume the stream,
//! buffering only accumulator state proportional to the number of
//! distinct keys or labels.

use crate::app::models::VcfRecord;
use crate::app::services::query::field::FieldRef;
use crate::app::services::query::predicate::Predicate;
use crate::constants::MISSING_SENTINEL;
use crate::{Error, Result};
use indexmap::IndexMap;
use itertools::process_results;
use std::collections::HashMap;

/// Lazily filter a record stream, preserving order.
///
/// Errors from the upstream parser pass through untouched so the default
/// abort-on-malformed policy reaches the caller.
pub fn filter_records<'a, I>(
    records: I,
    predicate: &'a Predicate,
) -> impl Iterator<Item = Result<VcfRecord>> + 'a
where
    I: Iterator<Item = Result<VcfRecord>> + 'a,
{
    records.filter(move |result| match result {
        Ok(record) => predicate.matches(record),
        Err(_) => true,
    })
}

/// Project one record onto an ordered field list.
///
/// The field order determines the output column order. A reference to an
/// INFO or FORMAT key the record does not carry is an error naming the
/// record's line.
pub fn project(record: &VcfRecord, fields: &[FieldRef]) -> Result<Vec<String>> {
    fields
        .iter()
        .map(|field| {
            field
                .text(record)
                .map(str::to_string)
                .ok_or_else(|| {
                    Error::unknown_field_on_record(field.to_string(), record.line_number)
                })
        })
        .collect()
}

/// Terminal aggregation: count records per textual value of a key field.
///
/// Key iteration order is unspecified; callers needing determinism sort
/// explicitly. Records where the key is absent count under the missing
/// sentinel.
pub fn count_by<I>(records: I, key: &FieldRef) -> Result<HashMap<String, u64>>
where
    I: Iterator<Item = Result<VcfRecord>>,
{
    process_results(records, |records| {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for record in records {
            let value = key
                .text(&record)
                .unwrap_or(MISSING_SENTINEL)
                .to_string();
            *counts.entry(value).or_insert(0) += 1;
        }
        counts
    })
}

/// Terminal aggregation: independent tallies over labeled predicates.
///
/// Every predicate is evaluated against every record, so a record may
/// count toward several labels; the labels are not a partition unless the
/// caller's expressions make them one. Label order is preserved in the
/// result, and labels that never match still appear with a zero count.
pub fn count_where<I>(
    records: I,
    tallies: &[(String, Predicate)],
) -> Result<IndexMap<String, u64>>
where
    I: Iterator<Item = Result<VcfRecord>>,
{
    process_results(records, |records| {
        let mut counts: IndexMap<String, u64> = tallies
            .iter()
            .map(|(label, _)| (label.clone(), 0))
            .collect();
        for record in records {
            for (label, predicate) in tallies {
                if predicate.matches(&record) {
                    *counts.entry(label.clone()).or_insert(0) += 1;
                }
            }
        }
        counts
    })
}

//! Query engine: field references, predicates and stream operations

pub mod engine;
pub mod field;
pub mod predicate;

pub use engine::{count_by, count_where, filter_records, project};
pub use field::{FieldRef, SampleSelector};
pub use predicate::{CompareOp, Literal, Predicate};

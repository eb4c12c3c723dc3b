//! Tabular data model and ingestion for plotbench

pub mod builtin;
pub mod dataset;
pub mod parser;
pub mod value;

use thiserror::Error;

// Re-exports
pub use builtin::{builtin_dataset, builtin_label, builtin_names};
pub use dataset::{Dataset, Record};
pub use parser::parse_delimited;
pub use value::{format_number, Value};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("unknown built-in dataset '{0}'")]
    UnknownBuiltin(String),
}

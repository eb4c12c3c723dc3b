//! Built-in sample datasets

use once_cell::sync::Lazy;
use tracing::debug;

use crate::dataset::Dataset;
use crate::parser::parse_delimited;
use crate::DataError;

static IRIS: Lazy<Dataset> = Lazy::new(|| {
    let ds = parse_delimited(include_str!("data/iris.csv"));
    debug!(rows = ds.len(), "built-in iris dataset parsed");
    ds
});

/// Identifiers of all built-in datasets, for help output and selection UIs.
pub fn builtin_names() -> &'static [&'static str] {
    &["iris"]
}

/// Look up a built-in dataset by identifier.
pub fn builtin_dataset(id: &str) -> Result<&'static Dataset, DataError> {
    match id {
        "iris" => Ok(&IRIS),
        other => Err(DataError::UnknownBuiltin(other.to_string())),
    }
}

/// Display label for a built-in dataset, e.g. "Iris".
pub fn builtin_label(id: &str) -> Result<&'static str, DataError> {
    match id {
        "iris" => Ok("Iris"),
        other => Err(DataError::UnknownBuiltin(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn iris_is_available_and_typed() {
        let ds = builtin_dataset("iris").unwrap();
        assert!(!ds.is_empty());

        let first = ds.first().unwrap();
        let names: Vec<&str> = first.field_names().collect();
        assert_eq!(
            names,
            vec![
                "sepal_length",
                "sepal_width",
                "petal_length",
                "petal_width",
                "species"
            ]
        );
        assert_eq!(first.get("sepal_length"), Some(&Value::Number(5.1)));
        assert_eq!(first.get("species"), Some(&Value::Text("setosa".to_string())));
    }

    #[test]
    fn unknown_builtin_is_an_error() {
        assert!(builtin_dataset("wine").is_err());
        assert!(builtin_label("wine").is_err());
    }
}

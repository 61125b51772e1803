//! Hyperparameter defaults and the JSON override file.
use crate::config::{JobPaths, DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;

/// Override key for the batch size.
pub const BATCH_SIZE_KEY: &str = "batch_size";
/// Override key for the epoch count.
pub const EPOCHS_KEY: &str = "epochs";

/// Training hyperparameters. Only these two values are tunable; the model
/// topology is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Samples per parameter update.
    pub batch_size: usize,
    /// Full passes over the training partition.
    pub epochs: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            epochs: DEFAULT_EPOCHS,
        }
    }
}

/// Read overrides from the hyperparameter file on top of the defaults.
///
/// Keys absent from the file keep their defaults; unrecognized keys are
/// ignored. A missing file or invalid JSON is an error.
pub fn read_hyperparameters(paths: &JobPaths) -> Result<Hyperparameters> {
    let mut hyperparameters = Hyperparameters::default();

    log::info!("Reading the hyperparameters");
    let path = paths.hyperparameters_file();
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let overrides = parsed
        .as_object()
        .ok_or_else(|| anyhow!("Expected a JSON object in {}", path.display()))?;

    if let Some(value) = overrides.get(BATCH_SIZE_KEY) {
        hyperparameters.batch_size = parse_count(BATCH_SIZE_KEY, value)?;
    }
    if let Some(value) = overrides.get(EPOCHS_KEY) {
        hyperparameters.epochs = parse_count(EPOCHS_KEY, value)?;
    }

    log::info!(
        "Finished reading the hyperparameters: batch_size = {}, epochs = {}",
        hyperparameters.batch_size,
        hyperparameters.epochs
    );
    Ok(hyperparameters)
}

/// Container hyperparameter values arrive either as JSON numbers or as
/// numeric strings; both must parse to a positive integer.
fn parse_count(key: &str, value: &Value) -> Result<usize> {
    let numeric = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let numeric =
        numeric.ok_or_else(|| anyhow!("Hyperparameter '{}' is not numeric: {}", key, value))?;
    let count = numeric as i64;
    if count <= 0 {
        return Err(anyhow!(
            "Hyperparameter '{}' must be a positive integer, got {}",
            key,
            value
        ));
    }
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn paths_with_config(contents: &str) -> (tempfile::TempDir, JobPaths) {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = JobPaths::new(dir.path());
        fs::create_dir_all(dir.path().join("input/config")).expect("config dir");
        let mut file = fs::File::create(paths.hyperparameters_file()).expect("config file");
        file.write_all(contents.as_bytes()).expect("write config");
        (dir, paths)
    }

    #[test]
    fn test_defaults() {
        let hp = Hyperparameters::default();
        assert_eq!(hp.batch_size, 16);
        assert_eq!(hp.epochs, 1);
    }

    #[test]
    fn test_empty_object_keeps_defaults() {
        let (_dir, paths) = paths_with_config("{}");
        let hp = read_hyperparameters(&paths).expect("read");
        assert_eq!(hp, Hyperparameters::default());
    }

    #[test]
    fn test_full_override() {
        let (_dir, paths) = paths_with_config(r#"{"batch_size": 32, "epochs": 5}"#);
        let hp = read_hyperparameters(&paths).expect("read");
        assert_eq!(hp.batch_size, 32);
        assert_eq!(hp.epochs, 5);
    }

    #[test]
    fn test_partial_override() {
        let (_dir, paths) = paths_with_config(r#"{"batch_size": 32}"#);
        let hp = read_hyperparameters(&paths).expect("read");
        assert_eq!(hp.batch_size, 32);
        assert_eq!(hp.epochs, 1);
    }

    #[test]
    fn test_string_values_parse() {
        let (_dir, paths) = paths_with_config(r#"{"batch_size": "64", "epochs": "3"}"#);
        let hp = read_hyperparameters(&paths).expect("read");
        assert_eq!(hp.batch_size, 64);
        assert_eq!(hp.epochs, 3);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (_dir, paths) = paths_with_config(r#"{"learning_rate": 0.5, "epochs": 2}"#);
        let hp = read_hyperparameters(&paths).expect("read");
        assert_eq!(hp.batch_size, 16);
        assert_eq!(hp.epochs, 2);
    }

    #[test]
    fn test_non_positive_rejected() {
        let (_dir, paths) = paths_with_config(r#"{"batch_size": 0}"#);
        assert!(read_hyperparameters(&paths).is_err());

        let (_dir, paths) = paths_with_config(r#"{"epochs": -1}"#);
        assert!(read_hyperparameters(&paths).is_err());
    }

    #[test]
    fn test_non_numeric_rejected() {
        let (_dir, paths) = paths_with_config(r#"{"batch_size": "many"}"#);
        assert!(read_hyperparameters(&paths).is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = JobPaths::new(dir.path());
        assert!(read_hyperparameters(&paths).is_err());
    }

    #[test]
    fn test_invalid_json_fails() {
        let (_dir, paths) = paths_with_config("batch_size = 32");
        assert!(read_hyperparameters(&paths).is_err());
    }

    #[test]
    fn test_non_object_json_fails() {
        let (_dir, paths) = paths_with_config("[16, 1]");
        assert!(read_hyperparameters(&paths).is_err());
    }
}

//! Job configuration: the container path layout and fixed model constants.
use std::path::{Path, PathBuf};

/// Number of target classes.
pub const NUM_CLASSES: usize = 10;
/// Width of one input row (28x28 pixel intensities).
pub const INPUT_SIZE: usize = 784;
/// Name of the single input data channel.
pub const CHANNEL_NAME: &str = "training";
/// File name of the training data inside the channel directory.
pub const DATA_FILE: &str = "data_set";
/// Batch size used when the hyperparameter file does not set one.
pub const DEFAULT_BATCH_SIZE: usize = 16;
/// Epoch count used when the hyperparameter file does not set one.
pub const DEFAULT_EPOCHS: usize = 1;
/// Row index at which the ordered dataset is cut into train and test.
pub const DEFAULT_SPLIT_ROWS: usize = 8000;

/// Filesystem layout of a training container, rooted at a single prefix.
///
/// Constructed once at startup and passed by reference into each stage.
#[derive(Debug, Clone)]
pub struct JobPaths {
    prefix: PathBuf,
}

impl JobPaths {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The comma-delimited dataset in the training channel.
    pub fn training_data_file(&self) -> PathBuf {
        self.prefix
            .join("input/data")
            .join(CHANNEL_NAME)
            .join(DATA_FILE)
    }

    /// The JSON file with hyperparameter overrides.
    pub fn hyperparameters_file(&self) -> PathBuf {
        self.prefix.join("input/config/hyperparameters.json")
    }

    /// Directory the trained model artifacts are written to.
    pub fn model_dir(&self) -> PathBuf {
        self.prefix.join("model")
    }

    /// Auxiliary output directory of the container convention.
    pub fn output_dir(&self) -> PathBuf {
        self.prefix.join("output")
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }
}

impl Default for JobPaths {
    fn default() -> Self {
        Self::new("/opt/ml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let paths = JobPaths::default();
        assert_eq!(
            paths.training_data_file(),
            PathBuf::from("/opt/ml/input/data/training/data_set")
        );
        assert_eq!(
            paths.hyperparameters_file(),
            PathBuf::from("/opt/ml/input/config/hyperparameters.json")
        );
        assert_eq!(paths.model_dir(), PathBuf::from("/opt/ml/model"));
        assert_eq!(paths.output_dir(), PathBuf::from("/opt/ml/output"));
    }

    #[test]
    fn test_custom_prefix() {
        let paths = JobPaths::new("/tmp/job");
        assert_eq!(paths.prefix(), Path::new("/tmp/job"));
        assert_eq!(paths.model_dir(), PathBuf::from("/tmp/job/model"));
    }
}

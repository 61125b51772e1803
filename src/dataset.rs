//! Reading, pre-processing and splitting the training data.
use crate::config::{JobPaths, DEFAULT_SPLIT_ROWS, NUM_CLASSES};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::fs::File;

/// Pixel intensities arrive in byte range; dividing by 255 maps them to [0, 1].
const NORMALIZATION: f64 = 255.0;

/// One-hot encode
pub fn one_hot(label: usize, num_classes: usize) -> Vec<f64> {
    let mut v = vec![0.0; num_classes];
    if label < num_classes {
        v[label] = 1.0;
    }
    v
}

/// Where the ordered rows are cut into train and test partitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainSplit {
    /// Absolute number of leading rows that form the training partition.
    Rows(usize),
    /// Fraction of rows (rounded down) that form the training partition.
    Fraction(f64),
}

impl Default for TrainSplit {
    fn default() -> Self {
        TrainSplit::Rows(DEFAULT_SPLIT_ROWS)
    }
}

impl TrainSplit {
    fn index(&self, total: usize) -> usize {
        match *self {
            TrainSplit::Rows(rows) => rows,
            TrainSplit::Fraction(fraction) => (total as f64 * fraction) as usize,
        }
    }
}

/// The four arrays every downstream stage consumes. Rows keep the order
/// they had in the data file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedData {
    pub x_train: Vec<Vec<f64>>,
    pub y_train: Vec<Vec<f64>>,
    pub x_test: Vec<Vec<f64>>,
    pub y_test: Vec<Vec<f64>>,
}

/// Read, pre-process and split the data file with the legacy split point.
pub fn get_data(paths: &JobPaths) -> Result<ProcessedData> {
    get_data_with_split(paths, TrainSplit::default())
}

/// Read, pre-process and split the data file in order.
pub fn get_data_with_split(paths: &JobPaths, split: TrainSplit) -> Result<ProcessedData> {
    log::info!("Reading the data");
    let (features, labels) = read_data(paths)?;
    let (features, labels) = process_data(features, labels)?;
    let processed = train_test_split(features, labels, split)?;
    log::info!("Finished data reading and pre-processing");
    Ok(processed)
}

/// Read raw records: field 0 is the label token, the rest are feature tokens.
fn read_data(paths: &JobPaths) -> Result<(Vec<Vec<String>>, Vec<String>)> {
    let path = paths.training_data_file();
    let file = File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut features = Vec::new();
    let mut labels = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Failed to read row {} of {}", row_idx, path.display()))?;
        if record.is_empty() {
            continue;
        }
        labels.push(record[0].to_string());
        features.push(record.iter().skip(1).map(|s| s.to_string()).collect());
    }
    Ok((features, labels))
}

/// Parse and normalize features, parse and one-hot encode labels.
fn process_data(
    raw_features: Vec<Vec<String>>,
    raw_labels: Vec<String>,
) -> Result<(Vec<Vec<f64>>, Vec<Vec<f64>>)> {
    let width = raw_features.first().map(Vec::len).unwrap_or(0);

    let mut features = Vec::with_capacity(raw_features.len());
    for (row_idx, row) in raw_features.iter().enumerate() {
        if row.len() != width {
            return Err(anyhow!(
                "Row {} has {} feature columns, expected {}",
                row_idx,
                row.len(),
                width
            ));
        }
        let mut parsed = Vec::with_capacity(row.len());
        for value in row {
            let v: f64 = value.trim().parse().with_context(|| {
                format!("Non-numeric feature value '{}' in row {}", value, row_idx)
            })?;
            parsed.push(v / NORMALIZATION);
        }
        features.push(parsed);
    }
    log::info!("Number of data samples: {}", features.len());

    let mut labels = Vec::with_capacity(raw_labels.len());
    for (row_idx, raw) in raw_labels.iter().enumerate() {
        // Labels are written as floats in some exports; "3.0" is class 3.
        let numeric: f64 = raw
            .trim()
            .parse()
            .with_context(|| format!("Non-numeric label '{}' in row {}", raw, row_idx))?;
        let class = numeric as i64;
        if class < 0 || class as usize >= NUM_CLASSES {
            return Err(anyhow!(
                "Label '{}' in row {} is outside [0, {})",
                raw,
                row_idx,
                NUM_CLASSES
            ));
        }
        labels.push(one_hot(class as usize, NUM_CLASSES));
    }
    log::info!("Number of data labels: {}", labels.len());

    Ok((features, labels))
}

/// Deterministic, order-preserving partition of rows at the split point.
fn train_test_split(
    features: Vec<Vec<f64>>,
    labels: Vec<Vec<f64>>,
    split: TrainSplit,
) -> Result<ProcessedData> {
    let total = features.len();
    let cut = split.index(total);
    if cut == 0 || cut >= total {
        return Err(anyhow!(
            "Cannot split {} rows at index {}: both partitions must be non-empty",
            total,
            cut
        ));
    }

    let mut x_train = features;
    let x_test = x_train.split_off(cut);
    let mut y_train = labels;
    let y_test = y_train.split_off(cut);

    log::info!(
        "Number of training samples: {} ({} labels)",
        x_train.len(),
        y_train.len()
    );
    log::info!(
        "Number of test samples: {} ({} labels)",
        x_test.len(),
        y_test.len()
    );

    Ok(ProcessedData {
        x_train,
        y_train,
        x_test,
        y_test,
    })
}

//! A minimal supervised training job for pixel classification: reads a
//! comma-delimited dataset from the container input path, trains a small
//! dense network, and persists the result to the model directory.
//!
//! - Fixed container path layout (input data, hyperparameter file, model dir)
//! - JSON hyperparameter overrides on top of defaults
//! - MLP with ReLU hidden layers, dropout, and a softmax output
//! - Mini-batch RMSProp on categorical cross-entropy
//! - Architecture JSON + gzipped weights persistence

pub mod activations;
pub mod config;
pub mod dataset;
pub mod hyperparameters;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod model;
pub mod network;
pub mod optimizer;
pub mod utils;

pub use activations::{Activation, ActivationKind, ReLU, Softmax};
pub use config::{JobPaths, INPUT_SIZE, NUM_CLASSES};
pub use dataset::{get_data, get_data_with_split, one_hot, ProcessedData, TrainSplit};
pub use hyperparameters::{read_hyperparameters, Hyperparameters};
pub use layers::DenseLayer;
pub use loss::{cross_entropy_deriv, cross_entropy_loss};
pub use metrics::{accuracy, Evaluation};
pub use model::Model;
pub use network::{Architecture, Mlp};
pub use optimizer::RmsProp;
pub use utils::{generate_synthetic_data, print_model_summary};

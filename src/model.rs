//! The fixed model topology and the compile → train → evaluate → save run.
use crate::activations::{ReLU, Softmax};
use crate::config::{JobPaths, INPUT_SIZE, NUM_CLASSES};
use crate::dataset::ProcessedData;
use crate::hyperparameters::Hyperparameters;
use crate::layers::DenseLayer;
use crate::metrics::Evaluation;
use crate::network::Mlp;
use crate::optimizer::RmsProp;
use crate::utils::print_model_summary;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::sync::Arc;

/// Width of the two hidden layers.
const HIDDEN_UNITS: usize = 512;
/// Fraction of hidden activations dropped during training.
const DROPOUT_RATE: f64 = 0.2;

/// A named classifier with its training hyperparameters. The topology is
/// fixed at construction; hyperparameters only shape the training run.
pub struct Model {
    model_name: String,
    hyperparameters: Hyperparameters,
    network: Mlp,
    optimizer: Option<RmsProp>,
}

impl Model {
    pub fn new(model_name: impl Into<String>, hyperparameters: Hyperparameters) -> Self {
        let layers = vec![
            DenseLayer::new(INPUT_SIZE, HIDDEN_UNITS, Arc::new(ReLU)).with_dropout(DROPOUT_RATE),
            DenseLayer::new(HIDDEN_UNITS, HIDDEN_UNITS, Arc::new(ReLU)).with_dropout(DROPOUT_RATE),
            DenseLayer::new(HIDDEN_UNITS, NUM_CLASSES, Arc::new(Softmax)),
        ];
        Self {
            model_name: model_name.into(),
            hyperparameters,
            network: Mlp::new(layers),
            optimizer: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.model_name
    }

    pub fn network(&self) -> &Mlp {
        &self.network
    }

    /// Attach the optimizer and print the structural summary.
    pub fn compile(&mut self) {
        self.optimizer = Some(RmsProp::default());
        print_model_summary(&self.network);
    }

    /// Fit on the train partition, scoring the test partition after each epoch.
    pub fn train(&mut self, data: &ProcessedData) -> Result<()> {
        let optimizer = self
            .optimizer
            .as_mut()
            .ok_or_else(|| anyhow!("Model must be compiled before training"))?;
        self.network.fit(
            &data.x_train,
            &data.y_train,
            &data.x_test,
            &data.y_test,
            self.hyperparameters.epochs,
            self.hyperparameters.batch_size,
            optimizer,
        )
    }

    /// Loss and accuracy on the test partition.
    pub fn evaluate(&self, data: &ProcessedData) -> Result<Evaluation> {
        self.network.evaluate(&data.x_test, &data.y_test)
    }

    /// Write the architecture description and the weights container into the
    /// model directory. The directory must already exist.
    pub fn save(&self, paths: &JobPaths) -> Result<()> {
        let model_dir = paths.model_dir();

        let architecture_path = model_dir.join(format!("{}_architecture.json", self.model_name));
        let json = serde_json::to_string_pretty(&self.network.architecture())?;
        fs::write(&architecture_path, json)
            .with_context(|| format!("Failed to write {}", architecture_path.display()))?;

        let weights_path = model_dir.join(format!("{}.mlp", self.model_name));
        self.network.save(&weights_path)?;
        Ok(())
    }

    /// Full job: compile, train, evaluate, persist.
    pub fn run(&mut self, data: &ProcessedData, paths: &JobPaths) -> Result<()> {
        log::info!("Starting the model training");
        self.compile();
        self.train(data)?;
        log::info!("Finished training the model");

        let score = self.evaluate(data)?;
        log::info!("Test loss: {:.6}", score.loss);
        log::info!("Test accuracy: {:.4}", score.accuracy);

        log::info!("Saving the model");
        self.save(paths)?;
        log::info!("Finished saving the model");
        Ok(())
    }
}

//! Feed-forward classifier network: training, evaluation, and persistence.
use crate::activations::{identify_activation_kind, ActivationKind};
use crate::layers::{DenseLayer, Matrix};
use crate::loss::{cross_entropy_deriv, cross_entropy_loss};
use crate::metrics::{accuracy, Evaluation};
use crate::optimizer::RmsProp;
use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Feed-forward network of dense layers. The output layer is expected to be
/// softmax trained against cross-entropy; hidden layers may carry dropout.
#[derive(Debug)]
pub struct Mlp {
    /// Ordered list of dense layers from input to output.
    pub layers: Vec<DenseLayer>,
    /// Number of input features.
    input_size: usize,
    /// Number of outputs/classes.
    output_size: usize,
}

/// Gradients for all layers in order
#[derive(Debug)]
pub struct Gradients {
    pub d_w: Vec<Matrix>,
    pub db: Vec<Vec<f64>>,
}

impl Gradients {
    fn zeros_like(layers: &[DenseLayer]) -> Self {
        let d_w = layers
            .iter()
            .map(|l| vec![vec![0.0; l.input_size()]; l.output_size()])
            .collect();
        let db = layers.iter().map(|l| vec![0.0; l.output_size()]).collect();
        Self { d_w, db }
    }

    fn add(&mut self, other: &Gradients) {
        for (acc, g) in self.d_w.iter_mut().zip(&other.d_w) {
            for (acc_row, g_row) in acc.iter_mut().zip(g) {
                for (a, &v) in acc_row.iter_mut().zip(g_row) {
                    *a += v;
                }
            }
        }
        for (acc, g) in self.db.iter_mut().zip(&other.db) {
            for (a, &v) in acc.iter_mut().zip(g) {
                *a += v;
            }
        }
    }

    fn scale(&mut self, factor: f64) {
        for layer in self.d_w.iter_mut() {
            for row in layer.iter_mut() {
                for v in row.iter_mut() {
                    *v *= factor;
                }
            }
        }
        for layer in self.db.iter_mut() {
            for v in layer.iter_mut() {
                *v *= factor;
            }
        }
    }
}

impl Mlp {
    /// Create a network from an ordered list of layers.
    pub fn new(layers: Vec<DenseLayer>) -> Self {
        assert!(!layers.is_empty(), "At least one layer is required");
        let input_size = layers[0].input_size();
        let output_size = layers[layers.len() - 1].output_size();
        Self {
            layers,
            input_size,
            output_size,
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Inference pass from input to output. Dropout is inactive.
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut current = input.to_vec();
        for layer in &self.layers {
            let (_, a) = layer.forward(&current);
            current = a;
        }
        current
    }

    /// Predict outputs for a single input.
    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        self.forward(input)
    }

    /// Training-mode forward pass: caches pre-activations, (dropped)
    /// activations, and the dropout masks that produced them.
    #[allow(clippy::type_complexity)]
    fn forward_train<R: Rng>(
        &self,
        input: &[f64],
        rng: &mut R,
    ) -> (Vec<Vec<f64>>, Vec<Vec<f64>>, Vec<Option<Vec<f64>>>) {
        let mut activations = vec![input.to_vec()];
        let mut zs = Vec::with_capacity(self.layers.len());
        let mut masks = Vec::with_capacity(self.layers.len());
        let mut current = input.to_vec();
        for layer in &self.layers {
            let (z, mut a) = layer.forward(&current);
            let mask = layer.sample_mask(rng);
            if let Some(ref m) = mask {
                for (v, &s) in a.iter_mut().zip(m) {
                    *v *= s;
                }
            }
            zs.push(z);
            masks.push(mask);
            activations.push(a.clone());
            current = a;
        }
        (zs, activations, masks)
    }

    /// Compute (dW, db) and the loss for a single sample.
    fn sample_gradients<R: Rng>(
        &self,
        input: &[f64],
        target: &[f64],
        rng: &mut R,
    ) -> Result<(Gradients, f64)> {
        if input.len() != self.input_size || target.len() != self.output_size {
            return Err(anyhow!(
                "Input/target size mismatch: got {}/{}, expected {}/{}",
                input.len(),
                target.len(),
                self.input_size,
                self.output_size
            ));
        }
        let (zs, activations, masks) = self.forward_train(input, rng);
        let y_hat = activations.last().expect("No layers in MLP");
        let loss = cross_entropy_loss(y_hat, target)?;

        // softmax + CE: dz at the output is y_hat - target
        let mut delta = cross_entropy_deriv(y_hat, target)?;

        let mut d_w: Vec<Matrix> = Vec::with_capacity(self.layers.len());
        let mut db: Vec<Vec<f64>> = Vec::with_capacity(self.layers.len());
        let last = self.layers.len() - 1;
        for layer_idx in (0..self.layers.len()).rev() {
            let layer = &self.layers[layer_idx];
            let z = &zs[layer_idx];
            let a_prev = &activations[layer_idx];
            // Dropped units carry no gradient
            if let Some(mask) = &masks[layer_idx] {
                for (d, &m) in delta.iter_mut().zip(mask) {
                    *d *= m;
                }
            }
            // At the output layer the CE shortcut already produced dz
            let dz: Vec<f64> = if layer_idx == last {
                delta.clone()
            } else {
                delta
                    .iter()
                    .zip(z)
                    .map(|(&d, &val)| d * layer.activation.derivative(val))
                    .collect()
            };
            db.push(dz.clone());
            // dW = dz (outer) a_prev
            let mut d_w_layer: Matrix = vec![vec![0.0; a_prev.len()]; dz.len()];
            for (i, dz_i) in dz.iter().copied().enumerate() {
                for (j, &a_prev_j) in a_prev.iter().enumerate() {
                    d_w_layer[i][j] = dz_i * a_prev_j;
                }
            }
            d_w.push(d_w_layer);
            // delta_prev = W^T * dz
            let mut delta_prev = vec![0.0; a_prev.len()];
            for (i, row) in layer.weights.iter().enumerate() {
                for (j, &w) in row.iter().enumerate() {
                    delta_prev[j] += w * dz[i];
                }
            }
            delta = delta_prev;
        }
        // reverse back to layer order
        d_w.reverse();
        db.reverse();
        Ok((Gradients { d_w, db }, loss))
    }

    /// Mini-batch training with a validation score after every epoch.
    #[allow(clippy::too_many_arguments)]
    pub fn fit(
        &mut self,
        x_train: &[Vec<f64>],
        y_train: &[Vec<f64>],
        x_val: &[Vec<f64>],
        y_val: &[Vec<f64>],
        epochs: usize,
        batch_size: usize,
        optimizer: &mut RmsProp,
    ) -> Result<()> {
        if x_train.is_empty() {
            return Err(anyhow!("Training partition is empty"));
        }
        if x_train.len() != y_train.len() {
            return Err(anyhow!(
                "Feature/label row mismatch: {} vs {}",
                x_train.len(),
                y_train.len()
            ));
        }
        if batch_size == 0 {
            return Err(anyhow!("Batch size must be positive"));
        }

        let mut rng = rand::thread_rng();
        for epoch in 1..=epochs {
            // Shuffle sample order each epoch for SGD stability
            let mut indices: Vec<usize> = (0..x_train.len()).collect();
            indices.as_mut_slice().shuffle(&mut rng);

            let mut total_loss = 0.0;
            for chunk in indices.chunks(batch_size) {
                let mut batch_grads = Gradients::zeros_like(&self.layers);
                for &idx in chunk {
                    let (grads, loss) =
                        self.sample_gradients(&x_train[idx], &y_train[idx], &mut rng)?;
                    batch_grads.add(&grads);
                    total_loss += loss;
                }
                batch_grads.scale(1.0 / chunk.len() as f64);
                optimizer.step(&mut self.layers, &batch_grads);
            }

            let train_loss = total_loss / x_train.len() as f64;
            if x_val.is_empty() {
                log::info!("Epoch {}/{}: loss = {:.6}", epoch, epochs, train_loss);
            } else {
                let val = self.evaluate(x_val, y_val)?;
                log::info!(
                    "Epoch {}/{}: loss = {:.6}, val_loss = {:.6}, val_accuracy = {:.4}",
                    epoch,
                    epochs,
                    train_loss,
                    val.loss,
                    val.accuracy
                );
            }
        }
        Ok(())
    }

    /// Average loss and accuracy over a partition, dropout inactive.
    pub fn evaluate(&self, features: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Evaluation> {
        if features.is_empty() {
            return Err(anyhow!("Cannot evaluate on an empty partition"));
        }
        if features.len() != targets.len() {
            return Err(anyhow!(
                "Feature/label row mismatch: {} vs {}",
                features.len(),
                targets.len()
            ));
        }
        let mut total_loss = 0.0;
        for (input, target) in features.iter().zip(targets) {
            if input.len() != self.input_size || target.len() != self.output_size {
                return Err(anyhow!(
                    "Input/target size mismatch: got {}/{}, expected {}/{}",
                    input.len(),
                    target.len(),
                    self.input_size,
                    self.output_size
                ));
            }
            let y_hat = self.forward(input);
            total_loss += cross_entropy_loss(&y_hat, target)?;
        }
        Ok(Evaluation {
            loss: total_loss / features.len() as f64,
            accuracy: accuracy(features, targets, self),
        })
    }

    /// Structural description of the network without weights.
    pub fn architecture(&self) -> Architecture {
        Architecture {
            input_size: self.input_size,
            output_size: self.output_size,
            layers: self
                .layers
                .iter()
                .map(|layer| LayerArchitecture {
                    input_size: layer.input_size(),
                    output_size: layer.output_size(),
                    activation: identify_activation_kind(layer.activation.as_ref()),
                    dropout: layer.dropout,
                })
                .collect(),
        }
    }

    /// Total number of trainable parameters.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.output_size() * (l.input_size() + 1))
            .sum()
    }

    /// Save weights and architecture as a gzipped JSON container. The
    /// target directory must already exist.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dto = MlpDto::from_mlp(self);
        let json = serde_json::to_vec(&dto)?;
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(&json)?;
        enc.finish()?;
        Ok(())
    }

    /// Load a network saved with [`Mlp::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let mut dec = GzDecoder::new(file);
        let mut buf = Vec::new();
        dec.read_to_end(&mut buf)
            .with_context(|| format!("Failed to decompress {}", path.display()))?;
        let dto: MlpDto = serde_json::from_slice(&buf)
            .with_context(|| format!("Malformed model container {}", path.display()))?;
        Ok(dto.into_mlp())
    }
}

impl fmt::Display for Mlp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sizes = vec![self.input_size];
        for layer in &self.layers {
            sizes.push(layer.output_size());
        }
        write!(f, "MLP: {:?}", sizes)
    }
}

// ============ Architecture description ============

/// One layer of the persisted structural description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerArchitecture {
    pub input_size: usize,
    pub output_size: usize,
    pub activation: ActivationKind,
    pub dropout: f64,
}

/// The persisted structural description of the whole network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    pub input_size: usize,
    pub output_size: usize,
    pub layers: Vec<LayerArchitecture>,
}

// ============ Persistence DTOs ============

#[derive(Debug, Serialize, Deserialize)]
struct LayerDto {
    input_size: usize,
    output_size: usize,
    weights: Vec<Vec<f64>>, // [output_size][input_size]
    bias: Vec<f64>,         // [output_size]
    activation: ActivationKind,
    dropout: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct MlpDto {
    input_size: usize,
    output_size: usize,
    layers: Vec<LayerDto>,
}

impl MlpDto {
    fn from_mlp(mlp: &Mlp) -> Self {
        fn sanitize_f64(x: f64) -> f64 {
            if x.is_finite() {
                x
            } else {
                0.0
            }
        }
        fn sanitize_vec(v: &[f64]) -> Vec<f64> {
            v.iter().map(|&x| sanitize_f64(x)).collect()
        }
        fn sanitize_matrix(m: &[Vec<f64>]) -> Vec<Vec<f64>> {
            m.iter().map(|row| sanitize_vec(row)).collect()
        }
        let layers = mlp
            .layers
            .iter()
            .map(|layer| LayerDto {
                input_size: layer.input_size(),
                output_size: layer.output_size(),
                weights: sanitize_matrix(&layer.weights),
                bias: sanitize_vec(&layer.bias),
                activation: identify_activation_kind(layer.activation.as_ref()),
                dropout: layer.dropout,
            })
            .collect();
        Self {
            input_size: mlp.input_size,
            output_size: mlp.output_size,
            layers,
        }
    }

    fn into_mlp(self) -> Mlp {
        let mut layers: Vec<DenseLayer> = Vec::with_capacity(self.layers.len());
        for ld in &self.layers {
            let mut layer = DenseLayer::new(ld.input_size, ld.output_size, ld.activation.to_arc());
            layer.weights = ld.weights.clone();
            layer.bias = ld.bias.clone();
            layer.dropout = ld.dropout;
            layers.push(layer);
        }
        Mlp {
            layers,
            input_size: self.input_size,
            output_size: self.output_size,
        }
    }
}

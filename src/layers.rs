//! Dense layer with weights, bias, activation, and optional output dropout.
use crate::activations::Activation;
use rand::Rng;
use std::sync::Arc;

/// Matrix type
pub type Matrix = Vec<Vec<f64>>;

/// A fully-connected (dense) layer. `dropout` is the fraction of this
/// layer's outputs dropped during training (0.0 disables it); inference
/// always uses the full output.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub weights: Matrix,
    pub bias: Vec<f64>,
    pub activation: Arc<dyn Activation + Send + Sync>,
    pub dropout: f64,
}

impl DenseLayer {
    /// Create a new dense layer using He (Kaiming) uniform initialization and small positive bias.
    pub fn new(
        input_size: usize,
        output_size: usize,
        activation: Arc<dyn Activation + Send + Sync>,
    ) -> Self {
        let mut rng = rand::thread_rng();
        // He uniform: U(-sqrt(6/fan_in), sqrt(6/fan_in))
        let limit = (6.0f64 / (input_size as f64)).sqrt();
        let weights: Matrix = (0..output_size)
            .map(|_| (0..input_size).map(|_| rng.gen_range(-limit..limit)).collect())
            .collect();
        let bias = vec![0.01; output_size];
        Self {
            weights,
            bias,
            activation,
            dropout: 0.0,
        }
    }

    /// Attach an output dropout rate.
    pub fn with_dropout(mut self, rate: f64) -> Self {
        assert!((0.0..1.0).contains(&rate), "Dropout rate must be in [0, 1)");
        self.dropout = rate;
        self
    }

    pub fn input_size(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.bias.len()
    }

    /// Forward pass: computes pre-activations `z = W·x + b` and activations `a = act(z)`.
    pub fn forward(&self, input: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let z: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, &b)| row.iter().zip(input).map(|(&w, &i)| w * i).sum::<f64>() + b)
            .collect();
        let a = self.activation.apply_vec(&z);
        (z, a)
    }

    /// Sample an inverted-dropout mask for this layer's outputs. Kept units
    /// are scaled by 1/(1-rate) so the expected activation is unchanged.
    pub fn sample_mask<R: Rng>(&self, rng: &mut R) -> Option<Vec<f64>> {
        if self.dropout <= 0.0 {
            return None;
        }
        let scale = 1.0 / (1.0 - self.dropout);
        Some(
            (0..self.output_size())
                .map(|_| {
                    if rng.gen::<f64>() > self.dropout {
                        scale
                    } else {
                        0.0
                    }
                })
                .collect(),
        )
    }
}

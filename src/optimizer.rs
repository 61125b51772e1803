//! RMSProp parameter updates.
use crate::layers::{DenseLayer, Matrix};
use crate::network::Gradients;

/// RMSProp with the standard defaults: learning rate 0.001, decay 0.9,
/// epsilon 1e-7. Keeps a per-parameter moving average of squared gradients
/// and divides each update by its root.
#[derive(Debug, Clone)]
pub struct RmsProp {
    pub learning_rate: f64,
    pub rho: f64,
    pub epsilon: f64,
    sq_weights: Vec<Matrix>,
    sq_bias: Vec<Vec<f64>>,
}

impl Default for RmsProp {
    fn default() -> Self {
        Self::new(0.001)
    }
}

impl RmsProp {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            rho: 0.9,
            epsilon: 1e-7,
            sq_weights: Vec::new(),
            sq_bias: Vec::new(),
        }
    }

    /// Apply one update step from averaged mini-batch gradients.
    pub fn step(&mut self, layers: &mut [DenseLayer], grads: &Gradients) {
        if self.sq_weights.len() != layers.len() {
            self.sq_weights = layers
                .iter()
                .map(|l| vec![vec![0.0; l.input_size()]; l.output_size()])
                .collect();
            self.sq_bias = layers.iter().map(|l| vec![0.0; l.output_size()]).collect();
        }

        for (idx, layer) in layers.iter_mut().enumerate() {
            for (i, row) in layer.weights.iter_mut().enumerate() {
                for (j, w) in row.iter_mut().enumerate() {
                    let g = grads.d_w[idx][i][j];
                    let sq = &mut self.sq_weights[idx][i][j];
                    *sq = self.rho * *sq + (1.0 - self.rho) * g * g;
                    *w -= self.learning_rate * g / (sq.sqrt() + self.epsilon);
                }
            }
            for (i, b) in layer.bias.iter_mut().enumerate() {
                let g = grads.db[idx][i];
                let sq = &mut self.sq_bias[idx][i];
                *sq = self.rho * *sq + (1.0 - self.rho) * g * g;
                *b -= self.learning_rate * g / (sq.sqrt() + self.epsilon);
            }
        }
    }
}

//! Loss functions for training the network.
use anyhow::{anyhow, Result};

/// Cross-entropy loss (assumes `pred` is a valid probability distribution)
pub fn cross_entropy_loss(pred: &[f64], target: &[f64]) -> Result<f64> {
    if pred.len() != target.len() {
        return Err(anyhow!("Size mismatch"));
    }
    let eps = 1e-12;
    let mut loss = 0.0;
    for (&p, &t) in pred.iter().zip(target) {
        let pp = if p < eps {
            eps
        } else if p > 1.0 - eps {
            1.0 - eps
        } else {
            p
        };
        loss -= t * pp.ln();
    }
    let hot = target.iter().filter(|&&t| t == 1.0).count().max(1);
    Ok(loss / hot as f64)
}

/// CE deriv for softmax + CE: softmax(x) - target
pub fn cross_entropy_deriv(pred: &[f64], target: &[f64]) -> Result<Vec<f64>> {
    if pred.len() != target.len() {
        return Err(anyhow!("Size mismatch"));
    }
    Ok(pred.iter().zip(target).map(|(&p, &t)| p - t).collect())
}

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Trait for activation functions.
pub trait Activation: fmt::Debug + Send + Sync + Any {
    fn apply(&self, x: f64) -> f64;
    fn derivative(&self, x: f64) -> f64;
    fn apply_vec(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.apply(xi)).collect()
    }
}

/// ReLU: max(0, x)
#[derive(Debug, Clone, Default)]
pub struct ReLU;

impl Activation for ReLU {
    fn apply(&self, x: f64) -> f64 {
        x.max(0.0)
    }
    fn derivative(&self, x: f64) -> f64 {
        (x > 0.0) as u8 as f64
    }
}

/// Softmax (vector-only; per-element calls are a programming error)
#[derive(Debug, Clone, Default)]
pub struct Softmax;

impl Activation for Softmax {
    fn apply(&self, _x: f64) -> f64 {
        unimplemented!("Softmax is vector-only; use apply_vec")
    }
    fn derivative(&self, _x: f64) -> f64 {
        unimplemented!("Softmax gradients flow through the cross-entropy shortcut")
    }
    fn apply_vec(&self, x: &[f64]) -> Vec<f64> {
        if x.is_empty() {
            return Vec::new();
        }
        let max = x.iter().fold(f64::MIN, |a, &b| a.max(b));
        let exps: Vec<f64> = x.iter().map(|&xi| (xi - max).exp()).collect();
        let exp_sum: f64 = exps.iter().sum();
        if !exp_sum.is_finite() || exp_sum <= 0.0 {
            // Fallback to uniform distribution to avoid NaNs
            let n = x.len() as f64;
            return vec![1.0 / n; x.len()];
        }
        exps.into_iter().map(|e| e / exp_sum).collect()
    }
}

/// Serializable activation kinds for persistence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivationKind {
    ReLU,
    Softmax,
}

impl ActivationKind {
    pub fn to_arc(&self) -> std::sync::Arc<dyn Activation + Send + Sync> {
        use std::sync::Arc;
        match self {
            ActivationKind::ReLU => Arc::new(ReLU),
            ActivationKind::Softmax => Arc::new(Softmax),
        }
    }
}

/// Best-effort identification of activation kind from a trait object
pub fn identify_activation_kind(a: &(dyn Activation + Send + Sync)) -> ActivationKind {
    let any = a as &dyn Any;
    if any.is::<Softmax>() {
        return ActivationKind::Softmax;
    }
    ActivationKind::ReLU
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu() {
        assert_eq!(ReLU.apply(2.5), 2.5);
        assert_eq!(ReLU.apply(-2.5), 0.0);
        assert_eq!(ReLU.derivative(1.0), 1.0);
        assert_eq!(ReLU.derivative(-1.0), 0.0);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = Softmax.apply_vec(&[1.0, 2.0, 3.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_is_shift_invariant() {
        let a = Softmax.apply_vec(&[1.0, 2.0, 3.0]);
        let b = Softmax.apply_vec(&[1001.0, 1002.0, 1003.0]);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_kind_round_trip() {
        let relu = ActivationKind::ReLU.to_arc();
        assert_eq!(identify_activation_kind(relu.as_ref()), ActivationKind::ReLU);
        let softmax = ActivationKind::Softmax.to_arc();
        assert_eq!(
            identify_activation_kind(softmax.as_ref()),
            ActivationKind::Softmax
        );
    }
}

//! Metrics for evaluating classifier performance.
use crate::network::Mlp;

/// Loss and accuracy over one partition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
}

/// Index of the largest value.
pub(crate) fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold(0usize, |max_i, (i, &v)| if v > values[max_i] { i } else { max_i })
}

/// Fraction of samples whose predicted class matches the one-hot target.
pub fn accuracy(features: &[Vec<f64>], targets: &[Vec<f64>], model: &Mlp) -> f64 {
    if features.is_empty() {
        return 0.0;
    }
    let mut correct = 0;
    for (input, target) in features.iter().zip(targets) {
        let pred = model.predict(input);
        if argmax(&pred) == argmax(target) {
            correct += 1;
        }
    }
    correct as f64 / features.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::Softmax;
    use crate::layers::DenseLayer;
    use std::sync::Arc;

    /// 2-in/2-out layer wired so output class = argmax of the input pair.
    fn identity_model() -> Mlp {
        let mut layer = DenseLayer::new(2, 2, Arc::new(Softmax));
        layer.weights = vec![vec![10.0, 0.0], vec![0.0, 10.0]];
        layer.bias = vec![0.0, 0.0];
        Mlp::new(vec![layer])
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.8, 0.1]), 1);
        assert_eq!(argmax(&[0.9, 0.05, 0.05]), 0);
        assert_eq!(argmax(&[0.2, 0.2, 0.6]), 2);
    }

    #[test]
    fn test_accuracy_on_separable_inputs() {
        let model = identity_model();
        let features = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.9, 0.1]];
        let targets = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0], // wrong on purpose
        ];
        let acc = accuracy(&features, &targets, &model);
        assert!((acc - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_of_empty_set_is_zero() {
        let model = identity_model();
        assert_eq!(accuracy(&[], &[], &model), 0.0);
    }
}

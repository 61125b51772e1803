use pixel_mlp::{
    generate_synthetic_data, DenseLayer, Hyperparameters, Mlp, Model, ReLU, RmsProp, Softmax,
};
use std::sync::Arc;

/// Linearly separable 3-class data: class k lights up feature k.
fn separable_data(samples_per_class: usize) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut features = Vec::new();
    let mut targets = Vec::new();
    for i in 0..samples_per_class {
        for class in 0..3 {
            let mut row = vec![0.05; 6];
            row[class] = 1.0 - 0.01 * (i % 5) as f64;
            features.push(row);
            targets.push(pixel_mlp::one_hot(class, 3));
        }
    }
    (features, targets)
}

fn small_classifier() -> Mlp {
    Mlp::new(vec![
        DenseLayer::new(6, 16, Arc::new(ReLU)),
        DenseLayer::new(16, 3, Arc::new(Softmax)),
    ])
}

#[test]
fn test_fit_reduces_loss_on_separable_data() {
    let (features, targets) = separable_data(30);
    let mut net = small_classifier();
    let mut optimizer = RmsProp::new(0.01);

    let before = net.evaluate(&features, &targets).expect("initial score");
    net.fit(&features, &targets, &features, &targets, 30, 10, &mut optimizer)
        .expect("training");
    let after = net.evaluate(&features, &targets).expect("final score");

    assert!(after.loss.is_finite());
    assert!(
        after.loss < before.loss,
        "loss did not improve: {} -> {}",
        before.loss,
        after.loss
    );
    assert!(
        after.accuracy >= 0.8,
        "accuracy too low after training: {}",
        after.accuracy
    );
}

#[test]
fn test_fit_with_dropout_stays_finite() {
    let (features, targets) = generate_synthetic_data(48, 6, 3);
    let mut net = Mlp::new(vec![
        DenseLayer::new(6, 16, Arc::new(ReLU)).with_dropout(0.2),
        DenseLayer::new(16, 3, Arc::new(Softmax)),
    ]);
    let mut optimizer = RmsProp::new(0.01);

    net.fit(&features, &targets, &features, &targets, 10, 8, &mut optimizer)
        .expect("training");
    let score = net.evaluate(&features, &targets).expect("score");
    assert!(score.loss.is_finite());
    assert!((0.0..=1.0).contains(&score.accuracy));
}

#[test]
fn test_fit_rejects_zero_batch_size() {
    let (features, targets) = separable_data(2);
    let mut net = small_classifier();
    let mut optimizer = RmsProp::default();
    assert!(net
        .fit(&features, &targets, &features, &targets, 1, 0, &mut optimizer)
        .is_err());
}

#[test]
fn test_fit_rejects_empty_training_partition() {
    let mut net = small_classifier();
    let mut optimizer = RmsProp::default();
    assert!(net.fit(&[], &[], &[], &[], 1, 4, &mut optimizer).is_err());
}

#[test]
fn test_fit_rejects_mismatched_feature_width() {
    let mut net = small_classifier();
    let mut optimizer = RmsProp::default();
    let features = vec![vec![0.1, 0.2]];
    let targets = vec![pixel_mlp::one_hot(0, 3)];
    assert!(net
        .fit(&features, &targets, &features, &targets, 1, 4, &mut optimizer)
        .is_err());
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("classifier.mlp");

    let net = Mlp::new(vec![
        DenseLayer::new(6, 8, Arc::new(ReLU)).with_dropout(0.2),
        DenseLayer::new(8, 3, Arc::new(Softmax)),
    ]);
    net.save(&path).expect("save");

    let reloaded = Mlp::load(&path).expect("load");
    assert_eq!(net.architecture(), reloaded.architecture());

    let input = vec![0.3, 0.1, 0.9, 0.5, 0.0, 0.7];
    let original = net.forward(&input);
    let restored = reloaded.forward(&input);
    for (a, b) in original.iter().zip(&restored) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(Mlp::load(&dir.path().join("absent.mlp")).is_err());
}

#[test]
fn test_save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let net = small_classifier();
    assert!(net.save(&dir.path().join("no_such_dir/model.mlp")).is_err());
}

#[test]
fn test_architecture_json_names_every_layer() {
    let model = Model::new("topology", Hyperparameters::default());
    let json = serde_json::to_value(model.network().architecture()).expect("serialize");

    assert_eq!(json["input_size"], 784);
    assert_eq!(json["output_size"], 10);
    let layers = json["layers"].as_array().expect("layers array");
    assert_eq!(layers.len(), 3);
    assert_eq!(layers[0]["input_size"], 784);
    assert_eq!(layers[0]["output_size"], 512);
    assert_eq!(layers[0]["activation"], "ReLU");
    assert_eq!(layers[0]["dropout"], 0.2);
    assert_eq!(layers[2]["output_size"], 10);
    assert_eq!(layers[2]["activation"], "Softmax");
    assert_eq!(layers[2]["dropout"], 0.0);
}

#[test]
fn test_topology_ignores_hyperparameters() {
    let small = Model::new("small", Hyperparameters { batch_size: 1, epochs: 1 });
    let large = Model::new(
        "large",
        Hyperparameters {
            batch_size: 512,
            epochs: 100,
        },
    );
    assert_eq!(
        small.network().architecture(),
        large.network().architecture()
    );
    assert_eq!(small.network().parameter_count(), 669_706);
}

//! Helpers for model summaries and synthetic training data.
use crate::dataset::one_hot;
use crate::network::Mlp;
use rand::Rng;

/// Generate a synthetic classification set: features in [0, 1] and a random
/// one-hot label per row.
pub fn generate_synthetic_data(
    n_samples: usize,
    input_size: usize,
    num_classes: usize,
) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut rng = rand::thread_rng();
    let mut features = Vec::with_capacity(n_samples);
    let mut targets = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let input: Vec<f64> = (0..input_size).map(|_| rng.gen_range(0.0..1.0)).collect();
        features.push(input);
        targets.push(one_hot(rng.gen_range(0..num_classes), num_classes));
    }
    (features, targets)
}

/// Print a layer table with parameter counts.
pub fn print_model_summary(mlp: &Mlp) {
    println!("Model Summary: {}", mlp);
    println!("+-------+-------+------------+---------+---------+");
    println!("| Layer | Units | Activation | Dropout | Params  |");
    println!("+-------+-------+------------+---------+---------+");
    for (idx, layer) in mlp.architecture().layers.iter().enumerate() {
        let params = layer.output_size * (layer.input_size + 1);
        println!(
            "| {:>5} | {:>5} | {:<10} | {:>7.2} | {:>7} |",
            idx,
            layer.output_size,
            format!("{:?}", layer.activation),
            layer.dropout,
            params,
        );
    }
    println!("+-------+-------+------------+---------+---------+");
    println!("Total params: {}", mlp.parameter_count());
}

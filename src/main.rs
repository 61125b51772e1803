//! Training job entry point: read hyperparameters and data, train, persist.
use anyhow::Result;
use pixel_mlp::{get_data, read_hyperparameters, JobPaths, Model};

/// Name used for the persisted model artifacts.
const MODEL_NAME: &str = "pixel_mlp";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths = JobPaths::default();
    let hyperparameters = read_hyperparameters(&paths)?;
    let data = get_data(&paths)?;

    let mut model = Model::new(MODEL_NAME, hyperparameters);
    model.run(&data, &paths)
}

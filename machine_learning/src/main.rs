use std::io;

use log::{debug, info};
use machine_learning::{
    arch::{
        Sequential,
        layers::Layer,
        loss::{CategoricalCrossEntropy, LossFn},
    },
    config::RunConfig,
    dataset::Dataset,
    metrics::accuracy,
};
use ndarray::{ArrayView, Dimension};
use rand::{SeedableRng, rngs::StdRng};

fn norm<D: Dimension>(a: ArrayView<f64, D>) -> f64 {
    a.iter().map(|v| v * v).sum::<f64>().sqrt()
}

fn main() -> io::Result<()> {
    env_logger::init();

    let config = RunConfig::from_env()?;
    debug!("{config:?}");

    let mut rng = match config.seed() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let dataset = match config.dataset() {
        Some(path) => {
            info!("loading dataset from {}", path.display());
            Dataset::from_path(path)?
        }
        None => {
            info!(
                "generating spiral dataset: samples={} classes={}",
                config.samples(),
                config.classes()
            );
            Dataset::spiral(config.samples(), config.classes(), &mut rng)
        }
    };
    let targets = dataset.targets();

    let mut model = Sequential::new([
        Layer::dense(dataset.x().ncols(), config.hidden(), &mut rng),
        Layer::relu(),
        Layer::dense(config.hidden(), dataset.classes(), &mut rng),
        Layer::softmax(),
    ]);
    info!(
        "model ready: samples={} params={}",
        dataset.len(),
        model.size()
    );

    let loss_fn = CategoricalCrossEntropy::new();
    let y_pred = model.forward(dataset.x())?;
    let loss = loss_fn.calculate(y_pred.view(), &targets)?;
    let acc = accuracy(y_pred.view(), &targets)?;
    info!("loss: {loss:.6}");
    info!("acc: {acc:.4}");

    let d = loss_fn.backward(y_pred.view(), &targets)?;
    let dx = model.backward(d.view())?;
    debug!("input gradient: {:?}", dx.dim());

    for (i, layer) in model.layers().iter().enumerate() {
        if let Layer::Dense(dense) = layer {
            info!(
                "layer {i}: |W|={:.6e} |b|={:.6e} |dW|={:.6e} |db|={:.6e}",
                norm(dense.weights()),
                norm(dense.biases()),
                norm(dense.dweights()),
                norm(dense.dbiases()),
            );
        }
    }

    Ok(())
}

use ndarray::{Array1, Array2, ArrayView2};

use super::Targets;
use crate::{Result, matrix::mean};

pub trait LossFn {
    /// Computes the loss of every sample of the batch.
    fn forward(&self, y_pred: ArrayView2<f64>, targets: &Targets) -> Result<Array1<f64>>;

    /// Computes the gradient of the mean loss with respect to `y_pred`.
    fn backward(&self, y_pred: ArrayView2<f64>, targets: &Targets) -> Result<Array2<f64>>;

    /// Computes the mean loss of the batch, `0.0` for an empty one.
    fn calculate(&self, y_pred: ArrayView2<f64>, targets: &Targets) -> Result<f64> {
        let losses = self.forward(y_pred, targets)?;
        Ok(mean(losses.view()))
    }
}

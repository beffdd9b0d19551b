use ndarray::ArrayView2;

use crate::{
    MlErr, Result,
    arch::loss::Targets,
    matrix::{equals_mask, mean, row_argmax},
};

/// Computes the fraction of samples whose most probable class is the expected one.
///
/// Dense targets are collapsed back into class indices by taking their arg-max.
///
/// # Arguments
/// * `y_pred` - The predicted probabilities, one row per sample.
/// * `targets` - The expected classes.
///
/// # Returns
/// The accuracy in `[0, 1]`, `0.0` for an empty batch.
pub fn accuracy(y_pred: ArrayView2<f64>, targets: &Targets) -> Result<f64> {
    if targets.len() != y_pred.nrows() {
        return Err(MlErr::ShapeMismatch {
            what: "target samples",
            got: targets.len(),
            expected: y_pred.nrows(),
        });
    }

    let predictions = row_argmax(y_pred)?;
    let labels = match targets {
        Targets::Sparse(labels) => labels.clone(),
        Targets::Dense(dist) => row_argmax(dist.view())?,
    };

    let hits = equals_mask(predictions.view(), labels.view())?;
    Ok(mean(hits.view()))
}

use log::debug;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::{LossFn, Targets};
use crate::{Result, matrix::clip};

/// Predictions are clipped into `[EPSILON, 1 - EPSILON]` before taking logs or dividing by them.
/// Clipping both ends keeps the mean loss from drifting towards either bound.
pub const EPSILON: f64 = 1e-7;

/// Categorical cross-entropy loss, meant to follow a softmax output.
#[derive(Default, Clone, Copy, Debug)]
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    /// Returns a new `CategoricalCrossEntropy`.
    pub fn new() -> Self {
        Self
    }

    fn clipped(y_pred: ArrayView2<f64>) -> Array2<f64> {
        let clipped = clip(&y_pred, EPSILON, 1. - EPSILON);
        let changed = y_pred
            .iter()
            .zip(&clipped)
            .filter(|(a, b)| a != b && !a.is_nan())
            .count();
        if changed > 0 {
            debug!("clipped {changed} predictions");
        }

        clipped
    }
}

impl LossFn for CategoricalCrossEntropy {
    fn forward(&self, y_pred: ArrayView2<f64>, targets: &Targets) -> Result<Array1<f64>> {
        targets.check(y_pred)?;
        let y_pred = Self::clipped(y_pred);

        let losses: Array1<f64> = match targets {
            Targets::Sparse(labels) => labels
                .iter()
                .enumerate()
                .map(|(i, &label)| -y_pred[[i, label]].ln())
                .collect(),
            Targets::Dense(dist) => (&y_pred * dist).sum_axis(Axis(1)).mapv_into(|c| -c.ln()),
        };

        Ok(losses)
    }

    fn backward(&self, y_pred: ArrayView2<f64>, targets: &Targets) -> Result<Array2<f64>> {
        targets.check(y_pred)?;
        let samples = y_pred.nrows();
        let y = targets.to_dense(y_pred.ncols())?;
        let y_pred = Self::clipped(y_pred);

        let d = -y / y_pred;
        if samples == 0 {
            return Ok(d);
        }

        Ok(d / samples as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MlErr;
    use ndarray::array;

    #[test]
    fn sparse_and_dense_targets_agree() {
        let p = array![[0.7, 0.3], [0.2, 0.8]];
        let cce = CategoricalCrossEntropy::new();

        let sparse = cce.forward(p.view(), &Targets::Sparse(array![0, 1])).unwrap();
        let dense = cce
            .forward(p.view(), &Targets::Dense(array![[1., 0.], [0., 1.]]))
            .unwrap();

        assert!((sparse[0] - 0.357).abs() < 1e-3);
        assert!((sparse[1] - 0.223).abs() < 1e-3);
        for (a, b) in sparse.iter().zip(&dense) {
            assert!((a - b).abs() < 1e-12);
        }

        let mean = cce.calculate(p.view(), &Targets::Sparse(array![0, 1])).unwrap();
        assert!((mean - 0.290).abs() < 1e-3);
    }

    #[test]
    fn soft_targets_weight_the_confidences() {
        let p = array![[0.5, 0.25, 0.25]];
        let targets = Targets::Dense(array![[0.5, 0.5, 0.]]);
        let loss = CategoricalCrossEntropy.forward(p.view(), &targets).unwrap();

        assert!((loss[0] + 0.375f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn loss_is_bounded_by_clipping() {
        let p = array![[1., 0.], [0., 1.]];
        let targets = Targets::Sparse(array![0, 0]);
        let losses = CategoricalCrossEntropy.forward(p.view(), &targets).unwrap();

        assert!((losses[0] - 1e-7).abs() < 1e-9);
        assert!((losses[1] + EPSILON.ln()).abs() < 1e-9);
        assert!((losses[1] - 16.118).abs() < 1e-3);
    }

    #[test]
    fn nan_predictions_are_not_clipped_away() {
        let p = array![[f64::NAN, 0.5], [0.5, 0.5]];
        let cce = CategoricalCrossEntropy;
        let targets = Targets::Sparse(array![0, 0]);

        let losses = cce.forward(p.view(), &targets).unwrap();
        assert!(losses[0].is_nan());
        assert!((losses[1] - 2f64.ln()).abs() < 1e-12);
        assert!(cce.calculate(p.view(), &targets).unwrap().is_nan());
        assert!(cce.backward(p.view(), &targets).unwrap()[[0, 0]].is_nan());
    }

    #[test]
    fn forward_does_not_touch_predictions() {
        let p = array![[1., 0.]];
        CategoricalCrossEntropy
            .forward(p.view(), &Targets::Sparse(array![0]))
            .unwrap();

        assert_eq!(p, array![[1., 0.]]);
    }

    #[test]
    fn empty_batch_has_zero_loss() {
        let p = Array2::<f64>::zeros((0, 3));
        let targets = Targets::Sparse(Array1::zeros(0));
        let cce = CategoricalCrossEntropy;

        assert_eq!(cce.calculate(p.view(), &targets).unwrap(), 0.);
        assert_eq!(cce.backward(p.view(), &targets).unwrap().dim(), (0, 3));
    }

    #[test]
    fn backward_averages_over_the_batch() {
        let p = array![[0.7, 0.3], [0.2, 0.8]];
        let sparse = CategoricalCrossEntropy
            .backward(p.view(), &Targets::Sparse(array![0, 1]))
            .unwrap();
        let dense = CategoricalCrossEntropy
            .backward(p.view(), &Targets::Dense(array![[1., 0.], [0., 1.]]))
            .unwrap();

        let expected = array![[-1. / 0.7 / 2., 0.], [0., -1. / 0.8 / 2.]];
        for ((a, b), e) in sparse.iter().zip(&dense).zip(&expected) {
            assert!((a - e).abs() < 1e-12);
            assert!((b - e).abs() < 1e-12);
        }
    }

    #[test]
    fn backward_uses_clipped_predictions() {
        let p = array![[0., 1.]];
        let d = CategoricalCrossEntropy
            .backward(p.view(), &Targets::Sparse(array![0]))
            .unwrap();

        assert!((d[[0, 0]] + 1. / EPSILON).abs() < 1e-3);
        assert!(d.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rejects_incompatible_targets() {
        let p = array![[0.7, 0.3], [0.2, 0.8]];
        let cce = CategoricalCrossEntropy;

        assert!(matches!(
            cce.forward(p.view(), &Targets::Sparse(array![0, 2])),
            Err(MlErr::LabelOutOfRange {
                sample: 1,
                label: 2,
                classes: 2
            })
        ));
        assert!(matches!(
            cce.backward(p.view(), &Targets::Sparse(array![0])),
            Err(MlErr::ShapeMismatch { .. })
        ));
        assert!(matches!(
            cce.backward(p.view(), &Targets::Dense(array![[1., 0., 0.], [0., 1., 0.]])),
            Err(MlErr::ShapeMismatch { .. })
        ));
    }
}

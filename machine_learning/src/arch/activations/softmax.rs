use ndarray::prelude::*;

use crate::{
    MlErr, Result,
    matrix::{row_max, row_sums, subtract_row_max},
};

/// Row-wise softmax, turning every row into a probability distribution.
///
/// Caches its last *output*, which is all the backward pass needs.
#[derive(Clone, Debug, Default)]
pub struct Softmax {
    y: Option<Array2<f64>>,
}

impl Softmax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the softmax of every row of `x`, subtracting the row maximum first so `exp` never
    /// overflows.
    pub fn forward(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let mut z = x.to_owned();
        let maxes = row_max(z.view());
        subtract_row_max(&mut z, maxes.view())?;

        let e = z.mapv_into(f64::exp);
        let sums = row_sums(e.view());
        let y = e / &sums.insert_axis(Axis(1));

        self.y = Some(y.clone());
        Ok(y)
    }

    /// Computes the Jacobian-vector product of the softmax for every row,
    /// `dx = y * (d - <d, y>)`.
    pub fn backward(&mut self, d: ArrayView2<f64>) -> Result<Array2<f64>> {
        let y = self.y.as_ref().ok_or(MlErr::Uninitialized { what: "softmax" })?;

        if d.dim() != y.dim() {
            return Err(MlErr::ShapeMismatch {
                what: "softmax gradient",
                got: d.len(),
                expected: y.len(),
            });
        }

        let dots = (&d * y).sum_axis(Axis(1)).insert_axis(Axis(1));
        Ok((&d - &dots) * y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    fn assert_close(a: ArrayView2<f64>, b: ArrayView2<f64>, tol: f64) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < tol, "{a} != {b}");
        }
    }

    #[test]
    fn forward_normalizes_rows() {
        let mut softmax = Softmax::new();
        let y = softmax.forward(array![[1., 2., 3.], [0., 0., 0.]].view()).unwrap();

        let e = [1f64.exp(), 2f64.exp(), 3f64.exp()];
        let s: f64 = e.iter().sum();
        let expected = array![[e[0] / s, e[1] / s, e[2] / s], [1. / 3., 1. / 3., 1. / 3.]];
        assert_close(y.view(), expected.view(), 1e-12);
    }

    #[test]
    fn forward_survives_huge_logits() {
        let mut softmax = Softmax::new();
        let y = softmax.forward(array![[1000., 1000.], [-1000., 0.]].view()).unwrap();

        assert!(y.iter().all(|v| v.is_finite()));
        assert_close(y.row(0).insert_axis(Axis(0)), array![[0.5, 0.5]].view(), 1e-12);
    }

    #[test]
    fn forward_leaves_input_untouched() {
        let mut softmax = Softmax::new();
        let x = array![[1., 5.]];
        softmax.forward(x.view()).unwrap();

        assert_eq!(x, array![[1., 5.]]);
    }

    #[test]
    fn backward_matches_jacobian() {
        let mut softmax = Softmax::new();
        let y = softmax.forward(array![[0.5, -1., 2.]].view()).unwrap();
        let d = array![[1., -2., 0.5]];
        let dx = softmax.backward(d.view()).unwrap();

        // Explicit Jacobian: J[i][j] = y_i * (δ_ij - y_j).
        let y = y.row(0);
        let mut expected = Array2::zeros((1, 3));
        for i in 0..3 {
            for j in 0..3 {
                let delta = if i == j { 1. } else { 0. };
                expected[[0, i]] += y[i] * (delta - y[j]) * d[[0, j]];
            }
        }

        assert_close(dx.view(), expected.view(), 1e-12);
    }

    #[test]
    fn backward_requires_forward() {
        let mut softmax = Softmax::new();
        assert!(matches!(
            softmax.backward(array![[1.]].view()),
            Err(MlErr::Uninitialized { .. })
        ));
    }

    proptest! {
        #[test]
        fn rows_are_distributions(values in prop::collection::vec(-50.0..50.0f64, 8)) {
            let x = Array2::from_shape_vec((2, 4), values).unwrap();
            let y = Softmax::new().forward(x.view()).unwrap();

            for row in y.rows() {
                prop_assert!((row.sum() - 1.).abs() < 1e-9);
                prop_assert!(row.iter().all(|&p| p > 0. && p <= 1.));
            }
        }

        #[test]
        fn shift_invariant(
            values in prop::collection::vec(-20.0..20.0f64, 6),
            c in -100.0..100.0f64,
        ) {
            let x = Array2::from_shape_vec((2, 3), values).unwrap();
            let y = Softmax::new().forward(x.view()).unwrap();
            let shifted = Softmax::new().forward((&x + c).view()).unwrap();

            for (a, b) in y.iter().zip(&shifted) {
                prop_assert!((a - b).abs() < 1e-9);
            }
        }
    }
}

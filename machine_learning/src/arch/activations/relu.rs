use ndarray::prelude::*;

use crate::{MlErr, Result};

/// Rectified linear unit, `max(0, x)` elementwise.
#[derive(Clone, Debug, Default)]
pub struct ReLU {
    x: Option<Array2<f64>>,
}

impl ReLU {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamps the negatives of `x` to zero, caching `x`.
    pub fn forward(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let y = x.mapv(|v| v.max(0.));

        self.x = Some(x.to_owned());
        Ok(y)
    }

    /// Gates `d` by the sign of the last forward input: the gradient flows only where that input
    /// was strictly positive.
    pub fn backward(&mut self, d: ArrayView2<f64>) -> Result<Array2<f64>> {
        let x = self.x.as_ref().ok_or(MlErr::Uninitialized { what: "relu" })?;

        if d.dim() != x.dim() {
            return Err(MlErr::ShapeMismatch {
                what: "relu gradient",
                got: d.len(),
                expected: x.len(),
            });
        }

        let mut dx = d.to_owned();
        dx.zip_mut_with(x, |d, &x| {
            if x <= 0. {
                *d = 0.;
            }
        });

        Ok(dx)
    }
}

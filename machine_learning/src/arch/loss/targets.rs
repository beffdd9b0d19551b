use ndarray::{Array1, Array2, ArrayView2};

use crate::{MlErr, Result, matrix::one_hot_with_classes};

/// The expected outputs of a batch.
#[derive(Clone, Debug, PartialEq)]
pub enum Targets {
    /// One class index per sample.
    Sparse(Array1<usize>),
    /// One target distribution per sample, one-hot or soft.
    Dense(Array2<f64>),
}

impl Targets {
    /// Returns the amount of samples the targets describe.
    pub fn len(&self) -> usize {
        match self {
            Targets::Sparse(labels) => labels.len(),
            Targets::Dense(dist) => dist.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that the targets describe every row of `y_pred`, and only valid columns of it.
    pub fn check(&self, y_pred: ArrayView2<f64>) -> Result<()> {
        if self.len() != y_pred.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "target samples",
                got: self.len(),
                expected: y_pred.nrows(),
            });
        }

        match self {
            Targets::Sparse(labels) => {
                let classes = y_pred.ncols();
                match labels.iter().enumerate().find(|(_, l)| **l >= classes) {
                    Some((sample, &label)) => Err(MlErr::LabelOutOfRange {
                        sample,
                        label,
                        classes,
                    }),
                    None => Ok(()),
                }
            }
            Targets::Dense(dist) if dist.ncols() != y_pred.ncols() => Err(MlErr::ShapeMismatch {
                what: "target classes",
                got: dist.ncols(),
                expected: y_pred.ncols(),
            }),
            Targets::Dense(_) => Ok(()),
        }
    }

    /// Returns the targets as a dense matrix with `classes` columns.
    pub fn to_dense(&self, classes: usize) -> Result<Array2<f64>> {
        match self {
            Targets::Sparse(labels) => one_hot_with_classes(labels.view(), classes),
            Targets::Dense(dist) => Ok(dist.clone()),
        }
    }
}

impl From<Array1<usize>> for Targets {
    fn from(value: Array1<usize>) -> Self {
        Self::Sparse(value)
    }
}

impl From<Array2<f64>> for Targets {
    fn from(value: Array2<f64>) -> Self {
        Self::Dense(value)
    }
}

use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::Dense;
use crate::{
    Result,
    arch::activations::{ReLU, Softmax},
};

#[derive(Clone, Debug)]
pub enum Layer {
    Dense(Dense),
    ReLU(ReLU),
    Softmax(Softmax),
}
use Layer::*;

impl Layer {
    pub fn dense<R: Rng + ?Sized>(n_inputs: usize, n_neurons: usize, rng: &mut R) -> Self {
        Self::Dense(Dense::with_rng(n_inputs, n_neurons, rng))
    }

    pub fn relu() -> Self {
        Self::ReLU(ReLU::new())
    }

    pub fn softmax() -> Self {
        Self::Softmax(Softmax::new())
    }

    /// Returns the amount of parameters of the layer.
    pub fn size(&self) -> usize {
        match self {
            Dense(l) => l.size(),
            ReLU(_) | Softmax(_) => 0,
        }
    }

    pub fn forward(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        match self {
            Dense(l) => l.forward(x),
            ReLU(l) => l.forward(x),
            Softmax(l) => l.forward(x),
        }
    }

    pub fn backward(&mut self, d: ArrayView2<f64>) -> Result<Array2<f64>> {
        match self {
            Dense(l) => l.backward(d),
            ReLU(l) => l.backward(d),
            Softmax(l) => l.backward(d),
        }
    }
}

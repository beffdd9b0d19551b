use log::debug;
use ndarray::prelude::*;
use ndarray_rand::{RandomExt, rand_distr::Uniform};
use rand::Rng;

use crate::{
    MlErr, Result,
    matrix::{broadcast_row_vector, col_sums},
};

/// Scale applied to the uniform `[-1, 1]` samples the weights start from.
const INIT_SCALE: f64 = 0.01;

/// A fully connected layer computing `y = x·W + b`.
///
/// The weights have shape `(n_inputs, n_neurons)`, one column per neuron. The last forward input
/// is cached since the weight gradient is expressed in terms of it.
#[derive(Clone, Debug)]
pub struct Dense {
    weights: Array2<f64>,
    biases: Array1<f64>,

    // Forward metadata
    x: Option<Array2<f64>>,

    // Backward metadata
    dweights: Array2<f64>,
    dbiases: Array1<f64>,
}

impl Dense {
    /// Creates a new `Dense` layer drawing its weights from the thread local rng.
    ///
    /// # Arguments
    /// * `n_inputs` - The amount of features of every input sample.
    /// * `n_neurons` - The amount of outputs of the layer.
    ///
    /// # Returns
    /// A new `Dense` instance.
    pub fn new(n_inputs: usize, n_neurons: usize) -> Self {
        Self::with_rng(n_inputs, n_neurons, &mut rand::rng())
    }

    /// Creates a new `Dense` layer with weights sampled uniformly from `[-1, 1]` and scaled by
    /// `0.01`, biases start at zero.
    ///
    /// # Arguments
    /// * `n_inputs` - The amount of features of every input sample.
    /// * `n_neurons` - The amount of outputs of the layer.
    /// * `rng` - The source of randomness for the weights.
    ///
    /// # Returns
    /// A new `Dense` instance.
    pub fn with_rng<R: Rng + ?Sized>(n_inputs: usize, n_neurons: usize, rng: &mut R) -> Self {
        // SAFETY: This range is always valid.
        let distribution = Uniform::new_inclusive(-1.0, 1.0).unwrap();
        let weights = Array2::random_using((n_inputs, n_neurons), distribution, rng) * INIT_SCALE;

        Self {
            dweights: Array2::zeros(weights.raw_dim()),
            dbiases: Array1::zeros(n_neurons),
            weights,
            biases: Array1::zeros(n_neurons),
            x: None,
        }
    }

    /// Creates a new `Dense` layer out of existing parameters.
    ///
    /// # Returns
    /// An error if the amount of biases doesn't match the amount of weight columns.
    pub fn from_params(weights: Array2<f64>, biases: Array1<f64>) -> Result<Self> {
        if biases.len() != weights.ncols() {
            return Err(MlErr::ShapeMismatch {
                what: "biases",
                got: biases.len(),
                expected: weights.ncols(),
            });
        }

        Ok(Self {
            dweights: Array2::zeros(weights.raw_dim()),
            dbiases: Array1::zeros(biases.raw_dim()),
            weights,
            biases,
            x: None,
        })
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    pub fn n_inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_neurons(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    pub fn biases(&self) -> ArrayView1<'_, f64> {
        self.biases.view()
    }

    /// The gradient of the weights computed by the last `backward` call.
    pub fn dweights(&self) -> ArrayView2<'_, f64> {
        self.dweights.view()
    }

    /// The gradient of the biases computed by the last `backward` call.
    pub fn dbiases(&self) -> ArrayView1<'_, f64> {
        self.dbiases.view()
    }

    /// Makes a forward pass through the layer, caching `x`.
    ///
    /// # Arguments
    /// * `x` - The input batch, one sample per row.
    ///
    /// # Returns
    /// The `(x.nrows(), n_neurons)` output or an error if `x` has the wrong amount of columns.
    pub fn forward(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_inputs() {
            return Err(MlErr::ShapeMismatch {
                what: "dense input columns",
                got: x.ncols(),
                expected: self.n_inputs(),
            });
        }

        debug!("dense forward: {:?} x {:?}", x.dim(), self.weights.dim());

        let b = broadcast_row_vector(self.biases.view(), x.nrows());
        let y = x.dot(&self.weights) + b;

        self.x = Some(x.to_owned());
        Ok(y)
    }

    /// Makes a backward pass through the layer, overwriting the weight and bias gradients.
    ///
    /// # Arguments
    /// * `d` - The gradient with respect to this layer's last output.
    ///
    /// # Returns
    /// The gradient with respect to this layer's last input, or an error if no forward pass
    /// happened yet or `d` doesn't have the shape of the last output.
    pub fn backward(&mut self, d: ArrayView2<f64>) -> Result<Array2<f64>> {
        let x = self
            .x
            .as_ref()
            .ok_or(MlErr::Uninitialized { what: "dense layer" })?;

        if d.nrows() != x.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "dense gradient rows",
                got: d.nrows(),
                expected: x.nrows(),
            });
        }

        if d.ncols() != self.n_neurons() {
            return Err(MlErr::ShapeMismatch {
                what: "dense gradient columns",
                got: d.ncols(),
                expected: self.n_neurons(),
            });
        }

        debug!("dense backward: {:?}", d.dim());

        self.dweights = x.t().dot(&d);
        self.dbiases = col_sums(d);

        Ok(d.dot(&self.weights.t()))
    }
}

use log::debug;
use ndarray::{Array2, ArrayView2};

use super::layers::Layer;
use crate::Result;

/// A sequential model: information flows forward when computing an output and backward when
/// computing the gradients of its layers.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Layer::size).sum()
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `x` - The input data.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn forward(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let mut y = x.to_owned();
        for (i, layer) in self.layers.iter_mut().enumerate() {
            y = layer.forward(y.view())?;
            debug!("layer {i} output: {:?}", y.dim());
        }

        Ok(y)
    }

    /// Makes a backward pass through the network, leaving every layer's gradients in place.
    ///
    /// # Arguments
    /// * `d` - The gradient of the loss with respect to the network's output.
    ///
    /// # Returns
    /// The gradient with respect to the network's input or an error if occurred.
    pub fn backward(&mut self, d: ArrayView2<f64>) -> Result<Array2<f64>> {
        let mut d = d.to_owned();
        for layer in self.layers.iter_mut().rev() {
            d = layer.backward(d.view())?;
        }

        Ok(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MlErr,
        arch::layers::Dense,
        arch::loss::{CategoricalCrossEntropy, LossFn, Targets},
    };
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn size_counts_dense_params_only() {
        let mut rng = StdRng::seed_from_u64(0);
        let model = Sequential::new([
            Layer::dense(2, 3, &mut rng),
            Layer::relu(),
            Layer::dense(3, 4, &mut rng),
            Layer::softmax(),
        ]);

        assert_eq!(model.size(), (2 * 3 + 3) + (3 * 4 + 4));
        assert_eq!(model.layers().len(), 4);
    }

    #[test]
    fn backward_before_forward_fails() {
        let mut model = Sequential::new([Layer::relu()]);
        assert!(matches!(
            model.backward(array![[1.]].view()),
            Err(MlErr::Uninitialized { .. })
        ));
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let dense1 = Dense::from_params(
            array![[0.2, -0.4, 0.1], [0.5, 0.3, -0.2]],
            array![0.2, 0., -0.1],
        )
        .unwrap();
        let dense2 = Dense::from_params(
            array![[0.3, -0.1], [-0.2, 0.4], [0.6, 0.2]],
            array![0., 0.05],
        )
        .unwrap();
        let mut model = Sequential::new([
            Layer::Dense(dense1),
            Layer::relu(),
            Layer::Dense(dense2),
            Layer::softmax(),
        ]);

        let x = array![[1., 2.], [-0.5, 1.5], [2., -1.]];
        let targets = Targets::Sparse(array![0, 1, 1]);
        let cce = CategoricalCrossEntropy;

        let y_pred = model.forward(x.view()).unwrap();
        let d = cce.backward(y_pred.view(), &targets).unwrap();
        let dx = model.backward(d.view()).unwrap();

        let h = 1e-6;
        for i in 0..x.nrows() {
            for j in 0..x.ncols() {
                let mut plus = x.clone();
                plus[[i, j]] += h;
                let mut minus = x.clone();
                minus[[i, j]] -= h;

                let mut probe = model.clone();
                let lp = cce
                    .calculate(probe.forward(plus.view()).unwrap().view(), &targets)
                    .unwrap();
                let lm = cce
                    .calculate(probe.forward(minus.view()).unwrap().view(), &targets)
                    .unwrap();

                let numeric = (lp - lm) / (2. * h);
                assert!(
                    (numeric - dx[[i, j]]).abs() < 1e-6,
                    "dx[{i}, {j}]: {numeric} vs {}",
                    dx[[i, j]]
                );
            }
        }
    }
}

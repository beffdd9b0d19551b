use std::{fs::File, io::BufReader, io::Read, path::Path};

use ndarray::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::Deserialize;

use crate::{
    MlErr, Result,
    arch::loss::Targets,
    matrix::{infer_classes, labels_from_f64, to_dense},
};

/// Angle noise of the spiral generator.
const SPIRAL_NOISE: f64 = 0.2;

/// The payload served by the dataset server: parallel arrays of samples and class indices.
#[derive(Deserialize)]
struct Payload {
    x: Vec<Vec<f64>>,
    y: Vec<f64>,
}

/// An in memory labeled dataset, one sample per row of `x`.
#[derive(Clone, Debug)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array1<usize>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Returns
    /// An error if there isn't exactly one label per sample or a label is not lower than
    /// `MAX_CLASSES`.
    pub fn new(x: Array2<f64>, y: Array1<usize>) -> Result<Self> {
        if y.len() != x.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "dataset labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        infer_classes(y.view())?;
        Ok(Self { x, y })
    }

    /// Decodes a `{"x": [[..], ..], "y": [..]}` JSON payload.
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let payload: Payload = serde_json::from_reader(reader)?;
        let x = to_dense(&payload.x)?;
        let y = labels_from_f64(&payload.y)?;

        Self::new(x, y)
    }

    /// Reads and decodes a JSON payload stored at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json(BufReader::new(file))
    }

    /// Generates `classes` interleaved noisy spiral arms of `samples` two dimensional points each.
    ///
    /// # Arguments
    /// * `samples` - The amount of points per class.
    /// * `classes` - The amount of spiral arms.
    /// * `rng` - The source of the angle noise.
    ///
    /// # Returns
    /// A dataset of `samples * classes` rows, grouped by class.
    pub fn spiral<R: Rng + ?Sized>(samples: usize, classes: usize, rng: &mut R) -> Self {
        let mut x = Array2::zeros((samples * classes, 2));
        let mut y = Array1::zeros(samples * classes);
        let radius = Array1::linspace(0., 1., samples);

        for class in 0..classes {
            let start = class as f64 * 4.;
            let angles = Array1::linspace(start, start + 4., samples);

            for k in 0..samples {
                let noise: f64 = StandardNormal.sample(rng);
                let t = (angles[k] + noise * SPIRAL_NOISE) * 2.5;
                let row = class * samples + k;

                x[[row, 0]] = radius[k] * t.sin();
                x[[row, 1]] = radius[k] * t.cos();
                y[row] = class;
            }
        }

        Self { x, y }
    }

    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, usize> {
        self.y.view()
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Returns the amount of classes, inferred as the greatest label plus one.
    pub fn classes(&self) -> usize {
        // `new` bounds labels by `MAX_CLASSES` and `spiral` keeps them below `classes`.
        self.y.iter().max().map_or(0, |&max| max + 1)
    }

    /// Returns the labels as sparse targets.
    pub fn targets(&self) -> Targets {
        Targets::Sparse(self.y.clone())
    }
}

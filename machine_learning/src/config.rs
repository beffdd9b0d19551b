use std::{env, num::NonZeroUsize, path::PathBuf, str::FromStr};

use crate::{MlErr, Result};

const DEFAULT_HIDDEN: NonZeroUsize = NonZeroUsize::new(3).unwrap();
const DEFAULT_SAMPLES: NonZeroUsize = NonZeroUsize::new(100).unwrap();
const DEFAULT_CLASSES: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Immutable settings of a single forward and backward run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    hidden: NonZeroUsize,
    samples: NonZeroUsize,
    classes: NonZeroUsize,
    seed: Option<u64>,
    dataset: Option<PathBuf>,
}

impl RunConfig {
    /// Creates a new run configuration generating a spiral dataset.
    ///
    /// # Args
    /// * `hidden` - Neurons of the hidden dense layer.
    /// * `samples` - Spiral samples per class.
    /// * `classes` - Spiral classes.
    ///
    /// # Returns
    /// A `RunConfig` instance.
    pub fn new(hidden: NonZeroUsize, samples: NonZeroUsize, classes: NonZeroUsize) -> Self {
        Self {
            hidden,
            samples,
            classes,
            seed: None,
            dataset: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_dataset<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.dataset = Some(path.into());
        self
    }

    /// Reads the configuration from the `NN_HIDDEN`, `NN_SAMPLES`, `NN_CLASSES`, `NN_SEED` and
    /// `NN_DATASET` environment variables, falling back to defaults for the missing ones.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|var| env::var(var).ok())
    }

    /// Same as `from_env` but reading the variables through `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let count = |var: &'static str, default: NonZeroUsize| {
            parse::<NonZeroUsize, _>(&lookup, var).map(|v| v.unwrap_or(default))
        };

        Ok(Self {
            hidden: count("NN_HIDDEN", DEFAULT_HIDDEN)?,
            samples: count("NN_SAMPLES", DEFAULT_SAMPLES)?,
            classes: count("NN_CLASSES", DEFAULT_CLASSES)?,
            seed: parse(&lookup, "NN_SEED")?,
            dataset: lookup("NN_DATASET").map(PathBuf::from),
        })
    }

    pub fn hidden(&self) -> usize {
        self.hidden.get()
    }

    pub fn samples(&self) -> usize {
        self.samples.get()
    }

    pub fn classes(&self) -> usize {
        self.classes.get()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn dataset(&self) -> Option<&PathBuf> {
        self.dataset.as_ref()
    }
}

fn parse<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| MlErr::InvalidConfig { var, value })
}

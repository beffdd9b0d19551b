pub mod arch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod matrix;
pub mod metrics;

pub use error::{MlErr, Result};

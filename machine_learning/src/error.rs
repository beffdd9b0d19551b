use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    /// Operand dimensions are incompatible.
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A sparse target points outside of the prediction's columns.
    LabelOutOfRange {
        sample: usize,
        label: usize,
        classes: usize,
    },
    /// `backward` was called before any `forward` populated the cache.
    Uninitialized { what: &'static str },
    /// A reduction was asked over an axis of length zero.
    EmptyDimension { what: &'static str },
    /// A decoded label is not a non negative integer.
    InvalidLabel { index: usize, value: f64 },
    /// An environment variable could not be parsed.
    InvalidConfig { var: &'static str, value: String },
    Io(io::Error),
    Json(serde_json::Error),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(f, "shape mismatch for {what}: got {got}, expected {expected}"),
            MlErr::LabelOutOfRange {
                sample,
                label,
                classes,
            } => write!(
                f,
                "label {label} of sample {sample} is out of range for {classes} classes"
            ),
            MlErr::Uninitialized { what } => {
                write!(f, "{what}: backward called before any forward pass")
            }
            MlErr::EmptyDimension { what } => write!(f, "{what} has an empty dimension"),
            MlErr::InvalidLabel { index, value } => {
                write!(f, "label at position {index} is not a class index: {value}")
            }
            MlErr::InvalidConfig { var, value } => {
                write!(f, "invalid value for {var}: {value:?}")
            }
            MlErr::Io(e) => write!(f, "io error: {e}"),
            MlErr::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            MlErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Boundary conversion for the runner binary.
impl From<MlErr> for io::Error {
    fn from(value: MlErr) -> Self {
        match value {
            MlErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

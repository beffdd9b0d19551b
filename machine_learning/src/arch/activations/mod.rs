mod relu;
mod softmax;

pub use relu::ReLU;
pub use softmax::Softmax;

pub mod measure;
pub mod report;

pub use measure::{Dtype, Measurement, Measurer, BASELINE_DTYPE};
pub use report::Comparison;

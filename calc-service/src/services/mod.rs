pub mod calc;
pub mod metrics;

pub use calc::{CalcError, increment};
pub use metrics::{get_metrics, init_metrics};
